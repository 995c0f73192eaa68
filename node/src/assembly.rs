// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Builds kernel snapshots from store rows.
//!
//! Dates are formatted here, once, in the canonical textual forms the kernel expects.

use chrono::SecondsFormat;
use graintrust_kernel::error::KernelResult;
use graintrust_kernel::types::{derive_status, BatchSnapshot, ImageVerdict, StageSnapshot};

use crate::errors::AnchorError;
use crate::store::{BatchRecord, BatchStore, ImageVerificationRecord, StageRecord};

const MAX_BATCH_ID_LEN: usize = 128;

/// Rejects identifiers before any store or hashing work.
pub fn validate_batch_id(batch_id: &str) -> Result<(), AnchorError> {
    if batch_id.trim().is_empty() {
        return Err(AnchorError::Validation("batchId is required".to_string()));
    }
    if batch_id.len() > MAX_BATCH_ID_LEN {
        return Err(AnchorError::Validation(format!(
            "batchId longer than {} bytes",
            MAX_BATCH_ID_LEN
        )));
    }
    if batch_id.chars().any(|c| c.is_control() || c == '/') {
        return Err(AnchorError::Validation("batchId contains invalid characters".to_string()));
    }
    Ok(())
}

fn stage_snapshot(stage: &StageRecord, verifications: &[ImageVerificationRecord]) -> Option<StageSnapshot> {
    let completed_at = stage.completed_at?;

    let image_urls: Vec<String> = stage.images.iter().map(|i| i.url.clone()).collect();
    let image_hashes: Vec<String> = stage.images.iter().map(|i| i.content_hash.clone()).collect();
    let verdicts: Vec<ImageVerdict> = verifications
        .iter()
        .filter(|v| v.stage_id == stage.id)
        .map(|v| ImageVerdict {
            reference: v.image_url.clone(),
            verdict: v.verdict,
        })
        .collect();

    Some(StageSnapshot {
        stage_id: stage.id.clone(),
        name: stage.name.clone(),
        completed_at: completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        verification_status: derive_status(&image_urls, &verdicts),
        image_urls,
        image_hashes,
    })
}

/// Snapshot of a batch's completed stages. Stages without a completion time are left out.
pub fn build_snapshot(
    batch: &BatchRecord,
    stages: &[StageRecord],
    verifications: &[ImageVerificationRecord],
) -> KernelResult<BatchSnapshot> {
    let snapshot = BatchSnapshot {
        batch_id: batch.id.clone(),
        batch_code: batch.batch_code.clone(),
        farmer_id: batch.farmer_id.clone(),
        farmer_name: batch.farmer_name.clone(),
        crop_type: batch.crop_type.clone(),
        quantity: batch.quantity,
        location: batch.location.clone(),
        harvest_date: batch.harvest_date.format("%Y-%m-%d").to_string(),
        stages: stages
            .iter()
            .filter_map(|s| stage_snapshot(s, verifications))
            .collect(),
    };
    snapshot.validate()?;
    Ok(snapshot)
}

/// Loads a batch row and the snapshot of its current data.
pub async fn load_snapshot(
    store: &dyn BatchStore,
    batch_id: &str,
) -> Result<(BatchRecord, BatchSnapshot), AnchorError> {
    let batch = store
        .load_batch(batch_id)
        .await?
        .ok_or_else(|| AnchorError::NotFound(batch_id.to_string()))?;
    let snapshot = snapshot_for(store, &batch).await?;
    Ok((batch, snapshot))
}

/// Snapshot of an already loaded batch row.
pub async fn snapshot_for(store: &dyn BatchStore, batch: &BatchRecord) -> Result<BatchSnapshot, AnchorError> {
    let (stages, verifications) = futures::try_join!(
        store.load_stages(&batch.id),
        store.load_verifications(&batch.id)
    )?;
    Ok(build_snapshot(batch, &stages, &verifications)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AnchorState, ImageRecord};
    use chrono::{NaiveDate, TimeZone, Utc};
    use graintrust_kernel::types::{Verdict, VerificationStatus};

    fn batch() -> BatchRecord {
        BatchRecord {
            id: "b1".to_string(),
            batch_code: "GT-1".to_string(),
            farmer_id: "f1".to_string(),
            farmer_name: "Meena".to_string(),
            crop_type: "Tomato".to_string(),
            quantity: 75.0,
            location: "Nashik".to_string(),
            harvest_date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            anchor: AnchorState::default(),
        }
    }

    fn stage(id: &str, order: u32, completed: bool, urls: &[&str]) -> StageRecord {
        StageRecord {
            id: id.to_string(),
            batch_id: "b1".to_string(),
            name: format!("Stage {}", order),
            order,
            completed_at: completed.then(|| Utc.with_ymd_and_hms(2025, 1, 5, 8, 0, 0).unwrap()),
            images: urls
                .iter()
                .map(|u| ImageRecord {
                    url: u.to_string(),
                    content_hash: graintrust_kernel::hash::digest(u),
                    audit_hash: None,
                })
                .collect(),
        }
    }

    fn review(stage_id: &str, url: &str, verdict: Verdict) -> ImageVerificationRecord {
        ImageVerificationRecord {
            batch_id: "b1".to_string(),
            stage_id: stage_id.to_string(),
            image_url: url.to_string(),
            verdict,
            reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn test_canonical_date_forms() {
        let snapshot = build_snapshot(&batch(), &[stage("s1", 1, true, &["a.jpg"])], &[]).unwrap();
        assert_eq!(snapshot.harvest_date, "2025-02-03");
        assert_eq!(snapshot.stages[0].completed_at, "2025-01-05T08:00:00.000Z");
    }

    #[test]
    fn test_incomplete_stages_excluded() {
        let stages = [stage("s1", 1, true, &["a.jpg"]), stage("s2", 2, false, &["b.jpg"])];
        let snapshot = build_snapshot(&batch(), &stages, &[]).unwrap();
        assert_eq!(snapshot.stages.len(), 1);
        assert_eq!(snapshot.stages[0].stage_id, "s1");
    }

    #[test]
    fn test_status_derived_per_stage() {
        let stages = [
            stage("s1", 1, true, &["a.jpg"]),
            stage("s2", 2, true, &["b.jpg", "c.jpg"]),
            stage("s3", 3, true, &["d.jpg"]),
        ];
        let reviews = [
            review("s1", "a.jpg", Verdict::Accepted),
            review("s2", "b.jpg", Verdict::Accepted),
            review("s3", "d.jpg", Verdict::Rejected),
        ];
        let snapshot = build_snapshot(&batch(), &stages, &reviews).unwrap();
        let statuses: Vec<VerificationStatus> =
            snapshot.stages.iter().map(|s| s.verification_status).collect();
        assert_eq!(
            statuses,
            vec![VerificationStatus::Verified, VerificationStatus::Pending, VerificationStatus::Flagged]
        );
    }

    #[test]
    fn test_batch_id_validation() {
        assert!(validate_batch_id("b-1").is_ok());
        assert!(matches!(validate_batch_id(""), Err(AnchorError::Validation(_))));
        assert!(matches!(validate_batch_id("a/b"), Err(AnchorError::Validation(_))));
        assert!(validate_batch_id(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_non_finite_quantity_rejected() {
        let mut b = batch();
        b.quantity = f64::INFINITY;
        assert!(build_snapshot(&b, &[], &[]).is_err());
    }
}
