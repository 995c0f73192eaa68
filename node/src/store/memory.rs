// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-process record store with optional JSON file persistence.
//!
//! The whole store is one JSON document. Every mutation rewrites it through a temp file
//! and an atomic rename, while the write lock is still held.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use graintrust_kernel::hash::{digest_bytes, hash_content_reference};
use graintrust_kernel::types::AnchorReceipt;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{
    AnchorState, BatchRecord, BatchStore, CommitOutcome, ImageRecord, ImageVerificationRecord,
    StageRecord, SyncStatus,
};
use crate::errors::StoreError;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    batches: BTreeMap<String, BatchRecord>,
    #[serde(default)]
    stages: BTreeMap<String, StageRecord>,
    #[serde(default)]
    verifications: Vec<ImageVerificationRecord>,
    /// Creation order.
    #[serde(default)]
    receipts: Vec<AnchorReceipt>,
}

impl StoreData {
    fn batch_mut(&mut self, batch_id: &str) -> Result<&mut BatchRecord, StoreError> {
        self.batches
            .get_mut(batch_id)
            .ok_or_else(|| StoreError::BatchNotFound(batch_id.to_string()))
    }
}

pub struct MemoryStore {
    data: RwLock<StoreData>,
    path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            path: None,
        }
    }

    /// Opens a file-backed store, loading existing contents if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            let data: StoreData = serde_json::from_slice(&bytes)?;
            tracing::info!(
                "Loaded store from {:?}: {} batch(es), {} receipt(s)",
                path,
                data.batches.len(),
                data.receipts.len()
            );
            data
        } else {
            tracing::info!("No store file at {:?}; starting empty", path);
            StoreData::default()
        };

        Ok(Self {
            data: RwLock::new(data),
            path: Some(path),
        })
    }

    async fn flush(&self, data: &StoreData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(data)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Runs `change` against the store. A file-backed store applies it to a copy, writes
    /// the copy out and only then swaps it in, so a failed write leaves memory untouched.
    async fn apply<T, F>(&self, data: &mut StoreData, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreData) -> Result<T, StoreError> + Send,
        T: Send,
    {
        if self.path.is_none() {
            return change(data);
        }
        let mut next = data.clone();
        let out = change(&mut next)?;
        self.flush(&next).await?;
        *data = next;
        Ok(out)
    }

    pub async fn upsert_batch(&self, batch: BatchRecord) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        self.apply(&mut data, |d| {
            d.batches.insert(batch.id.clone(), batch);
            Ok(())
        })
        .await
    }

    pub async fn upsert_stage(&self, stage: StageRecord) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if !data.batches.contains_key(&stage.batch_id) {
            return Err(StoreError::BatchNotFound(stage.batch_id));
        }
        self.apply(&mut data, |d| {
            d.stages.insert(stage.id.clone(), stage);
            Ok(())
        })
        .await
    }

    /// Adds an uploaded image to a stage, hashing its bytes.
    pub async fn attach_image(&self, stage_id: &str, url: &str, content: &[u8]) -> Result<ImageRecord, StoreError> {
        let image = ImageRecord {
            url: url.to_string(),
            content_hash: digest_bytes(content),
            audit_hash: Some(hash_content_reference(url, &Utc::now().timestamp_millis().to_string())),
        };

        let mut data = self.data.write().await;
        self.apply(&mut data, |d| {
            let stage = d
                .stages
                .get_mut(stage_id)
                .ok_or_else(|| StoreError::StageNotFound(stage_id.to_string()))?;
            stage.images.retain(|i| i.url != image.url);
            stage.images.push(image.clone());
            Ok(image)
        })
        .await
    }

    /// Stores an image review. A newer review of the same image replaces the older one.
    pub async fn record_verification(&self, record: ImageVerificationRecord) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if !data.stages.contains_key(&record.stage_id) {
            return Err(StoreError::StageNotFound(record.stage_id));
        }
        self.apply(&mut data, |d| {
            d.verifications
                .retain(|v| !(v.stage_id == record.stage_id && v.image_url == record.image_url));
            d.verifications.push(record);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn load_batch(&self, batch_id: &str) -> Result<Option<BatchRecord>, StoreError> {
        Ok(self.data.read().await.batches.get(batch_id).cloned())
    }

    async fn load_stages(&self, batch_id: &str) -> Result<Vec<StageRecord>, StoreError> {
        let data = self.data.read().await;
        let mut stages: Vec<StageRecord> = data
            .stages
            .values()
            .filter(|s| s.batch_id == batch_id)
            .cloned()
            .collect();
        stages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(stages)
    }

    async fn load_verifications(&self, batch_id: &str) -> Result<Vec<ImageVerificationRecord>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .verifications
            .iter()
            .filter(|v| v.batch_id == batch_id)
            .cloned()
            .collect())
    }

    async fn latest_receipt(&self, batch_id: &str) -> Result<Option<AnchorReceipt>, StoreError> {
        let data = self.data.read().await;
        Ok(data.receipts.iter().rev().find(|r| r.batch_id == batch_id).cloned())
    }

    async fn receipts(&self, batch_id: &str) -> Result<Vec<AnchorReceipt>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .receipts
            .iter()
            .rev()
            .filter(|r| r.batch_id == batch_id)
            .cloned()
            .collect())
    }

    async fn find_receipt(&self, batch_id: &str, transaction_hash: &str) -> Result<Option<AnchorReceipt>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .receipts
            .iter()
            .find(|r| r.batch_id == batch_id && r.transaction_hash == transaction_hash)
            .cloned())
    }

    async fn commit_anchor(&self, receipt: &AnchorReceipt) -> Result<CommitOutcome, StoreError> {
        let mut data = self.data.write().await;
        let batch = data.batch_mut(&receipt.batch_id)?;

        if batch.anchor.status == SyncStatus::Synced {
            let winner = batch.anchor.transaction_hash.clone();
            let existing = data
                .receipts
                .iter()
                .rev()
                .find(|r| r.batch_id == receipt.batch_id && Some(&r.transaction_hash) == winner.as_ref())
                .cloned();
            return Ok(CommitOutcome::AlreadySynced(existing));
        }

        self.apply(&mut data, |d| {
            d.batch_mut(&receipt.batch_id)?.anchor = AnchorState {
                status: SyncStatus::Synced,
                data_hash: Some(receipt.digests.data_hash.clone()),
                transaction_hash: Some(receipt.transaction_hash.clone()),
                network: Some(receipt.network.clone()),
                synced_at: Some(receipt.timestamp.clone()),
            };
            d.receipts.push(receipt.clone());
            Ok(CommitOutcome::Committed)
        })
        .await
    }

    async fn reset_anchor(&self, batch_id: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        self.apply(&mut data, |d| {
            d.batch_mut(batch_id)?.anchor.status = SyncStatus::NotSynced;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use graintrust_kernel::types::{AnchorStatus, DigestPair, Verdict};
    use tempfile::tempdir;

    fn batch(id: &str) -> BatchRecord {
        BatchRecord {
            id: id.to_string(),
            batch_code: format!("GT-{}", id),
            farmer_id: "f-1".to_string(),
            farmer_name: "Ravi".to_string(),
            crop_type: "Wheat".to_string(),
            quantity: 120.0,
            location: "Ludhiana".to_string(),
            harvest_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            anchor: AnchorState::default(),
        }
    }

    fn receipt(batch_id: &str, tx: &str) -> AnchorReceipt {
        AnchorReceipt {
            batch_id: batch_id.to_string(),
            transaction_hash: tx.to_string(),
            block_number: 1,
            digests: DigestPair { data_hash: "aa".repeat(32), merkle_root: "bb".repeat(32) },
            previous_hash: None,
            network: "simulated-testnet".to_string(),
            status: AnchorStatus::Confirmed,
            gas_used: None,
            timestamp: "2025-04-11T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_commit_is_conditional() {
        let store = MemoryStore::new();
        store.upsert_batch(batch("b1")).await.unwrap();

        assert_eq!(store.commit_anchor(&receipt("b1", "0x1")).await.unwrap(), CommitOutcome::Committed);
        let second = store.commit_anchor(&receipt("b1", "0x2")).await.unwrap();
        assert_eq!(second, CommitOutcome::AlreadySynced(Some(receipt("b1", "0x1"))));

        assert_eq!(store.receipts("b1").await.unwrap().len(), 1);
        let row = store.load_batch("b1").await.unwrap().unwrap();
        assert_eq!(row.anchor.status, SyncStatus::Synced);
        assert_eq!(row.anchor.transaction_hash.as_deref(), Some("0x1"));
    }

    #[tokio::test]
    async fn test_reset_keeps_chain() {
        let store = MemoryStore::new();
        store.upsert_batch(batch("b1")).await.unwrap();
        store.commit_anchor(&receipt("b1", "0x1")).await.unwrap();
        store.reset_anchor("b1").await.unwrap();

        assert_eq!(store.commit_anchor(&receipt("b1", "0x2")).await.unwrap(), CommitOutcome::Committed);
        let all = store.receipts("b1").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].transaction_hash, "0x2");
        assert_eq!(store.latest_receipt("b1").await.unwrap().unwrap().transaction_hash, "0x2");
    }

    #[tokio::test]
    async fn test_unknown_batch() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.commit_anchor(&receipt("missing", "0x1")).await,
            Err(StoreError::BatchNotFound(_))
        ));
        assert!(store.load_batch("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = MemoryStore::open(&path).await.unwrap();
            store.upsert_batch(batch("b1")).await.unwrap();
            store
                .upsert_stage(StageRecord {
                    id: "s1".to_string(),
                    batch_id: "b1".to_string(),
                    name: "Sowing".to_string(),
                    order: 1,
                    completed_at: Some(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()),
                    images: vec![],
                })
                .await
                .unwrap();
            let image = store.attach_image("s1", "img/a.jpg", b"jpeg bytes").await.unwrap();
            assert_eq!(image.content_hash, digest_bytes(b"jpeg bytes"));
            assert!(image.audit_hash.is_some());
            store
                .record_verification(ImageVerificationRecord {
                    batch_id: "b1".to_string(),
                    stage_id: "s1".to_string(),
                    image_url: "img/a.jpg".to_string(),
                    verdict: Verdict::Accepted,
                    reviewed_at: Utc::now(),
                })
                .await
                .unwrap();
            store.commit_anchor(&receipt("b1", "0x1")).await.unwrap();
        }

        let reopened = MemoryStore::open(&path).await.unwrap();
        let stages = reopened.load_stages("b1").await.unwrap();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].images.len(), 1);
        assert_eq!(reopened.load_verifications("b1").await.unwrap().len(), 1);
        assert_eq!(reopened.latest_receipt("b1").await.unwrap(), Some(receipt("b1", "0x1")));
    }

    #[tokio::test]
    async fn test_newer_review_replaces_older() {
        let store = MemoryStore::new();
        store.upsert_batch(batch("b1")).await.unwrap();
        store
            .upsert_stage(StageRecord {
                id: "s1".to_string(),
                batch_id: "b1".to_string(),
                name: "Sowing".to_string(),
                order: 1,
                completed_at: None,
                images: vec![],
            })
            .await
            .unwrap();
        for verdict in [Verdict::Rejected, Verdict::Accepted] {
            store
                .record_verification(ImageVerificationRecord {
                    batch_id: "b1".to_string(),
                    stage_id: "s1".to_string(),
                    image_url: "img/a.jpg".to_string(),
                    verdict,
                    reviewed_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let reviews = store.load_verifications("b1").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].verdict, Verdict::Accepted);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = MemoryStore::open(&path).await.unwrap();
        store.upsert_batch(batch("b1")).await.unwrap();

        // A directory where the temp file goes makes every write fail.
        let blocker = path.with_extension("json.tmp");
        std::fs::create_dir(&blocker).unwrap();

        assert!(matches!(
            store.commit_anchor(&receipt("b1", "0x1")).await,
            Err(StoreError::Io(_))
        ));
        let row = store.load_batch("b1").await.unwrap().unwrap();
        assert_eq!(row.anchor, AnchorState::default());
        assert!(store.receipts("b1").await.unwrap().is_empty());

        assert!(store.upsert_batch(batch("b2")).await.is_err());
        assert!(store.load_batch("b2").await.unwrap().is_none());

        std::fs::remove_dir(&blocker).unwrap();
        assert_eq!(store.commit_anchor(&receipt("b1", "0x1")).await.unwrap(), CommitOutcome::Committed);
        let reopened = MemoryStore::open(&path).await.unwrap();
        assert_eq!(reopened.latest_receipt("b1").await.unwrap(), Some(receipt("b1", "0x1")));
    }
}
