// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Point-in-time views of a batch and its completed stages.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::types::status::VerificationStatus;

/// One completed production stage.
///
/// `image_hashes[i]` is the content hash of the bytes behind `image_urls[i]`.
/// Ordering of both lists carries no meaning; the canonicalizer sorts them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub stage_id: String,
    pub name: String,
    /// UTC timestamp, `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub completed_at: String,
    pub image_urls: Vec<String>,
    pub image_hashes: Vec<String>,
    pub verification_status: VerificationStatus,
}

/// Traceability-relevant attributes of one batch.
///
/// Built fresh from the record store on every hash or verify operation and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub batch_id: String,
    pub batch_code: String,
    pub farmer_id: String,
    pub farmer_name: String,
    pub crop_type: String,
    pub quantity: f64,
    pub location: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub harvest_date: String,
    pub stages: Vec<StageSnapshot>,
}

impl StageSnapshot {
    pub fn validate(&self) -> KernelResult<()> {
        if self.stage_id.trim().is_empty() {
            return Err(KernelError::EmptyIdentifier("stage_id"));
        }
        if self.image_urls.len() != self.image_hashes.len() {
            return Err(KernelError::MismatchedContentHashes {
                stage_id: self.stage_id.clone(),
                references: self.image_urls.len(),
                hashes: self.image_hashes.len(),
            });
        }
        Ok(())
    }
}

impl BatchSnapshot {
    /// Checks the invariants hashing relies on. Run before any digest work.
    pub fn validate(&self) -> KernelResult<()> {
        if self.batch_id.trim().is_empty() {
            return Err(KernelError::EmptyIdentifier("batch_id"));
        }
        if self.batch_code.trim().is_empty() {
            return Err(KernelError::EmptyIdentifier("batch_code"));
        }
        if !self.quantity.is_finite() {
            return Err(KernelError::NonFiniteQuantity);
        }
        for stage in &self.stages {
            stage.validate()?;
        }
        Ok(())
    }

    pub fn image_count(&self) -> usize {
        self.stages.iter().map(|s| s.image_urls.len()).sum()
    }

    pub fn all_stages_verified(&self) -> bool {
        self.stages
            .iter()
            .all(|s| s.verification_status == VerificationStatus::Verified)
    }
}
