// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Anchor receipts and the digest pair they commit to.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// `data_hash` covers the whole canonical batch; `merkle_root` covers the per-stage digests.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigestPair {
    pub data_hash: String,
    pub merkle_root: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorStatus {
    Confirmed,
    Pending,
    Failed,
}

/// Result of one submission to an anchoring backend.
///
/// Receipts are never mutated once created. `previous_hash` is the `data_hash` of the
/// batch's preceding receipt, which makes each batch's receipts an append-only chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub batch_id: String,
    pub transaction_hash: String,
    pub block_number: u64,
    pub digests: DigestPair,
    pub previous_hash: Option<String>,
    pub network: String,
    pub status: AnchorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// RFC 3339 UTC.
    pub timestamp: String,
}

impl AnchorReceipt {
    pub fn data_hash(&self) -> &str {
        &self.digests.data_hash
    }

    pub fn merkle_root(&self) -> &str {
        &self.digests.merkle_root
    }

    /// True when this receipt links back to `prior`.
    pub fn follows(&self, prior: &AnchorReceipt) -> bool {
        self.batch_id == prior.batch_id
            && self.previous_hash.as_deref() == Some(prior.data_hash())
    }
}
