// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Integrity verification against a recorded anchor.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::proof::compute_digest_pair;
use crate::types::receipt::{AnchorReceipt, DigestPair};
use crate::types::snapshot::BatchSnapshot;

pub const DATA_HASH_MISMATCH: &str = "Data hash mismatch - batch data has been modified";
pub const MERKLE_ROOT_MISMATCH: &str = "Merkle root mismatch - stage data has been modified";

/// Result of comparing current data with an anchor.
///
/// A mismatch is a normal negative result, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub current_data_hash: String,
    pub on_chain_data_hash: String,
    pub current_merkle_root: String,
    pub on_chain_merkle_root: String,
    pub transaction_hash: String,
    pub mismatch_details: Vec<String>,
}

/// Compares two digest pairs component by component.
pub fn compare_digests(current: &DigestPair, recorded: &DigestPair, transaction_hash: &str) -> VerificationOutcome {
    let mut mismatch_details = Vec::new();
    if current.data_hash != recorded.data_hash {
        mismatch_details.push(DATA_HASH_MISMATCH.to_string());
    }
    if current.merkle_root != recorded.merkle_root {
        mismatch_details.push(MERKLE_ROOT_MISMATCH.to_string());
    }

    VerificationOutcome {
        verified: mismatch_details.is_empty(),
        current_data_hash: current.data_hash.clone(),
        on_chain_data_hash: recorded.data_hash.clone(),
        current_merkle_root: current.merkle_root.clone(),
        on_chain_merkle_root: recorded.merkle_root.clone(),
        transaction_hash: transaction_hash.to_string(),
        mismatch_details,
    }
}

/// Recomputes the digest pair of `current` and checks it against `recorded`.
///
/// Read-only; safe to call any number of times.
pub fn verify(current: &BatchSnapshot, recorded: &AnchorReceipt) -> VerificationOutcome {
    let digests = compute_digest_pair(current);
    compare_digests(&digests, &recorded.digests, &recorded.transaction_hash)
}
