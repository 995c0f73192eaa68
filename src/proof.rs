// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Digest pair derivation.

use crate::canonical::canonicalize;
use crate::hash::digest;
use crate::merkle::stages_merkle_root;
use crate::types::receipt::DigestPair;
use crate::types::snapshot::BatchSnapshot;

/// Computes `(data_hash, merkle_root)` for a snapshot.
///
/// # Determinism
/// - No timestamps, no randomness
/// - Stage and image ordering normalised by the canonicalizer
/// - Any implementation following the canonical layout reproduces the same pair
pub fn compute_digest_pair(snapshot: &BatchSnapshot) -> DigestPair {
    DigestPair {
        data_hash: digest(&canonicalize(snapshot)),
        merkle_root: stages_merkle_root(&snapshot.stages),
    }
}
