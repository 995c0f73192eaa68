// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Merkle aggregation over per-stage digests.
//!
//! ```text
//! []        -> digest("empty")
//! [h]       -> h
//! [h0..hn]  -> sort, then pair level by level: digest(a ++ b)
//!              odd tail pairs with itself:     digest(a ++ a)
//! ```
//!
//! Pairing the odd tail with itself is weaker against second preimages than padding with
//! a domain-separated empty leaf. Previously anchored roots were computed this way, so
//! changing it would break their verification.

use alloc::string::String;
use alloc::vec::Vec;

use crate::canonical::canonicalize_stage;
use crate::config::EMPTY_TREE_SENTINEL;
use crate::hash::{digest, digest_concat};
use crate::types::snapshot::StageSnapshot;

/// Root over hex leaves. Independent of input order.
pub fn merkle_root(leaves: &[String]) -> String {
    match leaves {
        [] => digest(EMPTY_TREE_SENTINEL),
        [single] => single.clone(),
        _ => {
            let mut level: Vec<String> = leaves.to_vec();
            level.sort_unstable();
            while level.len() > 1 {
                level = level
                    .chunks(2)
                    .map(|pair| match pair {
                        [a, b] => digest_concat(&[a.as_str(), b.as_str()]),
                        [a] => digest_concat(&[a.as_str(), a.as_str()]),
                        _ => unreachable!("chunks(2) yields one or two items"),
                    })
                    .collect();
            }
            level.pop().unwrap_or_else(|| digest(EMPTY_TREE_SENTINEL))
        }
    }
}

/// Leaf digest of one stage.
pub fn stage_leaf(stage: &StageSnapshot) -> String {
    digest(&canonicalize_stage(stage))
}

/// Root over all stage leaves of a batch.
pub fn stages_merkle_root(stages: &[StageSnapshot]) -> String {
    let leaves: Vec<String> = stages.iter().map(stage_leaf).collect();
    merkle_root(&leaves)
}
