// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::fixtures::pending_batch;
use crate::hash::{digest, digest_concat};
use crate::merkle::{merkle_root, stage_leaf, stages_merkle_root};
use std::string::{String, ToString};
use std::vec::Vec;

fn leaves(n: usize) -> Vec<String> {
    (0..n).map(|i| digest(&format!("leaf-{}", i))).collect()
}

#[test]
fn test_empty_tree_sentinel() {
    assert_eq!(merkle_root(&[]), digest("empty"));
}

#[test]
fn test_single_leaf_identity() {
    let h = digest("only");
    assert_eq!(merkle_root(&[h.clone()]), h);
    // Not required to be a digest.
    assert_eq!(merkle_root(&["anything".to_string()]), "anything");
}

#[test]
fn test_two_leaves_sorted_then_paired() {
    let mut l = leaves(2);
    l.sort();
    let expected = digest_concat(&[l[0].as_str(), l[1].as_str()]);
    l.reverse();
    assert_eq!(merkle_root(&l), expected);
}

#[test]
fn test_odd_leaf_paired_with_itself() {
    let mut l = leaves(3);
    l.sort();
    let left = digest_concat(&[l[0].as_str(), l[1].as_str()]);
    let right = digest_concat(&[l[2].as_str(), l[2].as_str()]);
    let expected = digest_concat(&[left.as_str(), right.as_str()]);
    assert_eq!(merkle_root(&l), expected);
}

#[test]
fn test_order_independence() {
    let l = leaves(7);
    let mut rotated = l.clone();
    rotated.rotate_left(3);
    let mut reversed = l.clone();
    reversed.reverse();
    let root = merkle_root(&l);
    assert_eq!(root, merkle_root(&rotated));
    assert_eq!(root, merkle_root(&reversed));
}

#[test]
fn test_root_changes_with_any_leaf() {
    let l = leaves(5);
    let mut changed = l.clone();
    changed[4] = digest("tampered");
    assert_ne!(merkle_root(&l), merkle_root(&changed));
}

#[test]
fn test_stages_root_over_leaves() {
    let snapshot = pending_batch();
    let manual: Vec<String> = snapshot.stages.iter().map(stage_leaf).collect();
    assert_eq!(stages_merkle_root(&snapshot.stages), merkle_root(&manual));
}
