// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::fixtures::{batch, pending_batch};
use crate::hash::{digest, is_digest};
use crate::proof::compute_digest_pair;
use crate::types::receipt::{AnchorReceipt, AnchorStatus};
use crate::types::snapshot::BatchSnapshot;
use crate::verify::{verify, DATA_HASH_MISMATCH, MERKLE_ROOT_MISMATCH};
use std::string::ToString;

fn anchor(snapshot: &BatchSnapshot) -> AnchorReceipt {
    AnchorReceipt {
        batch_id: snapshot.batch_id.clone(),
        transaction_hash: "0xabc".to_string(),
        block_number: 1_700_000_000,
        digests: compute_digest_pair(snapshot),
        previous_hash: None,
        network: "simulated-testnet".to_string(),
        status: AnchorStatus::Confirmed,
        gas_used: Some(42_000),
        timestamp: "2025-03-15T00:00:00.000Z".to_string(),
    }
}

#[test]
fn test_digest_pair_shape() {
    let pair = compute_digest_pair(&pending_batch());
    assert!(is_digest(&pair.data_hash));
    assert!(is_digest(&pair.merkle_root));
}

#[test]
fn test_empty_batch_uses_sentinel_root() {
    let pair = compute_digest_pair(&batch(vec![]));
    assert_eq!(pair.merkle_root, digest("empty"));
}

#[test]
fn test_unmodified_snapshot_verifies() {
    let snapshot = pending_batch();
    let receipt = anchor(&snapshot);
    let outcome = verify(&snapshot, &receipt);
    assert!(outcome.verified);
    assert!(outcome.mismatch_details.is_empty());
    assert_eq!(outcome.current_data_hash, outcome.on_chain_data_hash);
    assert_eq!(outcome.transaction_hash, "0xabc");
}

#[test]
fn test_tampered_content_hash_detected() {
    let snapshot = pending_batch();
    let receipt = anchor(&snapshot);

    let mut tampered = snapshot.clone();
    tampered.stages[1].image_hashes[0] = digest("swapped photo");

    let outcome = verify(&tampered, &receipt);
    assert!(!outcome.verified);
    assert!(outcome.mismatch_details.iter().any(|m| m == MERKLE_ROOT_MISMATCH));
    // Stage data is also part of the whole-batch hash.
    assert!(outcome.mismatch_details.iter().any(|m| m == DATA_HASH_MISMATCH));
}

#[test]
fn test_batch_field_change_only_breaks_data_hash() {
    let snapshot = pending_batch();
    let receipt = anchor(&snapshot);

    let mut tampered = snapshot.clone();
    tampered.location = "Elsewhere".to_string();

    let outcome = verify(&tampered, &receipt);
    assert!(!outcome.verified);
    assert_eq!(outcome.mismatch_details, vec![DATA_HASH_MISMATCH]);
}

#[test]
fn test_receipt_chain_link() {
    let snapshot = pending_batch();
    let first = anchor(&snapshot);
    let mut second = anchor(&snapshot);
    second.previous_hash = Some(first.data_hash().to_string());
    assert!(second.follows(&first));
    assert!(!first.follows(&second));
}

#[test]
fn test_snapshot_validation() {
    let mut snapshot = pending_batch();
    assert!(snapshot.validate().is_ok());
    snapshot.stages[0].image_hashes.pop();
    assert!(snapshot.validate().is_err());

    let mut snapshot = pending_batch();
    snapshot.quantity = f64::NAN;
    assert!(snapshot.validate().is_err());

    let mut snapshot = pending_batch();
    snapshot.batch_id = " ".to_string();
    assert!(snapshot.validate().is_err());
}

#[test]
fn test_receipt_serde() {
    let receipt = anchor(&pending_batch());
    let json = serde_json::to_string(&receipt).unwrap();
    assert!(json.contains("\"status\":\"CONFIRMED\""));
    let decoded: AnchorReceipt = serde_json::from_str(&json).unwrap();
    assert_eq!(receipt, decoded);
}
