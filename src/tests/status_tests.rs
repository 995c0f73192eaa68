// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::types::status::{derive_status, ImageVerdict, Verdict, VerificationStatus};
use std::string::{String, ToString};
use std::vec::Vec;

fn refs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn verdict(reference: &str, verdict: Verdict) -> ImageVerdict {
    ImageVerdict { reference: reference.to_string(), verdict }
}

#[test]
fn test_no_references_is_pending() {
    assert_eq!(derive_status(&[], &[]), VerificationStatus::Pending);
}

#[test]
fn test_all_accepted_is_verified() {
    let r = refs(&["a.jpg", "b.jpg"]);
    let v = vec![verdict("b.jpg", Verdict::Accepted), verdict("a.jpg", Verdict::Accepted)];
    assert_eq!(derive_status(&r, &v), VerificationStatus::Verified);
}

#[test]
fn test_partial_acceptance_is_pending() {
    let r = refs(&["a.jpg", "b.jpg"]);
    let v = vec![verdict("a.jpg", Verdict::Accepted)];
    assert_eq!(derive_status(&r, &v), VerificationStatus::Pending);
}

#[test]
fn test_duplicate_acceptance_does_not_cover_other_reference() {
    let r = refs(&["a.jpg", "b.jpg"]);
    let v = vec![verdict("a.jpg", Verdict::Accepted), verdict("a.jpg", Verdict::Accepted)];
    assert_eq!(derive_status(&r, &v), VerificationStatus::Pending);
}

#[test]
fn test_any_rejection_flags() {
    let r = refs(&["a.jpg", "b.jpg"]);
    let v = vec![verdict("a.jpg", Verdict::Accepted), verdict("b.jpg", Verdict::Rejected)];
    assert_eq!(derive_status(&r, &v), VerificationStatus::Flagged);
}
