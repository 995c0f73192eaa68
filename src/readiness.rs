// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Anchoring readiness gate.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::types::snapshot::BatchSnapshot;
use crate::types::status::VerificationStatus;

/// Readiness policy.
///
/// `require_full_verification` defaults to `false`: stages still `PENDING` review do not
/// block anchoring, so a batch can be anchored before an administrator has accepted every
/// image. Turn it on to require every stage to be `VERIFIED` first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessPolicy {
    pub require_full_verification: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub reasons: Vec<String>,
}

impl ReadinessReport {
    fn from_reasons(reasons: Vec<String>) -> Self {
        Self { ready: reasons.is_empty(), reasons }
    }
}

/// Evaluates every rule and reports all blocking conditions together.
pub fn evaluate(snapshot: &BatchSnapshot, policy: &ReadinessPolicy) -> ReadinessReport {
    let mut reasons = Vec::new();

    if snapshot.stages.is_empty() {
        reasons.push("No stages completed yet".to_string());
    }

    let missing_images = snapshot.stages.iter().filter(|s| s.image_urls.is_empty()).count();
    if missing_images > 0 {
        reasons.push(format!("{} stage(s) missing images", missing_images));
    }

    let flagged = snapshot
        .stages
        .iter()
        .filter(|s| s.verification_status == VerificationStatus::Flagged)
        .count();
    if flagged > 0 {
        reasons.push(format!("{} stage(s) flagged for issues", flagged));
    }

    if policy.require_full_verification {
        let unverified = snapshot
            .stages
            .iter()
            .filter(|s| s.verification_status != VerificationStatus::Verified)
            .count();
        if unverified > 0 {
            reasons.push(format!("{} stage(s) not verified", unverified));
        }
    }

    ReadinessReport::from_reasons(reasons)
}
