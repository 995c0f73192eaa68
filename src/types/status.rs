// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Stage verification status and its derivation from image-level verdicts.

use alloc::string::String;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Verified,
    Pending,
    Flagged,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Flagged => "FLAGGED",
        }
    }
}

/// Outcome of an administrator's review of one uploaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// An image-level verification record, keyed by the content reference it reviews.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVerdict {
    pub reference: String,
    pub verdict: Verdict,
}

/// Derives a stage's status from its content references and the verdicts recorded for it.
///
/// - `Flagged` if any verdict is `Rejected`.
/// - `Verified` if there is at least one reference and every reference has an `Accepted` verdict.
/// - `Pending` otherwise.
///
/// Verdicts for references the stage does not list still count towards `Flagged`.
pub fn derive_status(references: &[String], verdicts: &[ImageVerdict]) -> VerificationStatus {
    if verdicts.iter().any(|v| v.verdict == Verdict::Rejected) {
        return VerificationStatus::Flagged;
    }

    let all_accepted = !references.is_empty()
        && references.iter().all(|r| {
            verdicts
                .iter()
                .any(|v| v.verdict == Verdict::Accepted && &v.reference == r)
        });

    if all_accepted {
        VerificationStatus::Verified
    } else {
        VerificationStatus::Pending
    }
}
