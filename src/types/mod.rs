// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod status;
pub mod snapshot;
pub mod receipt;

pub use receipt::{AnchorReceipt, AnchorStatus, DigestPair};
pub use snapshot::{BatchSnapshot, StageSnapshot};
pub use status::{derive_status, ImageVerdict, Verdict, VerificationStatus};
