// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use core::fmt;

/// Contract violations raised while validating a snapshot.
///
/// These should never surface for snapshots assembled from well-formed store rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// A required identifier or name is empty.
    EmptyIdentifier(&'static str),
    /// Declared quantity is NaN or infinite.
    NonFiniteQuantity,
    /// A stage lists a different number of content hashes than content references.
    MismatchedContentHashes { stage_id: alloc::string::String, references: usize, hashes: usize },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::EmptyIdentifier(field) => write!(f, "{} must not be empty", field),
            KernelError::NonFiniteQuantity => write!(f, "quantity must be a finite number"),
            KernelError::MismatchedContentHashes { stage_id, references, hashes } => write!(
                f,
                "stage {} has {} content references but {} content hashes",
                stage_id, references, hashes
            ),
        }
    }
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;

#[cfg(feature = "std")]
impl std::error::Error for KernelError {}
