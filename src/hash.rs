// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Canonical SHA-256 Hashing
//!
//! Every digest that takes part in anchoring or verification is lowercase hex SHA-256.
//! Anchored batches carry these digests, so the primitive is fixed.

use alloc::format;
use alloc::string::String;
use sha2::{Digest, Sha256};

/// SHA-256 over the UTF-8 bytes of `content`, lowercase hex.
pub fn digest(content: &str) -> String {
    digest_bytes(content.as_bytes())
}

/// SHA-256 over raw bytes, lowercase hex.
///
/// This is the content hash of an uploaded image and the only image-level value
/// that may feed integrity checks.
pub fn digest_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hash of several parts concatenated in order.
pub fn digest_concat(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Display/audit tag for an uploaded asset: `digest("{reference}:{salt}")`.
///
/// The salt is usually the upload time, so the tag is not reproducible.
/// Never feed it into integrity verification.
pub fn hash_content_reference(reference: &str, salt: &str) -> String {
    digest(&format!("{}:{}", reference, salt))
}

/// True for a 64-character lowercase hex string.
pub fn is_digest(value: &str) -> bool {
    value.len() == crate::config::DIGEST_HEX_LEN
        && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
