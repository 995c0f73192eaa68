// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![no_std]

//! graintrust-kernel: deterministic canonicalization, hashing, Merkle aggregation,
//! readiness gating and integrity verification for produce batches.

extern crate alloc;

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

pub mod config;
pub mod error;
pub mod types;
pub mod canonical;
pub mod hash;
pub mod merkle;
pub mod readiness;
pub mod proof;
pub mod verify;

#[cfg(test)]
pub mod tests;
