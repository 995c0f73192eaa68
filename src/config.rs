// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Protocol constants.

/// Input hashed to produce the root of an empty Merkle tree.
pub const EMPTY_TREE_SENTINEL: &str = "empty";

/// Prefix applied to synthesized transaction identifiers.
pub const TX_HASH_PREFIX: &str = "0x";

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Default network label reported by the simulated backend.
pub const DEFAULT_SIMULATED_NETWORK: &str = "simulated-testnet";
