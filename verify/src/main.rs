// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::{Context, Result};
use clap::Parser;
use graintrust_kernel::proof::compute_digest_pair;
use graintrust_kernel::types::{AnchorReceipt, BatchSnapshot};
use graintrust_kernel::verify::verify;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Re-verifies an exported batch snapshot against an anchor receipt, offline.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Batch snapshot JSON (as exported by the node)
    snapshot: PathBuf,

    /// Anchor receipt JSON. Without it the digest pair is printed.
    receipt: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {} file {:?}", what, path))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {} JSON {:?}", what, path))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let snapshot: BatchSnapshot = read_json(&args.snapshot, "snapshot")?;
    snapshot.validate().context("Invalid snapshot")?;

    let Some(receipt_path) = args.receipt else {
        let digests = compute_digest_pair(&snapshot);
        println!("{}", serde_json::to_string_pretty(&digests)?);
        return Ok(());
    };

    let receipt: AnchorReceipt = read_json(&receipt_path, "receipt")?;
    if receipt.batch_id != snapshot.batch_id {
        anyhow::bail!(
            "Receipt is for batch {} but snapshot is batch {}",
            receipt.batch_id,
            snapshot.batch_id
        );
    }

    let outcome = verify(&snapshot, &receipt);
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if outcome.verified {
        eprintln!("SUCCESS: batch {} matches tx {}", snapshot.batch_id, receipt.transaction_hash);
        Ok(())
    } else {
        eprintln!("FAILURE: {}", outcome.mismatch_details.join("; "));
        std::process::exit(1);
    }
}
