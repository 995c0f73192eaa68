// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger backend.
//!
//! Signing and contract execution live behind [`LedgerClient`]. This module only checks
//! configuration, encodes the call and bounds it in time.

use std::sync::Arc;

use async_trait::async_trait;
use graintrust_kernel::config::{DIGEST_HEX_LEN, TX_HASH_PREFIX};
use graintrust_kernel::types::{AnchorReceipt, AnchorStatus};
use serde::{Deserialize, Serialize};

use super::{now_timestamp, AnchorBackend, BackendKind, SubmitRequest};
use crate::config::LedgerConfig;
use crate::errors::BackendError;
use crate::network::JsonRpcLedgerClient;

/// Arguments of the contract's record-batch operation. Digests are `bytes32` words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBatchCall {
    pub batch_id: String,
    pub batch_code: String,
    pub data_hash: String,
    pub merkle_root: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedTx {
    pub transaction_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxConfirmation {
    pub transaction_hash: String,
    pub block_number: u64,
    #[serde(default)]
    pub gas_used: Option<u64>,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn record_batch(&self, contract_address: &str, call: &RecordBatchCall) -> Result<SubmittedTx, BackendError>;

    async fn wait_for_confirmation(&self, tx: &SubmittedTx) -> Result<TxConfirmation, BackendError>;
}

/// `0x`-prefixed, left-zero-padded 32-byte word.
pub fn to_bytes32(hex_digest: &str) -> Result<String, BackendError> {
    let raw = hex_digest.strip_prefix(TX_HASH_PREFIX).unwrap_or(hex_digest);
    if raw.len() > DIGEST_HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BackendError::Rejected(format!("{:?} is not a 32-byte hex value", hex_digest)));
    }
    Ok(format!("{}{:0>width$}", TX_HASH_PREFIX, raw.to_ascii_lowercase(), width = DIGEST_HEX_LEN))
}

pub struct LedgerBackend {
    config: LedgerConfig,
    client: Option<Arc<dyn LedgerClient>>,
}

impl LedgerBackend {
    /// Uses the JSON-RPC gateway client when endpoint and signing key are configured.
    pub fn from_config(config: LedgerConfig) -> Self {
        let client = match (&config.endpoint, &config.signing_key) {
            (Some(endpoint), Some(key)) => {
                Some(Arc::new(JsonRpcLedgerClient::new(endpoint, key)) as Arc<dyn LedgerClient>)
            }
            _ => None,
        };
        Self { config, client }
    }

    pub fn with_client(config: LedgerConfig, client: Arc<dyn LedgerClient>) -> Self {
        Self {
            config,
            client: Some(client),
        }
    }

    fn check_config(&self) -> Result<(&dyn LedgerClient, &str), BackendError> {
        if self.config.endpoint.is_none() {
            return Err(BackendError::Configuration("LEDGER_ENDPOINT"));
        }
        if self.config.signing_key.is_none() {
            return Err(BackendError::Configuration("LEDGER_SIGNING_KEY"));
        }
        let contract = self
            .config
            .contract_address
            .as_deref()
            .ok_or(BackendError::Configuration("LEDGER_CONTRACT_ADDRESS"))?;
        let client = self
            .client
            .as_deref()
            .ok_or(BackendError::Configuration("LEDGER_ENDPOINT"))?;
        Ok((client, contract))
    }
}

#[async_trait]
impl AnchorBackend for LedgerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ledger
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<AnchorReceipt, BackendError> {
        let (client, contract) = self.check_config()?;

        let call = RecordBatchCall {
            batch_id: request.batch_id.clone(),
            batch_code: request.batch_code.clone(),
            data_hash: to_bytes32(&request.digests.data_hash)?,
            merkle_root: to_bytes32(&request.digests.merkle_root)?,
        };

        let confirmation = tokio::time::timeout(self.config.timeout, async {
            let tx = client.record_batch(contract, &call).await?;
            tracing::debug!("Ledger transaction {} submitted, awaiting confirmation", tx.transaction_hash);
            client.wait_for_confirmation(&tx).await
        })
        .await
        .map_err(|_| BackendError::Timeout(self.config.timeout))??;

        if !confirmation.success {
            return Err(BackendError::Rejected(format!(
                "transaction {} reverted",
                confirmation.transaction_hash
            )));
        }

        Ok(AnchorReceipt {
            batch_id: request.batch_id.clone(),
            transaction_hash: confirmation.transaction_hash,
            block_number: confirmation.block_number,
            digests: request.digests.clone(),
            previous_hash: request.previous_hash.clone(),
            network: self.config.network.clone(),
            status: AnchorStatus::Confirmed,
            gas_used: confirmation.gas_used,
            timestamp: now_timestamp(),
        })
    }
}
