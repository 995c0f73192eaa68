// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! JSON-RPC 2.0 client for a signing ledger gateway.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::ledger::{LedgerClient, RecordBatchCall, SubmittedTx, TxConfirmation};
use crate::errors::BackendError;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    message: String,
}

/// Maps a gateway error message onto a typed failure.
pub fn classify_rpc_error(message: &str) -> BackendError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("insufficient funds") {
        BackendError::InsufficientFunds
    } else if lower.contains("already synced") || lower.contains("already recorded") {
        BackendError::AlreadyRecorded
    } else {
        BackendError::Rejected(message.to_string())
    }
}

/// Authenticates to the gateway with the signing credential as a bearer token.
pub struct JsonRpcLedgerClient {
    endpoint: String,
    signing_key: String,
    client: Client,
    next_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    pub fn new(endpoint: &str, signing_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            signing_key: signing_key.to_string(),
            client: Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.signing_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BackendError::Transport(format!("{} returned {}", method, resp.status())));
        }

        let rpc: RpcResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if let Some(err) = rpc.error {
            tracing::debug!("{} failed with code {}: {}", method, err.code, err.message);
            return Err(classify_rpc_error(&err.message));
        }

        match rpc.result {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| BackendError::Transport(format!("malformed {} result: {}", method, e))),
        }
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn record_batch(&self, contract_address: &str, call: &RecordBatchCall) -> Result<SubmittedTx, BackendError> {
        let params = json!([{
            "contract": contract_address,
            "batchId": call.batch_id,
            "batchCode": call.batch_code,
            "dataHash": call.data_hash,
            "merkleRoot": call.merkle_root,
        }]);
        self.call("ledger_recordBatch", params)
            .await?
            .ok_or_else(|| BackendError::Transport("ledger_recordBatch returned no transaction".to_string()))
    }

    /// Polls until the gateway reports a receipt. The caller bounds the wait.
    async fn wait_for_confirmation(&self, tx: &SubmittedTx) -> Result<TxConfirmation, BackendError> {
        loop {
            let receipt: Option<TxConfirmation> = self
                .call("ledger_getTransactionReceipt", json!([tx.transaction_hash]))
                .await?;
            if let Some(confirmation) = receipt {
                return Ok(confirmation);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
