// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proof documents handed to buyers. Rendering (PDF, QR image) happens elsewhere.

use chrono::{DateTime, SecondsFormat, Utc};
use graintrust_kernel::types::{AnchorReceipt, BatchSnapshot, VerificationStatus};
use serde::{Deserialize, Serialize};

use crate::config::NodeConfig;
use crate::store::BatchRecord;

pub const CERTIFICATE_VERSION: &str = "1.0";
pub const CERTIFICATE_TYPE: &str = "GRAINTRUST_BATCH_CERTIFICATE";
pub const QR_PAYLOAD_TYPE: &str = "GRAINTRUST_VERIFICATION";

/// Compact payload encoded into the verification QR code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationQrPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub tx_hash: String,
    pub network: String,
    pub data_hash: String,
    pub verify_url: String,
}

pub fn verification_qr_payload(config: &NodeConfig, receipt: &AnchorReceipt) -> VerificationQrPayload {
    VerificationQrPayload {
        kind: QR_PAYLOAD_TYPE.to_string(),
        tx_hash: receipt.transaction_hash.clone(),
        network: receipt.network.clone(),
        data_hash: receipt.digests.data_hash.clone(),
        verify_url: format!("{}/verify/{}", config.explorer_base_url, receipt.transaction_hash),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBatch {
    pub batch_id: String,
    pub batch_code: String,
    pub farmer_name: String,
    pub crop_type: String,
    pub quantity: f64,
    pub location: String,
    pub harvest_date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLine {
    pub name: String,
    pub completed_at: String,
    pub image_count: usize,
    pub status: VerificationStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub total_stages: usize,
    pub all_verified: bool,
    pub total_images: usize,
    pub stages: Vec<StageLine>,
}

impl StageSummary {
    pub fn of(snapshot: &BatchSnapshot) -> Self {
        Self {
            total_stages: snapshot.stages.len(),
            all_verified: snapshot.all_stages_verified(),
            total_images: snapshot.image_count(),
            stages: snapshot
                .stages
                .iter()
                .map(|s| StageLine {
                    name: s.name.clone(),
                    completed_at: s.completed_at.clone(),
                    image_count: s.image_urls.len(),
                    status: s.verification_status,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub certificate_id: String,
    pub issued_at: String,
    pub batch: CertificateBatch,
    pub anchor: AnchorReceipt,
    pub stages: StageSummary,
    pub explorer_url: String,
    pub verify_url: String,
    pub qr_payload: VerificationQrPayload,
}

impl Certificate {
    pub fn issue(
        config: &NodeConfig,
        batch: &BatchRecord,
        snapshot: &BatchSnapshot,
        receipt: AnchorReceipt,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: CERTIFICATE_VERSION.to_string(),
            kind: CERTIFICATE_TYPE.to_string(),
            certificate_id: format!("CERT-{}-{}", batch.batch_code, issued_at.timestamp_millis()),
            issued_at: issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            batch: CertificateBatch {
                batch_id: batch.id.clone(),
                batch_code: batch.batch_code.clone(),
                farmer_name: batch.farmer_name.clone(),
                crop_type: batch.crop_type.clone(),
                quantity: batch.quantity,
                location: batch.location.clone(),
                harvest_date: snapshot.harvest_date.clone(),
            },
            stages: StageSummary::of(snapshot),
            explorer_url: config.explorer_tx_url(&receipt.transaction_hash),
            verify_url: config.batch_verify_url(&batch.id),
            qr_payload: verification_qr_payload(config, &receipt),
            anchor: receipt,
        }
    }
}
