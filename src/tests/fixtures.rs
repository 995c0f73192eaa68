// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::hash::digest;
use crate::types::snapshot::{BatchSnapshot, StageSnapshot};
use crate::types::status::VerificationStatus;
use std::string::{String, ToString};
use std::vec::Vec;

pub fn stage(id: &str, name: &str, images: &[&str], status: VerificationStatus) -> StageSnapshot {
    let image_urls: Vec<String> = images.iter().map(|s| s.to_string()).collect();
    let image_hashes: Vec<String> = images.iter().map(|s| digest(&format!("bytes-of-{}", s))).collect();
    StageSnapshot {
        stage_id: id.to_string(),
        name: name.to_string(),
        completed_at: "2025-03-14T09:30:00.000Z".to_string(),
        image_urls,
        image_hashes,
        verification_status: status,
    }
}

pub fn batch(stages: Vec<StageSnapshot>) -> BatchSnapshot {
    BatchSnapshot {
        batch_id: "b-001".to_string(),
        batch_code: "GT-2025-001".to_string(),
        farmer_id: "f-42".to_string(),
        farmer_name: "Asha Verma".to_string(),
        crop_type: "Basmati Rice".to_string(),
        quantity: 500.0,
        location: "Karnal, Haryana".to_string(),
        harvest_date: "2025-03-01".to_string(),
        stages,
    }
}

/// Three stages, all pending, each with images.
pub fn pending_batch() -> BatchSnapshot {
    batch(vec![
        stage("s-1", "Sowing", &["img/sow-1.jpg", "img/sow-2.jpg"], VerificationStatus::Pending),
        stage("s-2", "Growth", &["img/grow-1.jpg"], VerificationStatus::Pending),
        stage("s-3", "Harvest", &["img/harvest-1.jpg", "img/harvest-2.jpg", "img/harvest-3.jpg"], VerificationStatus::Pending),
    ])
}
