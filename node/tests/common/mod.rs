// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use graintrust_kernel::types::Verdict;
use graintrust_node::config::NodeConfig;
use graintrust_node::store::{AnchorState, BatchRecord, ImageVerificationRecord, MemoryStore, StageRecord};

pub fn config() -> NodeConfig {
    NodeConfig {
        simulated_delay: Duration::ZERO,
        ..NodeConfig::default()
    }
}

pub fn batch_record(batch_id: &str) -> BatchRecord {
    BatchRecord {
        id: batch_id.to_string(),
        batch_code: format!("GT-{}", batch_id.to_uppercase()),
        farmer_id: "farmer-7".to_string(),
        farmer_name: "Lakshmi Devi".to_string(),
        crop_type: "Basmati Rice".to_string(),
        quantity: 1250.0,
        location: "Karnal, Haryana".to_string(),
        harvest_date: NaiveDate::from_ymd_opt(2025, 10, 2).unwrap(),
        anchor: AnchorState::default(),
    }
}

pub fn stage_record(batch_id: &str, stage_id: &str, name: &str, order: u32) -> StageRecord {
    StageRecord {
        id: stage_id.to_string(),
        batch_id: batch_id.to_string(),
        name: name.to_string(),
        order,
        completed_at: Some(Utc.with_ymd_and_hms(2025, 6, order, 9, 30, 0).unwrap()),
        images: Vec::new(),
    }
}

/// Batch with two completed stages, one accepted image each.
pub async fn seed_ready_batch(store: &MemoryStore, batch_id: &str) {
    store.upsert_batch(batch_record(batch_id)).await.unwrap();
    for (order, name) in [(1, "Sowing"), (2, "Harvest")] {
        let stage_id = format!("{}-s{}", batch_id, order);
        store.upsert_stage(stage_record(batch_id, &stage_id, name, order)).await.unwrap();
        let url = format!("https://cdn.graintrust.io/{}/{}.jpg", batch_id, order);
        store
            .attach_image(&stage_id, &url, format!("{} photo {}", name, order).as_bytes())
            .await
            .unwrap();
        store
            .record_verification(ImageVerificationRecord {
                batch_id: batch_id.to_string(),
                stage_id,
                image_url: url,
                verdict: Verdict::Accepted,
                reviewed_at: Utc::now(),
            })
            .await
            .unwrap();
    }
}

pub async fn ready_store(batch_id: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    seed_ready_batch(&store, batch_id).await;
    store
}
