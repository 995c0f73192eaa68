// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use graintrust_node::config::NodeConfig;
use graintrust_node::server::build_router;
use graintrust_node::service::AnchorService;
use graintrust_node::store::{BatchStore, MemoryStore};
use graintrust_node::telemetry::init_telemetry;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    init_telemetry();

    let cfg = match NodeConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("Initializing GrainTrust Node with config: {:?}", cfg);
    if cfg.use_ledger_backend && !cfg.allow_fallback {
        tracing::warn!("Ledger fallback disabled: ledger failures will fail the sync");
    }

    let store = match &cfg.data_path {
        Some(path) => match MemoryStore::open(path).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to open store at {:?}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No GRAINTRUST_DATA_PATH set; records are kept in memory only");
            MemoryStore::new()
        }
    };
    let store: Arc<dyn BatchStore> = Arc::new(store);

    let addr = cfg.bind_addr;
    let auth_token = cfg.auth_token.clone();
    let service = Arc::new(AnchorService::new(cfg, store));
    let app = build_router(service, auth_token);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
