// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use graintrust_kernel::config::DEFAULT_SIMULATED_NETWORK;
use graintrust_kernel::readiness::ReadinessPolicy;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid { key: &'static str, value: String, reason: String },
}

/// Settings for the ledger backend. All three connection fields must be present
/// before a submission is attempted.
#[derive(Clone, Default)]
pub struct LedgerConfig {
    pub endpoint: Option<String>,
    pub signing_key: Option<String>,
    pub contract_address: Option<String>,
    pub network: String,
    pub timeout: Duration,
}

impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("endpoint", &self.endpoint)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("contract_address", &self.contract_address)
            .field("network", &self.network)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub auth_token: Option<String>,
    /// JSON file backing the record store. `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,

    pub use_ledger_backend: bool,
    /// Fall back to the simulated backend when the ledger backend fails.
    pub allow_fallback: bool,
    pub ledger: LedgerConfig,

    pub network_label: String,
    pub simulated_delay: Duration,

    pub explorer_base_url: String,
    pub public_base_url: String,

    pub readiness: ReadinessPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            auth_token: None,
            data_path: None,
            use_ledger_backend: false,
            allow_fallback: true,
            ledger: LedgerConfig {
                endpoint: None,
                signing_key: None,
                contract_address: None,
                network: "polygon-amoy".to_string(),
                timeout: Duration::from_secs(30),
            },
            network_label: DEFAULT_SIMULATED_NETWORK.to_string(),
            simulated_delay: Duration::from_millis(1000),
            explorer_base_url: "https://explorer.graintrust.io".to_string(),
            public_base_url: "http://localhost:3005".to_string(),
            readiness: ReadinessPolicy::default(),
        }
    }
}

impl NodeConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = NodeConfig::default();

        if let Some(v) = get("GRAINTRUST_BIND_ADDR") {
            cfg.bind_addr = parse("GRAINTRUST_BIND_ADDR", &v)?;
        }
        cfg.auth_token = get("GRAINTRUST_AUTH_TOKEN");
        cfg.data_path = get("GRAINTRUST_DATA_PATH").map(PathBuf::from);

        if let Some(v) = get("USE_LEDGER_BACKEND") {
            cfg.use_ledger_backend = parse_bool("USE_LEDGER_BACKEND", &v)?;
        }
        if let Some(v) = get("ALLOW_LEDGER_FALLBACK") {
            cfg.allow_fallback = parse_bool("ALLOW_LEDGER_FALLBACK", &v)?;
        }
        cfg.ledger.endpoint = get("LEDGER_ENDPOINT");
        cfg.ledger.signing_key = get("LEDGER_SIGNING_KEY");
        cfg.ledger.contract_address = get("LEDGER_CONTRACT_ADDRESS");
        if let Some(v) = get("LEDGER_NETWORK") {
            cfg.ledger.network = v;
        }
        if let Some(v) = get("LEDGER_TIMEOUT_SECS") {
            cfg.ledger.timeout = Duration::from_secs(parse("LEDGER_TIMEOUT_SECS", &v)?);
        }

        if let Some(v) = get("NETWORK_LABEL") {
            cfg.network_label = v;
        }
        if let Some(v) = get("SIMULATED_DELAY_MS") {
            cfg.simulated_delay = Duration::from_millis(parse("SIMULATED_DELAY_MS", &v)?);
        }
        if let Some(v) = get("EXPLORER_BASE_URL") {
            cfg.explorer_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("PUBLIC_BASE_URL") {
            cfg.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("REQUIRE_FULL_VERIFICATION") {
            cfg.readiness.require_full_verification = parse_bool("REQUIRE_FULL_VERIFICATION", &v)?;
        }

        Ok(cfg)
    }

    /// `{explorer_base_url}/tx/{transaction_hash}`
    pub fn explorer_tx_url(&self, transaction_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_base_url, transaction_hash)
    }

    /// `{public_base_url}/verify/{batch_id}`
    pub fn batch_verify_url(&self, batch_id: &str) -> String {
        format!("{}/verify/{}", self.public_base_url, batch_id)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
