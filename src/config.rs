//! Configuration loading for the lottery client.
//!
//! Endpoints and the contract identity come from a TOML file with
//! per-field defaults; the contract id can additionally be overridden
//! through the `LOTTERY_CONTRACT_ID` environment variable.

use serde::{Deserialize, Serialize};

/// Default deployed contract instance.
pub const DEFAULT_CONTRACT_ID: &str = "CDEHL3FHJEO2RDYILJCPPNYWMKF2PGUJKAKGUU5MW6GWLETJOKLKI53Y";

/// Environment variable that overrides the configured contract id.
pub const CONTRACT_ID_ENV: &str = "LOTTERY_CONTRACT_ID";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network endpoints and contract identity.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Wallet session behavior.
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint used for simulation and submission.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Account endpoint used for sequence-number lookup.
    #[serde(default = "default_horizon_url")]
    pub horizon_url: String,

    /// Passphrase identifying the target network; required for signing.
    #[serde(default = "default_network_passphrase")]
    pub network_passphrase: String,

    /// Contract instance this client talks to.
    #[serde(default = "default_contract_id")]
    pub contract_id: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wallet-extension poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

// Default value functions
fn default_rpc_url() -> String {
    "https://soroban-testnet.stellar.org".to_string()
}
fn default_horizon_url() -> String {
    "https://horizon-testnet.stellar.org".to_string()
}
fn default_network_passphrase() -> String {
    "Test SDF Network ; September 2015".to_string()
}
fn default_contract_id() -> String {
    DEFAULT_CONTRACT_ID.to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    3
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            horizon_url: default_horizon_url(),
            network_passphrase: default_network_passphrase(),
            contract_id: default_contract_id(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration with `.env` support.
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var(CONTRACT_ID_ENV) {
            if !id.is_empty() {
                self.network.contract_id = id;
            }
        }
    }
}
