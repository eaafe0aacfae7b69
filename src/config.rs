//! Process configuration
//!
//! Built once at startup and passed explicitly to the relay and the uploader.

use crate::{Error, Result};

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY_URL: &str = "https://ipfs.io/ipfs";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub pinata_api_key: String,
    pub pinata_secret_api_key: String,
    pub pinata_api_url: String,
    pub gateway_url: String,
    pub bind_addr: String,
    pub relay_url: String,
}

impl Config {
    pub fn new(pinata_api_key: String, pinata_secret_api_key: String) -> Self {
        Self {
            pinata_api_key,
            pinata_secret_api_key,
            pinata_api_url: DEFAULT_PINATA_API_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
        }
    }

    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => return Err(e.into()),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            pinata_api_key: required("PINATA_API_KEY")?,
            pinata_secret_api_key: required("PINATA_SECRET_API_KEY")?,
            pinata_api_url: trim_url(optional("PINATA_API_URL", DEFAULT_PINATA_API_URL)),
            gateway_url: trim_url(optional("IPFS_GATEWAY_URL", DEFAULT_GATEWAY_URL)),
            bind_addr: optional("RELAY_BIND_ADDR", DEFAULT_BIND_ADDR),
            relay_url: trim_url(optional("RELAY_URL", DEFAULT_RELAY_URL)),
        })
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
