//! Connection settings for the remote store.
//!
//! Values come from the `[store]` section of the dashboard config file and
//! can be overridden by environment variables:
//!
//! - `TRACKER_STORE_URL`    (base URL, e.g. "https://xyz.example.co")
//! - `TRACKER_API_KEY`      (public API key sent as `apikey`)
//! - `TRACKER_ACCESS_TOKEN` (session token; falls back to the API key)
//! - `TRACKER_REORDER_RPC`  (batch reorder procedure, optional)
//! - `TRACKER_TIMEOUT_SECS` (default: "15")

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub access_token: Option<String>,
    /// Name of a stored procedure that applies a whole position batch in
    /// one transaction. Without it, batches are written row by row.
    pub reorder_rpc: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            url: String::new(),
            api_key: String::new(),
            access_token: None,
            reorder_rpc: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &redacted(&self.api_key))
            .field("access_token", &self.access_token.as_deref().map(redacted))
            .field("reorder_rpc", &self.reorder_rpc)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl StoreConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self, StoreError> {
        StoreConfig::default().overlay_env()
    }

    /// Apply any `TRACKER_*` variables that are set on top of `self`.
    pub fn overlay_env(mut self) -> Result<Self, StoreError> {
        if let Ok(url) = env::var("TRACKER_STORE_URL") {
            self.url = url;
        }
        if let Ok(key) = env::var("TRACKER_API_KEY") {
            self.api_key = key;
        }
        if let Ok(token) = env::var("TRACKER_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Ok(rpc) = env::var("TRACKER_REORDER_RPC") {
            self.reorder_rpc = Some(rpc).filter(|s| !s.is_empty());
        }
        self.timeout_secs = read_env_or_default("TRACKER_TIMEOUT_SECS", self.timeout_secs)?;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Token for the `Authorization` header.
    pub fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.url.trim().is_empty() {
            return Err(StoreError::Config("store url is not set".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(StoreError::Config("store api key is not set".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| StoreError::Config(format!("{key}={val:?}: {e}"))),
        Err(_) => Ok(default),
    }
}
