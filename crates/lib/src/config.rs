//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.slack-relay/config.json`) and environment.
//! Command-line flags override file values; the resolved struct is passed explicitly into
//! the listener and the relay server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Raw line-protocol listener settings.
    #[serde(default)]
    pub raw: RawConfig,

    /// HTTP forwarding relay settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Raw listener: where to accept line-protocol sessions and where to post the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    /// Socket to listen on (default "0.0.0.0:8081").
    #[serde(default = "default_raw_listen")]
    pub listen: String,

    /// Chat gateway URL each assembled message is POSTed to (default "http://localhost:8080").
    #[serde(default = "default_raw_gateway_url")]
    pub gateway_url: String,
}

/// Bound on each raw session's gateway POST. Not configurable.
pub const RAW_GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP relay: listen socket and the webhook JSON bodies are forwarded to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// Socket to listen on (default "0.0.0.0:8080").
    #[serde(default = "default_relay_listen")]
    pub listen: String,

    /// Chat webhook URL. Overridden by SLACK_GW_URL env.
    pub post_url: Option<String>,

    /// Outbound request timeout in seconds (default 30).
    #[serde(default = "default_relay_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_raw_listen() -> String {
    "0.0.0.0:8081".to_string()
}

fn default_raw_gateway_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_relay_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_relay_timeout_secs() -> u64 {
    30
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            listen: default_raw_listen(),
            gateway_url: default_raw_gateway_url(),
        }
    }
}

impl RawConfig {
    pub fn timeout(&self) -> Duration {
        RAW_GATEWAY_TIMEOUT
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: default_relay_listen(),
            post_url: None,
            timeout_secs: default_relay_timeout_secs(),
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolve the relay post URL: env SLACK_GW_URL overrides config.
pub fn resolve_relay_post_url(config: &Config) -> Option<String> {
    std::env::var("SLACK_GW_URL")
        .ok()
        .and_then(|s| non_empty(&s))
        .or_else(|| config.relay.post_url.as_deref().and_then(non_empty))
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SLACK_RELAY_CONFIG").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".slack-relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path (or the default). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let config: Config = serde_json::from_str(&s)
        .with_context(|| format!("parsing config from {}", path.display()))?;
    if config.relay.timeout_secs == 0 {
        anyhow::bail!("relay.timeoutSecs must be at least 1 (in {})", path.display());
    }
    Ok(config)
}
