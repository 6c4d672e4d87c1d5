//! Attribution settings
//!
//! Loaded from a JSON file next to the host app's other settings. Every field
//! has a default, so an empty object (or a missing file) is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Duration;

/// AdServices attribution endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "https://api-adservices.apple.com/api/v1/";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionSettings {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Total POST attempts; each 404/500 consumes one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
    /// Clamped to at least 5s when the client is built.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}

fn default_retryable_statuses() -> Vec<u16> {
    vec![404, 500]
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AttributionSettings {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            retryable_statuses: default_retryable_statuses(),
            request_timeout_secs: default_request_timeout_secs(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

impl AttributionSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }

        let url = url::Url::parse(&self.endpoint_url)
            .map_err(|e| format!("Invalid endpoint_url '{}': {}", self.endpoint_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "endpoint_url must be http(s), got scheme '{}'",
                url.scheme()
            ));
        }

        if self.upstream_proxy.enabled && self.upstream_proxy.url.trim().is_empty() {
            return Err("upstream_proxy is enabled but has no url".to_string());
        }
        Ok(())
    }
}

/// Load settings; a missing file yields defaults.
pub fn load_settings(path: &Path) -> Result<AttributionSettings, String> {
    if !path.exists() {
        tracing::debug!("No attribution settings at {:?}, using defaults", path);
        return Ok(AttributionSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings file: {}", e))?;

    let settings: AttributionSettings = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse settings: {}", e))?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AttributionSettings) -> Result<(), String> {
    settings.validate()?;

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;

    std::fs::write(path, content).map_err(|e| format!("Failed to write settings file: {}", e))
}
