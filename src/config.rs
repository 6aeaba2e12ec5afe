//! Server configuration from environment variables

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ASSET_ROOT: &str = "public";
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `data/` (catalog, content JSON, CSV series)
    pub asset_root: PathBuf,
    /// When set, content is fetched from this base URL instead of `asset_root`
    pub content_base_url: Option<String>,
    pub port: u16,
    /// Email provider API key (secret)
    pub resend_api_key: Option<String>,
    /// Operator inbox receiving contact inquiries
    pub contact_to: String,
    pub contact_from: String,
    pub content_cache_capacity: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            asset_root: get("ASSET_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT)),
            content_base_url: get("CONTENT_BASE_URL"),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            resend_api_key: get("RESEND_API_KEY"),
            contact_to: get("CONTACT_TO").unwrap_or_else(|| "sales@berrynursery.example".to_string()),
            contact_from: get("CONTACT_FROM")
                .unwrap_or_else(|| "Cultivar Catalog <noreply@berrynursery.example>".to_string()),
            content_cache_capacity: get("CONTENT_CACHE_CAPACITY")
                .and_then(|c| c.parse().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  ASSET_ROOT: {}", self.asset_root.display());
        tracing::info!(
            "  CONTENT_BASE_URL: {}",
            self.content_base_url.as_deref().unwrap_or("(local)")
        );
        tracing::info!("  PORT: {}", self.port);
        tracing::info!(
            "  RESEND_API_KEY: {}",
            if self.resend_api_key.is_some() { "set" } else { "missing" }
        );
        tracing::info!("  CONTACT_TO: {}", self.contact_to);
    }
}
