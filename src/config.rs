use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Admin Configuration
// ============================================================================
//
// Defaults match the dashboard's observed behaviour (8 rows per picker
// page, no compensation on partial saves). Every field can be overridden
// through SHOP_ADMIN_* environment variables.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Base URL of the admin REST API, e.g. `http://localhost:8080/api`
    pub api_url: Option<String>,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Rows per picker page
    pub page_size: u32,
    /// HTTP client timeout in seconds
    pub request_timeout_secs: u64,
    /// Delete the order header when line-item creation fails
    pub compensate_failed_orders: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            page_size: 8,
            request_timeout_secs: 30,
            compensate_failed_orders: false,
        }
    }
}

impl AdminConfig {
    /// Build a config from the process environment, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SHOP_ADMIN_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = Some(url.trim_end_matches('/').to_string());
        }

        config.api_token = lookup("SHOP_ADMIN_API_TOKEN").filter(|v| !v.is_empty());

        if let Some(raw) = lookup("SHOP_ADMIN_PAGE_SIZE") {
            let page_size: u32 = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SHOP_ADMIN_PAGE_SIZE '{}': {}", raw, e))?;
            if page_size == 0 {
                anyhow::bail!("SHOP_ADMIN_PAGE_SIZE must be at least 1");
            }
            config.page_size = page_size;
        }

        if let Some(raw) = lookup("SHOP_ADMIN_TIMEOUT_SECS") {
            config.request_timeout_secs = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SHOP_ADMIN_TIMEOUT_SECS '{}': {}", raw, e))?;
        }

        if let Some(raw) = lookup("SHOP_ADMIN_COMPENSATE") {
            config.compensate_failed_orders = matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
