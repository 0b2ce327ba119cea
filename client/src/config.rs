use std::{env, time::Duration};

/// Entitlements are served from cache for this long.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API origin, e.g. `https://api.genbook.ai`.
    pub base_url: String,
    /// Session access token sent as a bearer token.
    pub token: String,
    pub ttl: Duration,
    /// Billing page users are sent to after a 402.
    pub upgrade_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: String::new(),
            ttl: DEFAULT_TTL,
            upgrade_url: "/billing".to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `GENBOOK_API_URL`, `GENBOOK_API_TOKEN` and `GENBOOK_UPGRADE_URL`,
    /// keeping defaults for whatever is unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            base_url: env::var("GENBOOK_API_URL").unwrap_or(defaults.base_url),
            token: env::var("GENBOOK_API_TOKEN").unwrap_or(defaults.token),
            ttl: defaults.ttl,
            upgrade_url: env::var("GENBOOK_UPGRADE_URL").unwrap_or(defaults.upgrade_url),
        }
    }

    pub fn entitlements_url(&self) -> String {
        format!("{}/api/v1/tenants/current", self.base_url.trim_end_matches('/'))
    }
}
