use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::coordinator::CoordinatorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogScreenConfig,
    #[serde(default)]
    pub admin: AdminScreensConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend (e.g., "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Bearer token for the admin endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Public catalog screen
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogScreenConfig {
    #[serde(default = "default_catalog_page_size")]
    pub page_size: u32,
    /// Quiet window before a typed search is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for CatalogScreenConfig {
    fn default() -> Self {
        Self {
            page_size: default_catalog_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl CatalogScreenConfig {
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            page_size: self.page_size,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

fn default_catalog_page_size() -> u32 {
    25
}

fn default_debounce_ms() -> u64 {
    300
}

/// Administration panel listings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminScreensConfig {
    #[serde(default = "default_admin_page_size")]
    pub bds_page_size: u32,
    #[serde(default = "default_admin_page_size")]
    pub members_page_size: u32,
    #[serde(default = "default_available_page_size")]
    pub available_page_size: u32,
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for AdminScreensConfig {
    fn default() -> Self {
        Self {
            bds_page_size: default_admin_page_size(),
            members_page_size: default_admin_page_size(),
            available_page_size: default_available_page_size(),
            history_page_size: default_history_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AdminScreensConfig {
    fn with_page_size(&self, page_size: u32) -> CoordinatorConfig {
        CoordinatorConfig {
            page_size,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn bds(&self) -> CoordinatorConfig {
        self.with_page_size(self.bds_page_size)
    }

    pub fn members(&self) -> CoordinatorConfig {
        self.with_page_size(self.members_page_size)
    }

    pub fn available(&self) -> CoordinatorConfig {
        self.with_page_size(self.available_page_size)
    }
}

fn default_admin_page_size() -> u32 {
    50
}

fn default_available_page_size() -> u32 {
    25
}

fn default_history_page_size() -> u32 {
    10
}

/// Sanitized config for display (token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub catalog: CatalogScreenConfig,
    pub admin: AdminScreensConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub timeout_secs: u32,
    pub token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                timeout_secs: config.api.timeout_secs,
                token_configured: config
                    .api
                    .token
                    .as_deref()
                    .is_some_and(|t| !t.trim().is_empty()),
            },
            catalog: config.catalog.clone(),
            admin: config.admin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.token.is_none());
        assert_eq!(config.catalog.page_size, 25);
        assert_eq!(config.catalog.debounce_ms, 300);
        assert_eq!(config.admin.members_page_size, 50);
        assert_eq!(config.admin.history_page_size, 10);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[api]
base_url = "https://bdtheque.example.org"
timeout_secs = 10
token = "abc"

[catalog]
page_size = 20
debounce_ms = 500

[admin]
available_page_size = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://bdtheque.example.org");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.catalog.page_size, 20);
        assert_eq!(config.admin.available_page_size, 30);
        assert_eq!(config.admin.bds_page_size, 50); // default
    }

    #[test]
    fn test_coordinator_config_from_screen() {
        let screen = CatalogScreenConfig {
            page_size: 40,
            debounce_ms: 400,
        };
        let coordinator = screen.coordinator();
        assert_eq!(coordinator.page_size, 40);
        assert_eq!(coordinator.debounce, Duration::from_millis(400));

        let admin = AdminScreensConfig::default();
        assert_eq!(admin.available().page_size, 25);
        assert_eq!(admin.members().debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let config = Config {
            api: ApiConfig {
                token: Some("secret".to_string()),
                ..ApiConfig::default()
            },
            ..Config::default()
        };
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api.token_configured);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
