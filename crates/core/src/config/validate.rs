use reqwest::Url;

use super::{types::Config, ConfigError};

/// Largest page the backend serves (`limit` is capped at 100).
pub const MAX_PAGE_SIZE: u32 = 100;

/// Longest accepted debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 5_000;

/// Validate configuration
/// Currently validates:
/// - api.base_url is an http(s) URL
/// - api.timeout_secs is not 0
/// - every page size is within 1..=100
/// - debounce windows are at most 5 seconds
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url = Url::parse(&config.api.base_url).map_err(|e| {
        ConfigError::ValidationError(format!(
            "api.base_url '{}' is not a valid URL: {}",
            config.api.base_url, e
        ))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    let page_sizes = [
        ("catalog.page_size", config.catalog.page_size),
        ("admin.bds_page_size", config.admin.bds_page_size),
        ("admin.members_page_size", config.admin.members_page_size),
        ("admin.available_page_size", config.admin.available_page_size),
        ("admin.history_page_size", config.admin.history_page_size),
    ];
    for (name, size) in page_sizes {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_PAGE_SIZE, size
            )));
        }
    }

    let debounces = [
        ("catalog.debounce_ms", config.catalog.debounce_ms),
        ("admin.debounce_ms", config.admin.debounce_ms),
    ];
    for (name, ms) in debounces {
        if ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at most {}, got {}",
                name, MAX_DEBOUNCE_MS, ms
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, CatalogScreenConfig};

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let config = Config {
            api: ApiConfig {
                base_url: "not a url".to_string(),
                ..ApiConfig::default()
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_non_http_scheme_fails() {
        let config = Config {
            api: ApiConfig {
                base_url: "ftp://catalog.local".to_string(),
                ..ApiConfig::default()
            },
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_page_size_bounds() {
        for size in [0, 101] {
            let config = Config {
                catalog: CatalogScreenConfig {
                    page_size: size,
                    debounce_ms: 300,
                },
                ..Config::default()
            };
            let err = validate_config(&config).unwrap_err();
            assert!(err.to_string().contains("catalog.page_size"));
        }
    }

    #[test]
    fn test_validate_debounce_too_long() {
        let config = Config {
            catalog: CatalogScreenConfig {
                page_size: 25,
                debounce_ms: 60_000,
            },
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = Config {
            api: ApiConfig {
                timeout_secs: 0,
                ..ApiConfig::default()
            },
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
