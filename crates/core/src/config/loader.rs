use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides, e.g. `BDTHEQUE_API__TOKEN`.
pub const ENV_PREFIX: &str = "BDTHEQUE_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from environment variables and built-in defaults only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[api]
base_url = "http://127.0.0.1:9000"

[catalog]
page_size = 20
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.catalog.page_size, 20);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[catalog]
page_size = "twenty"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/bdtheque.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
base_url = "http://catalog.local:8000"
timeout_secs = 5

[admin]
members_page_size = 40
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://catalog.local:8000");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.admin.members_page_size, 40);
    }

    #[test]
    fn test_env_override_nested_key() {
        // Only this test reads history_page_size, so the variable cannot leak
        // into other assertions.
        std::env::set_var("BDTHEQUE_ADMIN__HISTORY_PAGE_SIZE", "15");
        let config = load_config_from_env().unwrap();
        std::env::remove_var("BDTHEQUE_ADMIN__HISTORY_PAGE_SIZE");
        assert_eq!(config.admin.history_page_size, 15);
    }
}
