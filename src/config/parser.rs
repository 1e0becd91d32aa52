use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// Missing sections and keys fall back to their defaults.
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration at `path`, or the defaults when no path is given
pub fn load_config_or_default(path: Option<&Path>) -> ConfigResult<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
start-url = "https://wiki.example.com/wiki/index.php?title=Category:Fault_Codes"
request-delay-ms = 250
max-pages = 10
test-mode-limit = 3
progress-interval = 5

[user-agent]
crawler-name = "TestHarvester"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
database-path = "./test.db"
snapshot-path = "./test.db.gz"
metadata-path = "./test.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.request_delay_ms, 250);
        assert_eq!(config.crawler.max_pages, 10);
        assert_eq!(config.crawler.test_mode_limit, 3);
        assert_eq!(config.user_agent.crawler_name, "TestHarvester");
        assert_eq!(config.output.database_path, "./test.db");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[crawler]\nmax-pages = 7\n").unwrap();

        assert_eq!(config.crawler.max_pages, 7);
        assert_eq!(config.crawler.request_delay_ms, 1000);
        assert_eq!(config.crawler.request_timeout_secs, 30);
        assert_eq!(config.output.database_path, "fault_codes.db");
        assert_eq!(config.user_agent.crawler_name, "fault-harvest");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = load_config_or_default(None).unwrap();
        assert_eq!(config.crawler.max_pages, 50);
        assert_eq!(config.crawler.test_mode_limit, 5);
        assert_eq!(config.crawler.progress_interval, 10);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nmax-pages = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
