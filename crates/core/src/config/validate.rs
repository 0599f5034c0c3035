use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upstream base URL is present and http(s)
/// - Search limits are sane
/// - Sync batch sizes are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if !config.upstream.base_url.starts_with("http://")
        && !config.upstream.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(
            "upstream.base_url must be an http(s) URL".to_string(),
        ));
    }

    if config.search.max_limit == 0 || config.search.default_limit == 0 {
        return Err(ConfigError::ValidationError(
            "search limits cannot be 0".to_string(),
        ));
    }

    if config.search.default_limit > config.search.max_limit {
        return Err(ConfigError::ValidationError(
            "search.default_limit cannot exceed search.max_limit".to_string(),
        ));
    }

    if config.sync.set_batch_size == 0 || config.sync.card_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "sync batch sizes cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_bad_base_url_fails() {
        let mut config = Config::default();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_limit_ordering() {
        let mut config = Config::default();
        config.search.default_limit = 500;
        config.search.max_limit = 100;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_batch_size_fails() {
        let mut config = Config::default();
        config.sync.card_batch_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
