use super::{types::Config, ConfigError};

/// Validate configuration
///
/// Currently validates:
/// - scan.endpoint and scan.api_token are set (the two mandatory values)
/// - a tracker token accompanies a tracker base URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.scan.endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "scan.endpoint is required".to_string(),
        ));
    }

    if config.scan.api_token.is_empty() {
        return Err(ConfigError::ValidationError(
            "scan.api_token is required".to_string(),
        ));
    }

    if !config.tracker.base_url.is_empty() && config.tracker.api_token.is_empty() {
        return Err(ConfigError::ValidationError(
            "tracker.api_token is required when tracker.base_url is set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn minimal() -> Config {
        load_config_from_str(
            r#"
[scan]
endpoint = "https://api.example.io"
api_token = "tok"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_minimal_ok() {
        assert!(validate_config(&minimal()).is_ok());
    }

    #[test]
    fn test_validate_empty_endpoint_fails() {
        let mut config = minimal();
        config.scan.endpoint.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_token_fails() {
        let mut config = minimal();
        config.scan.api_token.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_tracker_url_without_token_fails() {
        let mut config = minimal();
        config.tracker.base_url = "https://acme.atlassian.net".to_string();
        assert!(validate_config(&config).is_err());
    }
}
