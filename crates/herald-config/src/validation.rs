// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty endpoints and positive cache bounds.

use tracing::debug;

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    require_non_empty(
        &mut errors,
        "kafka.bootstrap_servers",
        &config.kafka.bootstrap_servers,
    );
    if config
        .kafka
        .bootstrap_servers
        .split(',')
        .any(|server| server.trim().is_empty())
        && !config.kafka.bootstrap_servers.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "kafka.bootstrap_servers `{}` contains an empty endpoint",
                config.kafka.bootstrap_servers
            ),
        });
    }

    require_non_empty(
        &mut errors,
        "kafka.schema_registry_url",
        &config.kafka.schema_registry_url,
    );
    let url = config.kafka.schema_registry_url.trim();
    if !url.is_empty()
        && !url.starts_with("memory://")
        && !url.starts_with("http://")
        && !url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "kafka.schema_registry_url `{url}` must start with memory://, http:// or https://"
            ),
        });
    }

    require_non_empty(&mut errors, "kafka.client_id", &config.kafka.client_id);

    if config.schema_registry.request_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "schema_registry.request_timeout_ms must be greater than 0".to_string(),
        });
    }

    if config.schema_registry.max_cached_schemas == 0 {
        errors.push(ConfigError::Validation {
            message: "schema_registry.max_cached_schemas must be at least 1".to_string(),
        });
    }

    if config.broker.partitions == 0 {
        errors.push(ConfigError::Validation {
            message: "broker.partitions must be at least 1".to_string(),
        });
    }

    require_non_empty(&mut errors, "consumer.group_id", &config.consumer.group_id);
    require_non_empty(&mut errors, "consumer.channel", &config.consumer.channel);

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        debug!("configuration validated");
        Ok(())
    } else {
        Err(errors)
    }
}

fn require_non_empty(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("{key} must not be empty"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&HeraldConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = HeraldConfig::default();
        config.kafka.bootstrap_servers = "  ".into();
        config.schema_registry.max_cached_schemas = 0;
        config.consumer.group_id = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_unknown_registry_scheme() {
        let mut config = HeraldConfig::default();
        config.kafka.schema_registry_url = "ftp://registry".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("ftp://registry"));
    }

    #[test]
    fn rejects_empty_endpoint_in_list() {
        let mut config = HeraldConfig::default();
        config.kafka.bootstrap_servers = "kafka-1:9092,,kafka-2:9092".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = HeraldConfig::default();
        config.schema_registry.request_timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = HeraldConfig::default();
        config.agent.log_level = "verbose".into();
        assert!(validate_config(&config).is_err());
    }
}
