// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::SeqliteConfig;

/// Log levels accepted by `logging.level`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `storage.busy_timeout_ms` (10 minutes).
pub const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first one.
pub fn validate_config(config: &SeqliteConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of: {}",
                config.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ),
        });
    }

    let prefix = config.dispatch.worker_name_prefix.trim();
    if prefix.is_empty() {
        errors.push(ConfigError::Validation {
            message: "dispatch.worker_name_prefix must not be empty".to_string(),
        });
    } else if prefix.contains('\0') {
        errors.push(ConfigError::Validation {
            message: "dispatch.worker_name_prefix must not contain NUL bytes".to_string(),
        });
    }

    if config.storage.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}, got {}",
                config.storage.busy_timeout_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = SeqliteConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = SeqliteConfig::default();
        config.logging.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = SeqliteConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn blank_worker_prefix_fails_validation() {
        let mut config = SeqliteConfig::default();
        config.dispatch.worker_name_prefix = "   ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "worker_name_prefix"));
    }

    #[test]
    fn excessive_busy_timeout_fails_validation() {
        let mut config = SeqliteConfig::default();
        config.storage.busy_timeout_ms = MAX_BUSY_TIMEOUT_MS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "busy_timeout_ms"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = SeqliteConfig::default();
        config.logging.level = "loud".to_string();
        config.dispatch.worker_name_prefix = String::new();
        config.storage.busy_timeout_ms = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
