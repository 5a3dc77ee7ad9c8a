// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for seqlite.
//!
//! TOML configuration with strict key checking (`deny_unknown_fields`), an XDG
//! file hierarchy, `SEQLITE_*` environment overrides, and miette diagnostics
//! with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use seqlite_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("simple nulls: {}", config.dispatch.simple_null_handling);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DispatchConfig, LoggingConfig, SeqliteConfig, StorageConfig};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<SeqliteConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(
    path: &std::path::Path,
) -> Result<SeqliteConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SeqliteConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read whichever config files exist so diagnostics can point into them.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("seqlite.toml"))
        .unwrap_or_else(|_| "seqlite.toml".into());
    let user = dirs::config_dir().map(|d| d.join("seqlite/seqlite.toml"));
    let system = std::path::PathBuf::from("/etc/seqlite/seqlite.toml");

    [Some(local), user, Some(system)]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
