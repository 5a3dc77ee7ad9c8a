// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for seqlite.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level seqlite configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SeqliteConfig {
    /// Operation dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// SQLite connection settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Operation dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Translate application nulls into the engine's null sentinel before
    /// parameters are bound. Can be flipped at runtime on the dispatcher.
    #[serde(default)]
    pub simple_null_handling: bool,

    /// Prefix for per-connection worker thread names.
    #[serde(default = "default_worker_name_prefix")]
    pub worker_name_prefix: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            simple_null_handling: false,
            worker_name_prefix: default_worker_name_prefix(),
        }
    }
}

fn default_worker_name_prefix() -> String {
    "seqlite".to_string()
}

/// SQLite connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// How long SQLite waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Enforce foreign key constraints.
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            wal_mode: true,
            foreign_keys: true,
        }
    }
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
