// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./seqlite.toml` > `~/.config/seqlite/seqlite.toml` > `/etc/seqlite/seqlite.toml`
//! with environment variable overrides via `SEQLITE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SeqliteConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/seqlite/seqlite.toml`
/// 3. `~/.config/seqlite/seqlite.toml`
/// 4. `./seqlite.toml`
/// 5. `SEQLITE_*` environment variables
pub fn load_config() -> Result<SeqliteConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SeqliteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SeqliteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SeqliteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SeqliteConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SeqliteConfig::default()))
        .merge(Toml::file("/etc/seqlite/seqlite.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("seqlite/seqlite.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("seqlite.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `SEQLITE_DISPATCH_SIMPLE_NULL_HANDLING`
/// must become `dispatch.simple_null_handling`, not `dispatch.simple.null.handling`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("SEQLITE_").map(|key| {
        key.as_str()
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("logging_", "logging.", 1)
            .into()
    })
}
