// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, lowest first: built-in defaults, an optional TOML file, then
//! `TRUNKLINE_*` environment variables (`__` separates nested keys, so
//! `TRUNKLINE_ENGINE__URL` sets `engine.url`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which engine implementation to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// File-backed engine in the data directory
    Local,
    /// Remote engine over HTTP
    Http,
}

/// Engine connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Engine implementation
    pub kind: EngineKind,
    /// Base URL of a remote engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Request timeout for a remote engine
    pub timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            kind: EngineKind::Local,
            url: None,
            timeout_secs: 30,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent data (the local engine's store)
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Engine connection
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
            engine: EngineSettings::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "hyperpolymath", "trunkline")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".trunkline")
        })
}

/// Load configuration from defaults, an optional file and the environment.
///
/// An explicitly given file must exist.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();

    let mut builder = ::config::Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
        .set_default("log_level", defaults.log_level)?
        .set_default("engine.kind", "local")?
        .set_default("engine.timeout_secs", defaults.engine.timeout_secs)?;

    if let Some(path) = path {
        builder = builder.add_source(
            ::config::File::from(path.to_path_buf())
                .format(::config::FileFormat::Toml)
                .required(true),
        );
    }

    builder = builder.add_source(
        ::config::Environment::with_prefix("TRUNKLINE")
            .prefix_separator("_")
            .separator("__"),
    );

    let loaded = builder
        .build()
        .context("Failed to load configuration")?
        .try_deserialize::<Config>()
        .context("Invalid configuration")?;

    tracing::debug!("Loaded configuration: {:?}", loaded);
    Ok(loaded)
}

/// Render configuration as TOML
pub fn to_toml(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}
