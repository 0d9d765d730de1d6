// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod deps;
pub mod majors;
pub mod model;
pub mod policy;
pub mod release;
pub mod settings;
pub mod sources;
pub mod url;

use crate::client::Client;
use crate::config::{Config, EngineKind};
use crate::engine::{self, Engine, LocalEngine};
use crate::source::RepositorySource;
use anyhow::{bail, Context as _, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

/// How results are printed
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Print response envelopes as JSON
    pub json: bool,
    /// Colour human-readable output
    pub color: bool,
}

impl Output {
    /// Pretty-print `value` as JSON on stdout
    pub fn print_json<T: Serialize>(self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{json}");
        Ok(())
    }

    /// Mark text as a positive status
    #[must_use]
    pub fn good(self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Mark text as a refusal or problem
    #[must_use]
    pub fn bad(self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    /// Mark text as secondary
    #[must_use]
    pub fn dim(self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Everything a command needs: configuration and output settings
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Output settings
    pub out: Output,
}

impl Context {
    /// Client over the configured engine
    pub fn client(&self) -> Result<Client<Box<dyn Engine>>> {
        let engine = engine::open(&self.config).context("Failed to open engine")?;
        Ok(Client::new(engine))
    }

    /// The local engine, for administration the engine contract does not cover
    pub fn local(&self, what: &str) -> Result<LocalEngine> {
        if self.config.engine.kind != EngineKind::Local {
            bail!("'{}' is only available with the local engine", what);
        }
        LocalEngine::open(&self.config.data_dir).with_context(|| {
            format!("Failed to open store in {}", self.config.data_dir.display())
        })
    }
}

/// Parse a repository argument in `id/path` form, or in URL-segment form
pub fn parse_source(arg: &str) -> Result<RepositorySource> {
    if arg.contains('/') {
        return arg
            .parse::<RepositorySource>()
            .with_context(|| format!("Invalid repository: {arg}"));
    }
    RepositorySource::from_url_segment(arg)
        .with_context(|| format!("Invalid repository: {arg} (expected id/path or id.path)"))
}
