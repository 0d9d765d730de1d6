// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The boundary to the engine that owns git state
//!
//! An [`Engine`] answers the request/response contract in [`crate::api`].
//! Engines must serialize mutating commands per `(source, major)` and reject
//! a command that lost a race with [`crate::error::Error::Conflict`].

pub mod http;
pub mod local;
pub mod locks;

use crate::api::{
    AllocateRequest, AllocateResponse, CommandResponse, ConfigResponse, MessageResponse,
    ModelResponse, SaveConfigRequest, SeriesResponse, SourceRequest, SourcesResponse,
};
use crate::config::{Config, EngineKind};
use crate::error::{Error, Result};
use crate::model::VersionCommand;
use std::time::Duration;

pub use http::HttpEngine;
pub use local::LocalEngine;

/// Operations offered by a release engine
pub trait Engine {
    /// Current topology of a repository
    fn fetch_model(&self, req: &SourceRequest) -> Result<ModelResponse>;

    /// Stored policy of a repository; `config` is `None` when none exists
    fn fetch_config(&self, req: &SourceRequest) -> Result<ConfigResponse>;

    /// Store a repository's policy
    fn save_config(&self, req: &SaveConfigRequest) -> Result<MessageResponse>;

    /// Cut a release on a line
    fn release(&self, cmd: &VersionCommand) -> Result<CommandResponse>;

    /// Open the patch branch of a historic major
    fn create_patch(&self, cmd: &VersionCommand) -> Result<CommandResponse>;

    /// All major series
    fn list_series(&self) -> Result<SeriesResponse>;

    /// Allocate a value in a major series
    fn allocate(&self, req: &AllocateRequest) -> Result<AllocateResponse>;

    /// All tracked repositories
    fn list_sources(&self) -> Result<SourcesResponse>;
}

impl<T: Engine + ?Sized> Engine for Box<T> {
    fn fetch_model(&self, req: &SourceRequest) -> Result<ModelResponse> {
        (**self).fetch_model(req)
    }

    fn fetch_config(&self, req: &SourceRequest) -> Result<ConfigResponse> {
        (**self).fetch_config(req)
    }

    fn save_config(&self, req: &SaveConfigRequest) -> Result<MessageResponse> {
        (**self).save_config(req)
    }

    fn release(&self, cmd: &VersionCommand) -> Result<CommandResponse> {
        (**self).release(cmd)
    }

    fn create_patch(&self, cmd: &VersionCommand) -> Result<CommandResponse> {
        (**self).create_patch(cmd)
    }

    fn list_series(&self) -> Result<SeriesResponse> {
        (**self).list_series()
    }

    fn allocate(&self, req: &AllocateRequest) -> Result<AllocateResponse> {
        (**self).allocate(req)
    }

    fn list_sources(&self) -> Result<SourcesResponse> {
        (**self).list_sources()
    }
}

/// Open the engine selected by the configuration
pub fn open(config: &Config) -> Result<Box<dyn Engine>> {
    match config.engine.kind {
        EngineKind::Local => {
            tracing::debug!("Using local engine in {}", config.data_dir.display());
            Ok(Box::new(LocalEngine::open(&config.data_dir)?))
        }
        EngineKind::Http => {
            let url = config.engine.url.as_deref().ok_or_else(|| {
                Error::validation("engine.url is required when engine.kind = \"http\"")
            })?;
            tracing::debug!("Using remote engine at {}", url);
            Ok(Box::new(HttpEngine::new(
                url,
                Duration::from_secs(config.engine.timeout_secs),
            )?))
        }
    }
}
