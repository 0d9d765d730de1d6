// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Operator-facing control surface over an [`Engine`]
//!
//! Every client (CLI, automation job, UI backend) goes through this layer so
//! gating and policy edits are decided the same way everywhere.

use crate::api::{
    AllocateRequest, AllocateResponse, CommandResponse, MessageResponse, SaveConfigRequest,
    SourceRequest,
};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::majors::{MajorValue, Serie};
use crate::model::Root;
use crate::policy::{Action, RepositoryConfig};
use crate::source::RepositorySource;
use tracing::{info, warn};

/// A policy together with the warning raised when it had to be defaulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLookup {
    /// Stored policy, or the default one
    pub config: RepositoryConfig,
    /// Set when no policy was stored and the default was substituted
    pub warning: Option<String>,
}

/// Control surface bound to one engine
pub struct Client<E> {
    engine: E,
}

impl<E: Engine> Client<E> {
    /// Wrap an engine
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current topology of `source`
    pub fn model(&self, source: &RepositorySource) -> Result<Root> {
        let req = SourceRequest {
            source: source.clone(),
        };
        Ok(self.engine.fetch_model(&req)?.model)
    }

    /// Stored policy of `source`; [`Error::NotFound`] when there is none.
    pub fn config(&self, source: &RepositorySource) -> Result<RepositoryConfig> {
        self.stored_config(source)?
            .ok_or_else(|| Error::not_found(format!("no configuration stored for {source}")))
    }

    /// Stored policy of `source`, or the default policy with a warning.
    ///
    /// Only a tracked repository without a stored policy is defaulted; engine
    /// errors, an unknown repository included, are returned as they are.
    pub fn config_or_default(&self, source: &RepositorySource) -> Result<ConfigLookup> {
        match self.stored_config(source)? {
            Some(config) => Ok(ConfigLookup {
                config,
                warning: None,
            }),
            None => {
                let warning =
                    format!("no configuration stored for {source}; using the default configuration");
                warn!("{}", warning);
                Ok(ConfigLookup {
                    config: RepositoryConfig::default(),
                    warning: Some(warning),
                })
            }
        }
    }

    fn stored_config(&self, source: &RepositorySource) -> Result<Option<RepositoryConfig>> {
        let req = SourceRequest {
            source: source.clone(),
        };
        Ok(self.engine.fetch_config(&req)?.config)
    }

    /// Store a policy
    pub fn save_config(
        &self,
        source: &RepositorySource,
        config: RepositoryConfig,
    ) -> Result<MessageResponse> {
        self.engine.save_config(&SaveConfigRequest {
            source: source.clone(),
            config,
        })
    }

    /// Fetch-or-default the policy, apply `edit` and save the result
    pub fn edit_config(
        &self,
        source: &RepositorySource,
        edit: impl FnOnce(RepositoryConfig) -> RepositoryConfig,
    ) -> Result<RepositoryConfig> {
        let current = self.config_or_default(source)?.config;
        let next = edit(current);
        self.save_config(source, next.clone())?;
        Ok(next)
    }

    /// Set the default automation action
    pub fn set_default_action(
        &self,
        source: &RepositorySource,
        action: Action,
    ) -> Result<RepositoryConfig> {
        self.edit_config(source, |c| c.map_automation(|a| a.with_default(action)))
    }

    /// Upsert a label override
    pub fn set_label(
        &self,
        source: &RepositorySource,
        label: &str,
        action: Action,
    ) -> Result<RepositoryConfig> {
        self.edit_config(source, |c| c.map_automation(|a| a.with_label(label, action)))
    }

    /// Remove a label override
    pub fn remove_label(&self, source: &RepositorySource, label: &str) -> Result<RepositoryConfig> {
        self.edit_config(source, |c| c.map_automation(|a| a.without_label(label)))
    }

    /// Bind to a major series
    pub fn bind_serie(
        &self,
        source: &RepositorySource,
        serie: &str,
        auto_apply: bool,
    ) -> Result<RepositoryConfig> {
        self.edit_config(source, |c| c.with_major_serie(serie, auto_apply))
    }

    /// Drop the major series binding
    pub fn unbind_serie(&self, source: &RepositorySource) -> Result<RepositoryConfig> {
        self.edit_config(source, RepositoryConfig::without_major_serie)
    }

    /// Cut a release on `major`, validated against the last known model
    pub fn release(
        &self,
        source: &RepositorySource,
        last_known: &Root,
        major: u32,
    ) -> Result<CommandResponse> {
        let cmd = last_known.release_command(source, major)?;
        info!("Requesting release of {} major {}", source, major);
        self.engine.release(&cmd)
    }

    /// Open the patch branch of `major`, validated against the last known model
    pub fn create_patch(
        &self,
        source: &RepositorySource,
        last_known: &Root,
        major: u32,
    ) -> Result<CommandResponse> {
        let cmd = last_known.patch_command(source, major)?;
        info!("Requesting patch branch for {} major {}", source, major);
        self.engine.create_patch(&cmd)
    }

    /// All major series
    pub fn series(&self) -> Result<Vec<Serie>> {
        Ok(self.engine.list_series()?.series)
    }

    /// One major series by id
    pub fn serie(&self, id: &str) -> Result<Serie> {
        self.series()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::not_found(format!("series {id} does not exist")))
    }

    /// The next value of a series, for the operator to confirm
    pub fn propose_major(&self, serie: &str) -> Result<MajorValue> {
        self.serie(serie)?.propose()
    }

    /// Allocate a confirmed value
    pub fn allocate(&self, value: MajorValue) -> Result<AllocateResponse> {
        info!("Allocating {} in series {}", value.value, value.id);
        self.engine.allocate(&AllocateRequest { value })
    }

    /// All tracked repositories
    pub fn sources(&self) -> Result<Vec<RepositorySource>> {
        Ok(self.engine.list_sources()?.sources)
    }
}
