// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Request and response envelopes exchanged with an engine
//!
//! Identities travel in their `{id, path}` form inside bodies, never in the
//! URL-segment form.

use crate::majors::{MajorValue, Serie};
use crate::model::Root;
use crate::policy::RepositoryConfig;
use crate::source::RepositorySource;
use serde::{Deserialize, Serialize};

/// Body naming a single repository (fetch model, fetch config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRequest {
    /// Target repository
    pub source: RepositorySource,
}

/// Response of fetch model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Current topology
    pub model: Root,
}

/// Response of fetch config. An absent config means not-found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// Stored policy
    #[serde(default)]
    pub config: Option<RepositoryConfig>,
}

/// Body of save config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveConfigRequest {
    /// Target repository
    pub source: RepositorySource,
    /// Policy to store
    pub config: RepositoryConfig,
}

/// Response carrying only a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Outcome description
    pub message: String,
}

/// Response of release and create patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Outcome description
    pub message: String,
    /// Topology after the command
    pub model: Root,
}

/// Response of list major series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesResponse {
    /// All series
    pub series: Vec<Serie>,
}

/// Body of allocate major value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateRequest {
    /// Value to allocate
    pub value: MajorValue,
}

/// Response of allocate major value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateResponse {
    /// Outcome description
    pub message: String,
    /// The series after allocation
    pub serie: Serie,
}

/// Response of list tracked repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesResponse {
    /// Tracked repositories
    pub sources: Vec<RepositorySource>,
}

/// Error body a remote engine may return alongside a failure status
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
