// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Per-repository automation policy
//!
//! Edits never happen in place on a shared value: every edit consumes the
//! policy and hands back the changed one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build automation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Merge the change
    Merge,
    /// Merge and cut a release
    Release,
    /// Do nothing
    Nothing,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merge => "merge",
            Self::Release => "release",
            Self::Nothing => "nothing",
        })
    }
}

/// An action override keyed by a code-review label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAction {
    /// Label string
    pub id: String,
    /// Action taken for changes carrying the label
    pub action: Action,
}

/// Default action plus label overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAutomation {
    /// Action when no label matches
    pub default: Action,
    /// Label overrides, scanned in order
    #[serde(default)]
    pub labels: Vec<LabelAction>,
}

impl Default for BuildAutomation {
    fn default() -> Self {
        Self {
            default: Action::Merge,
            labels: Vec::new(),
        }
    }
}

impl BuildAutomation {
    /// Action for `label`: the first matching entry wins, else the default.
    ///
    /// Duplicate label ids are tolerated; later duplicates are never reached.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Action {
        self.labels
            .iter()
            .find(|l| l.id == label)
            .map_or(self.default, |l| l.action)
    }

    /// Replace the default action
    #[must_use]
    pub fn with_default(mut self, action: Action) -> Self {
        self.default = action;
        self
    }

    /// Upsert by id: replace the first entry with this id or append a new one
    #[must_use]
    pub fn with_label(mut self, id: impl Into<String>, action: Action) -> Self {
        let id = id.into();
        match self.labels.iter_mut().find(|l| l.id == id) {
            Some(existing) => existing.action = action,
            None => self.labels.push(LabelAction { id, action }),
        }
        self
    }

    /// Delete by id. Every entry with the id goes, so no shadowed duplicate
    /// resurfaces; absent ids are a no-op.
    #[must_use]
    pub fn without_label(mut self, id: &str) -> Self {
        self.labels.retain(|l| l.id != id);
        self
    }
}

/// Free-function form of [`BuildAutomation::resolve`]
#[must_use]
pub fn resolve_action(automation: &BuildAutomation, label: &str) -> Action {
    automation.resolve(label)
}

/// Binding of a repository to a major series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorSerieBinding {
    /// Series id
    pub id: String,
    /// Apply new series values to this repository automatically
    pub auto_apply: bool,
}

/// Automation policy of one repository.
///
/// The default (used when the engine has none stored) merges everything and
/// is bound to no series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Build automation policy
    pub build_automation: BuildAutomation,
    /// Optional major series binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_serie: Option<MajorSerieBinding>,
}

impl RepositoryConfig {
    /// Apply an edit to the build automation policy
    #[must_use]
    pub fn map_automation(mut self, edit: impl FnOnce(BuildAutomation) -> BuildAutomation) -> Self {
        self.build_automation = edit(self.build_automation);
        self
    }

    /// Bind to a major series, replacing any previous binding
    #[must_use]
    pub fn with_major_serie(mut self, id: impl Into<String>, auto_apply: bool) -> Self {
        self.major_serie = Some(MajorSerieBinding {
            id: id.into(),
            auto_apply,
        });
        self
    }

    /// Drop the major series binding
    #[must_use]
    pub fn without_major_serie(mut self) -> Self {
        self.major_serie = None;
        self
    }
}
