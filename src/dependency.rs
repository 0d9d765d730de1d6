// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dependency identity: what a build can depend on

use crate::error::{Error, Result};
use crate::source::RepositorySource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something a build depends on.
///
/// Equality is per variant: a git reference never equals an artifact
/// reference, whatever their fields contain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DependencyRef {
    /// Another tracked repository
    Git {
        /// The repository depended on
        source: RepositorySource,
    },
    /// A published artifact coordinate
    Artifact {
        /// Artifact namespace (group, scope, organisation)
        namespace: String,
        /// Artifact name
        name: String,
        /// Exact version
        version: String,
    },
}

impl DependencyRef {
    /// Reference a tracked repository
    #[must_use]
    pub fn git(source: RepositorySource) -> Self {
        Self::Git { source }
    }

    /// Reference an artifact coordinate
    pub fn artifact(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::Artifact {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// The repository behind a git reference
    #[must_use]
    pub fn source(&self) -> Option<&RepositorySource> {
        match self {
            Self::Git { source } => Some(source),
            Self::Artifact { .. } => None,
        }
    }

    /// Every distinct reference exactly once, in order of first appearance.
    pub fn unique_refs<I>(refs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        crate::dedup::first_occurrences(refs)
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git { source } => write!(f, "git:{source}"),
            Self::Artifact {
                namespace,
                name,
                version,
            } => write!(f, "artifact:{namespace}:{name}:{version}"),
        }
    }
}

impl FromStr for DependencyRef {
    type Err = Error;

    /// Parse `git:<id>/<path>` or `artifact:<namespace>:<name>:<version>`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, rest) = s.split_once(':').ok_or_else(|| {
            Error::validation(format!("'{s}' is not a dependency (expected git:... or artifact:...)"))
        })?;
        match kind {
            "git" => Ok(Self::git(rest.parse()?)),
            "artifact" => {
                let parts: Vec<&str> = rest.split(':').collect();
                match parts.as_slice() {
                    [namespace, name, version]
                        if !namespace.is_empty() && !name.is_empty() && !version.is_empty() =>
                    {
                        Ok(Self::artifact(*namespace, *name, *version))
                    }
                    _ => Err(Error::validation(format!(
                        "'{s}' is not an artifact coordinate (expected artifact:namespace:name:version)"
                    ))),
                }
            }
            other => Err(Error::validation(format!(
                "unknown dependency kind '{other}'. Valid: git, artifact"
            ))),
        }
    }
}
