// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository identity
//!
//! A [`RepositorySource`] names a tracked repository by the hosting system it
//! lives on (`id`, e.g. a code-review server) and its path inside that system.
//! It has two string forms:
//!
//! - the compact form `id/path`, used in storage and in API bodies
//! - the URL-segment form, where every `/` becomes `.` (`gerrit.platform.core`)
//!
//! The URL-segment form is only reversible while `id` contains no `.`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identity of a tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SourceFields")]
pub struct RepositorySource {
    id: String,
    path: String,
}

/// Unvalidated wire shape of a source
#[derive(Deserialize)]
struct SourceFields {
    id: String,
    path: String,
}

impl TryFrom<SourceFields> for RepositorySource {
    type Error = Error;

    fn try_from(fields: SourceFields) -> Result<Self> {
        Self::new(fields.id, fields.path)
    }
}

impl RepositorySource {
    /// Create a source, rejecting an empty `id` or `path`.
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let path = path.into();
        if id.is_empty() {
            return Err(Error::validation("repository source id must not be empty"));
        }
        if path.is_empty() {
            return Err(Error::validation(format!(
                "repository source path must not be empty (id: {id})"
            )));
        }
        Ok(Self { id, path })
    }

    /// Hosting system id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Repository path within the hosting system
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encode for use as a single URL path segment.
    #[must_use]
    pub fn to_url_segment(&self) -> String {
        format!("{}.{}", self.id, self.path.replace('/', "."))
    }

    /// Decode a URL path segment produced by [`Self::to_url_segment`].
    ///
    /// The first `.`-delimited token is the id; the remaining tokens are
    /// re-joined with `/` as the path. Returns `None` unless at least one
    /// token follows the id.
    #[must_use]
    pub fn from_url_segment(segment: &str) -> Option<Self> {
        let mut tokens = segment.split('.');
        let id = tokens.next()?;
        let rest: Vec<&str> = tokens.collect();
        if rest.is_empty() {
            return None;
        }
        Self::new(id, rest.join("/")).ok()
    }

    /// Every distinct source exactly once, in order of first appearance.
    pub fn unique<I>(sources: I) -> Vec<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        crate::dedup::first_occurrences(sources)
    }
}

impl fmt::Display for RepositorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.path)
    }
}

impl FromStr for RepositorySource {
    type Err = Error;

    /// Parse the compact `id/path` form. Everything after the first `/`
    /// (further slashes included) is the path.
    fn from_str(s: &str) -> Result<Self> {
        let (id, path) = s.split_once('/').ok_or_else(|| {
            Error::validation(format!("'{s}' is not a repository source (expected id/path)"))
        })?;
        Self::new(id, path)
    }
}
