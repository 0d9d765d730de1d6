// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error taxonomy shared by the domain model, the client and the engines

use thiserror::Error;

/// Errors reported by trunkline operations.
///
/// None of these are retried or swallowed inside the crate. The only local
/// recovery is [`crate::client::Client::config_or_default`], which turns a
/// missing stored policy into the default policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed identity string or structurally invalid command input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested object does not exist (yet).
    #[error("not found: {0}")]
    NotFound(String),

    /// A mutating command is not valid against the current engine state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network or timeout failure at the engine boundary.
    #[error("transport error: {0}")]
    Transport(String),

    /// The local engine could not read or write its store.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Discriminant of [`Error`], for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::NotFound`]
    NotFound,
    /// See [`Error::Conflict`]
    Conflict,
    /// See [`Error::Transport`]
    Transport,
    /// See [`Error::Storage`]
    Storage,
}

impl Error {
    /// The kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Shorthand for a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Shorthand for a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(Error::Transport("x".into()).kind(), ErrorKind::Transport);
        assert_eq!(Error::Storage("x".into()).kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_display_includes_message() {
        let err = Error::conflict("patch branch already exists for major 2");
        let msg = err.to_string();
        assert!(msg.starts_with("conflict"));
        assert!(msg.contains("major 2"));
    }
}
