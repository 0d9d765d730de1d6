// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Trunkline library - release control surface for many repositories
//!
//! Each tracked repository has a trunk plus historic major lines. This crate
//! holds the version/release topology of a repository, its automation policy,
//! the shared major-number series, and the decision rules every client must
//! apply identically: when a release may be cut, when a patch branch may be
//! opened, which action a review label maps to, and which major number comes
//! next. Git state itself is owned by an [`engine::Engine`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod dedup;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod majors;
pub mod model;
pub mod policy;
pub mod source;

/// Prelude for common imports
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::dependency::DependencyRef;
    pub use crate::engine::Engine;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::majors::{MajorValue, Serie};
    pub use crate::model::{
        MainContainer, MajorContainer, MinorContainer, PatchGate, ReleaseEntry, ReleaseGate,
        Root, TopContainer, Version, VersionCommand,
    };
    pub use crate::policy::{Action, BuildAutomation, LabelAction, RepositoryConfig};
    pub use crate::source::RepositorySource;
}
