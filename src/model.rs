// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Version and release topology of one repository
//!
//! A [`Root`] is a snapshot produced by the engine: the trunk ([`MainContainer`])
//! plus every historic major line ([`MajorContainer`]). Nothing here mutates a
//! snapshot; releasing or opening a patch branch is a command sent to the
//! engine, which answers with a fresh `Root`. This module decides whether such
//! a command may be offered and builds its payload.

use crate::error::{Error, Result};
use crate::source::RepositorySource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================================
// Snapshot types
// =========================================================================

/// A repository's whole release topology at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    /// The trunk line
    pub main: MainContainer,
    /// Historic major lines, in producer order (usually descending)
    #[serde(default)]
    pub majors: Vec<MajorContainer>,
}

/// Name and tip commit of a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Branch name
    pub name: String,
    /// Tip commit id
    pub sha: String,
}

/// The trunk line. Its branch always exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainContainer {
    /// Major version currently developed on trunk
    pub major: u32,
    /// Minor lines, newest first
    #[serde(default)]
    pub minors: Vec<MinorContainer>,
    /// Trunk branch and tip
    pub main: BranchRef,
}

/// A historic major line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorContainer {
    /// Major version number
    pub major: u32,
    /// Minor lines, newest first
    #[serde(default)]
    pub minors: Vec<MinorContainer>,
    /// Tip commit of the patch branch, present only once it has been created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// One minor line and its releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinorContainer {
    /// Minor version number
    pub minor: u32,
    /// Releases by patch number, newest first. Producers must keep this order.
    #[serde(default)]
    pub releases: Vec<ReleaseEntry>,
}

/// A cut release. Never deleted or renumbered once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEntry {
    /// Patch version number
    pub patch: u32,
    /// Released commit
    pub sha: String,
    /// Commit metadata, when the producer supplies it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
}

/// Metadata of a released commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    /// Who committed
    pub committer: String,
    /// Commit message
    pub message: String,
    /// Commit time, ISO-8601 on the wire
    pub timestamp: DateTime<Utc>,
}

/// A three-part version number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    /// Major
    pub major: u32,
    /// Minor
    pub minor: u32,
    /// Patch
    pub patch: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Branch name and tip a line can be linked to or released from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    /// Branch name
    pub name: String,
    /// Tip commit id
    pub sha: String,
}

/// Name of the patch branch of a major line
#[must_use]
pub fn patch_branch_name(major: u32) -> String {
    format!("patch-{major}")
}

// =========================================================================
// Lines (trunk or major) as one tagged view
// =========================================================================

/// Borrowed view over either kind of line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopContainer<'a> {
    /// The trunk
    Main(&'a MainContainer),
    /// A historic major
    Major(&'a MajorContainer),
}

impl<'a> TopContainer<'a> {
    /// Major version of this line
    #[must_use]
    pub fn major(self) -> u32 {
        match self {
            Self::Main(m) => m.major,
            Self::Major(m) => m.major,
        }
    }

    /// Minor lines in producer order
    #[must_use]
    pub fn minors(self) -> &'a [MinorContainer] {
        match self {
            Self::Main(m) => &m.minors,
            Self::Major(m) => &m.minors,
        }
    }

    /// Branch and tip of this line, if one exists.
    ///
    /// The trunk always has one; a major only after its patch branch was
    /// created.
    #[must_use]
    pub fn branch_and_sha(self) -> Option<BranchTip> {
        match self {
            Self::Main(m) => Some(BranchTip {
                name: m.main.name.clone(),
                sha: m.main.sha.clone(),
            }),
            Self::Major(m) => m.branch.as_ref().map(|sha| BranchTip {
                name: patch_branch_name(m.major),
                sha: sha.clone(),
            }),
        }
    }

    /// The newest release of the first minor (in supplied order) that has one.
    #[must_use]
    pub fn latest_release(self) -> Option<(u32, &'a ReleaseEntry)> {
        self.minors()
            .iter()
            .find_map(|m| m.releases.first().map(|r| (m.minor, r)))
    }

    /// Latest released version of this line.
    ///
    /// Found-first, not maximum: minors are walked in the order supplied and
    /// the first one with any release wins, so producers must list minors
    /// newest first.
    #[must_use]
    pub fn latest_version(self) -> Option<Version> {
        self.latest_release().map(|(minor, release)| Version {
            major: self.major(),
            minor,
            patch: release.patch,
        })
    }

    /// Whether a release can be cut from this line's own branch tip.
    #[must_use]
    pub fn release_gate(self) -> ReleaseGate {
        let tip = self.branch_and_sha();
        can_release(self, tip.as_ref().map(|t| t.sha.as_str()))
    }
}

/// Whether a release from `branch_sha` is legal on `top`.
///
/// Without a branch sha there is nothing to release from. With one, it must
/// differ from the sha of the most recent release.
#[must_use]
pub fn can_release(top: TopContainer<'_>, branch_sha: Option<&str>) -> ReleaseGate {
    let Some(sha) = branch_sha else {
        return ReleaseGate::NoBranch;
    };
    match top.latest_release() {
        Some((_, last)) if last.sha == sha => ReleaseGate::NothingToRelease,
        _ => ReleaseGate::Allowed,
    }
}

/// Outcome of release gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseGate {
    /// A release may be cut
    Allowed,
    /// No branch (or trunk tip) to release from
    NoBranch,
    /// The tip is already the most recent release
    NothingToRelease,
}

impl ReleaseGate {
    /// True when the release may be offered
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }

    /// Explanation shown when the release is refused
    #[must_use]
    pub fn reason(self) -> Option<&'static str> {
        match self {
            Self::Allowed => None,
            Self::NoBranch => Some("no branch"),
            Self::NothingToRelease => Some("nothing to release"),
        }
    }
}

/// Outcome of patch-branch gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchGate {
    /// The patch branch may be created
    Allowed,
    /// The patch branch already exists
    BranchExists,
}

impl PatchGate {
    /// True when creation may be offered
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }

    /// Explanation shown when creation is refused
    #[must_use]
    pub fn reason(self) -> Option<&'static str> {
        match self {
            Self::Allowed => None,
            Self::BranchExists => Some("patch branch already exists"),
        }
    }
}

impl MajorContainer {
    /// Patch-branch gating: refused once the branch exists.
    #[must_use]
    pub fn patch_gate(&self) -> PatchGate {
        if self.branch.is_some() {
            PatchGate::BranchExists
        } else {
            PatchGate::Allowed
        }
    }

    /// Shorthand for `patch_gate().is_allowed()`
    #[must_use]
    pub fn can_create_patch(&self) -> bool {
        self.patch_gate().is_allowed()
    }
}

// =========================================================================
// Commands
// =========================================================================

/// Payload of a release or create-patch command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCommand {
    /// Target repository
    pub source: RepositorySource,
    /// Target line
    pub major: u32,
    /// Commit the command was validated against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl Root {
    /// The trunk followed by every major line, in producer order
    pub fn lines(&self) -> impl Iterator<Item = TopContainer<'_>> {
        std::iter::once(TopContainer::Main(&self.main))
            .chain(self.majors.iter().map(TopContainer::Major))
    }

    /// The line carrying `major`; the trunk wins if a major repeats it
    #[must_use]
    pub fn line(&self, major: u32) -> Option<TopContainer<'_>> {
        self.lines().find(|line| line.major() == major)
    }

    /// The historic major container for `major`
    #[must_use]
    pub fn major(&self, major: u32) -> Option<&MajorContainer> {
        self.majors.iter().find(|m| m.major == major)
    }

    /// Build a release command for `major`, refusing it when gating fails.
    pub fn release_command(&self, source: &RepositorySource, major: u32) -> Result<VersionCommand> {
        let line = self
            .line(major)
            .ok_or_else(|| Error::validation(format!("{source} has no major {major}")))?;
        let gate = line.release_gate();
        if let Some(reason) = gate.reason() {
            tracing::debug!("Release of {} major {} refused: {}", source, major, reason);
            return Err(Error::conflict(format!(
                "cannot release {source} major {major}: {reason}"
            )));
        }
        Ok(VersionCommand {
            source: source.clone(),
            major,
            sha: line.branch_and_sha().map(|tip| tip.sha),
        })
    }

    /// Build a create-patch command for historic `major`.
    ///
    /// The command carries the sha of the major's latest release, which is
    /// where the patch branch starts.
    pub fn patch_command(&self, source: &RepositorySource, major: u32) -> Result<VersionCommand> {
        if self.main.major == major {
            return Err(Error::validation(format!(
                "major {major} of {source} is the trunk and has no patch branch"
            )));
        }
        let container = self
            .major(major)
            .ok_or_else(|| Error::validation(format!("{source} has no major {major}")))?;
        let gate = container.patch_gate();
        if let Some(reason) = gate.reason() {
            tracing::debug!("Patch branch for {} major {} refused: {}", source, major, reason);
            return Err(Error::conflict(format!(
                "cannot create patch branch for {source} major {major}: {reason}"
            )));
        }
        Ok(VersionCommand {
            source: source.clone(),
            major,
            sha: TopContainer::Major(container)
                .latest_release()
                .map(|(_, r)| r.sha.clone()),
        })
    }
}
