// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Model command - shows a repository's lines and what may be done to them

use super::{parse_source, Context, Output};
use crate::model::{PatchGate, ReleaseGate, Root, TopContainer};
use crate::source::RepositorySource;
use anyhow::{Context as _, Result};
use serde::Serialize;

/// Status of one line, as offered to an operator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStatus {
    /// Major number
    pub major: u32,
    /// True for the trunk
    pub trunk: bool,
    /// Branch name, if a branch exists
    pub branch: Option<String>,
    /// Branch tip, if a branch exists
    pub sha: Option<String>,
    /// Latest released version
    pub latest_version: Option<String>,
    /// Release gating
    pub release: ReleaseGate,
    /// Patch-branch gating (historic majors only)
    pub patch: Option<PatchGate>,
}

impl LineStatus {
    /// Evaluate every gate of `line`
    #[must_use]
    pub fn of(line: TopContainer<'_>) -> Self {
        let tip = line.branch_and_sha();
        Self {
            major: line.major(),
            trunk: matches!(line, TopContainer::Main(_)),
            branch: tip.as_ref().map(|t| t.name.clone()),
            sha: tip.map(|t| t.sha),
            latest_version: line.latest_version().map(|v| v.to_string()),
            release: line.release_gate(),
            patch: match line {
                TopContainer::Main(_) => None,
                TopContainer::Major(m) => Some(m.patch_gate()),
            },
        }
    }
}

#[derive(Serialize)]
struct ModelView<'a> {
    source: &'a RepositorySource,
    model: &'a Root,
    lines: Vec<LineStatus>,
}

/// Show the topology of a repository
pub fn run(ctx: &Context, source: &str) -> Result<()> {
    let source = parse_source(source)?;
    let model = ctx
        .client()?
        .model(&source)
        .with_context(|| format!("Failed to fetch model of {source}"))?;

    let lines: Vec<LineStatus> = model.lines().map(LineStatus::of).collect();
    if ctx.out.json {
        return ctx.out.print_json(&ModelView {
            source: &source,
            model: &model,
            lines,
        });
    }

    println!("{source}");
    for line in &lines {
        print_line(ctx.out, line);
    }
    Ok(())
}

/// Print one line's status in human form
pub fn print_line(out: Output, line: &LineStatus) {
    let label = if line.trunk {
        format!("trunk (major {})", line.major)
    } else {
        format!("major {}", line.major)
    };
    let location = match (&line.branch, &line.sha) {
        (Some(branch), Some(sha)) => format!("{branch} @ {sha}"),
        _ => out.dim("no branch"),
    };
    let latest = line
        .latest_version
        .clone()
        .unwrap_or_else(|| out.dim("unreleased"));

    println!("  {label}");
    println!("    branch:  {location}");
    println!("    latest:  {latest}");
    println!("    release: {}", gate_text(out, line.release.reason()));
    if let Some(patch) = line.patch {
        println!("    patch:   {}", gate_text(out, patch.reason()));
    }
}

fn gate_text(out: Output, refusal: Option<&str>) -> String {
    match refusal {
        None => out.good("available"),
        Some(reason) => out.bad(&format!("unavailable ({reason})")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BranchRef, MainContainer, MajorContainer, MinorContainer, ReleaseEntry};

    #[test]
    fn test_line_status_of_major_without_branch() {
        let major = MajorContainer {
            major: 4,
            minors: vec![MinorContainer {
                minor: 1,
                releases: vec![ReleaseEntry { patch: 2, sha: "r".into(), commit: None }],
            }],
            branch: None,
        };
        let status = LineStatus::of(TopContainer::Major(&major));
        assert!(!status.trunk);
        assert_eq!(status.branch, None);
        assert_eq!(status.latest_version.as_deref(), Some("4.1.2"));
        assert_eq!(status.release, ReleaseGate::NoBranch);
        assert_eq!(status.patch, Some(PatchGate::Allowed));
    }

    #[test]
    fn test_line_status_of_trunk() {
        let main = MainContainer {
            major: 5,
            minors: vec![],
            main: BranchRef { name: "main".into(), sha: "t".into() },
        };
        let status = LineStatus::of(TopContainer::Main(&main));
        assert!(status.trunk);
        assert_eq!(status.branch.as_deref(), Some("main"));
        assert_eq!(status.release, ReleaseGate::Allowed);
        assert_eq!(status.patch, None);
    }
}
