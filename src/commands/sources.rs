// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tracked repository commands

use super::{parse_source, Context};
use crate::api::SourcesResponse;
use anyhow::{Context as _, Result};

/// List tracked repositories
pub fn run_list(ctx: &Context) -> Result<()> {
    let sources = ctx
        .client()?
        .sources()
        .context("Failed to list tracked repositories")?;

    if ctx.out.json {
        return ctx.out.print_json(&SourcesResponse { sources });
    }

    if sources.is_empty() {
        println!("No repositories tracked. Use 'trunkline track <id/path>' to add one.");
        return Ok(());
    }

    println!("Repositories ({}):", sources.len());
    for source in &sources {
        println!("  {}  {}", source, ctx.out.dim(&source.to_url_segment()));
    }
    Ok(())
}

/// Start tracking a repository
pub fn run_track(ctx: &Context, source: &str, trunk: &str, sha: &str, major: u32) -> Result<()> {
    let source = parse_source(source)?;
    let engine = ctx.local("track")?;
    let model = engine
        .track(&source, trunk, sha, major)
        .with_context(|| format!("Failed to track {source}"))?;

    if ctx.out.json {
        return ctx.out.print_json(&model);
    }
    println!("Tracking {source}");
    println!("  trunk: {} at {}", model.main.main.name, model.main.main.sha);
    println!("  major: {}", model.main.major);
    Ok(())
}
