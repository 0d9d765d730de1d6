// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Release and branch commands

use super::model::{print_line, LineStatus};
use super::{parse_source, Context};
use crate::api::{CommandResponse, SourceRequest};
use crate::engine::Engine;
use crate::model::Root;
use anyhow::{Context as _, Result};

/// Cut a release on a line
pub fn run_release(ctx: &Context, source: &str, major: u32) -> Result<()> {
    let source = parse_source(source)?;
    let client = ctx.client()?;
    let model = client
        .model(&source)
        .with_context(|| format!("Failed to fetch model of {source}"))?;
    let response = client
        .release(&source, &model, major)
        .with_context(|| format!("Release of {source} major {major} failed"))?;
    report(ctx, &response, major)
}

/// Open the patch branch of a historic major
pub fn run_patch(ctx: &Context, source: &str, major: u32) -> Result<()> {
    let source = parse_source(source)?;
    let client = ctx.client()?;
    let model = client
        .model(&source)
        .with_context(|| format!("Failed to fetch model of {source}"))?;
    let response = client
        .create_patch(&source, &model, major)
        .with_context(|| format!("Creating patch branch for {source} major {major} failed"))?;
    report(ctx, &response, major)
}

/// Move the trunk or a patch branch to a new tip
pub fn run_push(ctx: &Context, source: &str, sha: &str, major: Option<u32>) -> Result<()> {
    let source = parse_source(source)?;
    let engine = ctx.local("push")?;
    let major = match major {
        Some(major) => major,
        None => {
            engine
                .fetch_model(&SourceRequest {
                    source: source.clone(),
                })?
                .model
                .main
                .major
        }
    };
    let model = engine
        .advance(&source, major, sha)
        .with_context(|| format!("Failed to advance {source} major {major}"))?;
    show(ctx, &model, major)
}

/// Move the trunk to a new major
pub fn run_bump(ctx: &Context, source: &str, major: u32) -> Result<()> {
    let source = parse_source(source)?;
    let engine = ctx.local("bump")?;
    let model = engine
        .bump_major(&source, major)
        .with_context(|| format!("Failed to move {source} to major {major}"))?;
    show(ctx, &model, major)
}

fn report(ctx: &Context, response: &CommandResponse, major: u32) -> Result<()> {
    if ctx.out.json {
        return ctx.out.print_json(response);
    }
    println!("{}", ctx.out.good(&response.message));
    if let Some(line) = response.model.line(major) {
        print_line(ctx.out, &LineStatus::of(line));
    }
    Ok(())
}

fn show(ctx: &Context, model: &Root, major: u32) -> Result<()> {
    if ctx.out.json {
        return ctx.out.print_json(model);
    }
    if let Some(line) = model.line(major) {
        print_line(ctx.out, &LineStatus::of(line));
    }
    Ok(())
}
