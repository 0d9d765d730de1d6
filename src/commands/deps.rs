// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dependency commands

use super::{parse_source, Context};
use crate::dependency::DependencyRef;
use anyhow::{anyhow, bail, Context as _, Result};

/// Run deps command: list, or `add <ref>`
pub fn run(ctx: &Context, source: &str, action: Option<String>, reference: Option<String>) -> Result<()> {
    let source = parse_source(source)?;
    let engine = ctx.local("deps")?;

    let deps = match action.as_deref().unwrap_or("list") {
        "list" | "ls" => engine.dependencies(&source)?,
        "add" => {
            let reference = reference.ok_or_else(|| anyhow!("A dependency is required (git:<id/path> or artifact:<ns>:<name>:<version>)"))?;
            let dependency: DependencyRef = reference
                .parse()
                .with_context(|| format!("Invalid dependency: {reference}"))?;
            engine.add_dependency(&source, dependency)?
        }
        other => bail!("Unknown action: {}. Valid: list, add", other),
    };

    if ctx.out.json {
        return ctx.out.print_json(&deps);
    }
    if deps.is_empty() {
        println!("{source} has no recorded dependencies.");
        return Ok(());
    }
    println!("Dependencies of {source} ({}):", deps.len());
    for dep in &deps {
        println!("  {dep}");
    }
    Ok(())
}
