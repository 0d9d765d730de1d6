// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! URL-segment encoding of repository identities

use super::Context;
use crate::source::RepositorySource;
use anyhow::{anyhow, bail, Context as _, Result};

/// Run url command: `encode <id/path>` or `decode <segment>`
pub fn run(ctx: &Context, action: &str, value: &str) -> Result<()> {
    match action {
        "encode" => {
            let source: RepositorySource = value
                .parse()
                .with_context(|| format!("Invalid repository: {value}"))?;
            let segment = source.to_url_segment();
            if ctx.out.json {
                return ctx.out.print_json(&serde_json::json!({ "segment": segment }));
            }
            println!("{segment}");
        }
        "decode" => {
            let source = RepositorySource::from_url_segment(value)
                .ok_or_else(|| anyhow!("'{}' does not decode to a repository", value))?;
            if ctx.out.json {
                return ctx.out.print_json(&source);
            }
            println!("{source}");
        }
        other => bail!("Unknown action: {}. Valid: encode, decode", other),
    }
    Ok(())
}
