// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Major series commands

use super::Context;
use crate::api::SeriesResponse;
use crate::majors::MajorValue;
use anyhow::{anyhow, bail, Context as _, Result};

/// Run majors command
pub fn run(ctx: &Context, action: &str, serie: Option<String>, value: Option<u32>) -> Result<()> {
    match action {
        "list" | "ls" => {
            let series = ctx.client()?.series().context("Failed to list major series")?;
            if ctx.out.json {
                return ctx.out.print_json(&SeriesResponse { series });
            }
            if series.is_empty() {
                println!("No major series defined. Use 'trunkline majors create <id>' to create one.");
                return Ok(());
            }
            println!("Series ({}):", series.len());
            for s in &series {
                let values: Vec<String> = s.values.iter().map(u32::to_string).collect();
                let next = s
                    .next_value()
                    .map_or_else(|| "exhausted".to_string(), |v| v.to_string());
                println!("  {}  [{}]  next: {}", s.id, values.join(", "), next);
            }
        }

        "next" => {
            let serie = serie.ok_or_else(|| anyhow!("Series id is required"))?;
            let proposal = ctx.client()?.propose_major(&serie)?;
            if ctx.out.json {
                return ctx.out.print_json(&proposal);
            }
            println!("Next value of {}: {}", proposal.id, proposal.value);
        }

        "allocate" => {
            let serie = serie.ok_or_else(|| anyhow!("Series id is required"))?;
            let client = ctx.client()?;
            // Without --value the proposed next value is allocated.
            let value = match value {
                Some(value) => MajorValue { id: serie, value },
                None => client.propose_major(&serie)?,
            };
            let response = client
                .allocate(value)
                .context("Allocation failed")?;
            if ctx.out.json {
                return ctx.out.print_json(&response);
            }
            println!("{}", ctx.out.good(&response.message));
        }

        "create" | "new" => {
            let serie = serie.ok_or_else(|| anyhow!("Series id is required"))?;
            let created = ctx
                .local("majors create")?
                .create_serie(&serie)
                .with_context(|| format!("Failed to create series {serie}"))?;
            if ctx.out.json {
                return ctx.out.print_json(&created);
            }
            println!("Created series: {}", created.id);
        }

        other => {
            bail!("Unknown action: {}. Valid: list, next, allocate, create", other);
        }
    }

    Ok(())
}
