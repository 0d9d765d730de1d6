// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Policy commands - build automation actions and major series binding

use super::{parse_source, Context};
use crate::api::ConfigResponse;
use crate::policy::{Action, RepositoryConfig};
use anyhow::{anyhow, bail, Context as _, Result};
use clap::ValueEnum;

/// Run policy command
pub fn run(ctx: &Context, action: &str, source: &str, args: &[String], auto_apply: bool) -> Result<()> {
    let source = parse_source(source)?;
    let client = ctx.client()?;

    let config = match action {
        "show" | "get" => {
            let lookup = client
                .config_or_default(&source)
                .with_context(|| format!("Failed to fetch configuration of {source}"))?;
            if let Some(warning) = &lookup.warning {
                eprintln!("Warning: {warning}");
            }
            lookup.config
        }

        "default" => {
            let action = parse_action(arg(args, 0, "action")?)?;
            client.set_default_action(&source, action)?
        }

        "label" | "set" => {
            let label = arg(args, 0, "label")?;
            let action = parse_action(arg(args, 1, "action")?)?;
            client.set_label(&source, label, action)?
        }

        "unlabel" | "rm" => {
            let label = arg(args, 0, "label")?;
            client.remove_label(&source, label)?
        }

        "bind" => {
            let serie = arg(args, 0, "series id")?;
            client.bind_serie(&source, serie, auto_apply)?
        }

        "unbind" => client.unbind_serie(&source)?,

        "resolve" => {
            let label = arg(args, 0, "label")?;
            let lookup = client.config_or_default(&source)?;
            let resolved = lookup.config.build_automation.resolve(label);
            if ctx.out.json {
                return ctx
                    .out
                    .print_json(&serde_json::json!({ "label": label, "action": resolved }));
            }
            println!("{label} -> {resolved}");
            return Ok(());
        }

        other => {
            bail!(
                "Unknown action: {}. Valid: show, default, label, unlabel, bind, unbind, resolve",
                other
            );
        }
    };

    if ctx.out.json {
        return ctx.out.print_json(&ConfigResponse {
            config: Some(config),
        });
    }
    print_config(ctx, &source.to_string(), &config);
    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("<{}> is required", name))
}

fn parse_action(value: &str) -> Result<Action> {
    Action::from_str(value, true)
        .map_err(|_| anyhow!("Unknown build action: {}. Valid: merge, release, nothing", value))
}

fn print_config(ctx: &Context, source: &str, config: &RepositoryConfig) {
    let automation = &config.build_automation;
    println!("Policy for {source}:");
    println!("  default: {}", automation.default);
    if automation.labels.is_empty() {
        println!("  labels:  {}", ctx.out.dim("(none)"));
    } else {
        println!("  labels:");
        for label in &automation.labels {
            println!("    {} -> {}", label.id, label.action);
        }
    }
    match &config.major_serie {
        Some(binding) => {
            let mode = if binding.auto_apply { "auto-apply" } else { "manual" };
            println!("  series:  {} ({})", binding.id, mode);
        }
        None => println!("  series:  {}", ctx.out.dim("(unbound)")),
    }
}
