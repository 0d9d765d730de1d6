// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use super::Context;
use anyhow::Result;

/// Print the effective configuration
pub fn run(ctx: &Context) -> Result<()> {
    if ctx.out.json {
        return ctx.out.print_json(&ctx.config);
    }
    print!("{}", crate::config::to_toml(&ctx.config)?);
    Ok(())
}
