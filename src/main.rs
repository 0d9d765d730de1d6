// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Trunkline CLI - release control surface for trunk and major lines

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use trunkline::commands::{self, Context, Output};

#[derive(Parser)]
#[command(name = "trunkline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "TRUNKLINE_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "TRUNKLINE_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked repositories
    Sources,

    /// Start tracking a repository (local engine)
    Track {
        /// Repository (id/path)
        source: String,

        /// Trunk branch name
        #[arg(long, default_value = "main")]
        trunk: String,

        /// Trunk tip commit
        #[arg(long)]
        sha: String,

        /// Major version developed on trunk
        #[arg(long, default_value_t = 1)]
        major: u32,
    },

    /// Show a repository's lines, latest versions and available commands
    Model {
        /// Repository (id/path or id.path)
        source: String,
    },

    /// Cut a release on the trunk or a patch branch
    Release {
        /// Repository (id/path or id.path)
        source: String,

        /// Major line to release
        #[arg(long)]
        major: u32,
    },

    /// Create the patch branch of a historic major
    Patch {
        /// Repository (id/path or id.path)
        source: String,

        /// Historic major to branch
        #[arg(long)]
        major: u32,
    },

    /// Move the trunk or a patch branch to a new tip (local engine)
    Push {
        /// Repository (id/path or id.path)
        source: String,

        /// New tip commit
        #[arg(long)]
        sha: String,

        /// Line to advance (defaults to the trunk)
        #[arg(long)]
        major: Option<u32>,
    },

    /// Move the trunk to a new major; the old one becomes historic (local engine)
    Bump {
        /// Repository (id/path or id.path)
        source: String,

        /// New trunk major
        #[arg(long)]
        major: u32,
    },

    /// Manage build automation policy
    Policy {
        /// Action: show, default, label, unlabel, bind, unbind, resolve
        action: String,

        /// Repository (id/path or id.path)
        source: String,

        /// Action arguments (label, build action, series id)
        args: Vec<String>,

        /// Apply series values automatically (with bind)
        #[arg(long)]
        auto_apply: bool,
    },

    /// Manage major series
    Majors {
        /// Action: list, next, allocate, create
        #[arg(default_value = "list")]
        action: String,

        /// Series id
        serie: Option<String>,

        /// Value to allocate (defaults to the next value)
        #[arg(long)]
        value: Option<u32>,
    },

    /// List or record dependencies of a repository (local engine)
    Deps {
        /// Repository (id/path or id.path)
        source: String,

        /// Action: list, add
        action: Option<String>,

        /// Dependency: git:<id/path> or artifact:<namespace>:<name>:<version>
        reference: Option<String>,
    },

    /// Convert between id/path and URL-segment identities
    Url {
        /// Action: encode, decode
        action: String,

        /// Identity to convert
        value: String,
    },

    /// Show the effective configuration
    Settings,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = trunkline::config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => config.log_level.parse().unwrap_or(tracing::Level::INFO),
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        config,
        out: Output {
            json: cli.json,
            color: !cli.no_color && !cli.json,
        },
    };

    // Execute command
    match cli.command {
        Commands::Sources => commands::sources::run_list(&ctx),
        Commands::Track { source, trunk, sha, major } => {
            commands::sources::run_track(&ctx, &source, &trunk, &sha, major)
        }
        Commands::Model { source } => commands::model::run(&ctx, &source),
        Commands::Release { source, major } => commands::release::run_release(&ctx, &source, major),
        Commands::Patch { source, major } => commands::release::run_patch(&ctx, &source, major),
        Commands::Push { source, sha, major } => {
            commands::release::run_push(&ctx, &source, &sha, major)
        }
        Commands::Bump { source, major } => commands::release::run_bump(&ctx, &source, major),
        Commands::Policy { action, source, args, auto_apply } => {
            commands::policy::run(&ctx, &action, &source, &args, auto_apply)
        }
        Commands::Majors { action, serie, value } => {
            commands::majors::run(&ctx, &action, serie, value)
        }
        Commands::Deps { source, action, reference } => {
            commands::deps::run(&ctx, &source, action, reference)
        }
        Commands::Url { action, value } => commands::url::run(&ctx, &action, &value),
        Commands::Settings => commands::settings::run(&ctx),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
