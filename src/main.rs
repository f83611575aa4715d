// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Starshelf CLI - browse your GitHub stars through classification lenses

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser, Subcommand};
use starshelf::commands::{self, rule::RuleFields, tag::TagFields, view::ViewArgs, Context};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starshelf")]
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
    #[arg(short, long, env = "STARSHELF_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "STARSHELF_DATA_DIR", global = true)]
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
    /// Fetch starred repositories from GitHub
    Sync {
        /// GitHub username (saved for later syncs)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Browse the collection through a lens
    View(ViewArgs),

    /// Re-run keyword rules over the stored collection
    Reclassify,

    /// Manage tags
    Tag {
        /// Action: list, add, update, delete
        #[arg(default_value = "list")]
        action: String,

        /// Tag id (update, delete) or name (add)
        target: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Hex color, e.g. #61dafb
        #[arg(long)]
        color: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Manage keyword rules
    Rule {
        /// Action: list, add, update, delete
        #[arg(default_value = "list")]
        action: String,

        /// Rule index (update, delete)
        index: Option<String>,

        /// Comma-separated keywords
        #[arg(short, long)]
        keywords: Option<String>,

        /// Target tag id
        #[arg(short, long)]
        tag: Option<String>,

        /// Priority (higher runs first, default 10)
        #[arg(short, long, allow_negative_numbers = true)]
        priority: Option<i32>,
    },

    /// Show collection statistics
    Stats,

    /// List primary languages in the collection
    Languages,

    /// Show the GitHub API rate limit for the configured token
    RateLimit,

    /// Export a snapshot of all stored data
    Export {
        /// Output file or directory (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Import a snapshot file
    Import {
        /// Snapshot file
        file: std::path::PathBuf,
    },

    /// Get or set user settings
    Config {
        /// Key: username, token, auto-classify, data-dir, list, save-settings
        #[arg(default_value = "list")]
        key: String,

        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Delete all stored data
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: u8, quiet: bool, configured: &str) {
    let level = match verbose {
        0 if quiet => "error",
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = starshelf::config::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    init_logging(cli.verbose, cli.quiet, &settings.log_level);

    let ctx = Context {
        settings,
        settings_path: cli.config.or_else(starshelf::config::default_path),
        json: cli.json,
        color: !cli.no_color && std::io::stdout().is_terminal(),
    };

    // Execute command
    match cli.command {
        Commands::Sync { username } => commands::sync::run(&ctx, username).await,
        Commands::View(args) => commands::view::run(&ctx, &args),
        Commands::Reclassify => commands::reclassify::run(&ctx),
        Commands::Tag { action, target, name, color, description } => {
            commands::tag::run(&ctx, &action, target, TagFields { name, color, description })
        }
        Commands::Rule { action, index, keywords, tag, priority } => {
            commands::rule::run(&ctx, &action, index, RuleFields { keywords, tag, priority })
        }
        Commands::Stats => commands::stats::run(&ctx),
        Commands::Languages => commands::stats::languages(&ctx),
        Commands::RateLimit => commands::rate_limit::run(&ctx).await,
        Commands::Export { output } => commands::export::run(&ctx, output),
        Commands::Import { file } => commands::import::run(&ctx, &file),
        Commands::Config { key, value } => commands::config::run(&ctx, &key, value),
        Commands::Clear { yes } => commands::clear::run(&ctx, yes),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
