//! # Formwright CLI
//!
//! Command-line interface for composing declarations without writing Rust.
//!
//! ## Commands
//!
//! - `compose` - Compose declarations and print the snapshot as JSON
//! - `check` - Compose declarations and report warnings
//! - `resolve` - Resolve one option of one layout node
//!

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use formwright_compose::{Composer, Snapshot, load_declarations};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Re-export dependencies for use in main.rs
pub use formwright_compose;
pub use formwright_core;
pub use formwright_ir;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code when a requested option has no value
pub const EXIT_NOT_FOUND: u8 = 2;

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "formwright")]
#[command(version)]
#[command(about = "Compose schemas, overrides, layouts and actions into UI metadata")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compose declarations and print the snapshot as JSON
    Compose {
        /// Declaration file or directory
        path: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Fail on any warning
        #[arg(long)]
        strict: bool,
    },

    /// Compose declarations and report warnings
    Check {
        /// Declaration file or directory
        path: PathBuf,

        /// Fail on any warning
        #[arg(long)]
        strict: bool,
    },

    /// Resolve one option of one layout node
    Resolve {
        /// Declaration file or directory
        path: PathBuf,

        /// Layout name
        #[arg(long)]
        layout: String,

        /// Node name inside the layout
        #[arg(long)]
        node: String,

        /// Option key
        #[arg(long)]
        key: String,
    },
}

// ============================================================================
// Entry points
// ============================================================================

/// Install the stderr log subscriber
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run a parsed command
pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Compose { path, pretty, strict } => cmd_compose(&path, pretty, strict),
        Commands::Check { path, strict } => cmd_check(&path, strict),
        Commands::Resolve {
            path,
            layout,
            node,
            key,
        } => cmd_resolve(&path, &layout, &node, &key),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_compose(path: &Path, pretty: bool, strict: bool) -> Result<ExitCode> {
    let snapshot = compose_path(path, strict)?;
    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{}", json);
    print_warnings(&snapshot);
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(path: &Path, strict: bool) -> Result<ExitCode> {
    let snapshot = compose_path(path, strict)?;

    println!("{} {}", "Checked".bold(), path.display());
    println!(
        "  {} resources, {} layouts",
        snapshot.resources.len(),
        snapshot.layouts.len()
    );
    for (name, resource) in &snapshot.resources {
        println!("  {} {} ({} fields)", "-".dimmed(), name, resource.field_count());
    }

    if snapshot.has_warnings() {
        print_warnings(&snapshot);
        println!("{}", format!("⚠ {} warning(s)", snapshot.warnings.len()).yellow());
    } else {
        println!("{}", "✓ No problems found".green());
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_resolve(path: &Path, layout: &str, node: &str, key: &str) -> Result<ExitCode> {
    let snapshot = compose_path(path, false)?;
    match snapshot.resolve_option(layout, node, key)? {
        Some(value) => {
            println!("{}", serde_json::to_string(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!(
                "{} no value for '{}' on '{}' in layout '{}'",
                "not found:".yellow().bold(),
                key,
                node,
                layout
            );
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn compose_path(path: &Path, strict: bool) -> Result<Snapshot> {
    let set = load_declarations(path)
        .with_context(|| format!("failed to load declarations from {}", path.display()))?;

    let mut config = set.config.clone().unwrap_or_default();
    config.strict |= strict;
    tracing::debug!(path = %path.display(), strict = config.strict, "Composing");

    Composer::new(config)
        .compose(set)
        .context("composition failed")
}

fn print_warnings(snapshot: &Snapshot) {
    for warning in &snapshot.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

// ============================================================================
// Tests
// ============================================================================
