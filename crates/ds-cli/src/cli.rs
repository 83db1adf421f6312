//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Datascribe - builds analytics-agent context from a SQL transformation project
#[derive(Parser, Debug)]
#[command(name = "ds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the context directory from scratch
    Build(BuildArgs),

    /// Incrementally update an existing context directory
    Update(UpdateArgs),

    /// List models matching a selection
    Ls(LsArgs),
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Overwrite an existing context directory
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Only refresh table profiles, skip the project-level documents
    #[arg(long)]
    pub profiles_only: bool,

    /// Model selection (e.g. "+dim_customers", "stg_*", "tag:daily")
    #[arg(short, long)]
    pub select: Option<String>,

    /// Exclusion patterns, same grammar as --select
    #[arg(long)]
    pub exclude: Vec<String>,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Model selection (default: all models)
    #[arg(short, long)]
    pub select: Option<String>,

    /// Exclusion patterns, same grammar as --select
    #[arg(long)]
    pub exclude: Vec<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
