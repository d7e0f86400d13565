//! CLI argument parsing for the governance auditor.
//!
//! The CLI is intentionally thin: each subcommand maps onto one core
//! operation, so the same logic can be driven from other frontends.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the compliance auditor.
#[derive(Parser, Debug)]
#[command(
    name = "archgov",
    version,
    about = "Architecture governance compliance auditor",
    after_help = "Commands:\n  collect                                   Guided component collection on stdin\n  crossref --data <dir> --criteria <file>  Cross-reference audit records against the catalog\n  validate --name <n> --version <v>        Validate a single component\n\nExamples:\n  archgov collect\n  archgov collect --session release-42 --json\n  archgov crossref --data ./audits --criteria ./criteria.json\n  archgov crossref --data ./audits --criteria ./criteria.json --json\n  archgov validate --name componente-auth --version 2.1.0",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level auditor commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Collect(CollectArgs),
    Crossref(CrossrefArgs),
    Validate(ValidateArgs),
}

/// Collect command inputs for the stdin-driven dialogue.
#[derive(Parser, Debug)]
#[command(about = "Collect delivered components turn by turn and validate them")]
pub struct CollectArgs {
    /// Session key for this collection
    #[arg(long, value_name = "KEY", default_value = "default")]
    pub session: String,

    /// Maximum accepted input length in bytes
    #[arg(long, value_name = "N", default_value_t = 200)]
    pub max_input_len: usize,

    /// Emit the final result as machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Crossref command inputs naming the record store and catalog.
#[derive(Parser, Debug)]
#[command(about = "Rank governance criteria by non-compliance across audit records")]
pub struct CrossrefArgs {
    /// Directory containing audit record JSON files
    #[arg(long, value_name = "DIR")]
    pub data: Option<PathBuf>,

    /// Criterion catalog JSON file
    #[arg(long, value_name = "FILE")]
    pub criteria: PathBuf,

    /// Emit the full report as machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate command inputs for a one-shot component check.
#[derive(Parser, Debug)]
#[command(about = "Run the governance checks against one component")]
pub struct ValidateArgs {
    /// Component name (letters, digits, `-` and `_`)
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Component version (e.g. 1.2.3 or 2.0.0-rc1)
    #[arg(long, value_name = "VERSION")]
    pub version: String,

    /// Emit the verdict as machine-readable JSON
    #[arg(long)]
    pub json: bool,
}
