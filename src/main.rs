use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod audit;
mod cli;
mod crossref;
mod executor;
mod manager;
mod model;
mod report;
mod session;
mod store;

use audit::TracingAuditLog;
use cli::{CollectArgs, Command, CrossrefArgs, RootArgs, ValidateArgs};
use crossref::CrossRefError;
use executor::{validate_component, ApprovedChecks};
use manager::{SessionManager, SystemClock};
use model::ComponentEntry;
use session::{SessionConfig, TurnOutcome};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Collect(args) => cmd_collect(args),
        Command::Crossref(args) => cmd_crossref(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

/// Drive one collection session over stdin/stdout, one turn per line.
fn cmd_collect(args: CollectArgs) -> Result<()> {
    let config = SessionConfig {
        max_input_len: args.max_input_len,
        ..SessionConfig::default()
    };
    let manager = SessionManager::new(
        config,
        Arc::new(SystemClock),
        Arc::new(TracingAuditLog),
        Arc::new(ApprovedChecks),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let prompt = manager.start(&args.session);
    writeln!(out, "{}", prompt.message)?;
    out.flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input line")?;
        match manager.submit(&args.session, &line) {
            TurnOutcome::Prompt(prompt) => writeln!(out, "{}", prompt.message)?,
            TurnOutcome::Error(err) => writeln!(
                out,
                "{} (suggested action: {})",
                err.message, err.suggested_action
            )?,
            TurnOutcome::Final(result) => {
                if args.json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
                } else {
                    writeln!(out, "{}", result.summary)?;
                }
                return Ok(());
            }
        }
        out.flush()?;
    }
    Err(anyhow!("input ended before the collection was finalized"))
}

/// Load records and catalog, run the engine, print the report.
fn cmd_crossref(args: CrossrefArgs) -> Result<()> {
    let data_dir = match args.data {
        Some(dir) => dir,
        None => store::default_data_dir()
            .ok_or_else(|| anyhow!("no --data directory given and no default data dir"))?,
    };
    let catalog = store::load_criterion_catalog(&args.criteria)
        .map_err(|err| CrossRefError::CatalogMissing(err.to_string()))?;
    let records = store::load_audit_records(&data_dir)
        .with_context(|| format!("failed to load audit records from {}", data_dir.display()))?;
    let report = crossref::cross_reference(&records, &catalog)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_crossref(&report));
    }
    Ok(())
}

/// One-shot validation of a single component.
fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let entry = ComponentEntry::new(&args.name, &args.version, 200)
        .map_err(|err| anyhow!("invalid component: {err}"))?;
    let verdict = validate_component(&ApprovedChecks, &entry);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print!("{}", report::render_verdict(&verdict));
    }
    if verdict.passed {
        Ok(())
    } else {
        Err(anyhow!("component failed validation"))
    }
}
