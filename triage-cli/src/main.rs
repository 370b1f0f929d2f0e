use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use triage_core::{ScoreBand, ScoredTask, time::today_in};

mod api;
mod config;
mod state;

use api::RequestError;
use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "triage",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TRIAGE_BUILD_SHA"), ")"),
    about = "Rank tasks by urgency, importance, effort and dependencies"
)]
struct Cli {
    /// Config file (default: ~/.triage/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override "today" (YYYY-MM-DD) instead of the configured timezone's date
    #[arg(long, global = true, value_parser = parse_today)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file if none exists
    Init,

    /// Score every task and print the full ranking
    Analyze {
        /// JSON request or task array (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// One line per task instead of JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the top tasks with the reason for each
    Suggest {
        /// JSON request or task array (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// How many suggestions (default: config `suggest_limit`)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Group tasks into Eisenhower quadrants
    Matrix {
        /// JSON request or task array (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Init => {
            config::init_config(config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze { input, pretty } => {
            let (cfg, today) = settings(config_path, cli.today)?;
            let payload = read_input(input.as_deref())?;
            let result = api::analyze(&payload, &cfg.weights, today);
            match result {
                Ok(resp) if pretty => {
                    print_pretty(&resp.tasks);
                    Ok(ExitCode::SUCCESS)
                }
                other => respond(other),
            }
        }
        Command::Suggest { input, limit } => {
            let (cfg, today) = settings(config_path, cli.today)?;
            let payload = read_input(input.as_deref())?;
            let limit = limit.unwrap_or(cfg.suggest_limit);
            respond(api::suggest(&payload, &cfg.weights, today, limit))
        }
        Command::Matrix { input } => {
            let (cfg, today) = settings(config_path, cli.today)?;
            let payload = read_input(input.as_deref())?;
            respond(api::matrix(&payload, &cfg.weights, today))
        }
    }
}

/// Load config and work out which date counts as today.
fn settings(config_path: Option<&Path>, today: Option<NaiveDate>) -> Result<(Config, NaiveDate)> {
    let cfg = config::load_config(config_path)?;
    let today = match today {
        Some(d) => d,
        None => today_in(&cfg.timezone)?,
    };
    debug!(%today, timezone = %cfg.timezone, "resolved today");
    Ok((cfg, today))
}

/// Print a response as JSON, or the error body with a non-zero exit status.
fn respond<T: Serialize>(result: Result<T, RequestError>) -> Result<ExitCode> {
    match result {
        Ok(resp) => {
            let out = serde_json::to_string_pretty(&resp).context("serialize response")?;
            println!("{out}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            warn!(error = %e, "request failed");
            println!("{}", e.body());
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read {}", p.display())),
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("read stdin")?;
            Ok(s)
        }
    }
}

fn print_pretty(tasks: &[ScoredTask]) {
    for t in tasks {
        println!(
            "[{:<6}] {:>6.2} | {} | {} | {}",
            ScoreBand::of(t.score).label(),
            t.score,
            t.id(),
            t.task.title.as_deref().unwrap_or("-"),
            t.explanation
        );
    }
}
