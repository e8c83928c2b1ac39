//! arbiter-cli: run the moderation engine over JSON case files.
//!
//! Evaluates tallies, closes vote windows, computes payouts and checks raw
//! input. Results are printed to stdout as JSON; logs go to stderr.

mod case;
mod settings;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};

use arbiter_core::config::EngineConfig;
use arbiter_core::traits::{DecisionEvaluator, WindowCloser};
use arbiter_core::types::{ClosePolicy, ModerationResult, PayoutResult};
use arbiter_core::validation::validate;
use arbiter_engine::ModerationEngine;

use crate::case::Case;

/// Hybrid stake-weighted moderation engine.
#[derive(Parser, Debug)]
#[command(name = "arbiter-cli", version, about = "Hybrid stake-weighted content moderation")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a case, closing the window if its deadline has passed.
    Evaluate(EvaluateArgs),
    /// Apply a close policy to a previously printed result.
    Close(CloseArgs),
    /// Compute payouts and XP for a case.
    Payout(PayoutArgs),
    /// Check a case's raw tally.
    Validate(ValidateArgs),
    /// Print the effective engine configuration.
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Engine config file (default: <config dir>/arbiter/engine.json if present).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Case file.
    case: PathBuf,

    /// Current time in seconds; overrides the case's `now`.
    #[arg(long)]
    now: Option<u64>,

    /// Close policy: escalate, auto_accept, auto_reject or extend:<hours>.
    #[arg(long, value_parser = parse_policy)]
    policy: Option<ClosePolicy>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct CloseArgs {
    /// Result file as printed by `evaluate`.
    result: PathBuf,

    /// Close policy: escalate, auto_accept, auto_reject or extend:<hours>.
    #[arg(long, value_parser = parse_policy)]
    policy: ClosePolicy,

    /// Vote window end, used to report the new deadline of an extension.
    #[arg(long)]
    vote_window_end: Option<u64>,
}

#[derive(Args, Debug)]
struct PayoutArgs {
    /// Case file.
    case: PathBuf,

    /// Current time in seconds; overrides the case's `now`.
    #[arg(long)]
    now: Option<u64>,

    /// Close policy used if the case's deadline has passed undecided.
    #[arg(long, value_parser = parse_policy)]
    policy: Option<ClosePolicy>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Case file.
    case: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    if let Err(e) = run(cli.command) {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Evaluate(args) => evaluate(args),
        Commands::Close(args) => close(args),
        Commands::Payout(args) => payout(args),
        Commands::Validate(args) => validate_case(args),
        Commands::Config(args) => show_config(args),
    }
}

fn engine(config: Option<&Path>) -> Result<ModerationEngine> {
    let config = settings::load(config)?;
    ModerationEngine::from_config(&config).context("Invalid engine configuration")
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let engine = engine(args.config.config.as_deref())?;
    let case = Case::load(&args.case)?;
    let tally = case.snapshot(&engine.config().content)?;
    let now = args.now.unwrap_or(case.now);

    let result = engine.evaluate_and_close(&tally, now, case.vote_window_end, args.policy)?;
    info!(content_type = %case.content_type, status = ?result.status, reason = %result.reason, "evaluated case");
    print_json(&json!({
        "result": result,
        "new_vote_window_end": result.extended_deadline(case.vote_window_end),
    }))
}

fn close(args: CloseArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.result)
        .with_context(|| format!("Failed to read result: {}", args.result.display()))?;
    let result = parse_result(&text)?;

    let closed = ModerationEngine::default().close_window(&result, args.policy);
    let new_end = args.vote_window_end.and_then(|end| closed.extended_deadline(end));
    print_json(&json!({
        "result": closed,
        "new_vote_window_end": new_end,
    }))
}

/// Accepts a bare result or the `{ "result": .. }` wrapper `evaluate` prints.
fn parse_result(text: &str) -> Result<ModerationResult> {
    let value: serde_json::Value = serde_json::from_str(text).context("Result is not JSON")?;
    let inner = match value.get("result") {
        Some(inner) => inner.clone(),
        None => value,
    };
    serde_json::from_value(inner).context("Invalid moderation result")
}

fn payout(args: PayoutArgs) -> Result<()> {
    let engine = engine(args.config.config.as_deref())?;
    let case = Case::load(&args.case)?;
    let (decision, result) = settle_case(&engine, &case, args.now.unwrap_or(case.now), args.policy)?;
    let key = result.settlement_key()?;
    info!(
        content_type = %case.content_type,
        payouts = result.payouts.len(),
        penalties = result.penalties.len(),
        settlement_key = %key,
        "computed payouts"
    );
    print_json(&json!({
        "decision": decision,
        "payout": result,
        "settlement_key": hex::encode(key.as_bytes()),
    }))
}

/// Evaluate at `now`, close the window if it has passed, and settle the
/// resulting decision.
fn settle_case(
    engine: &ModerationEngine,
    case: &Case,
    now: u64,
    policy: Option<ClosePolicy>,
) -> Result<(ModerationResult, PayoutResult)> {
    let tally = case.snapshot(&engine.config().content)?;
    let (active, passive) = case.split_participants();
    let decision = engine.evaluate_and_close(&tally, now, case.vote_window_end, policy)?;
    let result = engine.settle_decision(case.content_type, &decision, &tally, &active, &passive)?;
    Ok((decision, result))
}

fn validate_case(args: ValidateArgs) -> Result<()> {
    let engine = engine(args.config.config.as_deref())?;
    let case = Case::load(&args.case)?;
    let outcome = validate(&case.raw_tally(&engine.config().content)?);
    print_json(&outcome)?;
    if !outcome.valid {
        bail!("tally rejected");
    }
    Ok(())
}

fn show_config(args: ConfigArgs) -> Result<()> {
    let engine = engine(args.config.as_deref())?;
    print_json(&effective_config(&engine))
}

/// The resolved configuration with every content-table row spelled out.
fn effective_config(engine: &ModerationEngine) -> EngineConfig {
    let resolved = engine.config();
    EngineConfig {
        min_voters: resolved.min_voters,
        threshold_ratio: resolved.threshold_ratio,
        default_close_policy: resolved.default_close_policy,
        content_overrides: resolved.content.iter().map(|(t, entry)| (t, *entry)).collect(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse `escalate`, `auto_accept`, `auto_reject` or `extend:<hours>`.
fn parse_policy(s: &str) -> Result<ClosePolicy, String> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "escalate" => Ok(ClosePolicy::Escalate),
        "auto_accept" => Ok(ClosePolicy::AutoAccept),
        "auto_reject" => Ok(ClosePolicy::AutoReject),
        other => match other.strip_prefix("extend:") {
            Some(hours) => hours
                .parse()
                .map(ClosePolicy::ExtendByHours)
                .map_err(|_| format!("invalid extension hours: {hours}")),
            None => Err(format!(
                "unknown policy '{s}' (expected escalate, auto_accept, auto_reject or extend:<hours>)"
            )),
        },
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}
