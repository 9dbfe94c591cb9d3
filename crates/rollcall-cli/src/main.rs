//! rollcall - sign in to every configured forum once per day.

mod simulated;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rollcall_core::config::GateKind;
use rollcall_core::impls::{
    HttpDateClock, ImmediateGate, JsonFileDiscovery, JsonFileReporter, MidnightGate,
    StaticDiscovery,
};
use rollcall_core::ports::{Discovery, StartGate, SystemClock};
use rollcall_core::{Item, RunReport, Runner, RunnerBuilder, Settings};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::simulated::SimulatedExecutor;

/// Exit code for configuration and wiring errors.
const EXIT_CONFIG: u8 = 2;

/// rollcall - bounded-concurrency sign-in runner
#[derive(Debug, Parser)]
#[command(name = "rollcall")]
#[command(about = "Sign in to every configured forum, retrying failures", long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Item key to sign in to; repeatable. Replaces the configured items.
    #[arg(long = "item", value_name = "KEY")]
    items: Vec<String>,

    /// Maximum number of concurrent attempts
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Maximum attempts per item
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Directory for run reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Start immediately even if the config asks for the midnight gate
    #[arg(long)]
    no_gate: bool,

    /// Failures the simulated executor returns per item before succeeding
    #[arg(long, default_value = "0")]
    simulate_failures: u32,

    /// Latency of each simulated attempt, in milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(n) = self.max_concurrency {
            settings.max_concurrency = n;
        }
        if let Some(n) = self.max_attempts {
            settings.max_attempts = n;
        }
        if let Some(dir) = &self.report_dir {
            settings.report_dir = dir.clone();
        }
        if self.no_gate {
            settings.gate = GateKind::Immediate;
        }
        if !self.items.is_empty() {
            settings.items_file = None;
            settings.items = self.items.iter().map(|k| Item::new(k, k)).collect();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runner = match load_settings(&cli).and_then(|s| build_runner(&cli, &s)) {
        Ok(runner) => runner,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match runner.run_until_cancelled(cancel).await {
        Ok(report) => {
            print_summary(&report);
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!(error = %e, "failed to encode report"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, kind = e.as_label(), "run aborted");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    cli.apply(&mut settings);
    Ok(settings)
}

fn build_runner(cli: &Cli, settings: &Settings) -> Result<Runner, Box<dyn Error>> {
    let offset = settings.utc_offset()?;

    let discovery: Arc<dyn Discovery> = match &settings.items_file {
        Some(path) => Arc::new(JsonFileDiscovery::new(path)),
        None => Arc::new(StaticDiscovery::new(settings.items.clone())),
    };

    let gate: Arc<dyn StartGate> = match (settings.gate, &settings.clock_url) {
        (GateKind::Immediate, _) => Arc::new(ImmediateGate),
        (GateKind::Midnight, Some(url)) => {
            Arc::new(
                MidnightGate::new(HttpDateClock::new(url.clone()), offset)
                    .with_window(settings.gate_window()),
            )
        }
        (GateKind::Midnight, None) => Arc::new(
            MidnightGate::new(SystemClock, offset).with_window(settings.gate_window()),
        ),
    };

    let executor = SimulatedExecutor::new(cli.simulate_failures)
        .with_latency(Duration::from_millis(cli.latency_ms));

    info!(
        max_concurrency = settings.max_concurrency,
        max_attempts = settings.max_attempts,
        gate = ?settings.gate,
        report_dir = %settings.report_dir.display(),
        "configured"
    );

    let runner = RunnerBuilder::new()
        .config(settings.scheduler_config()?)
        .executor(Arc::new(executor))
        .discovery(discovery)
        .gate(gate)
        .reporter(Arc::new(
            JsonFileReporter::new(&settings.report_dir).with_offset(offset),
        ))
        .build()?;
    Ok(runner)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("interrupted, finishing in-flight attempts");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
    }
}

fn print_summary(report: &RunReport) {
    println!(
        "{}: {} succeeded, {} failed, {:.1}s",
        report.run_id(),
        report.succeeded(),
        report.failed(),
        report.duration().as_secs_f64()
    );
    println!("{:<20}  {:<8}  {:<18}  {}", "ITEM", "ATTEMPTS", "OUTCOME", "REASON");
    println!("{}", "-".repeat(72));
    for task in report.tasks() {
        let outcome = task.last_outcome();
        let label = match (task.is_abandoned(), outcome) {
            (true, _) => "ABANDONED",
            (false, Some(o)) => o.as_label(),
            (false, None) => "-",
        };
        println!(
            "{:<20}  {:<8}  {:<18}  {}",
            task.item().name(),
            task.attempts(),
            label,
            outcome.and_then(|o| o.reason()).unwrap_or("")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_settings() {
        let cli = Cli::try_parse_from([
            "rollcall",
            "--max-concurrency",
            "9",
            "--max-attempts",
            "2",
            "--report-dir",
            "/tmp/reports",
            "--no-gate",
            "--item",
            "rust",
            "--item",
            "go",
        ])
        .unwrap();
        let mut settings = Settings {
            gate: GateKind::Midnight,
            items_file: Some(PathBuf::from("items.json")),
            ..Settings::default()
        };

        cli.apply(&mut settings);

        assert_eq!(settings.max_concurrency, 9);
        assert_eq!(settings.max_attempts, 2);
        assert_eq!(settings.report_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(settings.gate, GateKind::Immediate);
        assert_eq!(settings.items_file, None);
        assert_eq!(
            settings.items.iter().map(Item::key).collect::<Vec<_>>(),
            ["rust", "go"]
        );
    }

    #[test]
    fn no_flags_keep_settings() {
        let cli = Cli::try_parse_from(["rollcall"]).unwrap();
        let mut settings = Settings {
            max_concurrency: 3,
            gate: GateKind::Midnight,
            ..Settings::default()
        };
        let before = settings.clone();

        cli.apply(&mut settings);

        assert_eq!(settings, before);
    }

    #[test]
    fn zero_concurrency_fails_to_build() {
        let cli = Cli::try_parse_from(["rollcall", "--max-concurrency", "0"]).unwrap();
        let settings = load_settings(&cli).unwrap();
        assert!(build_runner(&cli, &settings).is_err());
    }

    #[tokio::test]
    async fn simulated_run_completes() {
        let root = tempfile::tempdir().expect("tmpdir");
        let dir = root.path().join("log");
        let cli = Cli::try_parse_from([
            "rollcall",
            "--item",
            "a",
            "--item",
            "b",
            "--max-attempts",
            "3",
            "--simulate-failures",
            "2",
            "--report-dir",
            dir.to_str().unwrap(),
        ])
        .unwrap();
        let settings = load_settings(&cli).unwrap();
        let runner = build_runner(&cli, &settings).unwrap();

        let report = runner.run().await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 0);
        assert!(report.tasks().iter().all(|t| t.attempts() == 3));
        assert!(std::fs::read_dir(&dir).unwrap().next().is_some());
    }
}
