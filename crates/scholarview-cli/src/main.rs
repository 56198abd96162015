//! scholarview - terminal front-end for a scholar profile backend
//!
//! Waits for the backend to come up, loads the profile (cached or streamed
//! with live progress), and prints filtered, sorted, paginated publications.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use scholarview_client::{AcquisitionController, HttpTransport, ReadinessPolicy};
use scholarview_core::ProgressContext;

mod cmd;
mod config;
mod shutdown;

use config::Config;

#[derive(Parser)]
#[command(name = "scholarview")]
#[command(about = "Browse a researcher's publications from a scholar profile backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./scholarview.toml or ~/.config/scholarview/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Backend API root, e.g. http://localhost:3001/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Milliseconds between readiness probes
    #[arg(long, global = true)]
    retry_delay_ms: Option<u64>,

    /// Give up after this many readiness probes (default: wait until interrupted)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the profile and print publications
    Show(cmd::show::ShowArgs),
    /// Ask the backend to refresh its data, then reload
    Refresh,
    /// Show the backend's cache status
    Cache,
    /// Show current configuration
    Config,
}

/// Effective settings: config file values with CLI overrides applied.
struct Settings {
    base_url: String,
    connect_timeout: Duration,
    policy: ReadinessPolicy,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Self {
        let mut policy = config.readiness.policy();
        if let Some(ms) = cli.retry_delay_ms {
            policy.retry_delay = config::retry_delay(ms);
        }
        if cli.max_attempts.is_some() {
            policy.max_attempts = cli.max_attempts;
        }
        Self {
            base_url: cli
                .base_url
                .clone()
                .unwrap_or_else(|| config.server.base_url.clone()),
            connect_timeout: config.connect_timeout(),
            policy,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = ProgressContext::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    if let Err(e) = scholarview_core::init_logging(quiet, cli.debug, multi) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli, &progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            if !log::log_enabled!(log::Level::Error) {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, progress: &ProgressContext) -> Result<()> {
    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    let settings = Settings::resolve(&cli, &config);

    if let Command::Config = cli.command {
        print_config(&config, &settings);
        return Ok(());
    }

    shutdown::install_signal_handlers().context("Failed to register signal handlers")?;

    let transport = HttpTransport::new(settings.base_url.as_str(), settings.connect_timeout)
        .context("Failed to build HTTP client")?;
    log::info!("Backend: {}", transport.base_url());
    let ctl = AcquisitionController::new(transport, settings.policy);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let command = cli.command;
    runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(shutdown::watch(cancel.clone()));

        let result = match command {
            Command::Show(args) => cmd::show::run(args, &ctl, progress, &cancel).await,
            Command::Refresh => cmd::refresh::run(&ctl, progress, &cancel).await,
            Command::Cache => cmd::cache::run(&ctl).await,
            Command::Config => Ok(()),
        };

        cancel.cancel();
        let _ = watcher.await;
        result
    })
}

fn print_config(config: &Config, settings: &Settings) {
    let mut table = cmd::styled_table(&["Setting", "Value"]);

    table.add_row(vec!["Base URL", settings.base_url.as_str()]);
    table.add_row(vec![
        "Connect timeout".to_string(),
        format!("{}s", config.http.connect_timeout),
    ]);
    table.add_row(vec![
        "Retry delay".to_string(),
        format!("{}ms", settings.policy.retry_delay.as_millis()),
    ]);
    table.add_row(vec![
        "Max attempts".to_string(),
        settings
            .policy
            .max_attempts
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string()),
    ]);

    eprintln!("\n{table}");
}
