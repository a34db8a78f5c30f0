//! cellstream - Bioreactor Sensor Relay
//!
//! Replays a bioreactor sensor log onto RabbitMQ, one record per second,
//! logging every sent record and every alert.
//!
//! # Usage
//!
//! ```bash
//! # Replay ./Cell_Data.csv against a local RabbitMQ
//! cargo run --release
//!
//! # Different file, no pacing, nothing sent (in-memory broker)
//! cellstream --csv runs/batch-7.csv --pacing-ms 0 --dry-run
//! ```
//!
//! # Environment Variables
//!
//! - `CELLSTREAM_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging filter (default: `logging.level`, i.e. info)
//!
//! # Exit Codes
//!
//! - `0`: source exhausted, or interrupted with Ctrl+C
//! - `1`: bad configuration, broker unreachable, malformed record, or failed publish

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use cellstream::broker::{Broker, ManagementBroker, MemoryBroker};
use cellstream::config::{IngestPolicy, LoadedConfig, ProducerConfig};
use cellstream::pipeline::{run_session, CsvRecordSource, IngestOutcome};
use cellstream::{admin, logging};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "cellstream")]
#[command(about = "Bioreactor sensor log relay with real-time alerts")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides CELLSTREAM_CONFIG and ./cellstream.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Sensor log to replay
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Delay after each record in milliseconds (0 = no delay)
    #[arg(long, value_name = "MS")]
    pacing_ms: Option<u64>,

    /// Broker host for the management API
    #[arg(long)]
    host: Option<String>,

    /// Persistent log file (empty string disables it)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Do not open the broker admin console in a browser
    #[arg(long)]
    no_admin: bool,

    /// Use an in-memory broker instead of RabbitMQ
    #[arg(long)]
    dry_run: bool,
}

// ============================================================================
// Configuration
// ============================================================================

/// Resolve the config file, then apply CLI overrides and re-validate.
fn load_config(args: &CliArgs) -> Result<LoadedConfig> {
    let mut loaded =
        ProducerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let config = &mut loaded.config;
    if let Some(ref csv) = args.csv {
        config.input.path.clone_from(csv);
    }
    if let Some(ms) = args.pacing_ms {
        config.input.pacing_ms = ms;
    }
    if let Some(ref host) = args.host {
        config.broker.host.clone_from(host);
    }
    if let Some(ref file) = args.log_file {
        config.logging.file.clone_from(file);
    }
    if args.no_admin || args.dry_run {
        config.admin.open_on_start = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(loaded)
}

// ============================================================================
// Run
// ============================================================================

async fn run(loaded: LoadedConfig, dry_run: bool) -> Result<ExitCode> {
    let LoadedConfig {
        config,
        source: config_source,
        warnings,
    } = loaded;

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  cellstream - Bioreactor Sensor Relay");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("Config: {}", config_source);
    for w in &warnings {
        warn!("{}", w);
    }

    let policy = IngestPolicy::from_config(&config);
    info!(
        "⏱️  Pacing: {}ms between records",
        policy.pacing.as_millis()
    );

    if config.admin.open_on_start {
        admin::open_admin_console(&config.admin.url);
    }

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Received Ctrl+C, stopping after the current record...");
            shutdown_token.cancel();
        }
    });

    let mut source = CsvRecordSource::open(&config.input.path)
        .await
        .with_context(|| format!("Cannot open sensor log {}", config.input.path.display()))?;
    info!("📥 Input: {}", config.input.path.display());

    let mut broker: Box<dyn Broker> = if dry_run {
        info!("🧪 Dry run: publishing to in-memory broker");
        Box::new(MemoryBroker::new())
    } else {
        let connected = tokio::select! {
            biased;
            () = cancel_token.cancelled() => None,
            result = ManagementBroker::connect(&config.broker) => Some(result),
        };
        match connected {
            Some(Ok(broker)) => Box::new(broker),
            Some(Err(e)) if !cancel_token.is_cancelled() => {
                error!("Error: Connection to RabbitMQ server failed: {e}");
                return Ok(ExitCode::FAILURE);
            }
            _ => {
                info!("Program execution was canceled by the user.");
                return Ok(ExitCode::SUCCESS);
            }
        }
    };

    let report = run_session(
        broker.as_mut(),
        &mut source,
        policy,
        (),
        cancel_token,
    )
    .await;

    Ok(match report.outcome {
        IngestOutcome::Completed => {
            info!("✓ Sensor log replay complete");
            ExitCode::SUCCESS
        }
        IngestOutcome::Cancelled => ExitCode::SUCCESS,
        IngestOutcome::Failed(e) => {
            error!("✗ Ingest aborted: {e}");
            ExitCode::FAILURE
        }
    })
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let loaded = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("cellstream: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&loaded.config.logging) {
        eprintln!("cellstream: {e}");
        return ExitCode::FAILURE;
    }
    if loaded.config.logging.file_path().is_none() {
        info!("File logging disabled");
    }

    match run(loaded, args.dry_run).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
