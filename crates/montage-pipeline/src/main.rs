//! Highlight montage stage runner.
//!
//! Reads one JSON envelope (from `--input` or stdin), runs a single stage and
//! writes the output envelope to stdout. Logs go to stderr.

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use montage_ledger::{HttpLedger, LedgerError};
use montage_media::ProcessRunner;
use montage_pipeline::metrics::install_exporter;
use montage_pipeline::{
    output_schema, run_stage, PipelineConfig, PipelineContext, PipelineError, Stage,
};
use montage_services::{HttpDetector, HttpSpeechSynthesizer, HttpTextGenerator};
use montage_storage::S3Store;

#[derive(Debug, Parser)]
#[command(name = "montage-stage", version, about = "Run one stage of the highlight montage pipeline")]
struct Cli {
    /// Stage to run
    #[arg(value_enum)]
    stage: Stage,

    /// Read the input envelope from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pretty-print the output envelope
    #[arg(long)]
    pretty: bool,

    /// Print the JSON schema of the stage's output envelope and exit
    #[arg(long)]
    schema: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if cli.schema {
        let printed = serde_json::to_value(output_schema(cli.stage))
            .map_err(anyhow::Error::from)
            .and_then(|schema| print_envelope(&schema, true));
        return match printed {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Failed to print schema: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    if let Ok(addr) = std::env::var("METRICS_ADDR") {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = install_exporter(addr) {
                    warn!("Failed to start metrics exporter on {}: {:#}", addr, e);
                }
            }
            Err(e) => warn!("Ignoring invalid METRICS_ADDR {:?}: {}", addr, e),
        }
    }

    match run(&cli).await {
        Ok(output) => match print_envelope(&output, cli.pretty) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Failed to write output envelope: {:#}", e);
                ExitCode::FAILURE
            }
        },
        Err(RunError::Stage(PipelineError::Validation(e))) => {
            warn!(stage = cli.stage.name(), "Rejected input: {}", e);
            let body = json!({ "statusCode": 400, "error": e.to_string() });
            if let Err(e) = print_envelope(&body, cli.pretty) {
                error!("Failed to write error body: {:#}", e);
            }
            ExitCode::from(2)
        }
        Err(RunError::Stage(e)) => {
            error!(stage = cli.stage.name(), kind = ?e.kind(), "Stage failed: {}", e);
            ExitCode::FAILURE
        }
        Err(RunError::Setup(e)) => {
            error!(stage = cli.stage.name(), "Stage setup failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

enum RunError {
    Setup(anyhow::Error),
    Stage(PipelineError),
}

async fn run(cli: &Cli) -> Result<Value, RunError> {
    let payload = read_payload(cli.input.as_ref()).map_err(RunError::Setup)?;
    let config = PipelineConfig::from_env();

    let ctx = if cli.stage.needs_services() {
        Some(build_context(config.clone()).await.map_err(RunError::Setup)?)
    } else {
        None
    };

    info!(stage = cli.stage.name(), "Running stage");
    run_stage(cli.stage, payload, &config, ctx.as_ref())
        .await
        .map_err(RunError::Stage)
}

fn read_payload(path: Option<&PathBuf>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("input is not valid JSON")
}

async fn build_context(config: PipelineConfig) -> anyhow::Result<PipelineContext> {
    let store = S3Store::from_env().await.context("object storage")?;

    let mut runner = ProcessRunner::new();
    if let Some(timeout) = config.media_timeout {
        runner = runner.with_timeout(timeout.as_secs());
    }

    let detector = HttpDetector::from_env().context("detector client")?;
    let text = HttpTextGenerator::from_env().context("text client")?;
    let speech = HttpSpeechSynthesizer::from_env().context("speech client")?;

    let ctx = PipelineContext::new(
        config,
        Arc::new(store),
        Arc::new(runner),
        Arc::new(detector),
        Arc::new(text),
        Arc::new(speech),
    );

    match HttpLedger::from_env() {
        Ok(ledger) => Ok(ctx.with_ledger(Arc::new(ledger))),
        Err(LedgerError::NotConfigured(msg)) => {
            info!("Video ledger disabled: {}", msg);
            Ok(ctx)
        }
        Err(e) => Err(anyhow::Error::new(e).context("video ledger")),
    }
}

fn print_envelope(value: &Value, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true),
            )
            .with(env_filter)
            .init();
    }
}
