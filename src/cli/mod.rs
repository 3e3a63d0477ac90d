use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::load_config;
use crate::detect::{DetectionEngine, catalogue::default_detectors};
use crate::secret::Secret;
use crate::utils::http::default_http_client;
use crate::validate::ValidatorSet;

#[derive(Parser)]
#[command(name = "credsweep")]
#[command(about = "Streaming credential scanner")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files (or stdin when no path is given) for embedded credentials
    Scan {
        /// Files to scan; omit to read stdin
        paths: Vec<PathBuf>,
        /// Check each finding against the issuing service
        #[arg(long)]
        validate: bool,
        /// Emit findings as JSON lines instead of text
        #[arg(long)]
        json: bool,
        /// Path to a credsweep.toml (defaults to ./credsweep.toml if present)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// List the registered detector families
    Families,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            paths,
            validate,
            json,
            config,
        } => run_scan(&paths, validate, json, config.as_deref()).await,
        Commands::Families => run_families(),
    }
}

#[derive(Serialize)]
struct ReportLine<'a> {
    source: &'a str,
    offset: u64,
    family: &'a str,
    secret: &'a Secret,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<String>,
}

async fn run_scan(
    paths: &[PathBuf],
    validate: bool,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let engine = DetectionEngine::with_base_window(default_detectors()?, config.scan.window_kib * 1024)?;

    // Ctrl-C aborts the scan at the next window boundary.
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping scan");
            ctrl_c.cancel();
        }
    });

    let validators = validate.then(|| {
        ValidatorSet::with_timeout(
            default_http_client(),
            std::time::Duration::from_secs(config.validation.timeout_secs),
        )
    });

    let mut total = 0usize;
    if paths.is_empty() {
        total += scan_reader(&engine, &cancel, validators.as_ref(), "<stdin>", tokio::io::stdin(), json)
            .await?;
    } else {
        for path in paths {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            total += scan_reader(
                &engine,
                &cancel,
                validators.as_ref(),
                &path.display().to_string(),
                file,
                json,
            )
            .await?;
        }
    }
    info!(findings = total, "scan complete");
    Ok(())
}

async fn scan_reader<R>(
    engine: &DetectionEngine,
    cancel: &CancellationToken,
    validators: Option<&ValidatorSet>,
    source: &str,
    reader: R,
    json: bool,
) -> Result<usize>
where
    R: tokio::io::AsyncRead + Unpin,
{
    debug!(source, "scanning");
    let findings = engine
        .scan(cancel, reader)
        .await
        .with_context(|| format!("scanning {}", source))?;

    for finding in &findings {
        let validation = match validators {
            Some(set) => set
                .validate(cancel, &finding.secret)
                .await
                .map(|v| v.to_string()),
            None => None,
        };
        if json {
            let line = ReportLine {
                source,
                offset: finding.offset,
                family: finding.secret.label(),
                secret: &finding.secret,
                validation,
            };
            println!("{}", serde_json::to_string(&line)?);
        } else {
            match validation {
                Some(v) => println!(
                    "{}:{}: {} [{}]",
                    source,
                    finding.offset,
                    finding.secret.label(),
                    v
                ),
                None => println!("{}:{}: {}", source, finding.offset, finding.secret.label()),
            }
        }
    }
    Ok(findings.len())
}

fn run_families() -> Result<()> {
    for detector in default_detectors()? {
        println!("{}", detector.name());
    }
    Ok(())
}
