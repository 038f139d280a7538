// One-shot export runner
//
// Runs the same fetch/export pipeline as the Lambda, once, from a
// workstation: scan the table, write one JSON object, print the summary to
// stdout. With --output the object goes to a local directory instead of S3,
// which is the easy way to eyeball an export without touching a bucket.

use anyhow::{Context, Result};
use clap::Parser;
use dynamo2json_config::{ExportConfig, ExportConfigOverlay, StdEnvSource};
use dynamo2json_export::{run_export, storage, DynamoTable};
use std::path::PathBuf;

/// Export recent DynamoDB records to a timestamped JSON object
#[derive(Parser)]
#[command(name = "dynamo2json")]
#[command(version)]
#[command(about = "Export recent DynamoDB records to a timestamped JSON object", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Table to scan (overrides config file and environment)
    #[arg(long, value_name = "TABLE")]
    table: Option<String>,

    /// Destination bucket
    #[arg(long, value_name = "BUCKET")]
    bucket: Option<String>,

    /// Key prefix for export objects
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Maximum records per export object
    #[arg(long, value_name = "COUNT")]
    max_items: Option<usize>,

    /// Maximum continuation pages per scan
    #[arg(long, value_name = "PAGES")]
    max_scan_pages: Option<usize>,

    /// Write the export object into a local directory instead of S3
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_tracing(cli.log_level.as_deref());

    let config = resolve_config(&cli)?;

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let scanner = DynamoTable::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.table_name.clone(),
    );

    let operator = match &cli.output {
        Some(dir) => storage::fs_operator(
            dir.to_str()
                .context("output directory path is not valid UTF-8")?,
        )?,
        None => storage::s3_operator(&config)?,
    };

    let summary = run_export(&scanner, &operator, &config).await?;
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ExportConfig> {
    let mut overlay = match &cli.config {
        Some(path) => ExportConfigOverlay::from_file(path)?,
        None => ExportConfigOverlay::from_default_files(&StdEnvSource)?,
    };

    overlay.merge(ExportConfigOverlay::from_env(&StdEnvSource)?);

    // CLI flags win over everything.
    let cli_overlay = ExportConfigOverlay {
        table_name: cli.table.clone(),
        bucket: cli.bucket.clone(),
        key_prefix: cli.prefix.clone(),
        max_items: cli.max_items,
        max_scan_pages: cli.max_scan_pages,
        region: None,
        endpoint: None,
    };
    overlay.merge(cli_overlay);

    // The fs backend has no bucket; satisfy the required field for local runs.
    if cli.output.is_some() && overlay.bucket.is_none() {
        overlay.bucket = Some("local".to_string());
    }

    let config = overlay.resolve()?;
    config.validate()?;
    Ok(config)
}

fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
