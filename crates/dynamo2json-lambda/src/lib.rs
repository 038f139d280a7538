// AWS Lambda runtime adapter
//
// Configuration comes from the function's environment variables, the scan
// uses the function's IAM role via the default credential chain, and the
// export object goes to S3 through OpenDAL. The trigger payload (scheduled
// event or manual invoke) is accepted as opaque JSON and never read; every
// invocation runs the same pipeline.

use dynamo2json_config::ExportConfig;
use dynamo2json_export::{run_export, storage, DynamoTable, ExportSummary};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use opendal::Operator;
use std::sync::Arc;
use tracing::info;

struct HandlerState {
    scanner: DynamoTable,
    operator: Operator,
    config: ExportConfig,
}

async fn handle_trigger(
    event: LambdaEvent<serde_json::Value>,
    state: Arc<HandlerState>,
) -> Result<ExportSummary, Error> {
    let (_payload, _context) = event.into_parts();
    let summary = run_export(&state.scanner, &state.operator, &state.config).await?;
    Ok(summary)
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    init_tracing();

    let config = ExportConfig::from_env()?;
    info!(
        table = %config.table_name,
        bucket = %config.bucket,
        prefix = %config.key_prefix,
        "starting export runtime"
    );

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let scanner = DynamoTable::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.table_name.clone(),
    );
    let operator = storage::s3_operator(&config)?;

    let state = Arc::new(HandlerState {
        scanner,
        operator,
        config,
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let state = state.clone();
        async move { handle_trigger(event, state).await }
    }))
    .await
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // CloudWatch renders one log event per line; keep output plain.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false))
        .init();
}
