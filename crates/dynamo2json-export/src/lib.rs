// dynamo2json-export - the fetch/export pipeline
//
// Two steps joined by a single data handoff: the Fetcher scans the table
// and selects the newest records, the Exporter writes them as one JSON
// object. Platform entry points (Lambda, CLI) call run_export and report
// its summary.

use dynamo2json_config::ExportConfig;
use opendal::Operator;
use serde::Serialize;
use tracing::error;

pub mod export;
pub mod fetch;
pub mod storage;

pub use export::{export, ExportError, EXPORT_CONTENT_TYPE};
pub use fetch::{fetch_latest, AttributeMap, DynamoTable, FetchError, ScanPage, TableScanner};

/// Invocation result handed back to the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub status: &'static str,
    pub records_exported: usize,
}

impl ExportSummary {
    pub fn success(records_exported: usize) -> Self {
        Self {
            status: "success",
            records_exported,
        }
    }
}

/// Run one export: fetch, then write, then summarize.
///
/// Step failures are deliberately discarded here, and only here, so the
/// tradeoff stays visible in one place: a failed scan exports an empty
/// batch, a failed object write loses the batch, and the summary reports
/// success either way with `records_exported` counting what was handed to
/// the exporter. The single exception is a serialization failure, which
/// has no fallback and fails the invocation.
pub async fn run_export<S>(
    scanner: &S,
    operator: &Operator,
    config: &ExportConfig,
) -> anyhow::Result<ExportSummary>
where
    S: TableScanner + ?Sized,
{
    let records = match fetch_latest(scanner, config.max_items, config.max_scan_pages).await {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "table scan failed; exporting nothing");
            Vec::new()
        }
    };

    let records_exported = records.len();

    match export(operator, &config.key_prefix, &records).await {
        Ok(_) => {}
        Err(ExportError::Storage(err)) => {
            error!(error = %err, "export object write failed; batch lost");
        }
        Err(err @ ExportError::Serialize(_)) => return Err(err.into()),
    }

    Ok(ExportSummary::success(records_exported))
}
