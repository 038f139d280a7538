// Exporter: one export batch in, at most one blob out
//
// An empty batch is a logged no-op; the blob store is never contacted.
// Storage and serialization failures are kept apart because the pipeline
// treats them differently: storage errors are swallowed upstream,
// serialization errors fail the whole invocation.

use chrono::Utc;
use dynamo2json_core::{export_object_key, to_pretty_json, Record};
use opendal::Operator;
use thiserror::Error;
use tracing::info;

pub const EXPORT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum ExportError {
    /// The batch holds a value with no JSON representation. There is no
    /// fallback conversion for these.
    #[error("serializing export batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("writing export object: {0}")]
    Storage(#[from] opendal::Error),
}

/// Serialize `records` and write them as a single timestamped object under
/// `key_prefix`. Returns the written key, or `None` when the batch was
/// empty and nothing was written.
pub async fn export(
    operator: &Operator,
    key_prefix: &str,
    records: &[Record],
) -> Result<Option<String>, ExportError> {
    if records.is_empty() {
        info!("no records to export");
        return Ok(None);
    }

    let body = to_pretty_json(records)?;
    let key = export_object_key(key_prefix, Utc::now());

    operator
        .write_with(&key, body)
        .content_type(EXPORT_CONTENT_TYPE)
        .await?;

    info!(key = %key, "export object written");
    Ok(Some(key))
}
