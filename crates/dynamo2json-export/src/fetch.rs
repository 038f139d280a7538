// Fetcher: paginated full scan of the table, newest records first
//
// The scan follows continuation keys while one is present AND fewer than
// `max_scan_pages` continuation pages have been consumed. The first request
// is always issued, so a fetch makes at most max_scan_pages + 1 requests.
// Exhausting the budget with a live continuation key drops the remaining
// records; that is the documented best-effort bound, not a bug.

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use dynamo2json_core::{select_latest, FieldValue, Record};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

pub type AttributeMap = HashMap<String, AttributeValue>;

/// One page of scan results.
pub struct ScanPage {
    pub items: Vec<AttributeMap>,
    /// Continuation key; `Some` means more results remain.
    pub next_key: Option<AttributeMap>,
}

/// Errors surfaced by the table store.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("table scan failed: {message}")]
    Service { message: String },
}

/// Paginated read access to the table. The production implementation is
/// [`DynamoTable`]; tests substitute scripted scanners.
#[async_trait]
pub trait TableScanner: Send + Sync {
    async fn scan_page(&self, start_key: Option<AttributeMap>) -> Result<ScanPage, FetchError>;
}

/// Scanner backed by a DynamoDB table.
pub struct DynamoTable {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoTable {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl TableScanner for DynamoTable {
    async fn scan_page(&self, start_key: Option<AttributeMap>) -> Result<ScanPage, FetchError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|err| FetchError::Service {
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(ScanPage {
            items: output.items.unwrap_or_default(),
            next_key: output.last_evaluated_key,
        })
    }
}

/// Scan the whole table (within the page budget), sort descending by
/// timestamp and keep the newest `max_items` records.
pub async fn fetch_latest<S>(
    scanner: &S,
    max_items: usize,
    max_scan_pages: usize,
) -> Result<Vec<Record>, FetchError>
where
    S: TableScanner + ?Sized,
{
    debug!("starting full table scan");

    let mut attribute_items = Vec::new();
    let mut pages_consumed = 0usize;
    let mut page = scanner.scan_page(None).await?;

    loop {
        attribute_items.extend(page.items);
        match page.next_key {
            Some(next_key) if pages_consumed < max_scan_pages => {
                pages_consumed += 1;
                page = scanner.scan_page(Some(next_key)).await?;
            }
            Some(_) => {
                warn!(
                    pages = pages_consumed + 1,
                    "scan page budget exhausted; remaining records omitted from this export"
                );
                break;
            }
            None => break,
        }
    }

    let records: Vec<Record> = attribute_items.iter().map(record_from_attributes).collect();
    let latest = select_latest(records, max_items);

    info!(count = latest.len(), "retrieved recent records");
    if let Some(sample) = latest.first() {
        debug!(?sample, "sample record");
    }

    Ok(latest)
}

/// Convert a scan item into the schema-less record model.
pub fn record_from_attributes(attributes: &AttributeMap) -> Record {
    attributes
        .iter()
        .map(|(name, value)| (name.clone(), field_from_attribute(value)))
        .collect()
}

fn field_from_attribute(value: &AttributeValue) -> FieldValue {
    match value {
        AttributeValue::Null(_) => FieldValue::Null,
        AttributeValue::Bool(flag) => FieldValue::Bool(*flag),
        AttributeValue::N(text) => FieldValue::Number(text.clone()),
        AttributeValue::S(text) => FieldValue::Text(text.clone()),
        AttributeValue::B(blob) => FieldValue::Binary(blob.as_ref().to_vec()),
        AttributeValue::Ss(values) => {
            FieldValue::List(values.iter().cloned().map(FieldValue::Text).collect())
        }
        AttributeValue::Ns(values) => {
            FieldValue::List(values.iter().cloned().map(FieldValue::Number).collect())
        }
        AttributeValue::Bs(blobs) => FieldValue::List(
            blobs
                .iter()
                .map(|blob| FieldValue::Binary(blob.as_ref().to_vec()))
                .collect(),
        ),
        AttributeValue::L(items) => {
            FieldValue::List(items.iter().map(field_from_attribute).collect())
        }
        AttributeValue::M(entries) => FieldValue::Map(
            entries
                .iter()
                .map(|(name, item)| (name.clone(), field_from_attribute(item)))
                .collect(),
        ),
        other => {
            warn!(?other, "unrecognized attribute type; exporting as null");
            FieldValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted scanner: pops one prepared page result per request and
    /// counts how many requests were made.
    struct ScriptedScanner {
        pages: Mutex<Vec<Result<ScanPage, FetchError>>>,
        requests: Mutex<usize>,
    }

    impl ScriptedScanner {
        fn new(pages: Vec<Result<ScanPage, FetchError>>) -> Self {
            let mut pages = pages;
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                requests: Mutex::new(0),
            }
        }

        fn requests(&self) -> usize {
            *self.requests.lock().unwrap()
        }
    }

    #[async_trait]
    impl TableScanner for ScriptedScanner {
        async fn scan_page(&self, _start_key: Option<AttributeMap>) -> Result<ScanPage, FetchError> {
            *self.requests.lock().unwrap() += 1;
            self.pages
                .lock()
                .unwrap()
                .pop()
                .expect("scanner asked for more pages than scripted")
        }
    }

    fn item(timestamp: i64, id: i64) -> AttributeMap {
        HashMap::from([
            (
                "event_timestamp".to_string(),
                AttributeValue::N(timestamp.to_string()),
            ),
            ("id".to_string(), AttributeValue::N(id.to_string())),
        ])
    }

    fn continuation_key() -> Option<AttributeMap> {
        Some(HashMap::from([(
            "id".to_string(),
            AttributeValue::N("0".to_string()),
        )]))
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records
            .iter()
            .map(|record| record["id"].as_f64().unwrap() as i64)
            .collect()
    }

    #[tokio::test]
    async fn single_page_is_sorted_descending() {
        let scanner = ScriptedScanner::new(vec![Ok(ScanPage {
            items: vec![item(100, 1), item(200, 2)],
            next_key: None,
        })]);

        let latest = fetch_latest(&scanner, 10, 10).await.unwrap();
        assert_eq!(ids(&latest), vec![2, 1]);
        assert_eq!(scanner.requests(), 1);
    }

    #[tokio::test]
    async fn follows_continuation_keys_across_pages() {
        let scanner = ScriptedScanner::new(vec![
            Ok(ScanPage {
                items: vec![item(10, 1)],
                next_key: continuation_key(),
            }),
            Ok(ScanPage {
                items: vec![item(30, 2)],
                next_key: continuation_key(),
            }),
            Ok(ScanPage {
                items: vec![item(20, 3)],
                next_key: None,
            }),
        ]);

        let latest = fetch_latest(&scanner, 10, 10).await.unwrap();
        assert_eq!(ids(&latest), vec![2, 3, 1]);
        assert_eq!(scanner.requests(), 3);
    }

    #[tokio::test]
    async fn page_budget_caps_requests_at_budget_plus_one() {
        let endless: Vec<_> = (0..4)
            .map(|n| {
                Ok(ScanPage {
                    items: vec![item(n, n)],
                    next_key: continuation_key(),
                })
            })
            .collect();
        let scanner = ScriptedScanner::new(endless);

        let latest = fetch_latest(&scanner, 10, 3).await.unwrap();
        // Initial request plus three continuation pages; the fourth
        // continuation key is left unfollowed.
        assert_eq!(scanner.requests(), 4);
        assert_eq!(latest.len(), 4);
    }

    #[tokio::test]
    async fn zero_page_budget_issues_exactly_one_request() {
        let scanner = ScriptedScanner::new(vec![Ok(ScanPage {
            items: vec![item(1, 1)],
            next_key: continuation_key(),
        })]);

        let latest = fetch_latest(&scanner, 10, 0).await.unwrap();
        assert_eq!(scanner.requests(), 1);
        assert_eq!(latest.len(), 1);
    }

    #[tokio::test]
    async fn first_page_error_is_surfaced() {
        let scanner = ScriptedScanner::new(vec![Err(FetchError::Service {
            message: "throttled".into(),
        })]);

        let err = fetch_latest(&scanner, 10, 10).await.unwrap_err();
        assert!(err.to_string().contains("throttled"));
    }

    #[tokio::test]
    async fn later_page_error_discards_accumulated_items() {
        let scanner = ScriptedScanner::new(vec![
            Ok(ScanPage {
                items: vec![item(1, 1)],
                next_key: continuation_key(),
            }),
            Err(FetchError::Service {
                message: "connection reset".into(),
            }),
        ]);

        assert!(fetch_latest(&scanner, 10, 10).await.is_err());
    }

    #[tokio::test]
    async fn truncates_to_max_items() {
        let scanner = ScriptedScanner::new(vec![Ok(ScanPage {
            items: (0..6).map(|n| item(n, n)).collect(),
            next_key: None,
        })]);

        let latest = fetch_latest(&scanner, 2, 10).await.unwrap();
        assert_eq!(ids(&latest), vec![5, 4]);
    }

    #[tokio::test]
    async fn empty_table_yields_empty_batch() {
        let scanner = ScriptedScanner::new(vec![Ok(ScanPage {
            items: Vec::new(),
            next_key: None,
        })]);

        let latest = fetch_latest(&scanner, 10, 10).await.unwrap();
        assert!(latest.is_empty());
        assert_eq!(scanner.requests(), 1);
    }

    #[test]
    fn attribute_conversion_covers_the_wire_shapes() {
        let attributes: AttributeMap = HashMap::from([
            ("n".to_string(), AttributeValue::N("12.5".to_string())),
            ("s".to_string(), AttributeValue::S("hello".to_string())),
            ("b".to_string(), AttributeValue::Bool(true)),
            ("nul".to_string(), AttributeValue::Null(true)),
            (
                "ss".to_string(),
                AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]),
            ),
            (
                "ns".to_string(),
                AttributeValue::Ns(vec!["1".to_string(), "2".to_string()]),
            ),
            (
                "l".to_string(),
                AttributeValue::L(vec![AttributeValue::N("7".to_string())]),
            ),
            (
                "m".to_string(),
                AttributeValue::M(HashMap::from([(
                    "inner".to_string(),
                    AttributeValue::S("x".to_string()),
                )])),
            ),
        ]);

        let record = record_from_attributes(&attributes);
        assert_eq!(record["n"], FieldValue::Number("12.5".into()));
        assert_eq!(record["s"], FieldValue::Text("hello".into()));
        assert_eq!(record["b"], FieldValue::Bool(true));
        assert_eq!(record["nul"], FieldValue::Null);
        assert_eq!(
            record["ss"],
            FieldValue::List(vec![
                FieldValue::Text("a".into()),
                FieldValue::Text("b".into())
            ])
        );
        assert_eq!(
            record["ns"],
            FieldValue::List(vec![
                FieldValue::Number("1".into()),
                FieldValue::Number("2".into())
            ])
        );
        assert_eq!(
            record["l"],
            FieldValue::List(vec![FieldValue::Number("7".into())])
        );
        assert_eq!(
            record["m"],
            FieldValue::Map([("inner".to_string(), FieldValue::Text("x".into()))].into())
        );
    }

    #[test]
    fn binary_attributes_are_preserved_until_serialization() {
        let attributes: AttributeMap = HashMap::from([(
            "raw".to_string(),
            AttributeValue::B(aws_sdk_dynamodb::primitives::Blob::new(vec![1u8, 2, 3])),
        )]);
        let record = record_from_attributes(&attributes);
        assert_eq!(record["raw"], FieldValue::Binary(vec![1, 2, 3]));
    }
}
