// Export object key generation
//
// Keys look like: {prefix}/gps_data_{YYYYMMDD_HHMMSS}.json
// The timestamp is the UTC wall clock at the moment of export, so
// concurrent invocations land on distinct objects and nothing is ever
// overwritten in place.

use chrono::{DateTime, Utc};

pub const OBJECT_BASENAME: &str = "gps_data_";
pub const OBJECT_EXTENSION: &str = ".json";

const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the destination key for an export object written at `at`.
pub fn export_object_key(prefix: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}{}{}",
        prefix,
        OBJECT_BASENAME,
        at.format(KEY_TIMESTAMP_FORMAT),
        OBJECT_EXTENSION
    )
}
