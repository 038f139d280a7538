// dynamo2json-core - schema-less record model and export batch selection
//
// This crate is platform-free: no AWS SDK types and no storage I/O.
// It covers everything between "attribute maps came back from a scan" and
// "bytes are ready to be written":
// - FieldValue/Record: tagged value union preserving arbitrary-shape input
// - select_latest: timestamp sort-key heuristic, descending sort, truncation
// - to_pretty_json: the export object body format
// - export_object_key: destination key naming

mod object_key;
mod select;
mod value;

pub use object_key::{export_object_key, OBJECT_BASENAME, OBJECT_EXTENSION};
pub use select::{select_latest, FALLBACK_SORT_KEY, PRIMARY_SORT_KEY};
pub use value::{to_pretty_json, FieldValue, Record};
