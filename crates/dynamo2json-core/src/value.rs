// Schema-less record values
//
// Records carry whatever fields the table holds; no schema is enforced.
// Numbers keep their original decimal text until serialization, where they
// become standard f64 JSON numbers. Binary payloads can be held in memory
// but have no JSON representation, so serializing them is a hard error.

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;

/// One record from the table: an ordered mapping of field name to value.
pub type Record = BTreeMap<String, FieldValue>;

/// Tagged union over every value shape the table can hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    /// Arbitrary-precision decimal text, converted to f64 at serialization.
    Number(String),
    Text(String),
    /// Raw bytes. Not representable in the export format.
    Binary(Vec<u8>),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Numeric view used for timestamp ordering. Non-numeric variants and
    /// unparseable decimal text have no numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(flag) => serializer.serialize_bool(*flag),
            FieldValue::Number(text) => {
                let value: f64 = text.parse().map_err(|_| {
                    S::Error::custom(format!("number value {:?} does not parse as f64", text))
                })?;
                serializer.serialize_f64(value)
            }
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Binary(_) => Err(S::Error::custom(
                "binary values have no JSON representation",
            )),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
        }
    }
}

/// Serialize an export batch as the object body: a pretty-printed JSON
/// array with 4-space indentation.
pub fn to_pretty_json(records: &[Record]) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::with_capacity(records.len() * 256);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
    records.serialize(&mut serializer)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, FieldValue)]) -> Record {
        fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn decimal_text_serializes_as_plain_number() {
        let records = vec![record(&[("lat", FieldValue::Number("12.5".into()))])];
        let body = String::from_utf8(to_pretty_json(&records).unwrap()).unwrap();
        assert!(body.contains("\"lat\": 12.5"), "body was: {body}");
        assert!(!body.contains("\"12.5\""));
    }

    #[test]
    fn nested_shapes_round_trip() {
        let records = vec![record(&[
            ("ok", FieldValue::Bool(true)),
            ("none", FieldValue::Null),
            (
                "pos",
                FieldValue::Map(
                    [
                        ("lat".to_string(), FieldValue::Number("51.5".into())),
                        ("lon".to_string(), FieldValue::Number("-0.1".into())),
                    ]
                    .into(),
                ),
            ),
            (
                "tags",
                FieldValue::List(vec![
                    FieldValue::Text("gps".into()),
                    FieldValue::Text("fleet".into()),
                ]),
            ),
        ])];

        let body = to_pretty_json(&records).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed[0]["ok"], serde_json::json!(true));
        assert_eq!(parsed[0]["none"], serde_json::Value::Null);
        assert_eq!(parsed[0]["pos"]["lat"], serde_json::json!(51.5));
        assert_eq!(parsed[0]["tags"][1], serde_json::json!("fleet"));
    }

    #[test]
    fn body_uses_four_space_indent() {
        let records = vec![record(&[("v", FieldValue::Number("1".into()))])];
        let body = String::from_utf8(to_pretty_json(&records).unwrap()).unwrap();
        assert!(body.starts_with("[\n    {\n        \"v\": 1.0"), "body was: {body}");
    }

    #[test]
    fn binary_value_is_a_hard_error() {
        let records = vec![record(&[("raw", FieldValue::Binary(vec![0xde, 0xad]))])];
        let err = to_pretty_json(&records).unwrap_err();
        assert!(err.to_string().contains("binary"));
    }

    #[test]
    fn unparseable_number_is_a_hard_error() {
        let records = vec![record(&[("n", FieldValue::Number("1e9999x".into()))])];
        assert!(to_pretty_json(&records).is_err());
    }

    #[test]
    fn as_f64_only_reads_numbers() {
        assert_eq!(FieldValue::Number("200".into()).as_f64(), Some(200.0));
        assert_eq!(FieldValue::Number("nope".into()).as_f64(), None);
        assert_eq!(FieldValue::Text("200".into()).as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
    }
}
