use bson::{Bson, Document};
use serde_json::{Number, Value};

use crate::legacy::decode_document;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    #[default]
    Compact,
    Pretty,
}

/// Convert a BSON value into plain JSON for display.
///
/// `ObjectId`s become their 24-character hex string and dates become RFC 3339
/// strings. Types with no natural JSON form (binary, decimal128, regex,
/// timestamps, non-finite doubles, ...) fall back to relaxed extended JSON.
pub fn to_json(value: Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => match Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => Bson::Double(f).into_relaxed_extjson(),
        },
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    Value::Object(doc.into_iter().map(|(k, v)| (k, to_json(v))).collect())
}

/// Render a result set as a JSON array.
///
/// With `legacy_decode` set, Python 2 string markers are stripped from every
/// key and string value first.
pub fn serialize(
    results: Vec<Document>,
    legacy_decode: bool,
    style: OutputStyle,
) -> Result<String, serde_json::Error> {
    let array = Value::Array(
        results
            .into_iter()
            .map(|doc| {
                let doc = if legacy_decode {
                    decode_document(doc)
                } else {
                    doc
                };
                document_to_json(doc)
            })
            .collect(),
    );

    match style {
        OutputStyle::Compact => serde_json::to_string(&array),
        OutputStyle::Pretty => serde_json::to_string_pretty(&array),
    }
}
