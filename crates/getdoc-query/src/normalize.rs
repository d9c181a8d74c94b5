use bson::{Bson, Document};
use serde_json::{Map, Number, Value};

use crate::literal::{LiteralError, parse_reference};

/// Convert a parsed JSON value into BSON, turning every reference literal
/// into an `ObjectId`.
///
/// The shape is preserved exactly: objects keep their keys in input order and
/// arrays keep their length. Only string leaves that are reference literals
/// change type.
pub fn normalize(value: &Value) -> Result<Bson, LiteralError> {
    match value {
        Value::Null => Ok(Bson::Null),
        Value::Bool(b) => Ok(Bson::Boolean(*b)),
        Value::Number(n) => Ok(number(n)),
        Value::String(s) => Ok(match parse_reference(s)? {
            Some(oid) => Bson::ObjectId(oid),
            None => Bson::String(s.clone()),
        }),
        Value::Array(items) => items
            .iter()
            .map(normalize)
            .collect::<Result<Vec<_>, _>>()
            .map(Bson::Array),
        Value::Object(map) => normalize_object(map).map(Bson::Document),
    }
}

/// Normalize a top-level JSON object into a query or projection document.
pub fn normalize_object(map: &Map<String, Value>) -> Result<Document, LiteralError> {
    let mut doc = Document::new();
    for (key, value) in map {
        doc.insert(key.clone(), normalize(value)?);
    }
    Ok(doc)
}

// Integers take the narrowest BSON width that holds them, the same choice
// the server-side shell makes for untyped numbers.
fn number(n: &Number) -> Bson {
    match n.as_i64() {
        Some(i) => i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32),
        None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
    }
}
