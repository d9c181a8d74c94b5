//! Reads query and projection text and turns it into BSON documents ready
//! for the driver.

use std::io::ErrorKind;

use bson::Document;
use serde_json::{Map, Value};
use tracing::debug;

use getdoc_query::normalize_object;

use crate::config::QuerySource;
use crate::error::Error;

pub fn read_source(source: &QuerySource) -> Result<String, Error> {
    match source {
        QuerySource::Literal(text) => Ok(text.clone()),
        QuerySource::File(path) => {
            debug!(path = %path.display(), "reading");
            std::fs::read_to_string(path).map_err(|source| match source.kind() {
                ErrorKind::InvalidData => Error::MalformedInput {
                    what: "file",
                    origin: path.display().to_string(),
                    reason: "not valid UTF-8".into(),
                },
                _ => Error::FileNotFound {
                    path: path.clone(),
                    source,
                },
            })
        }
    }
}

/// Parse `text` as a JSON object.
pub fn parse_object(
    text: &str,
    what: &'static str,
    source: &QuerySource,
) -> Result<Map<String, Value>, Error> {
    let malformed = |reason: String| Error::MalformedInput {
        what,
        origin: source.to_string(),
        reason,
    };
    match serde_json::from_str::<Value>(text).map_err(|e| malformed(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(malformed(format!(
            "expected a JSON object, found {}",
            kind(&other)
        ))),
    }
}

/// Load and normalize the query document.
pub fn load_query(source: &QuerySource) -> Result<Document, Error> {
    let text = read_source(source)?;
    let map = parse_object(&text, "query", source)?;
    Ok(normalize_object(&map)?)
}

/// Load and normalize the projection, if any. Blank text means no
/// projection.
pub fn load_projection(source: Option<&QuerySource>) -> Result<Option<Document>, Error> {
    let Some(source) = source else {
        return Ok(None);
    };
    let text = read_source(source)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    let map = parse_object(&text, "projection", source)?;
    Ok(Some(normalize_object(&map)?))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bson::doc;
    use bson::oid::ObjectId;

    use super::*;

    fn literal(text: &str) -> QuerySource {
        QuerySource::Literal(text.to_string())
    }

    #[test]
    fn literal_query_is_normalized() {
        let query = load_query(&literal(
            r#"{"_id": "ObjectId('507f1f77bcf86cd799439011')", "n": 1}"#,
        ))
        .unwrap();
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(query, doc! { "_id": oid, "n": 1 });
    }

    #[test]
    fn query_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"status": "active"}}"#).unwrap();
        let query = load_query(&QuerySource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(query, doc! { "status": "active" });
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_query(&QuerySource::File(path.clone())).unwrap_err();
        match err {
            Error::FileNotFound { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn non_utf8_file_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'{', 0xff, 0xfe, b'}']).unwrap();
        let err = load_query(&QuerySource::File(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { what: "file", .. }), "{err:?}");
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn invalid_json_mentions_quoting() {
        let err = load_query(&literal("{status: active}")).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { what: "query", .. }));
        assert!(err.to_string().contains("single quotes"), "{err}");
    }

    #[test]
    fn query_must_be_an_object() {
        let err = load_query(&literal("[1, 2]")).unwrap_err();
        assert!(err.to_string().contains("found an array"), "{err}");
    }

    #[test]
    fn invalid_literal_is_distinct_from_malformed_json() {
        let err = load_query(&literal(r#"{"_id": "ObjectId('xyz')"}"#)).unwrap_err();
        assert!(matches!(err, Error::InvalidLiteral(_)), "{err:?}");
    }

    #[test]
    fn projection_variants() {
        assert_eq!(load_projection(None).unwrap(), None);
        assert_eq!(load_projection(Some(&literal("  "))).unwrap(), None);
        assert_eq!(
            load_projection(Some(&literal(r#"{"name": 1, "_id": 0}"#))).unwrap(),
            Some(doc! { "name": 1, "_id": 0 })
        );
        assert_eq!(load_projection(Some(&literal("{}"))).unwrap(), Some(doc! {}));
        assert!(matches!(
            load_projection(Some(&literal("{'name': 1}"))).unwrap_err(),
            Error::MalformedInput { what: "projection", .. }
        ));
    }
}
