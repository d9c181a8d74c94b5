use std::collections::HashSet;

use bson::{Bson, Document};

/// Strip a Python 2 string-representation marker (`u'...'`, `u"..."`,
/// `b'...'`, `b"..."`) wrapped around the whole string. Anything else is
/// returned as is.
pub fn strip_marker(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() < 3 || !matches!(bytes[0], b'u' | b'b') {
        return s;
    }
    let quote = bytes[1];
    if matches!(quote, b'\'' | b'"') && bytes[bytes.len() - 1] == quote {
        &s[2..s.len() - 1]
    } else {
        s
    }
}

/// Recursively strip legacy markers from every key and string value.
///
/// A marked key whose stripped form is already taken, by an unmarked key or
/// by an earlier stripped one, keeps its marker so no field is lost.
pub fn decode_document(doc: Document) -> Document {
    let original: HashSet<String> = doc.keys().cloned().collect();
    let mut decoded = Document::new();
    for (key, value) in doc {
        let stripped = strip_marker(&key);
        let key = if stripped.len() != key.len()
            && !original.contains(stripped)
            && !decoded.contains_key(stripped)
        {
            stripped.to_string()
        } else {
            key
        };
        decoded.insert(key, decode_value(value));
    }
    decoded
}

fn decode_value(value: Bson) -> Bson {
    match value {
        Bson::String(s) => Bson::String(strip_owned(s)),
        Bson::Document(doc) => Bson::Document(decode_document(doc)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(decode_value).collect()),
        other => other,
    }
}

fn strip_owned(s: String) -> String {
    match strip_marker(&s) {
        inner if inner.len() == s.len() => s,
        inner => inner.to_string(),
    }
}
