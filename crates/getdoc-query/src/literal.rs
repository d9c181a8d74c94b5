use std::sync::LazyLock;

use bson::oid::ObjectId;
use regex::Regex;

/// `ObjectId('<token>')`, `ObjectId("<token>")` or `ObjectId(<token>)`,
/// anchored at the start of the string. The token is captured loosely so a
/// recognized wrapper around a bad token can be reported instead of ignored.
static REFERENCE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ObjectId\((?:'([^']*)'|"([^"]*)"|([^'")]*))\)"#)
        .expect("reference literal pattern compiles")
});

const TOKEN_LEN: usize = 24;

/// A string shaped like an `ObjectId(...)` literal whose token is not a
/// 24-character hexadecimal identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub literal: String,
    pub reason: String,
}

impl std::fmt::Display for LiteralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid ObjectId literal {:?}: {}", self.literal, self.reason)
    }
}

impl std::error::Error for LiteralError {}

/// Decode a reference literal.
///
/// Returns `Ok(None)` when `s` is not a reference literal at all, which is the
/// common case for ordinary string values in a query.
pub fn parse_reference(s: &str) -> Result<Option<ObjectId>, LiteralError> {
    let Some(caps) = REFERENCE_LITERAL.captures(s) else {
        return Ok(None);
    };

    let token = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str());

    let invalid = |reason: String| LiteralError {
        literal: s.to_string(),
        reason,
    };

    if token.len() != TOKEN_LEN {
        return Err(invalid(format!(
            "expected {TOKEN_LEN} hexadecimal characters, found {}",
            token.len()
        )));
    }
    if let Some(c) = token.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(invalid(format!("non-hexadecimal character {c:?}")));
    }

    ObjectId::parse_str(token)
        .map(Some)
        .map_err(|e| invalid(e.to_string()))
}

/// Canonical literal form of an identifier, the inverse of [`parse_reference`].
pub fn to_literal(oid: &ObjectId) -> String {
    format!("ObjectId('{}')", oid.to_hex())
}
