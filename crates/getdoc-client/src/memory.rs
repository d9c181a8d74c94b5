use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bson::{Bson, Document};

use crate::driver::{Connection, Driver, FindRequest};
use crate::error::ClientError;

#[derive(Default)]
struct State {
    collections: HashMap<(String, String), Vec<Document>>,
    connect_error: Option<String>,
    find_error: Option<String>,
    connects: usize,
    closes: usize,
}

/// In-process document store speaking the [`Driver`] interface.
///
/// Supports the subset of find semantics fixtures need: equality on dotted
/// paths, `$eq`, `$ne`, `$in`, `$exists`, `$and`, `$or`, top-level
/// projections and limits. Clones share state, so a test can keep a handle
/// to inspect connect/close counts after the driver has been used.
#[derive(Clone, Default)]
pub struct MemoryDriver {
    state: Arc<Mutex<State>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_many(&self, database: &str, collection: &str, docs: Vec<Document>) {
        self.state()
            .collections
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .extend(docs);
    }

    /// Make every subsequent `connect` fail with a connection error.
    pub fn fail_connect(&self, message: &str) {
        self.state().connect_error = Some(message.to_string());
    }

    /// Make every subsequent `find` fail with an operation error.
    pub fn fail_find(&self, message: &str) {
        self.state().find_error = Some(message.to_string());
    }

    pub fn connect_count(&self) -> usize {
        self.state().connects
    }

    pub fn close_count(&self) -> usize {
        self.state().closes
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Driver for MemoryDriver {
    type Connection = MemoryConnection;

    fn connect(&self, _uri: &str) -> Result<MemoryConnection, ClientError> {
        let mut state = self.state();
        if let Some(msg) = &state.connect_error {
            return Err(ClientError::connection(msg.clone()));
        }
        state.connects += 1;
        Ok(MemoryConnection {
            driver: self.clone(),
        })
    }
}

pub struct MemoryConnection {
    driver: MemoryDriver,
}

impl Connection for MemoryConnection {
    fn find<'a>(
        &'a mut self,
        request: FindRequest<'_>,
    ) -> Result<Box<dyn Iterator<Item = Result<Document, ClientError>> + 'a>, ClientError> {
        let state = self.driver.state();
        if let Some(msg) = &state.find_error {
            return Err(ClientError::operation(msg.clone()));
        }

        let projection = request
            .projection
            .as_ref()
            .map(Projection::parse)
            .transpose()?;

        let key = (request.database.to_string(), request.collection.to_string());
        let docs = state.collections.get(&key).map(Vec::as_slice).unwrap_or(&[]);

        let mut results = Vec::new();
        for doc in docs {
            if request.limit > 0 && results.len() as i64 >= request.limit {
                break;
            }
            if matches(&request.filter, doc)? {
                results.push(match &projection {
                    Some(p) => p.apply(doc),
                    None => doc.clone(),
                });
            }
        }

        Ok(Box::new(results.into_iter().map(Ok)))
    }

    fn close(&mut self) {
        self.driver.state().closes += 1;
    }
}

// ── Filtering ───────────────────────────────────────────────────

fn matches(filter: &Document, doc: &Document) -> Result<bool, ClientError> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => logical(condition, doc, true)?,
            "$or" => logical(condition, doc, false)?,
            k if k.starts_with('$') => {
                return Err(ClientError::operation(format!("unknown top-level operator: {k}")));
            }
            path => field_matches(lookup(doc, path), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn logical(condition: &Bson, doc: &Document, all: bool) -> Result<bool, ClientError> {
    let Bson::Array(clauses) = condition else {
        return Err(ClientError::operation("$and/$or value must be an array"));
    };
    if clauses.is_empty() {
        return Err(ClientError::operation("$and/$or array must not be empty"));
    }
    for clause in clauses {
        let Bson::Document(sub) = clause else {
            return Err(ClientError::operation("$and/$or array elements must be documents"));
        };
        if matches(sub, doc)? != all {
            return Ok(!all);
        }
    }
    Ok(all)
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(d) => d.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> Result<bool, ClientError> {
    if let Bson::Document(ops) = condition {
        if ops.keys().next().is_some_and(|k| k.starts_with('$')) {
            return operators(value, ops);
        }
    }
    Ok(equals(value, condition))
}

fn operators(value: Option<&Bson>, ops: &Document) -> Result<bool, ClientError> {
    for (op, arg) in ops {
        let ok = match op.as_str() {
            "$eq" => equals(value, arg),
            "$ne" => !equals(value, arg),
            "$in" => match arg {
                Bson::Array(candidates) => candidates.iter().any(|c| equals(value, c)),
                _ => return Err(ClientError::operation("$in needs an array")),
            },
            "$exists" => match arg {
                Bson::Boolean(b) => value.is_some() == *b,
                _ => return Err(ClientError::operation("$exists value must be a boolean")),
            },
            other => {
                return Err(ClientError::operation(format!("unknown operator: {other}")));
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Equality with the server's rules that matter for fixtures: numbers compare
/// across widths, arrays match any element, and a missing field equals null.
fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| same(item, expected))
        }
        Some(v) => same(v, expected),
    }
}

fn same(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

// ── Projection ──────────────────────────────────────────────────

enum Projection {
    Include { fields: Vec<String>, id: bool },
    Exclude { fields: Vec<String>, id: bool },
}

impl Projection {
    fn parse(projection: &Document) -> Result<Self, ClientError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        let mut id = None;

        for (field, flag) in projection {
            let on = truthy(flag).ok_or_else(|| {
                ClientError::operation(format!("unsupported projection value for {field}"))
            })?;
            if field == "_id" {
                id = Some(on);
            } else if on {
                include.push(field.clone());
            } else {
                exclude.push(field.clone());
            }
        }

        match (include.is_empty(), exclude.first()) {
            (false, Some(field)) => Err(ClientError::operation(format!(
                "Cannot do exclusion on field {field} in inclusion projection"
            ))),
            (false, None) => Ok(Projection::Include {
                fields: include,
                id: id.unwrap_or(true),
            }),
            (true, _) if id == Some(true) && exclude.is_empty() => Ok(Projection::Include {
                fields: Vec::new(),
                id: true,
            }),
            (true, _) => Ok(Projection::Exclude {
                fields: exclude,
                id: id.unwrap_or(true),
            }),
        }
    }

    fn apply(&self, doc: &Document) -> Document {
        doc.iter()
            .filter(|(key, _)| match self {
                Projection::Include { fields, id } => {
                    if key.as_str() == "_id" {
                        *id
                    } else {
                        fields.contains(key)
                    }
                }
                Projection::Exclude { fields, id } => {
                    if key.as_str() == "_id" {
                        *id
                    } else {
                        !fields.contains(key)
                    }
                }
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn truthy(flag: &Bson) -> Option<bool> {
    match flag {
        Bson::Boolean(b) => Some(*b),
        other => as_f64(other).map(|f| f != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn driver_with(docs: Vec<Document>) -> MemoryDriver {
        let driver = MemoryDriver::new();
        driver.insert_many("db", "people", docs);
        driver
    }

    fn find(
        driver: &MemoryDriver,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Vec<Document>, ClientError> {
        let mut conn = driver.connect("memory://").unwrap();
        let cursor = conn.find(FindRequest {
            database: "db",
            collection: "people",
            filter,
            projection,
            limit: 0,
        })?;
        cursor.collect()
    }

    fn people() -> Vec<Document> {
        vec![
            doc! { "_id": 1, "name": "Ada", "age": 36, "tags": ["math", "code"], "addr": { "city": "London" } },
            doc! { "_id": 2, "name": "Grace", "age": 85_i64, "tags": ["navy"], "addr": { "city": "Arlington" } },
            doc! { "_id": 3, "name": "Linus", "age": 54.0 },
        ]
    }

    fn ids(docs: &[Document]) -> Vec<i32> {
        docs.iter().map(|d| d.get_i32("_id").unwrap()).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let driver = driver_with(people());
        assert_eq!(ids(&find(&driver, doc! {}, None).unwrap()), [1, 2, 3]);
    }

    #[test]
    fn equality_across_numeric_widths() {
        let driver = driver_with(people());
        assert_eq!(ids(&find(&driver, doc! { "age": 85 }, None).unwrap()), [2]);
        assert_eq!(ids(&find(&driver, doc! { "age": 54 }, None).unwrap()), [3]);
    }

    #[test]
    fn dotted_paths_and_array_membership() {
        let driver = driver_with(people());
        assert_eq!(ids(&find(&driver, doc! { "addr.city": "London" }, None).unwrap()), [1]);
        assert_eq!(ids(&find(&driver, doc! { "tags": "navy" }, None).unwrap()), [2]);
    }

    #[test]
    fn operators_and_logical_groups() {
        let driver = driver_with(people());
        let filter = doc! { "name": { "$in": ["Ada", "Linus"] }, "tags": { "$exists": false } };
        assert_eq!(ids(&find(&driver, filter, None).unwrap()), [3]);

        let filter = doc! { "$or": [{ "name": "Ada" }, { "age": { "$eq": 85 } }] };
        assert_eq!(ids(&find(&driver, filter, None).unwrap()), [1, 2]);

        let filter = doc! { "$and": [{ "name": { "$ne": "Ada" } }, { "addr": { "$exists": true } }] };
        assert_eq!(ids(&find(&driver, filter, None).unwrap()), [2]);
    }

    #[test]
    fn unknown_operator_is_an_operation_error() {
        let driver = driver_with(people());
        let err = find(&driver, doc! { "age": { "$near": 1 } }, None).unwrap_err();
        assert!(matches!(err, ClientError::Operation(_)));
    }

    #[test]
    fn inclusion_projection_keeps_id_by_default() {
        let driver = driver_with(people());
        let docs = find(&driver, doc! { "_id": 1 }, Some(doc! { "name": 1 })).unwrap();
        assert_eq!(docs, [doc! { "_id": 1, "name": "Ada" }]);
    }

    #[test]
    fn exclusion_projection_and_id_suppression() {
        let driver = driver_with(people());
        let docs = find(&driver, doc! { "_id": 3 }, Some(doc! { "age": 0, "_id": 0 })).unwrap();
        assert_eq!(docs, [doc! { "name": "Linus" }]);

        let docs = find(&driver, doc! { "_id": 3 }, Some(doc! { "name": 1, "_id": 0 })).unwrap();
        assert_eq!(docs, [doc! { "name": "Linus" }]);
    }

    #[test]
    fn mixed_projection_is_rejected() {
        let driver = driver_with(people());
        let err = find(&driver, doc! {}, Some(doc! { "name": 1, "age": 0 })).unwrap_err();
        assert!(err.to_string().contains("Cannot do exclusion"), "{err}");
    }

    #[test]
    fn unknown_namespace_is_empty() {
        let driver = MemoryDriver::new();
        assert!(find(&driver, doc! {}, None).unwrap().is_empty());
    }

    #[test]
    fn injected_failures() {
        let driver = driver_with(people());
        driver.fail_find("boom");
        assert!(matches!(
            find(&driver, doc! {}, None).unwrap_err(),
            ClientError::Operation(_)
        ));

        driver.fail_connect("refused");
        assert!(matches!(
            driver.connect("memory://").err(),
            Some(ClientError::Connection(_))
        ));
    }
}
