use bson::Document;
use tracing::debug;

use crate::driver::{Connection, FindRequest};
use crate::error::ClientError;

/// Run `query` against `database.collection` and drain the cursor.
///
/// A positive `limit` caps the result set; zero or negative returns every
/// match. A namespace that does not exist yields an empty result.
pub fn execute<C: Connection + ?Sized>(
    connection: &mut C,
    database: &str,
    collection: &str,
    query: Document,
    projection: Option<Document>,
    limit: i64,
) -> Result<Vec<Document>, ClientError> {
    debug!(database, collection, limit, "find");

    let cap = if limit > 0 {
        usize::try_from(limit).unwrap_or(usize::MAX)
    } else {
        usize::MAX
    };

    let cursor = connection.find(FindRequest {
        database,
        collection,
        filter: query,
        projection,
        limit,
    })?;

    cursor.take(cap).collect()
}
