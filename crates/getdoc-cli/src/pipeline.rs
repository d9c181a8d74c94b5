use getdoc_client::{ConnectionGuard, Driver, execute};
use getdoc_query::serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Error;
use crate::loader::{load_projection, load_query};

/// Run one query end to end and return the rendered JSON.
///
/// Input is loaded and normalized before connecting, so bad JSON or literals
/// are reported without waiting on the server. Once connected, the connection
/// is released on every path out of this function.
pub fn run<D: Driver>(driver: &D, config: &Config) -> Result<String, Error> {
    let query = load_query(&config.source)?;
    let projection = load_projection(config.projection.as_ref())?;
    debug!(%query, projection = ?projection, "normalized");

    info!(server = %config.target.redacted(), "connecting");
    let mut connection = ConnectionGuard::new(driver.connect(&config.target.connection_string())?);

    let results = execute(
        &mut *connection,
        &config.database,
        &config.collection,
        query,
        projection,
        config.limit,
    )?;
    connection.release();

    info!(
        database = %config.database,
        collection = %config.collection,
        count = results.len(),
        "query complete"
    );

    serialize(results, config.legacy_decode, config.output).map_err(|e| Error::Output(e.into()))
}
