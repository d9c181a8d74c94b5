use bson::Document;

use crate::error::ClientError;

/// A single find against one namespace.
#[derive(Debug, Clone)]
pub struct FindRequest<'a> {
    pub database: &'a str,
    pub collection: &'a str,
    pub filter: Document,
    pub projection: Option<Document>,
    /// `<= 0` means unbounded.
    pub limit: i64,
}

/// Entry point of a database driver: turns a connection string into a live
/// connection.
pub trait Driver {
    type Connection: Connection;

    /// Establishes a connection and verifies the server is reachable, so that
    /// unreachable hosts and rejected credentials are reported here rather
    /// than on the first query.
    fn connect(&self, uri: &str) -> Result<Self::Connection, ClientError>;
}

pub trait Connection {
    /// Runs a find and returns a cursor over the matching documents.
    fn find<'a>(
        &'a mut self,
        request: FindRequest<'_>,
    ) -> Result<Box<dyn Iterator<Item = Result<Document, ClientError>> + 'a>, ClientError>;

    /// Releases the connection. Called exactly once by [`ConnectionGuard`].
    ///
    /// [`ConnectionGuard`]: crate::ConnectionGuard
    fn close(&mut self);
}
