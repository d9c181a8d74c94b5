use bson::{Document, doc};
use mongodb::error::{Error, ErrorKind};
use mongodb::sync::Client;
use tracing::debug;

use crate::driver::{Connection, Driver, FindRequest};
use crate::error::ClientError;

/// MongoDB over the driver's blocking API.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl Driver for MongoDriver {
    type Connection = MongoConnection;

    fn connect(&self, uri: &str) -> Result<MongoConnection, ClientError> {
        // Everything that fails here, a bad connection string included, is a
        // connection failure. The client connects lazily, so ping to surface
        // unreachable servers and rejected credentials now.
        let client = Client::with_uri_str(uri).map_err(ClientError::connection)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(ClientError::connection)?;
        debug!("connected");
        Ok(MongoConnection {
            client: Some(client),
        })
    }
}

pub struct MongoConnection {
    client: Option<Client>,
}

impl Connection for MongoConnection {
    fn find<'a>(
        &'a mut self,
        request: FindRequest<'_>,
    ) -> Result<Box<dyn Iterator<Item = Result<Document, ClientError>> + 'a>, ClientError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ClientError::operation("connection already closed"))?;
        let collection = client
            .database(request.database)
            .collection::<Document>(request.collection);

        let mut find = collection.find(request.filter);
        if let Some(projection) = request.projection {
            find = find.projection(projection);
        }
        if request.limit > 0 {
            find = find.limit(request.limit);
        }

        let cursor = find.run().map_err(classify)?;
        Ok(Box::new(cursor.map(|doc| doc.map_err(classify))))
    }

    fn close(&mut self) {
        // Dropping the last handle shuts the client's pools down.
        drop(self.client.take());
    }
}

fn classify(err: Error) -> ClientError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Authentication { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => ClientError::connection(err),
        _ => ClientError::operation(err),
    }
}
