use std::io::Write;
use std::path::PathBuf;

use bson::Document;
use getdoc_cli::config::{Auth, Config, ConnectionTarget, QuerySource};
use getdoc_client::MemoryDriver;
use getdoc_query::OutputStyle;

pub const DATABASE: &str = "traza";
pub const COLLECTION: &str = "processed";

pub fn driver_with(docs: Vec<Document>) -> MemoryDriver {
    let driver = MemoryDriver::new();
    driver.insert_many(DATABASE, COLLECTION, docs);
    driver
}

pub fn config(source: QuerySource) -> Config {
    Config {
        target: ConnectionTarget::Parts {
            host: "localhost".into(),
            port: 27017,
            auth: Auth::None,
        },
        database: DATABASE.into(),
        collection: COLLECTION.into(),
        source,
        projection: None,
        limit: 0,
        output: OutputStyle::Compact,
        legacy_decode: false,
    }
}

pub fn literal(text: &str) -> QuerySource {
    QuerySource::Literal(text.to_string())
}

/// Write `contents` to a fresh file and return it with its owning directory.
pub fn query_file(contents: &str) -> (PathBuf, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("query.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (path, dir)
}
