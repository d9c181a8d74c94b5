use std::fmt;
use std::path::PathBuf;

use getdoc_query::OutputStyle;

use crate::args::Cli;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    File(PathBuf),
    Literal(String),
}

impl fmt::Display for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuerySource::File(path) => write!(f, "{}", path.display()),
            QuerySource::Literal(_) => write!(f, "argument"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Credentials {
        username: String,
        password: String,
        auth_source: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Uri(String),
    Parts { host: String, port: u16, auth: Auth },
}

impl ConnectionTarget {
    pub fn connection_string(&self) -> String {
        match self {
            ConnectionTarget::Uri(uri) => uri.clone(),
            ConnectionTarget::Parts { host, port, auth } => match auth {
                Auth::None => format!("mongodb://{host}:{port}/"),
                Auth::Credentials {
                    username,
                    password,
                    auth_source,
                } => {
                    let mut uri = format!(
                        "mongodb://{}:{}@{host}:{port}/",
                        urlencoding::encode(username),
                        urlencoding::encode(password)
                    );
                    if let Some(source) = auth_source {
                        uri.push_str("?authSource=");
                        uri.push_str(&urlencoding::encode(source));
                    }
                    uri
                }
            },
        }
    }

    /// The connection string with any password masked, for logs.
    pub fn redacted(&self) -> String {
        redact(&self.connection_string())
    }
}

fn redact(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://").map(|i| i + 3) else {
        return uri.to_string();
    };
    let authority_end = uri[scheme_end..]
        .find(['/', '?'])
        .map_or(uri.len(), |i| scheme_end + i);
    let Some(at) = uri[scheme_end..authority_end].rfind('@').map(|i| scheme_end + i) else {
        return uri.to_string();
    };
    match uri[scheme_end..at].find(':') {
        Some(colon) => format!("{}:***{}", &uri[..scheme_end + colon], &uri[at..]),
        None => uri.to_string(),
    }
}

/// Everything one invocation needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: ConnectionTarget,
    pub database: String,
    pub collection: String,
    pub source: QuerySource,
    pub projection: Option<QuerySource>,
    pub limit: i64,
    pub output: OutputStyle,
    pub legacy_decode: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let target = match cli.uri {
            Some(uri) => ConnectionTarget::Uri(uri),
            None => ConnectionTarget::Parts {
                host: cli.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: cli.port.unwrap_or(DEFAULT_PORT),
                auth: match (cli.username, cli.password) {
                    (Some(username), Some(password)) => Auth::Credentials {
                        username,
                        password,
                        auth_source: cli.auth_source,
                    },
                    _ => Auth::None,
                },
            },
        };

        // clap guarantees exactly one of the two is present.
        let source = match (cli.query_file, cli.query) {
            (Some(path), _) => QuerySource::File(path),
            (None, text) => QuerySource::Literal(text.unwrap_or_default()),
        };

        let projection = match (cli.projection_file, cli.projection) {
            (Some(path), _) => Some(QuerySource::File(path)),
            (None, text) => text.map(QuerySource::Literal),
        };

        Config {
            target,
            database: cli.database,
            collection: cli.collection,
            source,
            projection,
            limit: cli.limit,
            output: if cli.pretty {
                OutputStyle::Pretty
            } else {
                OutputStyle::Compact
            },
            legacy_decode: cli.legacy_decode,
        }
    }
}
