use std::path::PathBuf;

use getdoc_client::ClientError;
use getdoc_query::LiteralError;

const QUOTING_HINT: &str = "check the query file format, and wrap JSON arguments in single quotes, \
     e.g. --projection '{\"name\": 1}'";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {what} ({origin}): {reason}; {hint}", hint = QUOTING_HINT)]
    MalformedInput {
        what: &'static str,
        origin: String,
        reason: String,
    },

    #[error(transparent)]
    InvalidLiteral(#[from] LiteralError),

    #[error("{0}")]
    ConnectionFailure(#[source] ClientError),

    #[error("{0}")]
    DriverOperation(#[source] ClientError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Process exit code, following the BSD sysexits convention.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::MalformedInput { .. } | Error::InvalidLiteral(_) => 65,
            Error::FileNotFound { .. } => 66,
            Error::ConnectionFailure(_) => 69,
            Error::DriverOperation(_) => 70,
            Error::Output(_) => 74,
        }
    }
}

impl From<ClientError> for Error {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Connection(_) => Error::ConnectionFailure(e),
            ClientError::Operation(_) => Error::DriverOperation(e),
        }
    }
}
