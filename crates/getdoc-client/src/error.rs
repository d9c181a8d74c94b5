pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server unreachable, DNS failure, or rejected credentials.
    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    /// Anything else the server or driver reports while running a command.
    #[error("driver operation failed: {0}")]
    Operation(#[source] BoxError),
}

impl ClientError {
    pub fn connection(cause: impl Into<BoxError>) -> Self {
        ClientError::Connection(cause.into())
    }

    pub fn operation(cause: impl Into<BoxError>) -> Self {
        ClientError::Operation(cause.into())
    }
}
