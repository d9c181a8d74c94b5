mod driver;
mod error;
mod execute;
mod guard;

pub use driver::{Connection, Driver, FindRequest};
pub use error::{BoxError, ClientError};
pub use execute::execute;
pub use guard::{ConnectionGuard, with_connection};

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::{MongoConnection, MongoDriver};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::{MemoryConnection, MemoryDriver};
