use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::driver::{Connection, Driver};
use crate::error::ClientError;

/// Owns a connection and closes it when dropped, on success and error paths
/// alike.
pub struct ConnectionGuard<C: Connection> {
    connection: C,
    released: bool,
}

impl<C: Connection> ConnectionGuard<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            released: false,
        }
    }

    /// Closes the connection now instead of at the end of the scope.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            self.connection.close();
            debug!("connection released");
        }
    }
}

impl<C: Connection> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.connection
    }
}

impl<C: Connection> DerefMut for ConnectionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.connection
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.close_once();
    }
}

/// Connect, run `f` against the connection, then release it whatever `f`
/// returned.
pub fn with_connection<D, T, E, F>(driver: &D, uri: &str, f: F) -> Result<T, E>
where
    D: Driver,
    E: From<ClientError>,
    F: FnOnce(&mut D::Connection) -> Result<T, E>,
{
    let mut guard = ConnectionGuard::new(driver.connect(uri)?);
    f(&mut *guard)
}
