//! Shared `bb8` pool of `diesel-async` PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// How long a repository call waits for a free connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// The pool could not be built or could not hand out a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available in time, or connecting failed.
    #[error("failed to get connection from pool: {message}")]
    Checkout {
        /// Reason reported by bb8.
        message: String,
    },
    /// The pool settings were rejected.
    #[error("failed to build connection pool: {message}")]
    Build {
        /// Reason reported by bb8.
        message: String,
    },
}

impl PoolError {
    /// A failed checkout.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// A failed build.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Connections are opened lazily, so building succeeds before the database
/// is reachable and failures surface on the first checkout.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build a pool holding at most `max_connections` connections.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when `max_connections` is zero or bb8 refuses the
    /// settings.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, PoolError> {
        if max_connections == 0 {
            return Err(PoolError::build("max_connections must be at least 1"));
        }
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(max_connections)
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when none is available within the checkout
    /// timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
