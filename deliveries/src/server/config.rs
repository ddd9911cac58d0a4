//! HTTP server configuration object.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the server listens.
pub(crate) enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind: Bind,
    pub(crate) shutdown_timeout: Duration,
    pub(crate) workers: Option<usize>,
    pub(crate) disable_signals: bool,
}

impl ServerConfig {
    const fn with_bind(bind: Bind) -> Self {
        Self {
            bind,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            workers: None,
            disable_signals: false,
        }
    }

    /// Listen on `bind_addr`.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self::with_bind(Bind::Addr(bind_addr))
    }

    /// Serve on an already bound listener.
    #[must_use]
    pub const fn from_listener(listener: TcpListener) -> Self {
        Self::with_bind(Bind::Listener(listener))
    }

    /// How long in-flight requests may run once shutdown starts.
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Fix the worker count instead of one per core.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Leave signal handling to the embedding process.
    #[must_use]
    pub const fn without_signals(mut self) -> Self {
        self.disable_signals = true;
        self
    }
}
