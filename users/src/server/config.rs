//! HTTP server configuration object.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

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
    /// Listen on `bind_addr` with a ten second shutdown budget.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind: Bind::Addr(bind_addr),
            shutdown_timeout: Duration::from_secs(10),
            workers: None,
            disable_signals: false,
        }
    }

    /// Serve on an already bound listener. Tests bind `127.0.0.1:0` and read
    /// the assigned port back from the listener.
    #[must_use]
    pub const fn from_listener(listener: TcpListener) -> Self {
        Self {
            bind: Bind::Listener(listener),
            shutdown_timeout: Duration::from_secs(10),
            workers: None,
            disable_signals: false,
        }
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
