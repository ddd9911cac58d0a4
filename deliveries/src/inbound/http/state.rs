//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on ports, so they
//! can be exercised with mocks.

use std::sync::Arc;

use crate::domain::ports::{DeliveriesCommand, DeliveriesQuery, IdentityProvider};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityProvider>,
    pub deliveries: Arc<dyn DeliveriesCommand>,
    pub queries: Arc<dyn DeliveriesQuery>,
}

impl HttpState {
    /// Bundle the ports.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        deliveries: Arc<dyn DeliveriesCommand>,
        queries: Arc<dyn DeliveriesQuery>,
    ) -> Self {
        Self {
            identity,
            deliveries,
            queries,
        }
    }
}
