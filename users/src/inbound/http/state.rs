//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on driving ports,
//! so they can be exercised with mocks.

use std::sync::Arc;

use crate::domain::ports::{AccountsCommand, Authenticator, CouriersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn Authenticator>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub couriers: Arc<dyn CouriersQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        auth: Arc<dyn Authenticator>,
        accounts: Arc<dyn AccountsCommand>,
        couriers: Arc<dyn CouriersQuery>,
    ) -> Self {
        Self {
            auth,
            accounts,
            couriers,
        }
    }
}
