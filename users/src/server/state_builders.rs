//! Wiring of domain services into the HTTP state.

use std::sync::Arc;

use crate::domain::ports::{PasswordHasher, TokenCodec, UserRepository};
use crate::domain::{AuthService, UserService};
use crate::inbound::http::HttpState;

/// Build the HTTP state from driven adapters.
///
/// One [`UserService`] backs both account ports; authentication shares the
/// same store and hasher.
pub fn build_http_state(
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
) -> HttpState {
    let auth = Arc::new(AuthService::new(
        Arc::clone(&users),
        Arc::clone(&hasher),
        tokens,
    ));
    let accounts = Arc::new(UserService::new(users, hasher));
    HttpState::new(auth, accounts.clone(), accounts)
}
