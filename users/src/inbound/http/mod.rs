//! HTTP inbound adapter exposing the account and token endpoints.

pub mod auth;
pub mod couriers;
pub mod state;
pub mod users;

pub use auth::AuthenticatedUser;
pub use state::HttpState;
