//! HTTP inbound adapter exposing the delivery lifecycle endpoints.

pub mod auth;
pub mod deliveries;
pub mod relay;
pub mod state;

pub use auth::AuthenticatedCaller;
pub use relay::RelayCredentials;
pub use state::HttpState;
