//! Reqwest client for the users service.
//!
//! One client backs both the identity lookup (`POST /auth` with the inbound
//! `Authorization` header forwarded verbatim) and courier lookups
//! (`GET /couriers/{id}` decorated through the credential relay).

mod client;
mod dto;

pub use client::UsersApiClient;
