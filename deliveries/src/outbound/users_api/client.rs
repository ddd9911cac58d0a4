//! Reqwest-backed users service adapter.
//!
//! This adapter owns transport details only: URL building, timeouts, status
//! mapping and JSON decoding into domain identities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{UserDto, UserEnvelopeDto};
use crate::domain::ports::{
    CourierDirectory, CourierDirectoryError, IdentityError, IdentityProvider,
};
use crate::domain::{Caller, Courier, UserId};
use crate::relay::CredentialRelay;

/// Client for the users service rooted at one base URL.
#[derive(Clone)]
pub struct UsersApiClient {
    client: Client,
    base_url: Url,
}

impl UsersApiClient {
    /// Build a client with an explicit request timeout.
    ///
    /// A base URL with a path prefix is honoured: `http://gw/users` resolves
    /// `/auth` to `http://gw/users/auth`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, String> {
        self.base_url
            .join(path)
            .map_err(|err| format!("cannot build users service URL for {path}: {err}"))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl IdentityProvider for UsersApiClient {
    async fn identify(&self, authorization: &str) -> Result<Caller, IdentityError> {
        let url = self
            .endpoint("auth")
            .map_err(IdentityError::transport)?;
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| IdentityError::transport(transport_message(&err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| IdentityError::transport(transport_message(&err)))?;
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "users service refused the token");
            return Err(IdentityError::unauthenticated(status_message(status, &body)));
        }

        let envelope: UserEnvelopeDto = serde_json::from_slice(&body)
            .map_err(|err| IdentityError::decode(format!("invalid /auth payload: {err}")))?;
        Ok(envelope.data.into_caller())
    }
}

#[async_trait]
impl CourierDirectory for UsersApiClient {
    async fn find_courier(&self, id: UserId) -> Result<Option<Courier>, CourierDirectoryError> {
        let url = self
            .endpoint(&format!("couriers/{id}"))
            .map_err(CourierDirectoryError::transport)?;
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json");
        let response = CredentialRelay::decorate(request)
            .send()
            .await
            .map_err(|err| CourierDirectoryError::transport(transport_message(&err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| CourierDirectoryError::transport(transport_message(&err)))?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_courier_status_error(status, &body));
        }

        let user: UserDto = serde_json::from_slice(&body).map_err(|err| {
            CourierDirectoryError::decode(format!("invalid courier payload: {err}"))
        })?;
        Ok(user.into_courier())
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timed out: {error}")
    } else {
        error.to_string()
    }
}

fn map_courier_status_error(status: StatusCode, body: &[u8]) -> CourierDirectoryError {
    let message = status_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CourierDirectoryError::rejected(message)
        }
        _ => CourierDirectoryError::transport(message),
    }
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
