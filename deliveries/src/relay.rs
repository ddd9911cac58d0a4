//! Request-scoped credential relay.
//!
//! Outbound calls made while serving a request must carry that request's
//! credentials. The decorator for the in-flight request lives in task-local
//! storage scoped to the request future, so concurrent requests never see
//! each other's decorator and nothing needs cleaning up afterwards.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Wrap
//! spawned work in [`CredentialRelay::scope`] when it makes outbound calls.
//!
//! ```
//! use std::sync::Arc;
//!
//! use deliveries::relay::{CredentialRelay, HeaderDecorator, PassThrough};
//! use reqwest::header::{AUTHORIZATION, HeaderValue};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let decorator = HeaderDecorator::new(
//!     PassThrough,
//!     AUTHORIZATION,
//!     HeaderValue::from_static("Bearer abc"),
//! );
//! let request = CredentialRelay::scope(Arc::new(decorator), async {
//!     CredentialRelay::decorate(reqwest::Client::new().get("http://users.invalid/"))
//!         .build()
//! })
//! .await
//! .expect("request builds");
//! assert_eq!(request.headers()[AUTHORIZATION], "Bearer abc");
//! # });
//! ```

use std::future::Future;
use std::sync::Arc;

use reqwest::RequestBuilder;
use reqwest::header::{HeaderName, HeaderValue};
use tokio::task_local;

task_local! {
    static CURRENT: Arc<dyn RequestDecorator>;
}

/// Stamps an outbound request.
pub trait RequestDecorator: Send + Sync {
    /// Return `request` with this decorator's changes applied.
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Leaves requests untouched; the base of every decorator chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl RequestDecorator for PassThrough {
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }
}

/// Applies the wrapped decorator, then sets one header.
#[derive(Debug, Clone)]
pub struct HeaderDecorator<D> {
    inner: D,
    name: HeaderName,
    value: HeaderValue,
}

impl<D> HeaderDecorator<D> {
    /// Set `name: value` after `inner` has run.
    pub const fn new(inner: D, name: HeaderName, value: HeaderValue) -> Self {
        Self { inner, name, value }
    }
}

impl<D: RequestDecorator> RequestDecorator for HeaderDecorator<D> {
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        self.inner
            .decorate(request)
            .header(self.name.clone(), self.value.clone())
    }
}

/// Entry points for registering and applying the current request's
/// decorator.
pub struct CredentialRelay;

impl CredentialRelay {
    /// Run `fut` with `decorator` registered for every outbound call it
    /// makes. An inner scope overrides an outer one for its duration.
    pub async fn scope<Fut>(decorator: Arc<dyn RequestDecorator>, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(decorator, fut).await
    }

    /// Apply the decorator registered for the current request, or pass
    /// `request` through when none is.
    pub fn decorate(request: RequestBuilder) -> RequestBuilder {
        match CURRENT.try_with(Arc::clone) {
            Ok(decorator) => decorator.decorate(request),
            Err(_) => request,
        }
    }
}
