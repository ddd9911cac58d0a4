//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use service_core::Trace;
use service_core::extract::{json_config, path_config};
use service_core::health::{HealthState, live, ready};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use config::Bind;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::deliveries::{
    assign_courier, complete_delivery, create_delivery, get_delivery, list_deliveries,
};
use crate::inbound::http::{HttpState, RelayCredentials};

/// Build the application with every route, the credential relay inside the
/// tracing middleware, and envelope-producing extractor configuration.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(path_config())
        .wrap(RelayCredentials)
        .wrap(Trace)
        .service(create_delivery)
        .service(list_deliveries)
        .service(get_delivery)
        .service(complete_delivery)
        .service(assign_courier)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server and mark the service ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind,
        shutdown_timeout,
        workers,
        disable_signals,
    } = config;

    let mut server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .shutdown_timeout(shutdown_timeout.as_secs());
    if let Some(workers) = workers {
        server = server.workers(workers);
    }
    if disable_signals {
        server = server.disable_signals();
    }
    let server = match bind {
        Bind::Addr(addr) => server.bind(addr)?,
        Bind::Listener(listener) => server.listen(listener)?,
    };
    for addr in server.addrs() {
        info!(%addr, "deliveries service listening");
    }

    health_state.mark_ready();
    Ok(server.run())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use mockable::DefaultClock;
    use service_core::TRACE_ID_HEADER;

    use super::*;
    use crate::test_support::{InMemoryDeliveryRepository, StaticCourierDirectory};
    use crate::domain::ports::MockIdentityProvider;

    fn http_state(identity: MockIdentityProvider) -> web::Data<HttpState> {
        web::Data::new(build_http_state(
            Arc::new(InMemoryDeliveryRepository::new()),
            Arc::new(StaticCourierDirectory::default()),
            Arc::new(identity),
            Arc::new(DefaultClock),
        ))
    }

    #[actix_web::test]
    async fn probes_answer_without_credentials() {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let app = actix_test::init_service(build_app(health, http_state(MockIdentityProvider::new())))
            .await;

        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health/ready").to_request())
                .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn refusals_carry_the_trace_id() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_identify().never();
        let app = actix_test::init_service(build_app(
            web::Data::new(HealthState::new()),
            http_state(identity),
        ))
        .await;

        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/deliveries").to_request())
                .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(TRACE_ID_HEADER));
    }
}
