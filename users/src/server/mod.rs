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
use crate::inbound::http::HttpState;
use crate::inbound::http::couriers::{create_courier, get_courier, list_couriers};
use crate::inbound::http::users::{authorize, login, sign_up};

/// Build the application with every route, the tracing middleware and
/// envelope-producing extractor configuration.
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
        .wrap(Trace)
        .service(sign_up)
        .service(login)
        .service(authorize)
        .service(create_courier)
        .service(list_couriers)
        .service(get_courier)
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
        info!(%addr, "users service listening");
    }

    health_state.mark_ready();
    Ok(server.run())
}
