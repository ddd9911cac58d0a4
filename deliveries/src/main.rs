//! Deliveries service entry-point.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use service_core::health::HealthState;
use service_core::persistence::{DbPool, run_migrations};
use tracing::{info, warn};

use deliveries::MIGRATIONS;
use deliveries::config::DeliveriesSettings;
use deliveries::outbound::persistence::DieselDeliveryRepository;
use deliveries::outbound::users_api::UsersApiClient;
use deliveries::server::{ServerConfig, build_http_state, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    service_core::telemetry::init();

    let settings =
        DeliveriesSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let database_url = settings.database_url()?;
    let users_base_url = settings.users_base_url()?;

    run_migrations(database_url.as_str().to_owned(), MIGRATIONS)
        .await
        .wrap_err("database migrations failed")?;
    let pool = DbPool::connect(database_url.as_str(), settings.db_max_connections())
        .await
        .wrap_err("failed to build connection pool")?;

    info!(users_base_url = %users_base_url, "using users service");
    let users = Arc::new(
        UsersApiClient::new(users_base_url, settings.http_client_timeout())
            .wrap_err("failed to build users service client")?,
    );

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr()?)
        .with_shutdown_timeout(settings.shutdown_timeout())
        .without_signals();
    let server = create_server(
        health_state.clone(),
        build_http_state(
            Arc::new(DieselDeliveryRepository::new(pool)),
            users.clone(),
            users,
            Arc::new(DefaultClock),
        ),
        config,
    )?;

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        service_core::shutdown::signal().await;
        warn!("shutdown requested; draining");
        health_state.mark_draining();
        handle.stop(true).await;
    });

    server.await.wrap_err("server terminated with an error")
}
