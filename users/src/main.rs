//! Users service entry-point.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use service_core::health::HealthState;
use service_core::persistence::{DbPool, run_migrations};
use tracing::{info, warn};

use users::MIGRATIONS;
use users::config::UsersSettings;
use users::domain::UserService;
use users::outbound::crypto::{BcryptPasswordHasher, JwtTokenCodec};
use users::outbound::persistence::DieselUserRepository;
use users::server::{ServerConfig, build_http_state, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    service_core::telemetry::init();

    let settings = UsersSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let database_url = settings.database_url()?;
    let jwt = settings.jwt()?;
    let bootstrap_admin = settings.bootstrap_admin()?;

    run_migrations(database_url.as_str().to_owned(), MIGRATIONS)
        .await
        .wrap_err("database migrations failed")?;
    let pool = DbPool::connect(database_url.as_str(), settings.db_max_connections())
        .await
        .wrap_err("failed to build connection pool")?;

    let users = Arc::new(DieselUserRepository::new(pool));
    let hasher = Arc::new(BcryptPasswordHasher::new(settings.password_hash_cost()?)?);
    let tokens = Arc::new(JwtTokenCodec::new(&jwt, Arc::new(DefaultClock))?);

    if let Some(credentials) = bootstrap_admin {
        let admin = UserService::new(users.clone(), hasher.clone())
            .ensure_admin(&credentials)
            .await
            .wrap_err("failed to provision bootstrap administrator")?;
        info!(user_id = %admin.id(), "bootstrap administrator present");
    }

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr()?)
        .with_shutdown_timeout(settings.shutdown_timeout())
        .without_signals();
    let server = create_server(
        health_state.clone(),
        build_http_state(users, hasher, tokens),
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
