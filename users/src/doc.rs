//! OpenAPI document for the users service.
//!
//! Served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer token scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token issued by POST /login."))
            .build();
        components.add_security_scheme("bearer", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the users REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Users service API",
        description = "Account signup, login, bearer token validation and courier administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::login,
        crate::inbound::http::users::authorize,
        crate::inbound::http::couriers::create_courier,
        crate::inbound::http::couriers::list_couriers,
        crate::inbound::http::couriers::get_courier,
        service_core::health::ready,
        service_core::health::live,
    ),
    components(schemas(
        service_core::ErrorEnvelope,
        service_core::Error,
        service_core::ErrorCode,
        service_core::Role,
        crate::domain::User,
        crate::domain::UserId,
        crate::domain::AccountStatus,
        crate::domain::ports::IssuedToken,
        crate::inbound::http::users::CredentialsRequest,
        crate::inbound::http::users::UserEnvelope,
    )),
    tags(
        (name = "users", description = "Signup, login and token validation"),
        (name = "couriers", description = "Courier administration"),
        (name = "health", description = "Orchestrator probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/signup",
            "/login",
            "/auth",
            "/courier",
            "/couriers",
            "/couriers/{id}",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
