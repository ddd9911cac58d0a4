//! OpenAPI document for the deliveries service.
//!
//! Served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer scheme; tokens are issued and validated by the
/// users service.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token issued by the users service POST /login."))
            .build();
        components.add_security_scheme("bearer", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the deliveries REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Deliveries service API",
        description = "Delivery requests, courier assignment and completion."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::deliveries::create_delivery,
        crate::inbound::http::deliveries::list_deliveries,
        crate::inbound::http::deliveries::get_delivery,
        crate::inbound::http::deliveries::complete_delivery,
        crate::inbound::http::deliveries::assign_courier,
        service_core::health::ready,
        service_core::health::live,
    ),
    components(schemas(
        service_core::ErrorEnvelope,
        service_core::Error,
        service_core::ErrorCode,
        crate::domain::Delivery,
        crate::domain::DeliveryId,
        crate::domain::DeliveryStatus,
        crate::domain::UserId,
        crate::inbound::http::deliveries::CreateDeliveryRequest,
    )),
    tags(
        (name = "deliveries", description = "Delivery lifecycle"),
        (name = "health", description = "Orchestrator probes")
    )
)]
pub struct ApiDoc;
