//! Delivery lifecycle handlers.
//!
//! ```text
//! POST /deliveries                              {"destination":"Main St 1"}
//! GET  /deliveries
//! GET  /deliveries/{id}
//! PUT  /deliveries/{id}/complete
//! POST /deliveries/{id}/courier/{courierId}
//! ```

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use service_core::{ApiResult, Error};
use utoipa::ToSchema;

use super::auth::{AuthenticatedCaller, DeliveryScope};
use super::state::HttpState;
use crate::domain::{Delivery, DeliveryId, Destination, DestinationError, UserId};

/// Body of a delivery request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateDeliveryRequest {
    #[schema(example = "Main St 1")]
    pub destination: String,
}

fn map_destination_error(err: DestinationError) -> Error {
    let code = match err {
        DestinationError::Empty => "empty_destination",
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "destination", "code": code }))
}

impl CreateDeliveryRequest {
    /// Validated destination.
    pub fn destination(&self) -> Result<Destination, Error> {
        Destination::new(&self.destination).map_err(map_destination_error)
    }
}

/// Request a delivery for the calling user.
#[utoipa::path(
    post,
    path = "/deliveries",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery created", body = Delivery),
        (status = 400, description = "Invalid body", body = Error),
        (status = 401, description = "Missing or invalid credentials", body = Error),
        (status = 403, description = "Caller is not a user", body = Error)
    ),
    tags = ["deliveries"],
    operation_id = "createDelivery",
    security(("bearer" = []))
)]
#[post("/deliveries")]
pub async fn create_delivery(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    payload: web::Json<CreateDeliveryRequest>,
) -> ApiResult<web::Json<Delivery>> {
    let recipient = caller.require_user()?;
    let destination = payload.destination()?;
    let delivery = state.deliveries.create(recipient, destination).await?;
    Ok(web::Json(delivery))
}

/// List every delivery for admins, or the caller's assignments for couriers.
#[utoipa::path(
    get,
    path = "/deliveries",
    responses(
        (status = 200, description = "Deliveries ordered by id", body = [Delivery]),
        (status = 401, description = "Missing or invalid credentials", body = Error),
        (status = 403, description = "Caller is neither admin nor courier", body = Error),
        (status = 503, description = "Delivery store unavailable", body = Error)
    ),
    tags = ["deliveries"],
    operation_id = "listDeliveries",
    security(("bearer" = []))
)]
#[get("/deliveries")]
pub async fn list_deliveries(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
) -> ApiResult<web::Json<Vec<Delivery>>> {
    let deliveries = match caller.listing_scope()? {
        DeliveryScope::All => state.queries.list_all().await?,
        DeliveryScope::AssignedTo(courier) => state.queries.list_for_courier(courier).await?,
    };
    Ok(web::Json(deliveries))
}

/// Fetch one delivery. Couriers may only see deliveries assigned to them.
#[utoipa::path(
    get,
    path = "/deliveries/{id}",
    params(("id" = i64, Path, description = "Delivery id")),
    responses(
        (status = 200, description = "Delivery", body = Delivery),
        (status = 400, description = "No delivery with this id", body = Error),
        (status = 401, description = "Missing or invalid credentials", body = Error),
        (status = 403, description = "Not visible to the caller", body = Error)
    ),
    tags = ["deliveries"],
    operation_id = "getDelivery",
    security(("bearer" = []))
)]
#[get("/deliveries/{id}")]
pub async fn get_delivery(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Delivery>> {
    caller.listing_scope()?;
    let delivery = state.queries.find(DeliveryId::new(id.into_inner())).await?;
    caller.ensure_can_view(&delivery)?;
    Ok(web::Json(delivery))
}

/// Mark a delivery handed over by the calling courier.
#[utoipa::path(
    put,
    path = "/deliveries/{id}/complete",
    params(("id" = i64, Path, description = "Delivery id")),
    responses(
        (status = 200, description = "Delivery completed", body = Delivery),
        (status = 400, description = "Unknown delivery, not completable or raced", body = Error),
        (status = 401, description = "Missing or invalid credentials", body = Error),
        (status = 403, description = "Not the assigned courier", body = Error)
    ),
    tags = ["deliveries"],
    operation_id = "completeDelivery",
    security(("bearer" = []))
)]
#[put("/deliveries/{id}/complete")]
pub async fn complete_delivery(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Delivery>> {
    let courier = caller.require_courier()?;
    let delivery = state
        .deliveries
        .complete(DeliveryId::new(id.into_inner()), courier)
        .await?;
    Ok(web::Json(delivery))
}

/// Hand a delivery to a courier.
#[utoipa::path(
    post,
    path = "/deliveries/{id}/courier/{courierId}",
    params(
        ("id" = i64, Path, description = "Delivery id"),
        ("courierId" = i64, Path, description = "Courier user id")
    ),
    responses(
        (status = 200, description = "Delivery assigned", body = Delivery),
        (status = 400, description = "Unknown delivery or courier, not assignable or raced", body = Error),
        (status = 401, description = "Missing or invalid credentials", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error)
    ),
    tags = ["deliveries"],
    operation_id = "assignCourier",
    security(("bearer" = []))
)]
#[post("/deliveries/{id}/courier/{courier_id}")]
pub async fn assign_courier(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<(i64, i64)>,
) -> ApiResult<web::Json<Delivery>> {
    caller.require_admin()?;
    let (id, courier) = path.into_inner();
    let delivery = state
        .deliveries
        .assign_courier(DeliveryId::new(id), UserId::new(courier))
        .await?;
    Ok(web::Json(delivery))
}

#[cfg(test)]
#[path = "deliveries_tests.rs"]
mod tests;
