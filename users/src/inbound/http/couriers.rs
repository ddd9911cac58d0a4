//! Courier administration handlers; every route requires the admin role.

use actix_web::{get, post, web};
use service_core::{ApiResult, Error};

use super::auth::AuthenticatedUser;
use super::state::HttpState;
use super::users::CredentialsRequest;
use crate::domain::{User, UserId};

/// Create a courier account.
#[utoipa::path(
    post,
    path = "/courier",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Courier created", body = User),
        (status = 400, description = "Invalid input or email already registered", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error)
    ),
    tags = ["couriers"],
    operation_id = "createCourier",
    security(("bearer" = []))
)]
#[post("/courier")]
pub async fn create_courier(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<User>> {
    caller.require_admin()?;
    let credentials = payload.for_new_account()?;
    let courier = state.accounts.create_courier(&credentials).await?;
    Ok(web::Json(courier))
}

/// List every courier account.
#[utoipa::path(
    get,
    path = "/couriers",
    responses(
        (status = 200, description = "Couriers ordered by id", body = [User]),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error)
    ),
    tags = ["couriers"],
    operation_id = "listCouriers",
    security(("bearer" = []))
)]
#[get("/couriers")]
pub async fn list_couriers(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<User>>> {
    caller.require_admin()?;
    Ok(web::Json(state.couriers.list_couriers().await?))
}

/// Fetch one courier.
#[utoipa::path(
    get,
    path = "/couriers/{id}",
    params(("id" = i64, Path, description = "Courier user id")),
    responses(
        (status = 200, description = "Courier", body = User),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No courier with this id", body = Error)
    ),
    tags = ["couriers"],
    operation_id = "getCourier",
    security(("bearer" = []))
)]
#[get("/couriers/{id}")]
pub async fn get_courier(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> ApiResult<web::Json<User>> {
    caller.require_admin()?;
    let courier = state
        .couriers
        .find_courier(UserId::new(id.into_inner()))
        .await?;
    Ok(web::Json(courier))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;
    use service_core::Role;

    use super::*;
    use crate::domain::ports::{MockAccountsCommand, MockAuthenticator, MockCouriersQuery};
    use crate::domain::{AccountStatus, Email, PasswordHash};

    fn user(id: i64, role: Role) -> User {
        User::new(
            UserId::new(id),
            Email::new(format!("u{id}@x.com")).expect("valid email"),
            role,
            AccountStatus::Active,
            PasswordHash::new("hash"),
        )
    }

    fn authenticator_for(role: Role) -> MockAuthenticator {
        let mut auth = MockAuthenticator::new();
        auth.expect_authorize()
            .returning(move |_| Ok(user(1, role)));
        auth
    }

    fn state(
        auth: MockAuthenticator,
        accounts: MockAccountsCommand,
        couriers: MockCouriersQuery,
    ) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(auth),
            Arc::new(accounts),
            Arc::new(couriers),
        ))
    }

    macro_rules! courier_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($state)
                    .app_data(service_core::extract::json_config())
                    .app_data(service_core::extract::path_config())
                    .service(create_courier)
                    .service(list_couriers)
                    .service(get_courier),
            )
            .await
        };
    }

    #[rstest]
    #[case::user(Role::User)]
    #[case::courier(Role::Courier)]
    #[actix_web::test]
    async fn non_admins_cannot_create_couriers(#[case] role: Role) {
        let mut accounts = MockAccountsCommand::new();
        accounts.expect_create_courier().never();
        let app = courier_app!(state(
            authenticator_for(role),
            accounts,
            MockCouriersQuery::new()
        ));

        let request = actix_test::TestRequest::post()
            .uri("/courier")
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json_credentials())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    fn json_credentials() -> CredentialsRequest {
        CredentialsRequest {
            email: "new@x.com".to_owned(),
            password: "pw123456".to_owned(),
        }
    }

    #[actix_web::test]
    async fn admin_creates_a_courier() {
        let mut accounts = MockAccountsCommand::new();
        accounts
            .expect_create_courier()
            .withf(|credentials| credentials.email().as_ref() == "new@x.com")
            .times(1)
            .returning(|_| Ok(user(9, Role::Courier)));
        let app = courier_app!(state(
            authenticator_for(Role::Admin),
            accounts,
            MockCouriersQuery::new()
        ));

        let request = actix_test::TestRequest::post()
            .uri("/courier")
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json_credentials())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["id"], 9);
        assert_eq!(body["role"], "courier");
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorised() {
        let mut couriers = MockCouriersQuery::new();
        couriers.expect_list_couriers().never();
        let app = courier_app!(state(
            MockAuthenticator::new(),
            MockAccountsCommand::new(),
            couriers
        ));

        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/couriers").to_request())
                .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], "unauthorized");
    }

    #[actix_web::test]
    async fn admin_lists_couriers() {
        let mut couriers = MockCouriersQuery::new();
        couriers
            .expect_list_couriers()
            .returning(|| Ok(vec![user(2, Role::Courier), user(3, Role::Courier)]));
        let app = courier_app!(state(
            authenticator_for(Role::Admin),
            MockAccountsCommand::new(),
            couriers
        ));

        let request = actix_test::TestRequest::get()
            .uri("/couriers")
            .insert_header(("Authorization", "Bearer t"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        let ids: Vec<_> = body
            .as_array()
            .expect("array")
            .iter()
            .map(|courier| courier["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![Some(2), Some(3)]);
    }

    #[actix_web::test]
    async fn unknown_courier_is_not_found() {
        let mut couriers = MockCouriersQuery::new();
        couriers
            .expect_find_courier()
            .returning(|id| Err(Error::not_found(format!("courier {id} not found"))));
        let app = courier_app!(state(
            authenticator_for(Role::Admin),
            MockAccountsCommand::new(),
            couriers
        ));

        let request = actix_test::TestRequest::get()
            .uri("/couriers/77")
            .insert_header(("Authorization", "Bearer t"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
