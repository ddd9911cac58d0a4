//! Signup, login and token validation handlers.
//!
//! ```text
//! POST /signup {"email":"a@x.com","password":"pw123456"}
//! POST /login  {"email":"a@x.com","password":"pw123456"}
//! POST /auth   Authorization: Bearer <token>
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use service_core::{ApiResult, Error};
use utoipa::ToSchema;

use super::auth::AuthenticatedUser;
use super::state::HttpState;
use crate::domain::ports::IssuedToken;
use crate::domain::{Credentials, User, UserValidationError};

/// Email and password submitted to signup, login and courier creation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "pw123456")]
    pub password: String,
}

/// A single user wrapped as `{"data": ...}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub data: User,
}

/// Map input validation failures to `invalid_request` with the offending
/// field in the details.
pub(crate) fn map_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match &err {
        UserValidationError::EmptyEmail => ("email", "empty_email"),
        UserValidationError::MalformedEmail => ("email", "malformed_email"),
        UserValidationError::EmailTooLong => ("email", "email_too_long"),
        UserValidationError::EmptyPassword => ("password", "empty_password"),
        UserValidationError::PasswordTooShort => ("password", "password_too_short"),
        UserValidationError::PasswordTooLong => ("password", "password_too_long"),
        UserValidationError::UnknownStatus(_) => ("status", "unknown_status"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

impl CredentialsRequest {
    /// Credentials for creating an account, enforcing the password policy.
    pub fn for_new_account(&self) -> Result<Credentials, Error> {
        Credentials::for_new_account(&self.email, &self.password).map_err(map_validation_error)
    }

    /// Credentials for logging in.
    pub fn for_login(&self) -> Result<Credentials, Error> {
        Credentials::try_from_parts(&self.email, &self.password).map_err(map_validation_error)
    }
}

/// Register a new account with the `user` role.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created", body = User),
        (status = 400, description = "Invalid input or email already registered", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "signUp",
    security([])
)]
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials = payload.for_new_account()?;
    let user = state.accounts.sign_up(&credentials).await?;
    Ok(web::Json(user))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = IssuedToken),
        (status = 400, description = "Invalid input", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account frozen or blocked", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<IssuedToken>> {
    let credentials = payload.for_login()?;
    let token = state.auth.authenticate(&credentials).await?;
    Ok(web::Json(token))
}

/// Resolve the bearer token to its account.
///
/// Other services call this to validate tokens they receive.
#[utoipa::path(
    post,
    path = "/auth",
    responses(
        (status = 200, description = "Token is valid", body = UserEnvelope),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "authorize",
    security(("bearer" = []))
)]
#[post("/auth")]
pub async fn authorize(caller: AuthenticatedUser) -> web::Json<UserEnvelope> {
    web::Json(UserEnvelope {
        data: caller.into_inner(),
    })
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
