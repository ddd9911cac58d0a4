//! Tests for the error envelope formatting and status mapping.

use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;

async fn body_json(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = error.error_response();
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("read body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, header, value)
}

#[rstest]
#[case::invalid(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case::unauthorized(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
#[case::forbidden(Error::forbidden("no"), StatusCode::FORBIDDEN)]
#[case::not_found(Error::not_found("gone"), StatusCode::NOT_FOUND)]
#[case::conflict(Error::conflict("state"), StatusCode::BAD_REQUEST)]
#[case::unavailable(Error::service_unavailable("db"), StatusCode::SERVICE_UNAVAILABLE)]
#[case::internal(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn codes_map_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(error.status_code(), expected);
}

#[actix_rt::test]
async fn body_wraps_payload_under_error_key() {
    let error = Error::conflict("delivery is not completable")
        .with_details(json!({ "code": "not_completable" }));

    let (status, _, body) = body_json(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "delivery is not completable");
    assert_eq!(body["error"]["details"]["code"], "not_completable");
}

#[actix_rt::test]
async fn internal_errors_are_redacted_but_keep_trace_id() {
    let error = Error::internal("connection string leaked").with_trace_id("abc");

    let (status, header, body) = body_json(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some("abc"));
    assert_eq!(body["error"]["message"], "Internal server error");
    assert_eq!(body["error"]["traceId"], "abc");
    assert!(body["error"].get("details").is_none());
}

#[tokio::test]
async fn new_captures_scoped_trace_id() {
    let trace_id = TraceId::generate();
    let error = TraceId::scope(trace_id, async { Error::forbidden("nope") }).await;
    assert_eq!(error.trace_id(), Some(trace_id.to_string().as_str()));
}

#[test]
fn envelope_deserialises_from_wire_form() {
    let raw = r#"{"error":{"code":"unauthorized","message":"invalid token"}}"#;
    let envelope: ErrorEnvelope = serde_json::from_str(raw).expect("decode envelope");
    assert_eq!(envelope.error.code(), ErrorCode::Unauthorized);
    assert!(envelope.error.trace_id().is_none());
}
