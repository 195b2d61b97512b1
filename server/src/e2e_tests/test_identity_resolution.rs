//! Test the authentication middleware on routes outside the token namespace.

use axum::http::StatusCode;
use serde_json::Value;

use crate::auth::SigningAlgorithm;
use crate::e2e_tests::helpers::*;
use crate::store::{ConfigStore, keys};
use crate::testing::USER_ID;

#[test]
fn test_bearer_token_resolves_user() {
    let server = TestServer::new(SigningAlgorithm::HS256);
    let bearer = format!("Bearer {}", server.issue());

    let response = server.get(ME_PATH, Some(&bearer));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], USER_ID);
}

#[test]
fn test_anonymous_requests_pass() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.get(ME_PATH, None);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], Value::Null);

    let response = server.get(ME_PATH, Some("Basic xyz"));
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], Value::Null);
}

#[test]
fn test_invalid_token_rejects_api_request() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.get(ME_PATH, Some("Bearer abc.def.ghi"));

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_invalid_token");
}

#[test]
fn test_bare_bearer_rejects_api_request() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.get(ME_PATH, Some("Bearer"));

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "simplejwt_bad_auth_header");
}

#[test]
fn test_invalid_token_ignored_outside_api() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.get("/health", Some("Bearer abc.def.ghi"));

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_configuration_change_applies_immediately() {
    let server = TestServer::new(SigningAlgorithm::HS256);
    let bearer = format!("Bearer {}", server.issue());

    server.store.upsert(keys::ALGORITHM, "XS256").expect("upsert");

    let response = server.get(ME_PATH, Some(&bearer));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_unsupported_algorithm");
}
