//! Test the happy path: log in, then validate the returned token.

use axum::http::StatusCode;

use crate::auth::{SigningAlgorithm, codec};
use crate::e2e_tests::helpers::*;
use crate::testing::{self, PASSWORD, USER_ID, USERNAME};

#[test]
fn test_login_returns_token_and_identity() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.login(USERNAME, PASSWORD);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.code(), "simplejwt_auth_credential");
    assert_eq!(response.message(), "Token created successfully");
    assert_eq!(response.data("status"), 200);
    assert_eq!(response.data("id"), USER_ID);
    assert_eq!(response.data("email"), "alice@example.com");
    assert_eq!(response.data("nicename"), "alice");
    assert_eq!(response.data("display_name"), "Alice");
    assert!(response.data("token").is_string());
}

#[test]
fn test_token_claims() {
    let server = TestServer::new(SigningAlgorithm::HS256);
    let token = server.issue();

    let claims = codec::decode(&token, SigningAlgorithm::HS256, testing::SECRET, testing::NOW)
        .expect("decodes with the configured secret");

    assert_eq!(claims.user_id(), Some(USER_ID));
    assert_eq!(claims.iss.as_deref(), Some(testing::ISSUER));
    assert_eq!(claims.iat, Some(testing::NOW));
    assert_eq!(claims.nbf, Some(testing::NOW));
    assert_eq!(claims.exp, Some(testing::NOW + 7 * 24 * 60 * 60));
}

#[test]
fn test_issued_token_validates() {
    let server = TestServer::new(SigningAlgorithm::HS256);
    let token = server.issue();

    let response = server.validate(Some(("authorization", &format!("Bearer {token}"))));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.code(), "simplejwt_valid_token");
    assert_eq!(response.message(), "Token is valid");
    assert_eq!(response.body["data"], serde_json::json!({"status": 200}));
}

#[test]
fn test_login_by_email() {
    let server = TestServer::new(SigningAlgorithm::HS512);

    let response = server.login("alice@example.com", PASSWORD);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data("id"), USER_ID);
}
