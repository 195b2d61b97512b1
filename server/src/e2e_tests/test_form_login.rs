//! Test logging in with a url-encoded form body.

use axum::http::StatusCode;

use crate::auth::SigningAlgorithm;
use crate::e2e_tests::helpers::*;
use crate::testing::USER_ID;

#[test]
fn test_form_body() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.login_form("username=alice&password=correct-password");

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data("id"), USER_ID);
}

#[test]
fn test_form_without_password() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.login_form("username=alice");

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "simplejwt_missing_credentials");
}
