//! Test that tokens from another issuer are refused.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::auth::{DefaultHooks, SigningAlgorithm};
use crate::e2e_tests::helpers::*;
use crate::testing;

#[test]
fn test_token_from_other_issuer() {
    let store = testing::configured_store(SigningAlgorithm::HS256);
    let issuing = TestServer::build(store.clone(), "https://a.example", Arc::new(DefaultHooks));
    let validating = TestServer::build(store, "https://b.example", Arc::new(DefaultHooks));

    let bearer = format!("Bearer {}", issuing.issue());

    let response = validating.validate(Some(("authorization", &bearer)));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_bad_issuer");
    assert_eq!(response.message(), "The issuer does not match with this server");

    let response = issuing.validate(Some(("authorization", &bearer)));
    assert_eq!(response.status, StatusCode::OK);
}
