//! Test the CORS allow-headers response header.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;

use crate::auth::hooks::DEFAULT_CORS_ALLOW_HEADERS;
use crate::auth::{SigningAlgorithm, TokenHooks};
use crate::e2e_tests::helpers::*;
use crate::store::{ConfigStore, keys};
use crate::testing::{self, ISSUER, PASSWORD, USERNAME};

#[test]
fn test_disabled_by_default() {
    let server = TestServer::new(SigningAlgorithm::HS256);

    let response = server.login(USERNAME, PASSWORD);

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(ACCESS_CONTROL_ALLOW_HEADERS).is_none());
}

#[test]
fn test_enabled_on_every_response() {
    let server = TestServer::new(SigningAlgorithm::HS256);
    server.store.upsert(keys::ENABLE_CORS, "1").expect("upsert");

    let success = server.login(USERNAME, PASSWORD);
    let failure = server.validate(None);
    let rejected = server.get(ME_PATH, Some("Bearer abc.def.ghi"));

    for response in [success, failure, rejected] {
        assert_eq!(
            response.headers.get(ACCESS_CONTROL_ALLOW_HEADERS).expect("header"),
            DEFAULT_CORS_ALLOW_HEADERS
        );
    }
}

struct ExtraHeaders;

impl TokenHooks for ExtraHeaders {
    fn cors_allow_headers(&self, default: &str) -> String {
        format!("{default}, X-Requested-With")
    }
}

#[test]
fn test_hook_overrides_value() {
    let store = testing::configured_store(SigningAlgorithm::HS256);
    store.upsert(keys::ENABLE_CORS, "1").expect("upsert");
    let server = TestServer::build(store, ISSUER, Arc::new(ExtraHeaders));

    let response = server.validate(None);

    assert_eq!(
        response.headers.get(ACCESS_CONTROL_ALLOW_HEADERS).expect("header"),
        "Access-Control-Allow-Headers, Content-Type, Authorization, X-Requested-With"
    );
}
