//! Test requests against an incomplete configuration.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::auth::SigningAlgorithm;
use crate::e2e_tests::helpers::*;
use crate::store::{ConfigStore, MemoryConfigStore, keys, provision_defaults};
use crate::testing::{PASSWORD, USERNAME};

fn store_with_algorithm(algorithm: &str) -> Arc<MemoryConfigStore> {
    let store = Arc::new(MemoryConfigStore::new());
    provision_defaults(store.as_ref()).expect("provisioned");
    store.upsert(keys::ALGORITHM, algorithm).expect("algorithm");
    store
}

#[test]
fn test_symmetric_without_secret() {
    let server = TestServer::with_store(store_with_algorithm("HS256"));

    let response = server.login(USERNAME, PASSWORD);
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_bad_secret_key");

    let response = server.validate(Some(("authorization", "Bearer a.b.c")));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_bad_secret_key");
}

#[test]
fn test_asymmetric_without_keys() {
    let server = TestServer::with_store(store_with_algorithm("RS256"));

    let response = server.login(USERNAME, PASSWORD);
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_bad_private_key");

    let response = server.validate(Some(("authorization", "Bearer a.b.c")));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_bad_public_key");
}

#[test]
fn test_unsupported_algorithm() {
    let server = TestServer::with_store(store_with_algorithm("none"));

    let response = server.login(USERNAME, PASSWORD);
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_unsupported_algorithm");

    let response = server.validate(Some(("authorization", "Bearer a.b.c")));
    assert_eq!(response.code(), "simplejwt_unsupported_algorithm");
}

#[test]
fn test_unreadable_sealed_key() {
    let store = store_with_algorithm("HS256");
    store
        .upsert(keys::SECRET_KEY, "not-an-envelope")
        .expect("secret");
    let server = TestServer::with_store(store);

    let response = server.login(USERNAME, PASSWORD);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.code(), "simplejwt_decryption_failed");
}
