//! Test configuring the service through the settings flow.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;
use crate::settings::{self, SettingsError, SettingsUpdate};
use crate::store::{MemoryConfigStore, provision_defaults};
use crate::testing::{self, PASSWORD, USERNAME, keys as pem};

fn provisioned() -> Arc<MemoryConfigStore> {
    let store = Arc::new(MemoryConfigStore::new());
    provision_defaults(store.as_ref()).expect("provisioned");
    store
}

#[test]
fn test_configure_then_login() {
    let store = provisioned();
    let update = SettingsUpdate {
        algorithm: "PS256".to_string(),
        enable_auth: true,
        private_key: pem::RSA_PRIVATE_KEY.to_string(),
        public_key: pem::RSA_PUBLIC_KEY.to_string(),
        ..SettingsUpdate::default()
    };
    settings::apply(&update, &testing::envelope(), store.as_ref()).expect("applied");

    let server = TestServer::with_store(store);
    let bearer = format!("Bearer {}", server.issue());

    let response = server.validate(Some(("authorization", &bearer)));
    assert_eq!(response.status, StatusCode::OK);
}

#[test]
fn test_switching_algorithm_invalidates_tokens() {
    let store = provisioned();
    let envelope = testing::envelope();
    let update = SettingsUpdate {
        enable_auth: true,
        secret_key: testing::SECRET.to_string(),
        ..SettingsUpdate::default()
    };
    settings::apply(&update, &envelope, store.as_ref()).expect("applied");
    let server = TestServer::with_store(store.clone());
    let bearer = format!("Bearer {}", server.issue());

    let update = SettingsUpdate {
        algorithm: "HS384".to_string(),
        ..update
    };
    settings::apply(&update, &envelope, store.as_ref()).expect("applied");

    let response = server.validate(Some(("authorization", &bearer)));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "simplejwt_invalid_token");
    assert_eq!(response.message(), "Algorithm not allowed");

    assert_eq!(server.login(USERNAME, PASSWORD).status, StatusCode::OK);
}

#[test]
fn test_refused_settings_leave_service_unchanged() {
    let store = testing::configured_store(crate::auth::SigningAlgorithm::HS256);
    let server = TestServer::with_store(store.clone());
    let bearer = format!("Bearer {}", server.issue());

    let update = SettingsUpdate {
        algorithm: "RS256".to_string(),
        enable_auth: true,
        private_key: pem::RSA_PRIVATE_KEY.to_string(),
        ..SettingsUpdate::default()
    };
    assert_eq!(
        settings::apply(&update, &testing::envelope(), store.as_ref()),
        Err(SettingsError::EmptyPublicKey)
    );

    let response = server.validate(Some(("authorization", &bearer)));
    assert_eq!(response.status, StatusCode::OK);
}
