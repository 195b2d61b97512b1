//! Common helpers for end-to-end tests.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Extension;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{CurrentUser, DefaultHooks, SigningAlgorithm, TokenEngine, TokenHooks};
use crate::routes::{AppState, token_routes, with_middleware};
use crate::store::MemoryConfigStore;
use crate::testing::{self, ISSUER, PASSWORD, USERNAME};
use crate::time::FixedTimeSource;

pub const TOKEN_PATH: &str = "/api/auth/v1/token";
pub const VALIDATE_PATH: &str = "/api/auth/v1/token/validate";
/// An API route outside the token namespace that reports the caller.
pub const ME_PATH: &str = "/api/wp/v2/users/me";

/// A router over an in-memory store, with its own runtime and clock.
pub struct TestServer {
    pub store: Arc<MemoryConfigStore>,
    pub clock: Arc<FixedTimeSource>,
    router: Router,
    runtime: tokio::runtime::Runtime,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// The JSON body, or `Value::Null` if the body is not JSON.
    pub body: Value,
}

impl TestResponse {
    #[must_use]
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    #[must_use]
    pub fn data(&self, key: &str) -> &Value {
        &self.body["data"][key]
    }
}

impl TestServer {
    /// A server configured for `algorithm` with the fixture keys.
    #[must_use]
    pub fn new(algorithm: SigningAlgorithm) -> Self {
        Self::with_store(testing::configured_store(algorithm))
    }

    #[must_use]
    pub fn with_store(store: Arc<MemoryConfigStore>) -> Self {
        Self::build(store, ISSUER, Arc::new(DefaultHooks))
    }

    #[must_use]
    pub fn build(store: Arc<MemoryConfigStore>, issuer: &str, hooks: Arc<dyn TokenHooks>) -> Self {
        let clock = Arc::new(FixedTimeSource::new(testing::NOW));
        let engine = TokenEngine::new(
            store.clone(),
            testing::envelope(),
            testing::credentials(),
            issuer,
        )
        .with_hooks(hooks)
        .with_clock(clock.clone());

        let state = AppState {
            engine: Arc::new(engine),
            api_prefix: "api".to_string(),
        };
        let routes = token_routes(&state.api_prefix, "auth", 1).route(ME_PATH, get(whoami));
        let router = with_middleware(routes, state);

        let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");

        Self {
            store,
            clock,
            router,
            runtime,
        }
    }

    /// Send a request and buffer the response.
    pub fn send(&self, request: Request<Body>) -> TestResponse {
        self.runtime.block_on(async {
            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("router is infallible");
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("Failed to read body");
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            TestResponse {
                status,
                headers,
                body,
            }
        })
    }

    /// Log in with a JSON body.
    pub fn login(&self, username: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({"username": username, "password": password});
        self.send(
            Request::post(TOKEN_PATH)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
    }

    /// Log in with a url-encoded form body.
    pub fn login_form(&self, form: &str) -> TestResponse {
        self.send(
            Request::post(TOKEN_PATH)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .expect("request"),
        )
    }

    /// Issue a token for the fixture user through the API.
    pub fn issue(&self) -> String {
        let response = self.login(USERNAME, PASSWORD);
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.data("token").as_str().expect("token").to_string()
    }

    /// Call the validation endpoint with an optional `(header, value)` pair.
    pub fn validate(&self, header: Option<(&str, &str)>) -> TestResponse {
        let mut request = Request::post(VALIDATE_PATH);
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        self.send(request.body(Body::empty()).expect("request"))
    }

    /// `GET path` with an optional `Authorization` value.
    pub fn get(&self, path: &str, authorization: Option<&str>) -> TestResponse {
        let mut request = Request::get(path);
        if let Some(value) = authorization {
            request = request.header("authorization", value);
        }
        self.send(request.body(Body::empty()).expect("request"))
    }
}

async fn whoami(Extension(user): Extension<CurrentUser>) -> Json<Value> {
    Json(serde_json::json!({"id": user.0}))
}
