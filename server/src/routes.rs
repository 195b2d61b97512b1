//! HTTP surface.
//!
//! Two routes live under `/{api_prefix}/{endpoint}/v{version}`:
//! - `POST .../token` exchanges a username and password for a token.
//! - `POST .../token/validate` checks the bearer token of the request.
//!
//! Every request, routed or not, passes the authentication middleware. The
//! CORS layer sits outside it so rejected requests carry the header too.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, CONTENT_TYPE, HeaderValue};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::Deserialize;

use crate::auth::hooks::DEFAULT_CORS_ALLOW_HEADERS;
use crate::auth::{CallSite, TokenEngine, ValidationOutcome, authenticate, authorization_header};
use crate::error::{AuthError, CODE_PREFIX};
use crate::notice::Notice;
use crate::response::ApiResponse;
use crate::store::{is_truthy, keys};

/// Shared state of every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TokenEngine>,
    /// First path segment of the REST API, without slashes.
    pub api_prefix: String,
}

/// The route namespace, e.g. `/api/auth/v1`.
#[must_use]
pub fn namespace(api_prefix: &str, endpoint: &str, api_version: u32) -> String {
    format!(
        "/{}/{}/v{api_version}",
        api_prefix.trim_matches('/'),
        endpoint.trim_matches('/')
    )
}

/// Build the application router.
pub fn router(state: AppState, endpoint: &str, api_version: u32) -> Router {
    let routes = token_routes(&state.api_prefix, endpoint, api_version);
    with_middleware(routes, state)
}

/// The token routes, without middleware.
pub fn token_routes(api_prefix: &str, endpoint: &str, api_version: u32) -> Router<AppState> {
    let base = namespace(api_prefix, endpoint, api_version);
    tracing::info!("Serving token routes under {base}");

    Router::new()
        .route(&format!("{base}/token"), post(issue_token))
        .route(&format!("{base}/token/validate"), post(validate_token))
}

/// Wrap `routes` in the authentication and CORS layers.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

/// Login form, accepted as JSON or `application/x-www-form-urlencoded`.
///
/// Missing fields, and bodies that cannot be parsed, read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl<S: Send + Sync> FromRequest<S> for Credentials {
    type Rejection = Infallible;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let parsed = if is_json {
            Json::<Self>::from_request(request, state)
                .await
                .map(|Json(credentials)| credentials)
                .map_err(|rejection| rejection.body_text())
        } else {
            Form::<Self>::from_request(request, state)
                .await
                .map(|Form(credentials)| credentials)
                .map_err(|rejection| rejection.body_text())
        };

        Ok(parsed.unwrap_or_else(|reason| {
            tracing::debug!("Unreadable login body: {reason}");
            Self::default()
        }))
    }
}

async fn issue_token(
    State(state): State<AppState>,
    credentials: Credentials,
) -> Result<ApiResponse, AuthError> {
    let issued = state
        .engine
        .issue_token(&credentials.username, &credentials.password)?;

    let identity = &issued.identity;
    let response = ApiResponse::new(
        format!("{CODE_PREFIX}{}", Notice::AuthCredential.key()),
        Notice::AuthCredential.message(),
        StatusCode::OK,
    )
    .with_data("id", identity.id)
    .with_data("email", identity.email.as_str())
    .with_data("nicename", identity.nicename.as_str())
    .with_data("display_name", identity.display_name.as_str())
    .with_data("token", issued.token.as_str());

    Ok(state.engine.hooks().token_before_dispatch(response, identity))
}

async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse, AuthError> {
    match state
        .engine
        .validate_token(authorization_header(&headers), CallSite::Endpoint)?
    {
        ValidationOutcome::Valid(response) => Ok(response),
        ValidationOutcome::Claims(_) => Err(AuthError::UnknownError),
    }
}

/// Add `Access-Control-Allow-Headers` to every response while CORS is
/// enabled in the config store.
async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let enabled = match state.engine.store().get(keys::ENABLE_CORS) {
        Ok(value) => is_truthy(value.as_deref()),
        Err(e) => {
            tracing::warn!("Failed to read CORS setting: {e}");
            false
        }
    };
    if !enabled {
        return response;
    }

    let allowed = state
        .engine
        .hooks()
        .cors_allow_headers(DEFAULT_CORS_ALLOW_HEADERS);
    match HeaderValue::from_str(&allowed) {
        Ok(value) => {
            response
                .headers_mut()
                .insert(ACCESS_CONTROL_ALLOW_HEADERS, value);
        }
        Err(e) => tracing::warn!("Invalid CORS allow-headers value {allowed:?}: {e}"),
    }
    response
}
