//! Request authentication.
//!
//! Authentication runs in two phases. [`determine_identity`] resolves the
//! caller from the bearer token and never rejects on its own; a failure is
//! handed back as a stashed error. [`pre_dispatch_guard`] then turns a stashed
//! error into the response before the handler runs. The stash lives only in
//! the value passed between the two phases of one request.
//!
//! # Invariants
//! - An identity already resolved for an API request is kept as is.
//! - A missing header never rejects a request; anonymous access stays
//!   possible.
//! - Headers with a scheme other than `Bearer` are ignored.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AuthError;
use crate::routes::AppState;

use super::engine::{CallSite, TokenEngine, ValidationOutcome};

/// Fallback header carrying the credentials when a proxy or rewrite rule
/// moved the original `Authorization` header.
pub const REDIRECT_AUTHORIZATION: &str = "redirect-authorization";

/// Path suffix of the validation endpoint, which authenticates on its own.
const VALIDATE_PATH: &str = "token/validate";

/// The authenticated user id of a request, if any.
///
/// Inserted into the request extensions by [`authenticate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentUser(pub Option<u64>);

/// Result of the identity phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityResolution {
    pub identity: Option<u64>,
    /// Validation failure to surface before dispatch.
    pub stashed: Option<AuthError>,
}

impl IdentityResolution {
    const fn unchanged(identity: Option<u64>) -> Self {
        Self {
            identity,
            stashed: None,
        }
    }
}

/// Whether `path` addresses the REST API mounted under `api_prefix`.
#[must_use]
pub fn is_api_request(path: &str, api_prefix: &str) -> bool {
    path.find(api_prefix).is_some_and(|position| position > 0)
}

/// Resolve the caller of a request.
///
/// `current` is the identity resolved so far by earlier layers.
#[must_use]
pub fn determine_identity(
    engine: &TokenEngine,
    api_prefix: &str,
    current: Option<u64>,
    path: &str,
    headers: &HeaderMap,
) -> IdentityResolution {
    if current.is_some() && is_api_request(path, api_prefix) {
        return IdentityResolution::unchanged(current);
    }

    if path.find(VALIDATE_PATH).is_some_and(|position| position > 0) {
        return IdentityResolution::unchanged(current);
    }

    let Some(header) = authorization_header(headers) else {
        return IdentityResolution::unchanged(current);
    };

    if !header.starts_with("Bearer") {
        return IdentityResolution::unchanged(current);
    }

    match engine.validate_token(Some(header), CallSite::Internal) {
        Ok(ValidationOutcome::Claims(claims)) => IdentityResolution {
            identity: claims.user_id(),
            stashed: None,
        },
        Ok(ValidationOutcome::Valid(_)) | Err(AuthError::NoAuthHeader) => {
            IdentityResolution::unchanged(current)
        }
        Err(error) => {
            tracing::warn!("Bearer token rejected: {}", error.code());
            IdentityResolution {
                identity: current,
                stashed: Some(error),
            }
        }
    }
}

/// Surface a stashed error, or let the request through.
///
/// # Errors
/// Returns the stashed error.
pub fn pre_dispatch_guard(stashed: Option<AuthError>) -> Result<(), AuthError> {
    stashed.map_or(Ok(()), Err)
}

/// Axum middleware running both phases and recording [`CurrentUser`].
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|user| user.0);

    let resolution = determine_identity(
        &state.engine,
        &state.api_prefix,
        current,
        &path,
        request.headers(),
    );

    let guard = if is_api_request(&path, &state.api_prefix) {
        pre_dispatch_guard(resolution.stashed)
    } else {
        Ok(())
    };
    if let Err(error) = guard {
        return error.into_response();
    }

    tracing::debug!("Request to {path} as {:?}", resolution.identity);
    request
        .extensions_mut()
        .insert(CurrentUser(resolution.identity));
    next.run(request).await
}

/// The credentials of a request: `Authorization`, or the redirect header
/// when the former is absent or empty.
#[must_use]
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, AUTHORIZATION.as_str())
        .or_else(|| header_value(headers, REDIRECT_AUTHORIZATION))
}

/// A non-empty, trimmed header value.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
