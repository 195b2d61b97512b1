//! Extension points of token issuance and the HTTP surface.
//!
//! Every method has a default, so an implementation overrides only what it
//! needs. Implementations must be cheap and must not fail; they run inside
//! request handling.

use crate::response::ApiResponse;

use super::claims::TokenClaims;
use super::credentials::UserIdentity;

/// Seconds in a day.
const DAY_SECS: i64 = 86_400;

/// Default token lifetime.
pub const DEFAULT_LIFETIME_SECS: i64 = 7 * DAY_SECS;

/// Default value of the CORS `Access-Control-Allow-Headers` header.
pub const DEFAULT_CORS_ALLOW_HEADERS: &str =
    "Access-Control-Allow-Headers, Content-Type, Authorization";

pub trait TokenHooks: Send + Sync {
    /// `nbf` of a token issued at `issued_at`.
    fn not_before(&self, issued_at: i64) -> i64 {
        issued_at
    }

    /// `exp` of a token issued at `issued_at`.
    fn expire(&self, issued_at: i64) -> i64 {
        issued_at + DEFAULT_LIFETIME_SECS
    }

    /// Issuer written into new tokens and required of validated ones.
    fn issuer(&self, default: &str) -> String {
        default.to_string()
    }

    /// Last chance to change the claims before they are signed.
    fn payload_before_sign(&self, claims: TokenClaims, _identity: &UserIdentity) -> TokenClaims {
        claims
    }

    /// Last chance to change the token response before it is sent.
    fn token_before_dispatch(
        &self,
        response: ApiResponse,
        _identity: &UserIdentity,
    ) -> ApiResponse {
        response
    }

    /// Value of `Access-Control-Allow-Headers` when CORS is enabled.
    fn cors_allow_headers(&self, default: &str) -> String {
        default.to_string()
    }
}

/// Hooks that keep every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl TokenHooks for DefaultHooks {}
