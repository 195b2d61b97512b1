//! Token issuance and validation.
//!
//! The engine is stateless between calls: algorithm and keys are read from the
//! config store on every call, so configuration changes apply immediately.
//!
//! # Ordering
//! - Issuance checks the request for credentials, then resolves the
//!   algorithm, before any key material is read or decrypted.
//! - Validation parses the header and resolves the algorithm before any key
//!   material is read or decrypted.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::crypto::Envelope;
use crate::error::AuthError;
use crate::notice::{Notice, strip_tags};
use crate::response::ApiResponse;
use crate::store::{ConfigStore, StoreError, keys};
use crate::time::{SystemTimeSource, TimeSource};

use super::algorithm::{KeyFamily, SigningAlgorithm};
use super::claims::{DecodedClaims, TokenClaims};
use super::codec::{self, CodecError};
use super::credentials::{CredentialVerifier, UserIdentity};
use super::hooks::{DefaultHooks, TokenHooks};

/// Symbolic code of a successful `token/validate` call.
pub const VALID_TOKEN_CODE: &str = "simplejwt_valid_token";

/// Where a validation request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// The authentication middleware; wants the decoded claims.
    Internal,
    /// The `token/validate` endpoint; wants the success envelope.
    Endpoint,
}

/// Successful result of [`TokenEngine::validate_token`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Claims(DecodedClaims),
    Valid(ApiResponse),
}

/// Successful result of [`TokenEngine::issue_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub identity: UserIdentity,
    pub token: String,
}

/// What a stored key is needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyRole {
    Signing,
    Verification,
}

pub struct TokenEngine {
    store: Arc<dyn ConfigStore>,
    envelope: Envelope,
    credentials: Arc<dyn CredentialVerifier>,
    hooks: Arc<dyn TokenHooks>,
    clock: Arc<dyn TimeSource>,
    issuer: String,
}

impl TokenEngine {
    /// Create an engine with default hooks and the system clock.
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigStore>,
        envelope: Envelope,
        credentials: Arc<dyn CredentialVerifier>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            store,
            envelope,
            credentials,
            hooks: Arc::new(DefaultHooks),
            clock: Arc::new(SystemTimeSource),
            issuer: issuer.into(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn TokenHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn hooks(&self) -> &dyn TokenHooks {
        self.hooks.as_ref()
    }

    /// The issuer new tokens carry and validated tokens must match.
    #[must_use]
    pub fn issuer(&self) -> String {
        self.hooks.issuer(&self.issuer)
    }

    /// Read the configured algorithm.
    ///
    /// A missing or empty value is `Ok(None)`; callers treat that as
    /// unsupported.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for a value outside the supported set,
    /// `UnknownError` if the store fails.
    pub fn resolve_algorithm(&self) -> Result<Option<SigningAlgorithm>, AuthError> {
        let Some(name) = self
            .store
            .get(keys::ALGORITHM)
            .map_err(store_failure)?
            .filter(|name| !name.is_empty())
        else {
            return Ok(None);
        };

        name.parse::<SigningAlgorithm>().map(Some).map_err(|_| {
            tracing::warn!("Configured algorithm {name:?} is not supported");
            AuthError::UnsupportedAlgorithm
        })
    }

    /// Verify `username`/`password` and sign a token for the user.
    ///
    /// # Errors
    /// - `MissingCredential` if either value is empty.
    /// - `UnsupportedAlgorithm` for a missing or unknown algorithm.
    /// - `BadSecretKey`/`BadPrivateKey` if the signing key is not configured.
    /// - Envelope errors from decrypting the key, unchanged.
    /// - `CredentialRejected` with the verifier's code, message and status.
    /// - `BadConfig` if the stored key cannot sign, `TokenCreationFailed` if
    ///   signing fails otherwise.
    pub fn issue_token(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let algorithm = self.require_algorithm()?;
        let key = self.load_key(algorithm, KeyRole::Signing)?;

        let identity = self
            .credentials
            .verify(username, password)
            .map_err(|rejection| {
                tracing::debug!("Credentials rejected: {}", rejection.code);
                AuthError::CredentialRejected {
                    code: rejection.code,
                    message: strip_tags(&rejection.message),
                    status: rejection.status,
                }
            })?;

        let issued_at = self.clock.now_secs();
        let claims = TokenClaims::new(
            self.issuer(),
            issued_at,
            self.hooks.not_before(issued_at),
            self.hooks.expire(issued_at),
            identity.id,
        );
        let claims = self.hooks.payload_before_sign(claims, &identity);

        let token = codec::encode(&claims, algorithm, &key).map_err(|e| {
            tracing::warn!("Failed to sign token with {algorithm}: {e}");
            match e {
                CodecError::InvalidKey(_) => AuthError::BadConfig,
                _ => AuthError::TokenCreationFailed,
            }
        })?;

        tracing::info!("Issued {algorithm} token for user {}", identity.id);
        Ok(IssuedToken { identity, token })
    }

    /// Validate an `Authorization` header value.
    ///
    /// # Errors
    /// - `NoAuthHeader` if `header` is absent or empty.
    /// - `BadAuthHeader` if it carries no `Bearer` token.
    /// - `UnsupportedAlgorithm` for a missing or unknown algorithm.
    /// - `BadSecretKey`/`BadPublicKey` if the verification key is not
    ///   configured, envelope errors from decrypting it.
    /// - `InvalidToken` with the reason for decode, signature and time-claim
    ///   failures.
    /// - `BadIssuer` if `iss` differs from the configured issuer.
    /// - `BadRequest` if the token carries no user id.
    pub fn validate_token(
        &self,
        header: Option<&str>,
        call_site: CallSite,
    ) -> Result<ValidationOutcome, AuthError> {
        let header = header
            .filter(|header| !header.is_empty())
            .ok_or(AuthError::NoAuthHeader)?;
        let token = parse_bearer(header).ok_or(AuthError::BadAuthHeader)?;

        let algorithm = self.require_algorithm()?;
        let key = self.load_key(algorithm, KeyRole::Verification)?;

        let claims = codec::decode(token, algorithm, &key, self.clock.now_secs()).map_err(|e| {
            tracing::debug!("Rejected token: {e}");
            AuthError::InvalidToken(strip_tags(&e.to_string()))
        })?;

        if claims.iss.as_deref() != Some(self.issuer().as_str()) {
            tracing::debug!("Rejected token from issuer {:?}", claims.iss);
            return Err(AuthError::BadIssuer);
        }

        if claims.user_id().is_none() {
            return Err(AuthError::BadRequest);
        }

        Ok(match call_site {
            CallSite::Internal => ValidationOutcome::Claims(claims),
            CallSite::Endpoint => ValidationOutcome::Valid(ApiResponse::new(
                VALID_TOKEN_CODE,
                Notice::ValidToken.message(),
                StatusCode::OK,
            )),
        })
    }

    fn require_algorithm(&self) -> Result<SigningAlgorithm, AuthError> {
        self.resolve_algorithm()?
            .ok_or(AuthError::UnsupportedAlgorithm)
    }

    /// Fetch and decrypt the key `algorithm` needs for `role`.
    ///
    /// An empty stored value counts as not configured.
    fn load_key(&self, algorithm: SigningAlgorithm, role: KeyRole) -> Result<String, AuthError> {
        let (name, missing) = match (algorithm.family(), role) {
            (KeyFamily::Symmetric, _) => (keys::SECRET_KEY, AuthError::BadSecretKey),
            (KeyFamily::Asymmetric, KeyRole::Signing) => {
                (keys::PRIVATE_KEY, AuthError::BadPrivateKey)
            }
            (KeyFamily::Asymmetric, KeyRole::Verification) => {
                (keys::PUBLIC_KEY, AuthError::BadPublicKey)
            }
        };

        let stored = self
            .store
            .get(name)
            .map_err(store_failure)?
            .filter(|value| !value.trim().is_empty())
            .ok_or(missing)?;

        self.envelope.decrypt(stored.trim())
    }
}

impl std::fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEngine")
            .field("envelope", &self.envelope)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Extract the token of a `Bearer <token>` header.
///
/// The header must start with `Bearer`; the token is the first
/// whitespace-delimited word after it.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer")?
        .split_whitespace()
        .next()
}

fn store_failure(error: StoreError) -> AuthError {
    tracing::warn!("Config store failure: {error}");
    AuthError::UnknownError
}
