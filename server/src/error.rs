//! Authentication error taxonomy.
//!
//! Every failure of the crypto envelope, the token engine and the middleware
//! is an [`AuthError`]. Each variant carries a symbolic code, an HTTP status
//! and a catalog message, and renders as a JSON [`ApiResponse`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::notice::Notice;
use crate::response::ApiResponse;

/// Prefix of every symbolic error code.
pub const CODE_PREFIX: &str = "simplejwt_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The envelope encryption key is not configured.
    #[error("{}", Notice::BadEncryptionKey.message())]
    BadEncryptionKey,

    /// The envelope encryption key is not exactly 32 bytes.
    #[error("{}", Notice::InvalidEncKeyLength.message())]
    InvalidEncryptionKeyLength,

    #[error("{}", Notice::EncryptionFailed.message())]
    EncryptionFailed,

    /// Tag mismatch or malformed envelope.
    #[error("{}", Notice::DecryptionFailed.message())]
    DecryptionFailed,

    #[error("{}", Notice::UnsupportedAlgo.message())]
    UnsupportedAlgorithm,

    /// Username or password absent from the token request.
    #[error("{}", Notice::MissingCredential.message())]
    MissingCredential,

    #[error("{}", Notice::BadSecretKey.message())]
    BadSecretKey,

    #[error("{}", Notice::BadPrivateKey.message())]
    BadPrivateKey,

    #[error("{}", Notice::BadPublicKey.message())]
    BadPublicKey,

    #[error("{}", Notice::NoAuthHeader.message())]
    NoAuthHeader,

    #[error("{}", Notice::BadAuthHeader.message())]
    BadAuthHeader,

    #[error("{}", Notice::BadIssuer.message())]
    BadIssuer,

    /// The token carries no user id.
    #[error("{}", Notice::BadRequest.message())]
    BadRequest,

    /// Stored key material could not be loaded.
    #[error("{}", Notice::BadConfig.message())]
    BadConfig,

    /// Decode, signature or time-claim failure, with the underlying reason.
    #[error("{0}")]
    InvalidToken(String),

    #[error("{}", Notice::UnknownError.message())]
    TokenCreationFailed,

    #[error("{}", Notice::UnknownError.message())]
    UnknownError,

    /// The credential verifier refused the login.
    ///
    /// `code` is the verifier's own code; the public code is prefixed.
    #[error("{message}")]
    CredentialRejected {
        code: String,
        message: String,
        status: u16,
    },
}

impl AuthError {
    /// The symbolic code surfaced to API callers.
    #[must_use]
    pub fn code(&self) -> String {
        let suffix = match self {
            Self::BadEncryptionKey => "bad_encryption_key",
            Self::InvalidEncryptionKeyLength => "invalid_enckey_length",
            Self::EncryptionFailed => "encryption_failed",
            Self::DecryptionFailed => "decryption_failed",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::MissingCredential => "missing_credentials",
            Self::BadSecretKey => "bad_secret_key",
            Self::BadPrivateKey => "bad_private_key",
            Self::BadPublicKey => "bad_public_key",
            Self::NoAuthHeader => "no_auth_header",
            Self::BadAuthHeader => "bad_auth_header",
            Self::BadIssuer => "bad_issuer",
            Self::BadRequest => "bad_request",
            Self::BadConfig => "bad_config",
            Self::InvalidToken(_) => "invalid_token",
            Self::TokenCreationFailed => "token_creation_error",
            Self::UnknownError => "unknown_error",
            Self::CredentialRejected { code, .. } => code.as_str(),
        };
        format!("{CODE_PREFIX}{suffix}")
    }

    /// The HTTP status of the error response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEncryptionKeyLength | Self::MissingCredential | Self::BadAuthHeader => {
                StatusCode::BAD_REQUEST
            }
            Self::EncryptionFailed
            | Self::DecryptionFailed
            | Self::TokenCreationFailed
            | Self::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CredentialRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::FORBIDDEN)
            }
            Self::BadEncryptionKey
            | Self::UnsupportedAlgorithm
            | Self::BadSecretKey
            | Self::BadPrivateKey
            | Self::BadPublicKey
            | Self::NoAuthHeader
            | Self::BadIssuer
            | Self::BadRequest
            | Self::BadConfig
            | Self::InvalidToken(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Render as the JSON error envelope.
    #[must_use]
    pub fn to_api_response(&self) -> ApiResponse {
        ApiResponse::new(self.code(), self.to_string(), self.status())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.to_api_response().into_response()
    }
}
