//! JWT compact serialization.
//!
//! Signs and verifies tokens for every [`SigningAlgorithm`]. `jsonwebtoken`
//! covers eleven of them; ES512 goes through [`super::es512`].
//!
//! # Invariants
//! - A token verifies only under the algorithm it is decoded with.
//! - `exp` is required. Time claims are checked with zero leeway against the
//!   caller's clock, never the library's.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use super::algorithm::{KeyFamily, SigningAlgorithm};
use super::claims::{DecodedClaims, TokenClaims};
use super::es512;

/// Error returned when a token cannot be signed or verified.
///
/// The `Display` text is what callers see as the invalid-token message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The token is not a well-formed compact JWS.
    MalformedToken(String),
    /// The signature does not match the header and payload.
    InvalidSignature,
    /// The header names a different algorithm than the configured one.
    AlgorithmMismatch,
    /// The key material cannot be used with the algorithm.
    InvalidKey(String),
    /// A required claim is absent.
    MissingClaim(&'static str),
    /// `exp` is at or before the current time.
    Expired,
    /// `nbf` is after the current time.
    NotYetValid(i64),
    /// `iat` is after the current time.
    IssuedInFuture(i64),
    /// Signing failed.
    Signing(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedToken(reason) => write!(f, "Malformed token: {reason}"),
            Self::InvalidSignature => write!(f, "Signature verification failed"),
            Self::AlgorithmMismatch => write!(f, "Algorithm not allowed"),
            Self::InvalidKey(reason) => write!(f, "Invalid key: {reason}"),
            Self::MissingClaim(claim) => write!(f, "Missing required claim: {claim}"),
            Self::Expired => write!(f, "Expired token"),
            Self::NotYetValid(nbf) => write!(f, "Cannot handle token prior to {nbf}"),
            Self::IssuedInFuture(iat) => {
                write!(f, "Cannot handle token with iat prior to {iat}")
            }
            Self::Signing(reason) => write!(f, "Token signing failed: {reason}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Sign `claims` with `key` under `algorithm`.
///
/// `key` is the shared secret for HS* and a PEM private key otherwise.
///
/// # Errors
/// Returns `CodecError::InvalidKey` if the key does not fit the algorithm and
/// `CodecError::Signing` if signing fails.
pub fn encode(
    claims: &TokenClaims,
    algorithm: SigningAlgorithm,
    key: &str,
) -> Result<String, CodecError> {
    let Some(alg) = algorithm.jsonwebtoken() else {
        return es512::encode(claims, key);
    };

    let encoding_key = match algorithm.family() {
        KeyFamily::Symmetric => EncodingKey::from_secret(key.as_bytes()),
        KeyFamily::Asymmetric if algorithm.is_elliptic() => {
            EncodingKey::from_ec_pem(key.as_bytes()).map_err(map_jwt_error)?
        }
        KeyFamily::Asymmetric => EncodingKey::from_rsa_pem(key.as_bytes()).map_err(map_jwt_error)?,
    };

    jsonwebtoken::encode(&Header::new(alg), claims, &encoding_key).map_err(map_jwt_error)
}

/// Verify `token` under `algorithm` and check its time claims against `now`.
///
/// `key` is the shared secret for HS* and a PEM public key otherwise.
///
/// # Errors
/// Returns a `CodecError` describing the first failed check.
pub fn decode(
    token: &str,
    algorithm: SigningAlgorithm,
    key: &str,
    now: i64,
) -> Result<DecodedClaims, CodecError> {
    let claims = match algorithm.jsonwebtoken() {
        None => es512::decode::<DecodedClaims>(token, key)?,
        Some(alg) => {
            let decoding_key = match algorithm.family() {
                KeyFamily::Symmetric => DecodingKey::from_secret(key.as_bytes()),
                KeyFamily::Asymmetric if algorithm.is_elliptic() => {
                    DecodingKey::from_ec_pem(key.as_bytes()).map_err(map_jwt_error)?
                }
                KeyFamily::Asymmetric => {
                    DecodingKey::from_rsa_pem(key.as_bytes()).map_err(map_jwt_error)?
                }
            };

            // Signature and header only; time claims are checked below.
            let mut validation = Validation::new(alg);
            validation.required_spec_claims.clear();
            validation.validate_exp = false;
            validation.validate_nbf = false;
            validation.validate_aud = false;
            validation.leeway = 0;

            jsonwebtoken::decode::<DecodedClaims>(token, &decoding_key, &validation)
                .map_err(map_jwt_error)?
                .claims
        }
    };

    check_time_claims(&claims, now)?;
    Ok(claims)
}

/// `nbf`, then `iat`, then `exp`, all with zero leeway.
fn check_time_claims(claims: &DecodedClaims, now: i64) -> Result<(), CodecError> {
    if let Some(nbf) = claims.nbf.filter(|nbf| *nbf > now) {
        return Err(CodecError::NotYetValid(nbf));
    }
    if let Some(iat) = claims.iat.filter(|iat| *iat > now) {
        return Err(CodecError::IssuedInFuture(iat));
    }
    match claims.exp {
        // Tokens without an expiry never validate.
        None => Err(CodecError::MissingClaim("exp")),
        Some(exp) if now >= exp => Err(CodecError::Expired),
        Some(_) => Ok(()),
    }
}

/// Whether `pem` is a private key usable by one of the asymmetric algorithms.
#[must_use]
pub fn is_private_key_pem(pem: &str) -> bool {
    if !pem_label(pem).is_some_and(|label| label.ends_with("PRIVATE KEY")) {
        return false;
    }
    EncodingKey::from_rsa_pem(pem.as_bytes()).is_ok()
        || EncodingKey::from_ec_pem(pem.as_bytes()).is_ok()
        || es512::signing_key(pem).is_ok()
}

/// Whether `pem` is a public key usable by one of the asymmetric algorithms.
#[must_use]
pub fn is_public_key_pem(pem: &str) -> bool {
    if !pem_label(pem).is_some_and(|label| label.ends_with("PUBLIC KEY")) {
        return false;
    }
    DecodingKey::from_rsa_pem(pem.as_bytes()).is_ok()
        || DecodingKey::from_ec_pem(pem.as_bytes()).is_ok()
        || es512::verifying_key(pem).is_ok()
}

/// The label of the first PEM block, e.g. `PRIVATE KEY`.
fn pem_label(pem: &str) -> Option<&str> {
    pem.trim_start()
        .strip_prefix("-----BEGIN ")?
        .split_once("-----")
        .map(|(label, _)| label)
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> CodecError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => CodecError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            CodecError::AlgorithmMismatch
        }
        ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidKeyFormat => {
            CodecError::InvalidKey("key does not match the algorithm".to_string())
        }
        ErrorKind::InvalidRsaKey(reason) => CodecError::InvalidKey(reason.clone()),
        ErrorKind::RsaFailedSigning => CodecError::Signing("RSA signing failed".to_string()),
        ErrorKind::Signing(reason) | ErrorKind::Provider(reason) => {
            CodecError::Signing(reason.clone())
        }
        ErrorKind::ExpiredSignature => CodecError::Expired,
        ErrorKind::MissingRequiredClaim(_) => CodecError::MissingClaim("exp"),
        ErrorKind::Base64(e) => CodecError::MalformedToken(e.to_string()),
        ErrorKind::Json(e) => CodecError::MalformedToken(e.to_string()),
        ErrorKind::Utf8(e) => CodecError::MalformedToken(e.to_string()),
        _ => CodecError::MalformedToken(error.to_string()),
    }
}
