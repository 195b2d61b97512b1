//! ES512 (ECDSA P-521 with SHA-512) compact JWS.
//!
//! `jsonwebtoken` stops at ES384, so tokens for this one algorithm are
//! assembled here with `p521` using the same `header.payload.signature`
//! layout. Only signature and header checks happen here; time claims are
//! checked by the codec for every algorithm alike.
//!
//! # Invariants
//! - The header `alg` of an accepted token is exactly `ES512`.
//! - Signatures are the fixed-size `r || s` encoding (132 bytes).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p521::ecdsa::signature::{Signer, Verifier};
use p521::ecdsa::{Signature, SigningKey, VerifyingKey};
use p521::elliptic_curve::sec1::ToEncodedPoint;
use p521::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p521::{PublicKey, SecretKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::codec::CodecError;

const ALG: &str = "ES512";

#[derive(Debug, Serialize, Deserialize)]
struct JoseHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    alg: String,
}

/// Parse a P-521 private key from PKCS#8 or SEC1 PEM.
///
/// # Errors
/// Returns `CodecError::InvalidKey` if the PEM is not a P-521 private key.
pub fn signing_key(pem: &str) -> Result<SigningKey, CodecError> {
    let secret = SecretKey::from_pkcs8_pem(pem)
        .or_else(|_| SecretKey::from_sec1_pem(pem))
        .map_err(|e| CodecError::InvalidKey(e.to_string()))?;
    SigningKey::from_bytes(&secret.to_bytes()).map_err(|e| CodecError::InvalidKey(e.to_string()))
}

/// Parse a P-521 public key from SPKI PEM.
///
/// # Errors
/// Returns `CodecError::InvalidKey` if the PEM is not a P-521 public key.
pub fn verifying_key(pem: &str) -> Result<VerifyingKey, CodecError> {
    let public =
        PublicKey::from_public_key_pem(pem).map_err(|e| CodecError::InvalidKey(e.to_string()))?;
    VerifyingKey::from_encoded_point(&public.to_encoded_point(false))
        .map_err(|e| CodecError::InvalidKey(e.to_string()))
}

/// Sign `claims` into a compact token.
///
/// # Errors
/// Returns `CodecError::InvalidKey` for an unusable key and
/// `CodecError::Signing` if serialization or signing fails.
pub fn encode<T: Serialize>(claims: &T, private_key_pem: &str) -> Result<String, CodecError> {
    let key = signing_key(private_key_pem)?;

    let header = JoseHeader {
        typ: Some("JWT".to_string()),
        alg: ALG.to_string(),
    };
    let header = serde_json::to_vec(&header).map_err(|e| CodecError::Signing(e.to_string()))?;
    let payload = serde_json::to_vec(claims).map_err(|e| CodecError::Signing(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature: Signature = key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| CodecError::Signing(e.to_string()))?;

    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

/// Verify the header and signature of `token` and deserialize its payload.
///
/// # Errors
/// - `CodecError::MalformedToken` for a token that is not three base64url
///   JSON segments.
/// - `CodecError::AlgorithmMismatch` if the header names another algorithm.
/// - `CodecError::InvalidSignature` if the signature does not verify.
/// - `CodecError::InvalidKey` for an unusable key.
pub fn decode<T: DeserializeOwned>(token: &str, public_key_pem: &str) -> Result<T, CodecError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(CodecError::MalformedToken(
            "wrong number of segments".to_string(),
        ));
    };

    let signing_input = &token[..header.len() + 1 + payload.len()];

    let header: JoseHeader = decode_segment(header)?;
    if header.alg != ALG {
        return Err(CodecError::AlgorithmMismatch);
    }

    let key = verifying_key(public_key_pem)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| CodecError::MalformedToken(e.to_string()))?;
    let signature = Signature::from_slice(&signature).map_err(|_| CodecError::InvalidSignature)?;

    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| CodecError::InvalidSignature)?;

    decode_segment(payload)
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, CodecError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CodecError::MalformedToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| CodecError::MalformedToken(e.to_string()))
}
