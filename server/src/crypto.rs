//! Envelope encryption of signing-key material at rest.
//!
//! Secrets are sealed with AES-256-GCM under a process-wide 32-byte key and
//! stored as `base64(IV || Tag || Ciphertext)`.
//!
//! # Invariants
//! - The IV is 12 bytes and freshly randomized for every encryption.
//! - The tag is exactly 16 bytes.
//! - Failures are returned as typed [`AuthError`]s, never panics.

use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce, Tag};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

use crate::error::AuthError;

/// Length of the AES-256 key in bytes.
pub const KEY_LENGTH: usize = 32;
/// Length of the GCM IV in bytes.
pub const IV_LENGTH: usize = 12;
/// Length of the GCM authentication tag in bytes.
pub const TAG_LENGTH: usize = 16;

/// Seals and opens secrets with the process-wide encryption key.
///
/// The key is configured out-of-band. A missing or wrongly sized key is not a
/// construction error: every call reports it, so the service can start and
/// answer with a proper error response.
#[derive(Clone)]
pub struct Envelope {
    key: Option<Vec<u8>>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Envelope {
    #[must_use]
    pub fn new(key: Option<&str>) -> Self {
        Self {
            key: key.filter(|k| !k.is_empty()).map(|k| k.as_bytes().to_vec()),
        }
    }

    /// Encrypt `plaintext` into an encoded envelope.
    ///
    /// # Errors
    /// `BadEncryptionKey` or `InvalidEncryptionKeyLength` when the key is not
    /// usable, `EncryptionFailed` when the cipher rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AuthError> {
        let cipher = self.cipher()?;

        let mut iv = [0u8; IV_LENGTH];
        rand::rng().fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| AuthError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(IV_LENGTH + TAG_LENGTH + buffer.len());
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(&tag);
        sealed.extend_from_slice(&buffer);

        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt an encoded envelope back into the original string.
    ///
    /// # Errors
    /// `BadEncryptionKey` or `InvalidEncryptionKeyLength` when the key is not
    /// usable, `DecryptionFailed` on malformed input (including empty input)
    /// or a tag mismatch.
    pub fn decrypt(&self, encoded: &str) -> Result<String, AuthError> {
        let cipher = self.cipher()?;

        let sealed = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::DecryptionFailed)?;
        if sealed.len() < IV_LENGTH + TAG_LENGTH {
            return Err(AuthError::DecryptionFailed);
        }

        let (iv, rest) = sealed.split_at(IV_LENGTH);
        let (tag, ciphertext) = rest.split_at(TAG_LENGTH);

        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(Nonce::from_slice(iv), b"", &mut buffer, Tag::from_slice(tag))
            .map_err(|_| AuthError::DecryptionFailed)?;

        String::from_utf8(buffer).map_err(|_| AuthError::DecryptionFailed)
    }

    fn cipher(&self) -> Result<Aes256Gcm, AuthError> {
        let key = self.key.as_deref().ok_or(AuthError::BadEncryptionKey)?;
        if key.len() != KEY_LENGTH {
            return Err(AuthError::InvalidEncryptionKeyLength);
        }
        Aes256Gcm::new_from_slice(key).map_err(|_| AuthError::InvalidEncryptionKeyLength)
    }
}
