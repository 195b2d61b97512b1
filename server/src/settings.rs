//! Administrative settings updates.
//!
//! Validates a submitted settings form, seals the keys with the envelope and
//! writes everything through [`ConfigStore::save`]. Nothing is written unless
//! every check passes.
//!
//! `enable_auth` and `disable_xmlrpc` are stored for other components; the
//! token engine does not read them.

use std::collections::BTreeMap;

use crate::auth::{KeyFamily, SigningAlgorithm, codec, family_of};
use crate::crypto::Envelope;
use crate::error::AuthError;
use crate::notice::Notice;
use crate::store::{ConfigStore, keys};

/// A submitted settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub algorithm: String,
    pub enable_auth: bool,
    pub enable_cors: bool,
    pub disable_xmlrpc: bool,
    /// Plain shared secret; empty keeps the stored one.
    pub secret_key: String,
    /// Plain PEM private key; empty keeps the stored one.
    pub private_key: String,
    /// Plain PEM public key; empty keeps the stored one.
    pub public_key: String,
}

impl Default for SettingsUpdate {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::HS256.as_str().to_string(),
            enable_auth: false,
            enable_cors: false,
            disable_xmlrpc: false,
            secret_key: String::new(),
            private_key: String::new(),
            public_key: String::new(),
        }
    }
}

/// Error returned when a settings update is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    UnsupportedAlgorithm,
    EmptySecretKey,
    EmptyPrivateKey,
    EmptyPublicKey,
    InvalidPrivateKey,
    InvalidPublicKey,
    /// Sealing a key failed.
    Crypto(AuthError),
    /// The store refused a write.
    UnknownError,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let notice = match self {
            Self::Crypto(e) => return write!(f, "{e}"),
            Self::UnsupportedAlgorithm => Notice::UnsupportedAlgo,
            Self::EmptySecretKey => Notice::EmptySecretKey,
            Self::EmptyPrivateKey => Notice::EmptyPrivateKey,
            Self::EmptyPublicKey => Notice::EmptyPublicKey,
            Self::InvalidPrivateKey => Notice::InvalidPrivateKey,
            Self::InvalidPublicKey => Notice::InvalidPublicKey,
            Self::UnknownError => Notice::UnknownError,
        };
        f.write_str(notice.message())
    }
}

impl std::error::Error for SettingsError {}

/// Validate `update`, seal its keys and persist it.
///
/// Empty key fields leave the stored keys untouched.
///
/// # Errors
/// Returns the first failed check as a `SettingsError`.
pub fn apply(
    update: &SettingsUpdate,
    envelope: &Envelope,
    store: &dyn ConfigStore,
) -> Result<(), SettingsError> {
    let algorithm = update.algorithm.trim();
    let secret_key = update.secret_key.trim();
    let private_key = update.private_key.trim();
    let public_key = update.public_key.trim();

    if !algorithm.is_empty() && algorithm.parse::<SigningAlgorithm>().is_err() {
        return Err(SettingsError::UnsupportedAlgorithm);
    }

    if update.enable_auth {
        match family_of(algorithm) {
            KeyFamily::Symmetric if secret_key.is_empty() => {
                return Err(SettingsError::EmptySecretKey);
            }
            KeyFamily::Asymmetric if private_key.is_empty() => {
                return Err(SettingsError::EmptyPrivateKey);
            }
            KeyFamily::Asymmetric if public_key.is_empty() => {
                return Err(SettingsError::EmptyPublicKey);
            }
            KeyFamily::Symmetric | KeyFamily::Asymmetric => {}
        }
    }

    if !private_key.is_empty() && !codec::is_private_key_pem(private_key) {
        return Err(SettingsError::InvalidPrivateKey);
    }
    if !public_key.is_empty() && !codec::is_public_key_pem(public_key) {
        return Err(SettingsError::InvalidPublicKey);
    }

    let seal = |value: &str| -> Result<String, SettingsError> {
        if value.is_empty() {
            Ok(String::new())
        } else {
            envelope.encrypt(value).map_err(SettingsError::Crypto)
        }
    };

    let configs = BTreeMap::from([
        (keys::ALGORITHM.to_string(), algorithm.to_string()),
        (keys::ENABLE_AUTH.to_string(), flag(update.enable_auth)),
        (keys::SECRET_KEY.to_string(), seal(secret_key)?),
        (keys::PRIVATE_KEY.to_string(), seal(private_key)?),
        (keys::PUBLIC_KEY.to_string(), seal(public_key)?),
        (keys::ENABLE_CORS.to_string(), flag(update.enable_cors)),
        (keys::DISABLE_XMLRPC.to_string(), flag(update.disable_xmlrpc)),
    ]);

    store.save(&configs).map_err(|e| {
        tracing::warn!("Failed to save settings: {e}");
        SettingsError::UnknownError
    })?;

    tracing::info!(
        "Saved settings: algorithm={algorithm}, enable_auth={}, enable_cors={}",
        update.enable_auth,
        update.enable_cors
    );
    Ok(())
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}
