//! Username/password verification.
//!
//! The token endpoint depends only on [`CredentialVerifier`]. The binary ships
//! [`StaticCredentials`], a fixed user list read from a JSON file.

use std::path::Path;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use serde::Deserialize;

/// Identity of a verified user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: u64,
    pub email: String,
    pub nicename: String,
    pub display_name: String,
}

impl UserIdentity {
    #[must_use]
    pub fn new(
        id: u64,
        email: impl Into<String>,
        nicename: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            nicename: nicename.into(),
            display_name: display_name.into(),
        }
    }
}

/// A refused login.
///
/// `message` may contain markup; callers strip it before display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialError {
    /// Unprefixed symbolic code, e.g. `incorrect_password`.
    pub code: String,
    pub message: String,
    /// HTTP status to answer with.
    pub status: u16,
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CredentialError {}

pub trait CredentialVerifier: Send + Sync {
    /// Check `password` for `username` and return the matching identity.
    fn verify(&self, username: &str, password: &str) -> Result<UserIdentity, CredentialError>;
}

/// One entry of the users file.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredUser {
    pub id: u64,
    pub username: String,
    /// Argon2 hash in PHC string format, e.g. `$argon2id$v=19$...`.
    pub password_hash: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nicename: String,
    #[serde(default)]
    pub display_name: String,
}

/// Error returned when the users file cannot be loaded.
#[derive(Debug)]
pub enum UsersFileError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for UsersFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read users file: {e}"),
            Self::Parse(e) => write!(f, "failed to parse users file: {e}"),
        }
    }
}

impl std::error::Error for UsersFileError {}

/// A fixed user list.
///
/// Users log in with their username or email. Passwords are checked against
/// the stored Argon2 hash.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: Vec<StoredUser>,
}

impl StaticCredentials {
    #[must_use]
    pub const fn new(users: Vec<StoredUser>) -> Self {
        Self { users }
    }

    /// Load a JSON array of users.
    ///
    /// # Errors
    /// Returns `UsersFileError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, UsersFileError> {
        let bytes = std::fs::read(path).map_err(UsersFileError::Io)?;
        let users: Vec<StoredUser> = serde_json::from_slice(&bytes).map_err(UsersFileError::Parse)?;
        tracing::info!("Loaded {} users from {}", users.len(), path.display());
        Ok(Self::new(users))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Result<UserIdentity, CredentialError> {
        let by_email = username.contains('@');
        let user = self
            .users
            .iter()
            .find(|user| {
                if by_email {
                    user.email == username
                } else {
                    user.username == username
                }
            })
            .ok_or_else(|| {
                if by_email {
                    CredentialError {
                        code: "invalid_email".to_string(),
                        message: "Unknown email address. Check again or try your username."
                            .to_string(),
                        status: 403,
                    }
                } else {
                    CredentialError {
                        code: "invalid_username".to_string(),
                        message: format!(
                            "<strong>Error:</strong> The username <strong>{username}</strong> \
                             is not registered on this site."
                        ),
                        status: 403,
                    }
                }
            })?;

        if !password_matches(&user.password_hash, password) {
            return Err(CredentialError {
                code: "incorrect_password".to_string(),
                message: format!(
                    "<strong>Error:</strong> The password you entered for the username \
                     <strong>{}</strong> is incorrect.",
                    user.username
                ),
                status: 403,
            });
        }

        Ok(UserIdentity {
            id: user.id,
            email: user.email.clone(),
            nicename: user.nicename.clone(),
            display_name: user.display_name.clone(),
        })
    }
}

/// A hash that does not parse never matches.
fn password_matches(password_hash: &str, password: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unreadable password hash: {e}");
            false
        }
    }
}
