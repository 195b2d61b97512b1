//! Supported signing algorithms.
//!
//! # Invariants
//! - Exactly twelve algorithms are supported; any other name is unsupported.
//! - Only `HS256`, `HS384` and `HS512` (exact, case-sensitive) are symmetric.

use std::str::FromStr;

use jsonwebtoken::Algorithm;

/// Key family of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    /// One shared secret signs and verifies.
    Symmetric,
    /// A private key signs and a public key verifies.
    Asymmetric,
}

/// The JWS algorithms a deployment may be configured with.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
    PS256,
    PS384,
    PS512,
}

/// Names that select the symmetric family.
const SYMMETRIC_NAMES: [&str; 3] = ["HS256", "HS384", "HS512"];

impl SigningAlgorithm {
    pub const ALL: [Self; 12] = [
        Self::HS256,
        Self::HS384,
        Self::HS512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::ES256,
        Self::ES384,
        Self::ES512,
        Self::PS256,
        Self::PS384,
        Self::PS512,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
        }
    }

    #[must_use]
    pub fn family(self) -> KeyFamily {
        family_of(self.as_str())
    }

    /// The `jsonwebtoken` algorithm, or `None` for ES512 which that crate
    /// does not implement.
    #[must_use]
    pub const fn jsonwebtoken(self) -> Option<Algorithm> {
        match self {
            Self::HS256 => Some(Algorithm::HS256),
            Self::HS384 => Some(Algorithm::HS384),
            Self::HS512 => Some(Algorithm::HS512),
            Self::RS256 => Some(Algorithm::RS256),
            Self::RS384 => Some(Algorithm::RS384),
            Self::RS512 => Some(Algorithm::RS512),
            Self::ES256 => Some(Algorithm::ES256),
            Self::ES384 => Some(Algorithm::ES384),
            Self::ES512 => None,
            Self::PS256 => Some(Algorithm::PS256),
            Self::PS384 => Some(Algorithm::PS384),
            Self::PS512 => Some(Algorithm::PS512),
        }
    }

    /// Whether the key material is an EC key (as opposed to RSA or a secret).
    #[must_use]
    pub const fn is_elliptic(self) -> bool {
        matches!(self, Self::ES256 | Self::ES384 | Self::ES512)
    }
}

/// Family of an arbitrary algorithm name.
///
/// An allow-list of the exact HS* names selects the symmetric family;
/// every other value, including case variants, is asymmetric.
#[must_use]
pub fn family_of(name: &str) -> KeyFamily {
    if SYMMETRIC_NAMES.contains(&name) {
        KeyFamily::Symmetric
    } else {
        KeyFamily::Asymmetric
    }
}

/// Error returned for a name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedAlgorithm(pub String);

impl std::fmt::Display for UnsupportedAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported algorithm: {}", self.0)
    }
}

impl std::error::Error for UnsupportedAlgorithm {}

impl FromStr for SigningAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| UnsupportedAlgorithm(s.to_string()))
    }
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
