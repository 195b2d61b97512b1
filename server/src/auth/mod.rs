//! Token issuance, validation and request authentication.
//!
//! # Invariants
//! - The configured algorithm decides the key family: HS* use the shared
//!   secret, every other algorithm a private key to sign and a public key to
//!   verify.
//! - Key material is stored sealed and only opened for the call that needs it.

pub mod algorithm;
pub mod claims;
pub mod codec;
pub mod credentials;
pub mod engine;
pub mod es512;
pub mod hooks;
pub mod middleware;

pub use algorithm::{KeyFamily, SigningAlgorithm, UnsupportedAlgorithm, family_of};
pub use claims::{DecodedClaims, TokenClaims};
pub use credentials::{
    CredentialError, CredentialVerifier, StaticCredentials, StoredUser, UserIdentity,
};
pub use engine::{CallSite, IssuedToken, TokenEngine, ValidationOutcome, parse_bearer};
pub use hooks::{DefaultHooks, TokenHooks};
pub use middleware::{
    CurrentUser, IdentityResolution, authenticate, authorization_header, determine_identity,
    pre_dispatch_guard,
};
