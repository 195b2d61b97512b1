//! Shared test fixtures: key material, a provisioned in-memory store, a
//! pinned clock and one known user.


use std::sync::{Arc, LazyLock};

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::auth::{SigningAlgorithm, StaticCredentials, StoredUser, TokenEngine};
use crate::crypto::Envelope;
use crate::store::{ConfigStore, MemoryConfigStore, keys as config_keys, provision_defaults};
use crate::time::FixedTimeSource;

/// A valid 32-byte envelope key.
pub const ENCRYPT_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const ISSUER: &str = "https://a.example";
pub const SECRET: &str = "s3cr3t-32-byte-ok";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct-password";
pub const USER_ID: u64 = 7;
/// Instant the fixture clock starts at.
pub const NOW: i64 = 1_700_000_000;

#[must_use]
pub fn envelope() -> Envelope {
    Envelope::new(Some(ENCRYPT_KEY))
}

/// PHC hash of [`PASSWORD`], computed once with minimal Argon2id costs so
/// logins in tests stay fast.
#[must_use]
pub fn password_hash() -> String {
    static HASH: LazyLock<String> = LazyLock::new(|| {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None).expect("params");
        let salt = SaltString::from_b64("c29tZXNhbHRzb21lc2FsdA").expect("salt");
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(PASSWORD.as_bytes(), &salt)
            .expect("hash")
            .to_string()
    });
    HASH.clone()
}

#[must_use]
pub fn alice() -> StoredUser {
    StoredUser {
        id: USER_ID,
        username: USERNAME.to_string(),
        password_hash: password_hash(),
        email: "alice@example.com".to_string(),
        nicename: "alice".to_string(),
        display_name: "Alice".to_string(),
    }
}

#[must_use]
pub fn credentials() -> Arc<StaticCredentials> {
    Arc::new(StaticCredentials::new(vec![alice()]))
}

/// Plain key material for `algorithm`: `(signing, verification)`.
#[must_use]
pub const fn key_pair(algorithm: SigningAlgorithm) -> (&'static str, &'static str) {
    match algorithm {
        SigningAlgorithm::HS256 | SigningAlgorithm::HS384 | SigningAlgorithm::HS512 => {
            (SECRET, SECRET)
        }
        SigningAlgorithm::ES256 => (keys::EC256_PRIVATE_KEY, keys::EC256_PUBLIC_KEY),
        SigningAlgorithm::ES384 => (keys::EC384_PRIVATE_KEY, keys::EC384_PUBLIC_KEY),
        SigningAlgorithm::ES512 => (keys::EC521_PRIVATE_KEY, keys::EC521_PUBLIC_KEY),
        SigningAlgorithm::RS256
        | SigningAlgorithm::RS384
        | SigningAlgorithm::RS512
        | SigningAlgorithm::PS256
        | SigningAlgorithm::PS384
        | SigningAlgorithm::PS512 => (keys::RSA_PRIVATE_KEY, keys::RSA_PUBLIC_KEY),
    }
}

/// A provisioned store configured for `algorithm` with sealed keys.
#[must_use]
pub fn configured_store(algorithm: SigningAlgorithm) -> Arc<MemoryConfigStore> {
    let store = Arc::new(MemoryConfigStore::new());
    provision_defaults(store.as_ref()).expect("provisioned");
    store
        .upsert(config_keys::ALGORITHM, algorithm.as_str())
        .expect("algorithm");

    let envelope = envelope();
    let (signing, verification) = key_pair(algorithm);
    if algorithm.family() == crate::auth::KeyFamily::Symmetric {
        let sealed = envelope.encrypt(signing).expect("sealed");
        store.upsert(config_keys::SECRET_KEY, &sealed).expect("secret");
    } else {
        let sealed = envelope.encrypt(signing).expect("sealed");
        store.upsert(config_keys::PRIVATE_KEY, &sealed).expect("private");
        let sealed = envelope.encrypt(verification).expect("sealed");
        store.upsert(config_keys::PUBLIC_KEY, &sealed).expect("public");
    }
    store
}

/// An engine over `store` with the fixture envelope, user and a clock
/// pinned at [`NOW`].
#[must_use]
pub fn engine(store: Arc<dyn ConfigStore>) -> TokenEngine {
    TokenEngine::new(store, envelope(), credentials(), ISSUER)
        .with_clock(Arc::new(FixedTimeSource::new(NOW)))
}

/// A configured store and an engine sharing one adjustable clock.
pub struct Fixture {
    pub store: Arc<MemoryConfigStore>,
    pub clock: Arc<FixedTimeSource>,
    pub engine: TokenEngine,
}

impl Fixture {
    #[must_use]
    pub fn new(algorithm: SigningAlgorithm) -> Self {
        let store = configured_store(algorithm);
        let clock = Arc::new(FixedTimeSource::new(NOW));
        let engine = TokenEngine::new(store.clone(), envelope(), credentials(), ISSUER)
            .with_clock(clock.clone());
        Self {
            store,
            clock,
            engine,
        }
    }

    /// Issue a token for the fixture user.
    #[must_use]
    pub fn issue(&self) -> String {
        self.engine
            .issue_token(USERNAME, PASSWORD)
            .expect("issued")
            .token
    }
}
