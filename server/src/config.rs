//! Server configuration module.
//!
//! This module provides configuration loading for the token service from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `JWT_AUTH_ENCRYPT_KEY`: 32-byte key sealing the stored signing keys (optional)
//! - `JWT_AUTH_ISSUER`: Issuer written into tokens (default: `http://localhost:{port}`)
//! - `JWT_AUTH_API_PREFIX`: REST URL prefix (default: `api`)
//! - `JWT_AUTH_ENDPOINT`: Route namespace (default: `auth`)
//! - `JWT_AUTH_API_VERSION`: Major API version (default: `1`)
//! - `JWT_AUTH_LISTEN_PORT`: Port to listen on (default: `3000`)
//! - `JWT_AUTH_CONFIG_PATH`: Config store file (default: `./data/config.json`)
//! - `JWT_AUTH_USERS_PATH`: JSON user list (optional)
//! - `JWT_AUTH_DROP_CONFIGS`: When truthy, remove every stored setting and
//!   exit instead of serving
//!
//! Settings applied once at start-up, when any of them is set:
//! `JWT_AUTH_ALGORITHM`, `JWT_AUTH_SECRET_KEY`, `JWT_AUTH_PRIVATE_KEY_PATH`,
//! `JWT_AUTH_PUBLIC_KEY_PATH`, `JWT_AUTH_ENABLE_AUTH`, `JWT_AUTH_ENABLE_CORS`.
//!
//! # Invariants
//!
//! - `listen_port` is always a valid port number (1-65535)
//! - `api_version` is a positive integer
//! - A missing encryption key is not an error here; sealing and opening keys
//!   fails later with `BadEncryptionKey`

use std::path::{Path, PathBuf};

use crate::auth::SigningAlgorithm;
use crate::settings::SettingsUpdate;
use crate::store::is_truthy;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Envelope key. Never logged.
    pub encrypt_key: Option<String>,
    pub issuer: String,
    pub api_prefix: String,
    pub endpoint: String,
    pub api_version: u32,
    pub listen_port: u16,
    /// File backing the config store.
    pub config_path: PathBuf,
    /// JSON user list for the credential verifier.
    pub users_path: Option<PathBuf>,
    /// Settings to apply before serving.
    pub bootstrap: Option<BootstrapSettings>,
    /// Uninstall: clear the config store and exit.
    pub drop_configs: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("encrypt_key", &self.encrypt_key.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("api_prefix", &self.api_prefix)
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("listen_port", &self.listen_port)
            .field("config_path", &self.config_path)
            .field("users_path", &self.users_path)
            .field("bootstrap", &self.bootstrap)
            .field("drop_configs", &self.drop_configs)
            .finish()
    }
}

/// Settings supplied through the environment.
///
/// Key material is referenced by path and only read by [`Self::to_update`].
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapSettings {
    pub algorithm: String,
    pub secret_key: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
    pub enable_auth: bool,
    pub enable_cors: bool,
}

impl std::fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("algorithm", &self.algorithm)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field("enable_auth", &self.enable_auth)
            .field("enable_cors", &self.enable_cors)
            .finish()
    }
}

impl BootstrapSettings {
    /// Read the key files and build the settings form.
    ///
    /// # Errors
    ///
    /// Returns an error if a key file cannot be read.
    pub fn to_update(&self) -> Result<SettingsUpdate, ConfigError> {
        Ok(SettingsUpdate {
            algorithm: self.algorithm.clone(),
            enable_auth: self.enable_auth,
            enable_cors: self.enable_cors,
            disable_xmlrpc: false,
            secret_key: self.secret_key.clone().unwrap_or_default(),
            private_key: read_key_file(ENV_PRIVATE_KEY_PATH, self.private_key_path.as_deref())?,
            public_key: read_key_file(ENV_PUBLIC_KEY_PATH, self.public_key_path.as_deref())?,
        })
    }
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self::InvalidValue { name, message } = self;
        write!(f, "invalid value for {name}: {message}")
    }
}

impl std::error::Error for ConfigError {}

const ENV_ENCRYPT_KEY: &str = "JWT_AUTH_ENCRYPT_KEY";
const ENV_ISSUER: &str = "JWT_AUTH_ISSUER";
const ENV_API_PREFIX: &str = "JWT_AUTH_API_PREFIX";
const ENV_ENDPOINT: &str = "JWT_AUTH_ENDPOINT";
const ENV_API_VERSION: &str = "JWT_AUTH_API_VERSION";
const ENV_LISTEN_PORT: &str = "JWT_AUTH_LISTEN_PORT";
const ENV_CONFIG_PATH: &str = "JWT_AUTH_CONFIG_PATH";
const ENV_USERS_PATH: &str = "JWT_AUTH_USERS_PATH";
const ENV_ALGORITHM: &str = "JWT_AUTH_ALGORITHM";
const ENV_SECRET_KEY: &str = "JWT_AUTH_SECRET_KEY";
const ENV_PRIVATE_KEY_PATH: &str = "JWT_AUTH_PRIVATE_KEY_PATH";
const ENV_PUBLIC_KEY_PATH: &str = "JWT_AUTH_PUBLIC_KEY_PATH";
const ENV_ENABLE_AUTH: &str = "JWT_AUTH_ENABLE_AUTH";
const ENV_ENABLE_CORS: &str = "JWT_AUTH_ENABLE_CORS";
const ENV_DROP_CONFIGS: &str = "JWT_AUTH_DROP_CONFIGS";

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_API_PREFIX: &'static str = "api";
    pub const DEFAULT_ENDPOINT: &'static str = "auth";
    pub const DEFAULT_API_VERSION: u32 = 1;
    /// Default config store file.
    pub const DEFAULT_CONFIG_PATH: &'static str = "./data/config.json";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_AUTH_LISTEN_PORT` is set but not a valid port number
    /// - `JWT_AUTH_API_VERSION` is set but not a positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let listen_port = Self::load_listen_port(var(ENV_LISTEN_PORT))?;
        let api_version = Self::load_api_version(var(ENV_API_VERSION))?;
        let issuer = var(ENV_ISSUER).map_or_else(
            || format!("http://localhost:{listen_port}"),
            |issuer| issuer.trim_end_matches('/').to_string(),
        );

        let bootstrap_vars = [
            ENV_ALGORITHM,
            ENV_SECRET_KEY,
            ENV_PRIVATE_KEY_PATH,
            ENV_PUBLIC_KEY_PATH,
            ENV_ENABLE_AUTH,
            ENV_ENABLE_CORS,
        ];
        let bootstrap = bootstrap_vars
            .into_iter()
            .any(|name| var(name).is_some())
            .then(|| BootstrapSettings {
                algorithm: var(ENV_ALGORITHM)
                    .unwrap_or_else(|| SigningAlgorithm::HS256.as_str().to_string()),
                secret_key: var(ENV_SECRET_KEY),
                private_key_path: var(ENV_PRIVATE_KEY_PATH).map(PathBuf::from),
                public_key_path: var(ENV_PUBLIC_KEY_PATH).map(PathBuf::from),
                enable_auth: is_truthy(var(ENV_ENABLE_AUTH).as_deref()),
                enable_cors: is_truthy(var(ENV_ENABLE_CORS).as_deref()),
            });

        Ok(Self {
            encrypt_key: var(ENV_ENCRYPT_KEY),
            issuer,
            api_prefix: var(ENV_API_PREFIX)
                .unwrap_or_else(|| Self::DEFAULT_API_PREFIX.to_string()),
            endpoint: var(ENV_ENDPOINT).unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
            api_version,
            listen_port,
            config_path: var(ENV_CONFIG_PATH)
                .map_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_PATH), PathBuf::from),
            users_path: var(ENV_USERS_PATH).map(PathBuf::from),
            bootstrap,
            drop_configs: is_truthy(var(ENV_DROP_CONFIGS).as_deref()),
        })
    }

    /// Parse the listen port.
    ///
    /// Returns the default if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is set but not a valid port number.
    fn load_listen_port(value: Option<String>) -> Result<u16, ConfigError> {
        match value {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: ENV_LISTEN_PORT.to_string(),
                    message: format!("'{value}' is not a valid port number (must be 1-65535)"),
                }),
            None => Ok(Self::DEFAULT_PORT),
        }
    }

    /// Parse the major API version.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is set but not a positive integer.
    fn load_api_version(value: Option<String>) -> Result<u32, ConfigError> {
        match value {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|version| *version > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: ENV_API_VERSION.to_string(),
                    message: format!("'{value}' is not a positive integer"),
                }),
            None => Ok(Self::DEFAULT_API_VERSION),
        }
    }
}

fn read_key_file(name: &str, path: Option<&Path>) -> Result<String, ConfigError> {
    let Some(path) = path else {
        return Ok(String::new());
    };
    std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        message: format!("cannot read {}: {e}", path.display()),
    })
}
