//! Notice catalog.
//!
//! Maps symbolic notice keys to the human-readable messages carried in API
//! responses and settings results. The set of keys is closed; lookups by an
//! unknown key string resolve to [`FALLBACK_MESSAGE`].

/// Message returned for keys that are not part of the catalog.
pub const FALLBACK_MESSAGE: &str = "Something magical is happening";

/// Every notice the service can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    // Settings notices.
    Error,
    Success,
    UnknownError,
    UnsupportedAlgo,
    EmptySecretKey,
    EmptyPublicKey,
    EmptyPrivateKey,
    InvalidPrivateKey,
    InvalidPublicKey,

    // API notices.
    AuthCredential,
    ValidToken,
    BadRequest,
    BadIssuer,
    BadConfig,
    BadAuthHeader,
    NoAuthHeader,
    BadSecretKey,
    BadPrivateKey,
    BadPublicKey,
    BadSigningKey,
    UnsupportedAlgorithm,
    MissingCredential,

    // Crypto envelope notices.
    BadEncryptionKey,
    InvalidEncKeyLength,
    EncryptionFailed,
    DecryptionFailed,
}

impl Notice {
    pub const ALL: [Self; 26] = [
        Self::Error,
        Self::Success,
        Self::UnknownError,
        Self::UnsupportedAlgo,
        Self::EmptySecretKey,
        Self::EmptyPublicKey,
        Self::EmptyPrivateKey,
        Self::InvalidPrivateKey,
        Self::InvalidPublicKey,
        Self::AuthCredential,
        Self::ValidToken,
        Self::BadRequest,
        Self::BadIssuer,
        Self::BadConfig,
        Self::BadAuthHeader,
        Self::NoAuthHeader,
        Self::BadSecretKey,
        Self::BadPrivateKey,
        Self::BadPublicKey,
        Self::BadSigningKey,
        Self::UnsupportedAlgorithm,
        Self::MissingCredential,
        Self::BadEncryptionKey,
        Self::InvalidEncKeyLength,
        Self::EncryptionFailed,
        Self::DecryptionFailed,
    ];

    /// The symbolic key of this notice.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Success => "success",
            Self::UnknownError => "unknown_error",
            Self::UnsupportedAlgo => "unsupported_algo",
            Self::EmptySecretKey => "empty_secret_key",
            Self::EmptyPublicKey => "empty_public_key",
            Self::EmptyPrivateKey => "empty_private_key",
            Self::InvalidPrivateKey => "invalid_private_key",
            Self::InvalidPublicKey => "invalid_public_key",
            Self::AuthCredential => "auth_credential",
            Self::ValidToken => "valid_token",
            Self::BadRequest => "bad_request",
            Self::BadIssuer => "bad_issuer",
            Self::BadConfig => "bad_config",
            Self::BadAuthHeader => "bad_auth_header",
            Self::NoAuthHeader => "no_auth_header",
            Self::BadSecretKey => "bad_secret_key",
            Self::BadPrivateKey => "bad_private_key",
            Self::BadPublicKey => "bad_public_key",
            Self::BadSigningKey => "bad_signing_key",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::MissingCredential => "missing_credential",
            Self::BadEncryptionKey => "bad_encryption_key",
            Self::InvalidEncKeyLength => "invalid_enckey_length",
            Self::EncryptionFailed => "encryption_failed",
            Self::DecryptionFailed => "decryption_failed",
        }
    }

    /// The human-readable message of this notice.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Error => "Settings save failed!",
            Self::Success => "Settings saved successfully",
            Self::UnknownError => "Something went wrong, try again",
            Self::UnsupportedAlgo => "Unsupported algorithm",
            Self::EmptySecretKey => "Secret key is missing",
            Self::EmptyPublicKey => "Public key is missing",
            Self::EmptyPrivateKey => "Private key is missing",
            Self::InvalidPrivateKey => "Invalid private key format",
            Self::InvalidPublicKey => "Invalid public key format",
            Self::AuthCredential => "Token created successfully",
            Self::ValidToken => "Token is valid",
            Self::BadRequest => "User ID not found in the token",
            Self::BadIssuer => "The issuer does not match with this server",
            Self::BadConfig => "JWT is not configured properly, please contact the admin",
            Self::BadAuthHeader => "Authorization header malformed",
            Self::NoAuthHeader => "Authorization header not found",
            Self::BadSecretKey => "JWT secret key not configured, please contact the admin",
            Self::BadPrivateKey => "JWT private key not configured, please contact the admin",
            Self::BadPublicKey => "JWT public key not configured, please contact the admin",
            Self::BadSigningKey => "JWT signing key not configured, please contact the admin",
            Self::UnsupportedAlgorithm => {
                "Algorithm not supported, see https://tools.ietf.org/html/draft-ietf-jose-json-web-algorithms-40"
            }
            Self::MissingCredential => "Username and password are required",
            Self::BadEncryptionKey => "Encryption key is not defined, please contact the admin",
            Self::InvalidEncKeyLength => "Encryption key must be exactly 32 characters long",
            Self::EncryptionFailed => "Failed to encrypt the data",
            Self::DecryptionFailed => "Failed to decrypt the data",
        }
    }

    /// Resolve a notice by its symbolic key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.key() == key)
    }

    /// Look up a message by symbolic key, falling back to [`FALLBACK_MESSAGE`].
    #[must_use]
    pub fn lookup(key: &str) -> &'static str {
        Self::from_key(key).map_or(FALLBACK_MESSAGE, Self::message)
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Remove markup from a message before it is surfaced to API callers.
///
/// `<script>` and `<style>` elements are dropped together with their
/// contents; every other tag is removed and its text kept.
#[must_use]
pub fn strip_tags(input: &str) -> String {
    let mut without_blocks = input.to_string();
    for element in ["script", "style"] {
        without_blocks = remove_element(&without_blocks, element);
    }

    let mut output = String::with_capacity(without_blocks.len());
    let mut in_tag = false;
    for ch in without_blocks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => output.push(ch),
            _ => {}
        }
    }

    output.trim().to_string()
}

fn remove_element(input: &str, element: &str) -> String {
    let open = format!("<{element}");
    let close = format!("</{element}>");
    let lower = input.to_ascii_lowercase();
    let mut output = String::with_capacity(input.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(found) = lower[search..].find(&open) {
        let start = search + found;
        let after = start + open.len();
        // `<scripted>` is an ordinary tag.
        let is_element = lower[after..]
            .bytes()
            .next()
            .is_some_and(|b| b == b'>' || b.is_ascii_whitespace());
        if !is_element {
            search = after;
            continue;
        }
        // Unterminated blocks are left to the tag stripper.
        let Some(end) = lower[after..].find(&close) else {
            break;
        };
        output.push_str(&input[copied..start]);
        copied = after + end + close.len();
        search = copied;
    }

    output.push_str(&input[copied..]);
    output
}
