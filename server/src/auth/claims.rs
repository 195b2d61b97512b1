//! Token claims.
//!
//! Issued tokens carry
//! `{"iss", "iat", "nbf", "exp", "data": {"user": {"id"}}}` plus whatever
//! custom members a [`TokenHooks`](super::TokenHooks) implementation adds.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Claims of an issued token. Immutable once signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer URL.
    pub iss: String,
    /// Issued-at, epoch seconds.
    pub iat: i64,
    /// Not-before, epoch seconds.
    pub nbf: i64,
    /// Expiry, epoch seconds.
    pub exp: i64,
    pub data: ClaimsData,
    /// Custom top-level claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsData {
    pub user: ClaimsUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsUser {
    pub id: u64,
}

impl TokenClaims {
    #[must_use]
    pub fn new(iss: String, iat: i64, nbf: i64, exp: i64, user_id: u64) -> Self {
        Self {
            iss,
            iat,
            nbf,
            exp,
            data: ClaimsData {
                user: ClaimsUser { id: user_id },
            },
            extra: Map::new(),
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> u64 {
        self.data.user.id
    }
}

/// Claims as read back from a token whose signature passed.
///
/// Every member is optional and read leniently; the engine decides which
/// absences are errors (missing `iss` is an issuer mismatch, missing user id
/// a bad request). A signed token whose `data` has an unexpected shape
/// decodes with no user id rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DecodedClaims {
    /// String issuer; any other JSON type reads as absent.
    #[serde(default, deserialize_with = "string_or_none")]
    pub iss: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "timestamp")]
    pub nbf: Option<i64>,
    #[serde(default, deserialize_with = "timestamp")]
    pub exp: Option<i64>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DecodedClaims {
    /// `data.user.id`, if it holds a non-negative integer or a string of
    /// digits.
    #[must_use]
    pub fn user_id(&self) -> Option<u64> {
        match self.data.as_ref()?.get("user")?.get("id")? {
            Value::Number(id) => id.as_u64(),
            Value::String(id) => id.trim().parse().ok(),
            _ => None,
        }
    }
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Some(value),
        _ => None,
    })
}

/// Epoch seconds; fractional values are floored.
fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(floor_secs))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp {number} is out of range"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a numeric timestamp, found {other}"
        ))),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn floor_secs(secs: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; stay strictly below 2^63.
    let floored = secs.floor();
    (floored.is_finite() && floored >= -9.223_372_036_854_776e18 && floored < 9.223_372_036_854_776e18)
        .then_some(floored as i64)
}
