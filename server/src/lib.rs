#![cfg_attr(test, allow(clippy::disallowed_methods, clippy::expect_used, clippy::unwrap_used))]
// Life of a request:
// 1. The CORS layer passes the request on and decorates the response.
// 2. The authentication middleware resolves the caller from the bearer token
//    and rejects API requests whose token failed validation.
// 3. The handler issues or validates a token through the token engine, which
//    reads the algorithm and the sealed keys from the config store.
//
// System components:
//  - Config store (memory or JSON file)
//  - Crypto envelope sealing stored keys
//  - Token engine and JWT codec
//  - HTTP routes and middleware

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod notice;
pub mod response;
pub mod routes;
pub mod settings;
pub mod store;
pub mod time;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod testing;

pub use auth::TokenEngine;
pub use error::AuthError;
pub use routes::{AppState, router};
