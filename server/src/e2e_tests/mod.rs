//! End-to-end tests at the HTTP request/response level.
//!
//! Each test file covers a specific scenario, driving the full router
//! (middleware included) with deterministic keys and a pinned clock.

#![cfg(test)]
#![allow(clippy::wildcard_imports, clippy::must_use_candidate)]

mod helpers;

mod test_bad_issuer;
mod test_cors;
mod test_form_login;
mod test_identity_resolution;
mod test_issue_and_validate;
mod test_missing_keys;
mod test_settings_flow;
