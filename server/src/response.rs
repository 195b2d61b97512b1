//! JSON response envelope shared by every API reply.
//!
//! Success and failure bodies have the same shape:
//! `{"code": "...", "message": "...", "data": {"status": 200, ...}}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

/// A symbolic response with a nested `data` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub code: String,
    pub message: String,
    pub data: Map<String, Value>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiResponse {
    /// Create a response whose `data` only carries the status.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        let mut data = Map::new();
        data.insert("status".to_string(), Value::from(status.as_u16()));
        Self {
            code: code.into(),
            message: message.into(),
            data,
            status,
        }
    }

    /// Add a member to the `data` object.
    #[must_use]
    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
