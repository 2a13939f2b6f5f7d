use axum::http::StatusCode;
use axum::Json;

use crate::core::mcp::{err as envelope_err, ok as envelope_ok, CallEnvelope, ErrorEnvelope};

pub fn ok(text: impl Into<String>) -> (StatusCode, Json<CallEnvelope>) {
    (StatusCode::OK, Json(envelope_ok(text)))
}

pub fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorEnvelope>) {
    (status, Json(envelope_err(message)))
}
