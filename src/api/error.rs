use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::order::OrderError;

// ============================================================================
// HTTP Error Mapping
// ============================================================================
//
//   MissingField / Validation → 400 with details
//   Duplicate                 → 409
//   NotFound                  → 404
//   Unexpected                → 500, cause is logged, never returned
//
// ============================================================================

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::MissingField(_) | OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::Duplicate(_) => StatusCode::CONFLICT,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            OrderError::MissingField(fields) => json!({
                "error": "Missing required fields",
                "details": fields,
            }),
            OrderError::Validation(messages) => json!({
                "error": "Validation error",
                "details": messages,
            }),
            OrderError::Unexpected(_) => json!({ "error": "Internal server error" }),
            other => json!({ "error": other.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Body-extraction failures use the same error shape as domain failures
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let status = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        _ => StatusCode::BAD_REQUEST,
    };

    tracing::warn!(error = %err, "Rejected request body");
    let response = HttpResponse::build(status).json(json!({
        "error": "Invalid JSON body",
        "details": [err.to_string()],
    }));

    InternalError::from_response(err, response).into()
}
