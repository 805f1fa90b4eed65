use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::llm::LlmGatewayError;
use shared::models::{ErrorBody, ErrorResponse};
use shared::repos::StoreError;
use tracing::{error, warn};

pub(super) fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

pub(super) fn conflict_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::CONFLICT, code, message)
}

pub(super) fn not_found_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, code, message)
}

pub(super) fn unauthorized_response() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "Missing or invalid bearer token",
    )
}

/// Session absent and session owned by someone else are deliberately the same
/// answer, so callers cannot probe for other users' session ids.
pub(super) fn tutoring_session_not_found_response() -> Response {
    not_found_response("session_not_found", "Tutoring session not found")
}

pub(super) fn completion_error_response(err: LlmGatewayError) -> Response {
    warn!("completion provider call failed: {err}");
    error_response(
        StatusCode::BAD_GATEWAY,
        "llm_unavailable",
        "Tutoring assistant is temporarily unavailable",
    )
}

pub(super) fn store_error_response(err: StoreError) -> Response {
    error!("database operation failed: {err}");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Unexpected server error",
    )
}
