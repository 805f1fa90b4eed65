use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use shared::models::{CreateSessionResponse, RefreshSessionRequest};

use super::AppState;
use super::errors::{error_response, store_error_response};
use super::tokens::{generate_access_token, generate_refresh_token, hash_token};

/// Anonymous sign-in: every call mints a fresh user and a token pair for it.
pub(super) async fn create_session(State(state): State<AppState>) -> Response {
    let user_id = match state.store.create_user().await {
        Ok(user_id) => user_id,
        Err(err) => return store_error_response(err),
    };

    let access_token = generate_access_token();
    let refresh_token = generate_refresh_token();
    let expires_at = Utc::now() + Duration::seconds(state.session_ttl_seconds as i64);

    if let Err(err) = state
        .store
        .create_auth_session(
            user_id,
            &hash_token(&access_token),
            &hash_token(&refresh_token),
            expires_at,
        )
        .await
    {
        return store_error_response(err);
    }

    (
        StatusCode::OK,
        Json(CreateSessionResponse {
            user_id,
            access_token,
            refresh_token,
            expires_at,
        }),
    )
        .into_response()
}

pub(super) async fn refresh_session(
    State(state): State<AppState>,
    Json(req): Json<RefreshSessionRequest>,
) -> Response {
    let presented_refresh = req.refresh_token.trim();
    if presented_refresh.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_refresh_token",
            "refresh_token is required",
        );
    }

    let access_token = generate_access_token();
    let refresh_token = generate_refresh_token();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(state.session_ttl_seconds as i64);

    let user_id = match state
        .store
        .rotate_session_by_refresh_token(
            &hash_token(presented_refresh),
            &hash_token(&access_token),
            &hash_token(&refresh_token),
            expires_at,
            now,
        )
        .await
    {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_refresh_token",
                "Refresh token is unknown, revoked, or expired",
            );
        }
        Err(err) => return store_error_response(err),
    };

    (
        StatusCode::OK,
        Json(CreateSessionResponse {
            user_id,
            access_token,
            refresh_token,
            expires_at,
        }),
    )
        .into_response()
}
