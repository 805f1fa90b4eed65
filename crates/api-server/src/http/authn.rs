use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use shared::repos::StoreError;

use super::errors::unauthorized_response;
use super::tokens::hash_token;
use super::{AppState, AuthUser};

pub(super) async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user_id = match resolve_bearer_user(&state, req.headers()).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            warn!("missing or invalid authorization header");
            return unauthorized_response();
        }
        Err(err) => return super::errors::store_error_response(err),
    };

    req.extensions_mut().insert(AuthUser { user_id });
    next.run(req).await
}

/// Resolves the caller identity without failing the request. Used by the
/// endpoints that soft-fail for anonymous callers instead of returning 401.
pub(super) async fn resolve_bearer_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Uuid>, StoreError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return Ok(None);
    };

    state
        .store
        .resolve_session_user(&hash_token(token), Utc::now())
        .await
}
