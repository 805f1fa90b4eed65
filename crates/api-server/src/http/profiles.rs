use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{CreateProfileRequest, ListProfilesResponse, UpdateProfileRequest};

use super::errors::{conflict_response, not_found_response, store_error_response};
use super::{AppState, AuthUser};

pub(super) async fn get_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match state.store.get_profile(user.user_id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => not_found_response("profile_not_found", "Profile has not been created yet"),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateProfileRequest>,
) -> Response {
    match state.store.get_profile(user.user_id).await {
        Ok(Some(_)) => return conflict_response("profile_exists", "Profile already exists"),
        Ok(None) => {}
        Err(err) => return store_error_response(err),
    }

    if let Err(err) = state.store.create_profile(user.user_id, &req).await {
        return store_error_response(err);
    }

    match state.store.get_profile(user.user_id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => store_error_response(shared::repos::StoreError::InvalidData(
            "profile missing after insert".to_string(),
        )),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn update_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Response {
    match state.store.update_profile(user.user_id, &req).await {
        Ok(true) => {}
        Ok(false) => {
            return not_found_response("profile_not_found", "Profile has not been created yet");
        }
        Err(err) => return store_error_response(err),
    }

    match state.store.get_profile(user.user_id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => not_found_response("profile_not_found", "Profile has not been created yet"),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn top_contributors(State(state): State<AppState>) -> Response {
    match state.store.list_top_contributors().await {
        Ok(items) => (StatusCode::OK, Json(ListProfilesResponse { items })).into_response(),
        Err(err) => store_error_response(err),
    }
}
