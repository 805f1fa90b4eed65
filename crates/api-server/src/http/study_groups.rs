use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::models::{CreateStudyGroupRequest, CreateStudyGroupResponse, ListStudyGroupsResponse, OkResponse};
use shared::repos::JoinGroupOutcome;
use uuid::Uuid;

use super::errors::{conflict_response, not_found_response, store_error_response};
use super::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub(super) struct ListGroupsParams {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    university: Option<String>,
}

pub(super) async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateStudyGroupRequest>,
) -> Response {
    match state.store.create_study_group(user.user_id, &req).await {
        Ok(group_id) => (StatusCode::OK, Json(CreateStudyGroupResponse { group_id })).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn list_groups(
    State(state): State<AppState>,
    Query(params): Query<ListGroupsParams>,
) -> Response {
    match state
        .store
        .list_study_groups(params.subject.as_deref(), params.university.as_deref())
        .await
    {
        Ok(items) => (StatusCode::OK, Json(ListStudyGroupsResponse { items })).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn join_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<Uuid>,
) -> Response {
    match state.store.join_study_group(group_id, user.user_id).await {
        Ok(JoinGroupOutcome::Joined) => {
            (StatusCode::OK, Json(OkResponse { ok: true })).into_response()
        }
        Ok(JoinGroupOutcome::NotFound) => {
            not_found_response("group_not_found", "Study group not found")
        }
        Ok(JoinGroupOutcome::AlreadyMember) => {
            conflict_response("already_member", "Already a member of this group")
        }
        Ok(JoinGroupOutcome::GroupFull) => conflict_response("group_full", "Group is full"),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn my_groups(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match state.store.list_user_study_groups(user.user_id).await {
        Ok(items) => (StatusCode::OK, Json(ListStudyGroupsResponse { items })).into_response(),
        Err(err) => store_error_response(err),
    }
}
