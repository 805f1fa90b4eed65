use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::models::{
    AnswerQuestionRequest, AnswerQuestionResponse, AskQuestionRequest, AskQuestionResponse,
    ListAnswersResponse, ListQuestionsResponse,
};
use uuid::Uuid;

use super::errors::{not_found_response, store_error_response};
use super::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub(super) struct ListQuestionsParams {
    #[serde(default)]
    subject: Option<String>,
}

pub(super) async fn ask_question(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AskQuestionRequest>,
) -> Response {
    match state.store.insert_question(user.user_id, &req).await {
        Ok(question_id) => {
            (StatusCode::OK, Json(AskQuestionResponse { question_id })).into_response()
        }
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsParams>,
) -> Response {
    match state.store.list_questions(params.subject.as_deref()).await {
        Ok(items) => (StatusCode::OK, Json(ListQuestionsResponse { items })).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn answer_question(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<AnswerQuestionRequest>,
) -> Response {
    match state.store.question_exists(question_id).await {
        Ok(true) => {}
        Ok(false) => return not_found_response("question_not_found", "Question not found"),
        Err(err) => return store_error_response(err),
    }

    match state
        .store
        .insert_answer(question_id, user.user_id, &req.content)
        .await
    {
        Ok(answer_id) => (StatusCode::OK, Json(AnswerQuestionResponse { answer_id })).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn list_answers(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Response {
    match state.store.list_answers(question_id).await {
        Ok(items) => (StatusCode::OK, Json(ListAnswersResponse { items })).into_response(),
        Err(err) => store_error_response(err),
    }
}
