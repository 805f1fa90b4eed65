use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use shared::llm::CompletionRequest;
use shared::models::{
    ContinueTutoringRequest, ContinueTutoringResponse, ListTutoringSessionsResponse, SessionTurn,
    StartTutoringRequest, StartTutoringResponse, TurnRole, TutoringSession,
};
use shared::repos::TUTOR_SESSIONS_LIST_LIMIT;
use shared::tutor;
use uuid::Uuid;

use super::authn::resolve_bearer_user;
use super::errors::{
    completion_error_response, store_error_response, tutoring_session_not_found_response,
};
use super::{AppState, AuthUser};

/// Opens a session: the completion call happens first, and the session record
/// is only inserted once a reply is in hand. An upstream failure therefore
/// leaves no partial session behind.
pub(super) async fn start_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<StartTutoringRequest>,
) -> Response {
    let messages = tutor::start_messages(&req.subject, &req.topic, &req.initial_question);

    let completion = match state
        .gateway
        .complete(CompletionRequest {
            messages,
            temperature: tutor::TUTOR_TEMPERATURE,
        })
        .await
    {
        Ok(completion) => completion,
        Err(err) => return completion_error_response(err),
    };

    let reply = tutor::reply_or_fallback(completion.text, tutor::START_FALLBACK_REPLY);
    let now = Utc::now();
    let turns = vec![
        SessionTurn {
            role: TurnRole::User,
            content: req.initial_question.clone(),
            created_at: now,
        },
        SessionTurn {
            role: TurnRole::Assistant,
            content: reply.clone(),
            created_at: now,
        },
    ];

    let session_id = match state
        .store
        .create_tutoring_session(user.user_id, &req.subject, &req.topic, &turns, now)
        .await
    {
        Ok(session_id) => session_id,
        Err(err) => return store_error_response(err),
    };

    (
        StatusCode::OK,
        Json(StartTutoringResponse {
            session_id,
            response: reply,
        }),
    )
        .into_response()
}

pub(super) async fn continue_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(req): Json<ContinueTutoringRequest>,
) -> Response {
    let Ok(session_id) = Uuid::parse_str(&session_id) else {
        return tutoring_session_not_found_response();
    };

    let session = match state.store.get_tutoring_session(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return tutoring_session_not_found_response(),
        Err(err) => return store_error_response(err),
    };

    if session.owner_id != user.user_id {
        return tutoring_session_not_found_response();
    }

    let messages =
        tutor::continue_messages(&session.subject, &session.topic, &session.turns, &req.message);

    let completion = match state
        .gateway
        .complete(CompletionRequest {
            messages,
            temperature: tutor::TUTOR_TEMPERATURE,
        })
        .await
    {
        Ok(completion) => completion,
        Err(err) => return completion_error_response(err),
    };

    let reply = tutor::reply_or_fallback(completion.text, tutor::CONTINUE_FALLBACK_REPLY);
    let now = Utc::now();
    let user_turn = SessionTurn {
        role: TurnRole::User,
        content: req.message.clone(),
        created_at: now,
    };
    let assistant_turn = SessionTurn {
        role: TurnRole::Assistant,
        content: reply.clone(),
        created_at: now,
    };

    match state
        .store
        .append_tutoring_turns(session_id, user_turn, assistant_turn, now)
        .await
    {
        Ok(true) => {}
        Ok(false) => return tutoring_session_not_found_response(),
        Err(err) => return store_error_response(err),
    }

    (
        StatusCode::OK,
        Json(ContinueTutoringResponse { response: reply }),
    )
        .into_response()
}

/// Reads have no ownership check: any caller holding a session id can fetch
/// the full turn history. Only the mutating operations verify the owner.
pub(super) async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Ok(session_id) = Uuid::parse_str(&session_id) else {
        return tutoring_session_not_found_response();
    };

    match state.store.get_tutoring_session(session_id).await {
        Ok(Some(session)) => {
            (StatusCode::OK, Json(TutoringSession::from(session))).into_response()
        }
        Ok(None) => tutoring_session_not_found_response(),
        Err(err) => store_error_response(err),
    }
}

/// An anonymous caller gets an empty list rather than an error.
pub(super) async fn list_sessions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user_id = match resolve_bearer_user(&state, &headers).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            return (
                StatusCode::OK,
                Json(ListTutoringSessionsResponse { items: Vec::new() }),
            )
                .into_response();
        }
        Err(err) => return store_error_response(err),
    };

    match state
        .store
        .list_recent_tutoring_sessions(user_id, TUTOR_SESSIONS_LIST_LIMIT)
        .await
    {
        Ok(sessions) => {
            let items = sessions.into_iter().map(TutoringSession::from).collect();
            (
                StatusCode::OK,
                Json(ListTutoringSessionsResponse { items }),
            )
                .into_response()
        }
        Err(err) => store_error_response(err),
    }
}
