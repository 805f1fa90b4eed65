use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::llm::CompletionGateway;
use shared::repos::Store;
use shared::storage::FileStorage;
use uuid::Uuid;

mod authn;
mod documents;
mod errors;
mod health;
mod profiles;
mod questions;
mod session;
mod study_groups;
mod tokens;
mod tutor;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub gateway: Arc<dyn CompletionGateway>,
    pub file_storage: FileStorage,
    pub session_ttl_seconds: u64,
}

#[derive(Clone, Copy)]
pub(crate) struct AuthUser {
    pub(crate) user_id: Uuid,
}

pub fn build_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/v1/auth/session", post(session::create_session))
        .route("/v1/auth/session/refresh", post(session::refresh_session))
        .route("/v1/profiles/top", get(profiles::top_contributors))
        .route("/v1/documents", get(documents::search_documents))
        .route("/v1/documents/{document_id}", get(documents::get_document))
        .route(
            "/v1/documents/{document_id}/download",
            post(documents::record_download),
        )
        .route("/v1/questions", get(questions::list_questions))
        .route(
            "/v1/questions/{question_id}/answers",
            get(questions::list_answers),
        )
        .route("/v1/groups", get(study_groups::list_groups))
        // Session reads are deliberately unauthenticated: only mutation checks
        // ownership, and the list endpoint soft-fails to empty for anonymous
        // callers.
        .route("/v1/tutor/sessions", get(tutor::list_sessions))
        .route("/v1/tutor/sessions/{session_id}", get(tutor::get_session))
        .with_state(app_state.clone());

    let auth_layer_state = app_state.clone();

    let protected_routes = Router::new()
        .route("/v1/profiles", post(profiles::create_profile))
        .route(
            "/v1/profiles/me",
            get(profiles::get_my_profile).patch(profiles::update_my_profile),
        )
        .route("/v1/documents", post(documents::upload_document))
        .route("/v1/documents/upload-url", post(documents::issue_upload_url))
        .route("/v1/questions", post(questions::ask_question))
        .route(
            "/v1/questions/{question_id}/answers",
            post(questions::answer_question),
        )
        .route("/v1/groups", post(study_groups::create_group))
        .route("/v1/groups/mine", get(study_groups::my_groups))
        .route("/v1/groups/{group_id}/join", post(study_groups::join_group))
        .route("/v1/tutor/sessions", post(tutor::start_session))
        .route(
            "/v1/tutor/sessions/{session_id}/messages",
            post(tutor::continue_session),
        )
        .layer(middleware::from_fn_with_state(
            auth_layer_state,
            authn::auth_middleware,
        ))
        .with_state(app_state);

    public_routes.merge(protected_routes)
}
