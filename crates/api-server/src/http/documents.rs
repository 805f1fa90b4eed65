use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::models::{
    DocumentDetail, DocumentType, ListDocumentsResponse, OkResponse, UploadDocumentRequest,
    UploadDocumentResponse, UploadUrlResponse,
};
use uuid::Uuid;

use super::errors::{not_found_response, store_error_response};
use super::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub(super) struct SearchDocumentsParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    university: Option<String>,
    #[serde(default)]
    document_type: Option<DocumentType>,
}

pub(super) async fn issue_upload_url(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Response {
    let (file_id, upload_url) = state.file_storage.issue_upload();
    (
        StatusCode::OK,
        Json(UploadUrlResponse {
            file_id,
            upload_url,
        }),
    )
        .into_response()
}

pub(super) async fn upload_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UploadDocumentRequest>,
) -> Response {
    match state.store.insert_document(user.user_id, &req).await {
        Ok(document_id) => {
            (StatusCode::OK, Json(UploadDocumentResponse { document_id })).into_response()
        }
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<SearchDocumentsParams>,
) -> Response {
    let search_term = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    let result = match search_term {
        Some(term) => {
            state
                .store
                .search_documents(
                    term,
                    params.subject.as_deref(),
                    params.university.as_deref(),
                    params.document_type,
                )
                .await
        }
        None => {
            state
                .store
                .list_documents(params.subject.as_deref(), params.university.as_deref())
                .await
        }
    };

    match result {
        Ok(items) => (StatusCode::OK, Json(ListDocumentsResponse { items })).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Response {
    match state.store.get_document(document_id).await {
        Ok(Some(document)) => {
            let file_url = state.file_storage.file_url(document.file_id);
            (
                StatusCode::OK,
                Json(DocumentDetail { document, file_url }),
            )
                .into_response()
        }
        Ok(None) => not_found_response("document_not_found", "Document not found"),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn record_download(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Response {
    match state.store.increment_document_downloads(document_id).await {
        Ok(true) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Ok(false) => not_found_response("document_not_found", "Document not found"),
        Err(err) => store_error_response(err),
    }
}
