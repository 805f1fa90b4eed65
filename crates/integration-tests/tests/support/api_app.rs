#![allow(dead_code)]

use std::sync::Arc;

use api_server::http::{AppState, build_router};
use shared::repos::Store;
use shared::storage::FileStorage;

use super::gateway::ScriptedGateway;

const TEST_STORAGE_UPLOAD_BASE_URL: &str = "http://blobs.test/v1";
const TEST_STORAGE_PUBLIC_BASE_URL: &str = "http://cdn.test";
const TEST_SESSION_TTL_SECONDS: u64 = 3600;

pub fn build_test_router(store: Store, gateway: ScriptedGateway) -> axum::Router {
    build_router(AppState {
        store,
        gateway: Arc::new(gateway),
        file_storage: FileStorage::new(
            TEST_STORAGE_UPLOAD_BASE_URL,
            TEST_STORAGE_PUBLIC_BASE_URL,
        ),
        session_ttl_seconds: TEST_SESSION_TTL_SECONDS,
    })
}

pub fn public_file_url(file_id: uuid::Uuid) -> String {
    format!("{TEST_STORAGE_PUBLIC_BASE_URL}/files/{file_id}")
}
