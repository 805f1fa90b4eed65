mod support;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use serial_test::serial;
use shared::llm::ChatRole;
use shared::models::{
    ContinueTutoringResponse, CreateSessionResponse, ListTutoringSessionsResponse,
    StartTutoringResponse, TurnRole, TutoringSession,
};
use tower::ServiceExt;
use uuid::Uuid;

use support::api_app::build_test_router;
use support::gateway::ScriptedGateway;

const START_FALLBACK: &str = "I'm here to help you succeed!";
const CONTINUE_FALLBACK: &str = "Let me help you with that!";

#[tokio::test]
#[serial]
async fn start_and_continue_append_user_assistant_turn_pairs() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let auth = sign_in(&app).await.bearer();

    gateway.push_reply("A derivative measures the instantaneous rate of change.");
    let start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(json!({
                "subject": "Mathematics",
                "topic": "Calculus",
                "initial_question": "What is a derivative?"
            })),
        ),
    )
    .await;
    assert_eq!(start.status, StatusCode::OK);
    let start_body: StartTutoringResponse =
        serde_json::from_value(start.body).expect("start response should decode");
    assert_eq!(
        start_body.response,
        "A derivative measures the instantaneous rate of change."
    );

    let session = fetch_session(&app, start_body.session_id).await;
    assert_eq!(session.subject, "Mathematics");
    assert_eq!(session.topic, "Calculus");
    assert!(session.is_active);
    assert_eq!(session.turns.len(), 2);
    assert_eq!(session.turns[0].role, TurnRole::User);
    assert_eq!(session.turns[0].content, "What is a derivative?");
    assert_eq!(session.turns[1].role, TurnRole::Assistant);
    assert_eq!(session.turns[1].content, start_body.response);

    gateway.push_reply("Think of the slope of the tangent line at a point.");
    let follow_up = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/tutor/sessions/{}/messages", start_body.session_id),
            Some(&auth),
            Some(json!({ "message": "Why is it defined as a limit?" })),
        ),
    )
    .await;
    assert_eq!(follow_up.status, StatusCode::OK);
    let follow_up_body: ContinueTutoringResponse =
        serde_json::from_value(follow_up.body).expect("continue response should decode");
    assert_eq!(
        follow_up_body.response,
        "Think of the slope of the tangent line at a point."
    );

    let session = fetch_session(&app, start_body.session_id).await;
    assert!(session.is_active);
    assert_eq!(session.turns.len(), 4);
    assert_eq!(session.turns[2].role, TurnRole::User);
    assert_eq!(session.turns[2].content, "Why is it defined as a limit?");
    assert_eq!(session.turns[3].role, TurnRole::Assistant);
    assert_eq!(session.turns[3].content, follow_up_body.response);
    for pair in session.turns.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
    assert!(session.updated_at >= session.created_at);

    let requests = gateway.seen_requests();
    assert_eq!(requests.len(), 2);

    let start_request = &requests[0];
    assert!((start_request.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(start_request.messages.len(), 2);
    assert_eq!(start_request.messages[0].role, ChatRole::System);
    assert!(start_request.messages[0].content.contains("Mathematics"));
    assert!(start_request.messages[0].content.contains("Calculus"));
    assert_eq!(start_request.messages[1].role, ChatRole::User);
    assert_eq!(start_request.messages[1].content, "What is a derivative?");

    // The continuation replays the entire stored history before the new turn.
    let continue_request = &requests[1];
    assert_eq!(continue_request.messages.len(), 4);
    assert_eq!(continue_request.messages[0].role, ChatRole::System);
    assert_eq!(continue_request.messages[1].role, ChatRole::User);
    assert_eq!(continue_request.messages[1].content, "What is a derivative?");
    assert_eq!(continue_request.messages[2].role, ChatRole::Assistant);
    assert_eq!(
        continue_request.messages[2].content,
        "A derivative measures the instantaneous rate of change."
    );
    assert_eq!(continue_request.messages[3].role, ChatRole::User);
    assert_eq!(
        continue_request.messages[3].content,
        "Why is it defined as a limit?"
    );
}

#[tokio::test]
#[serial]
async fn continuing_a_foreign_or_unknown_session_reads_as_not_found() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let auth_a = sign_in(&app).await.bearer();
    let auth_b = sign_in(&app).await.bearer();

    gateway.push_reply("Let us start with Newton's first law.");
    let start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth_a),
            Some(json!({
                "subject": "Physics",
                "topic": "Mechanics",
                "initial_question": "What is inertia?"
            })),
        ),
    )
    .await;
    assert_eq!(start.status, StatusCode::OK);
    let start_body: StartTutoringResponse =
        serde_json::from_value(start.body).expect("start response should decode");

    let cross_user = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/tutor/sessions/{}/messages", start_body.session_id),
            Some(&auth_b),
            Some(json!({ "message": "Tell me more" })),
        ),
    )
    .await;
    assert_eq!(cross_user.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&cross_user.body), Some("session_not_found"));

    let unknown = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/tutor/sessions/{}/messages", Uuid::new_v4()),
            Some(&auth_a),
            Some(json!({ "message": "Anyone there?" })),
        ),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&unknown.body), Some("session_not_found"));

    let malformed = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions/not-a-uuid/messages",
            Some(&auth_a),
            Some(json!({ "message": "Anyone there?" })),
        ),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&malformed.body), Some("session_not_found"));

    // The rejected attempts never reached the provider or touched the turns.
    assert_eq!(gateway.seen_requests().len(), 1);
    let session = fetch_session(&app, start_body.session_id).await;
    assert_eq!(session.turns.len(), 2);
}

#[tokio::test]
#[serial]
async fn session_reads_are_public_and_mutations_require_a_token() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let auth = sign_in(&app).await.bearer();

    let anonymous_list = send_json(
        &app,
        request(Method::GET, "/v1/tutor/sessions", None, None),
    )
    .await;
    assert_eq!(anonymous_list.status, StatusCode::OK);
    let anonymous_list_body: ListTutoringSessionsResponse =
        serde_json::from_value(anonymous_list.body).expect("list response should decode");
    assert!(anonymous_list_body.items.is_empty());

    let stale_token_list = send_json(
        &app,
        request(
            Method::GET,
            "/v1/tutor/sessions",
            Some("Bearer at_not_a_real_token"),
            None,
        ),
    )
    .await;
    assert_eq!(stale_token_list.status, StatusCode::OK);
    let stale_token_list_body: ListTutoringSessionsResponse =
        serde_json::from_value(stale_token_list.body).expect("list response should decode");
    assert!(stale_token_list_body.items.is_empty());

    let unauthenticated_start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            None,
            Some(json!({
                "subject": "History",
                "topic": "Rome",
                "initial_question": "Why did the republic fall?"
            })),
        ),
    )
    .await;
    assert_eq!(unauthenticated_start.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&unauthenticated_start.body), Some("unauthorized"));

    gateway.push_reply("The republic eroded over decades.");
    let start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(json!({
                "subject": "History",
                "topic": "Rome",
                "initial_question": "Why did the republic fall?"
            })),
        ),
    )
    .await;
    assert_eq!(start.status, StatusCode::OK);
    let start_body: StartTutoringResponse =
        serde_json::from_value(start.body).expect("start response should decode");

    let unauthenticated_continue = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/tutor/sessions/{}/messages", start_body.session_id),
            None,
            Some(json!({ "message": "Go on" })),
        ),
    )
    .await;
    assert_eq!(unauthenticated_continue.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_code(&unauthenticated_continue.body),
        Some("unauthorized")
    );

    // Anyone holding the id can read the transcript, no token needed.
    let anonymous_read = send_json(
        &app,
        request(
            Method::GET,
            &format!("/v1/tutor/sessions/{}", start_body.session_id),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(anonymous_read.status, StatusCode::OK);
    let anonymous_read_body: TutoringSession =
        serde_json::from_value(anonymous_read.body).expect("session should decode");
    assert_eq!(anonymous_read_body.turns.len(), 2);
}

#[tokio::test]
#[serial]
async fn empty_completion_text_falls_back_per_operation() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let auth = sign_in(&app).await.bearer();

    gateway.push_reply("");
    let start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(json!({
                "subject": "Chemistry",
                "topic": "Stoichiometry",
                "initial_question": "How do I balance equations?"
            })),
        ),
    )
    .await;
    assert_eq!(start.status, StatusCode::OK);
    let start_body: StartTutoringResponse =
        serde_json::from_value(start.body).expect("start response should decode");
    assert_eq!(start_body.response, START_FALLBACK);

    gateway.push_reply("");
    let follow_up = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/tutor/sessions/{}/messages", start_body.session_id),
            Some(&auth),
            Some(json!({ "message": "Can you show an example?" })),
        ),
    )
    .await;
    assert_eq!(follow_up.status, StatusCode::OK);
    let follow_up_body: ContinueTutoringResponse =
        serde_json::from_value(follow_up.body).expect("continue response should decode");
    assert_eq!(follow_up_body.response, CONTINUE_FALLBACK);

    // Both fallbacks are persisted verbatim in the transcript.
    let session = fetch_session(&app, start_body.session_id).await;
    assert_eq!(session.turns.len(), 4);
    assert_eq!(session.turns[1].content, START_FALLBACK);
    assert_eq!(session.turns[3].content, CONTINUE_FALLBACK);
}

#[tokio::test]
#[serial]
async fn provider_failure_leaves_sessions_untouched() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let auth = sign_in(&app).await.bearer();

    gateway.push_failure("status_500");
    let failed_start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(json!({
                "subject": "Biology",
                "topic": "Genetics",
                "initial_question": "What is a codon?"
            })),
        ),
    )
    .await;
    assert_eq!(failed_start.status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&failed_start.body), Some("llm_unavailable"));

    let list = send_json(
        &app,
        request(Method::GET, "/v1/tutor/sessions", Some(&auth), None),
    )
    .await;
    assert_eq!(list.status, StatusCode::OK);
    let list_body: ListTutoringSessionsResponse =
        serde_json::from_value(list.body).expect("list response should decode");
    assert!(list_body.items.is_empty());

    gateway.push_reply("A codon is a three-nucleotide unit.");
    let start = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(json!({
                "subject": "Biology",
                "topic": "Genetics",
                "initial_question": "What is a codon?"
            })),
        ),
    )
    .await;
    assert_eq!(start.status, StatusCode::OK);
    let start_body: StartTutoringResponse =
        serde_json::from_value(start.body).expect("start response should decode");

    gateway.push_failure("status_503");
    let failed_continue = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/tutor/sessions/{}/messages", start_body.session_id),
            Some(&auth),
            Some(json!({ "message": "And an anticodon?" })),
        ),
    )
    .await;
    assert_eq!(failed_continue.status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&failed_continue.body), Some("llm_unavailable"));

    let session = fetch_session(&app, start_body.session_id).await;
    assert_eq!(session.turns.len(), 2);
}

#[tokio::test]
#[serial]
async fn repeated_starts_create_distinct_sessions_listed_newest_first() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let signed_in = sign_in(&app).await;
    let auth = signed_in.bearer();

    let payload = json!({
        "subject": "Economics",
        "topic": "Supply and demand",
        "initial_question": "What shifts a demand curve?"
    });

    gateway.push_reply("Income, preferences, and related prices.");
    let first = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(payload.clone()),
        ),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK);
    let first_body: StartTutoringResponse =
        serde_json::from_value(first.body).expect("start response should decode");

    gateway.push_reply("Income, preferences, and related prices.");
    let second = send_json(
        &app,
        request(
            Method::POST,
            "/v1/tutor/sessions",
            Some(&auth),
            Some(payload),
        ),
    )
    .await;
    assert_eq!(second.status, StatusCode::OK);
    let second_body: StartTutoringResponse =
        serde_json::from_value(second.body).expect("start response should decode");

    assert_ne!(first_body.session_id, second_body.session_id);

    let list = send_json(
        &app,
        request(Method::GET, "/v1/tutor/sessions", Some(&auth), None),
    )
    .await;
    assert_eq!(list.status, StatusCode::OK);
    let list_body: ListTutoringSessionsResponse =
        serde_json::from_value(list.body).expect("list response should decode");
    assert_eq!(list_body.items.len(), 2);
    assert_eq!(list_body.items[0].id, second_body.session_id);
    assert_eq!(list_body.items[1].id, first_body.session_id);
    assert!(
        list_body
            .items
            .iter()
            .all(|session| session.owner_id == signed_in.user_id)
    );
}

#[tokio::test]
#[serial]
async fn recent_sessions_list_is_capped_at_the_ten_newest() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;

    let gateway = ScriptedGateway::new();
    let app = build_test_router(store, gateway.clone());
    let auth = sign_in(&app).await.bearer();

    let mut session_ids = Vec::new();
    for n in 0..11 {
        gateway.push_reply("Here is a worked example.");
        let start = send_json(
            &app,
            request(
                Method::POST,
                "/v1/tutor/sessions",
                Some(&auth),
                Some(json!({
                    "subject": "Statistics",
                    "topic": "Distributions",
                    "initial_question": format!("Question number {n}")
                })),
            ),
        )
        .await;
        assert_eq!(start.status, StatusCode::OK);
        let start_body: StartTutoringResponse =
            serde_json::from_value(start.body).expect("start response should decode");
        session_ids.push(start_body.session_id);
    }

    let list = send_json(
        &app,
        request(Method::GET, "/v1/tutor/sessions", Some(&auth), None),
    )
    .await;
    assert_eq!(list.status, StatusCode::OK);
    let list_body: ListTutoringSessionsResponse =
        serde_json::from_value(list.body).expect("list response should decode");

    assert_eq!(list_body.items.len(), 10);
    let listed: Vec<Uuid> = list_body.items.iter().map(|session| session.id).collect();
    let expected: Vec<Uuid> = session_ids.iter().rev().take(10).copied().collect();
    assert_eq!(listed, expected);
    // The eleventh-newest session fell off the end of the list.
    assert!(!listed.contains(&session_ids[0]));
}

async fn fetch_session(app: &axum::Router, session_id: Uuid) -> TutoringSession {
    let response = send_json(
        app,
        request(
            Method::GET,
            &format!("/v1/tutor/sessions/{session_id}"),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    serde_json::from_value(response.body).expect("session should decode")
}

struct SignedIn {
    user_id: Uuid,
    access_token: String,
}

impl SignedIn {
    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

async fn sign_in(app: &axum::Router) -> SignedIn {
    let response = send_json(app, request(Method::POST, "/v1/auth/session", None, None)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body: CreateSessionResponse =
        serde_json::from_value(response.body).expect("session response should decode");

    SignedIn {
        user_id: body.user_id,
        access_token: body.access_token,
    }
}

struct JsonResponse {
    status: StatusCode,
    body: Value,
}

async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse { status, body }
}

fn request(method: Method, path: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::ACCEPT, "application/json");

    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, token);
    }

    let request_body = body
        .map(|value| {
            serde_json::to_vec(&value).expect("json body should serialize for integration request")
        })
        .unwrap_or_default();
    if !request_body.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    builder
        .body(Body::from(request_body))
        .expect("integration request should build")
}

fn error_code(body: &Value) -> Option<&str> {
    body.get("error")?.get("code")?.as_str()
}
