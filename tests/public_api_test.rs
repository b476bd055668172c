mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use cbi_backend::database::MemoryStore;
use cbi_backend::middleware::auth::{Claims, JwtKeys};
use cbi_backend::models::actor::Actor;
use cbi_backend::utils::time::ManualClock;
use cbi_backend::{routes, AppState};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use common::*;

const SECRET: &str = "test_secret_key";

fn app(store: &MemoryStore) -> Router {
    let state = AppState::in_memory(
        store.clone(),
        Arc::new(ManualClock::new(start_time())),
        SECRET,
    );
    routes::router(state, 100, 100)
}

fn bearer(actor: Actor) -> String {
    let claims = Claims {
        sub: actor.user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: actor.role.as_str().to_string(),
        client_id: actor.scope.client_id(),
    };
    format!("Bearer {}", JwtKeys::new(SECRET).sign(&claims).unwrap())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, auth: Option<String>, body: JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn create_session(app: &Router) -> JsonValue {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/interviews",
            Some(bearer(manager(4))),
            json!({
                "candidate_id": CANDIDATE,
                "cbi_template_id": EXPLICIT_TEMPLATE,
                "interviewer_id": INTERVIEWER
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn public_flow_end_to_end() {
    let store = seeded_store();
    let app = app(&store);

    let session = create_session(&app).await;
    assert_eq!(session["status"], "Pending");
    assert_eq!(session["client_id"], 4);
    assert_eq!(session["candidate"]["surname"], "Lovelace");
    assert_eq!(session["template"]["template_name"], "Team lead");
    assert_eq!(session["interviewer"]["name"], "Grace");
    let token = session["token"].as_str().unwrap().to_string();
    let session_id = session["session_id"].as_i64().unwrap();

    let (status, form) = send(&app, get(&format!("/api/public/interviews/{}", token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["status"], "InProgress");
    assert_eq!(form["template"]["template_name"], "Team lead");
    assert_eq!(form["interviewer"]["surname"], "Hopper");
    assert_eq!(form["questions"][0]["question_id"], 2);
    assert_eq!(form["questions"][0]["competency_name"], "Teamwork");

    let (status, result) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/public/interviews/{}/submit", token),
            None,
            json!({
                "responses": [
                    {"question_id": 2, "competency_id": 10, "rating": 5,
                     "behavioral_flags": {"paste_detected": false, "time_spent_seconds": 42}},
                    {"question_id": 1, "competency_id": 10, "rating": 3, "notes": "solid"},
                    {"question_id": 3, "competency_id": 20}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["message"], "Interview submitted successfully");
    assert_eq!(result["percentage"], 53.33);
    assert_eq!(result.as_object().unwrap().len(), 2);

    let (status, again) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/public/interviews/{}/submit", token),
            None,
            json!({"responses": []}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(again["error"], "This interview has already been completed");

    let (status, responses) = send(
        &app,
        get(
            &format!("/api/interviews/{}/responses", session_id),
            Some(bearer(manager(4))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(responses.as_array().unwrap().len(), 3);
    assert_eq!(responses[0]["behavioral_flags"]["time_spent_seconds"], 42);
    assert_eq!(responses[2]["rating"], 0);
}

#[tokio::test]
async fn unknown_tokens_are_not_found() {
    let store = seeded_store();
    let app = app(&store);

    let (status, body) = send(&app, get("/api/public/interviews/no-such-token", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_submissions_are_bad_requests() {
    let store = seeded_store();
    let app = app(&store);
    let session = create_session(&app).await;
    let token = session["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/public/interviews/{}/submit", token),
            None,
            json!({"responses": [{"question_id": 1, "competency_id": 10, "rating": 9}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let malformed = Request::builder()
        .method("POST")
        .uri(format!("/api/public/interviews/{}/submit", token))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn staff_routes_require_a_valid_bearer_token() {
    let store = seeded_store();
    let app = app(&store);

    let (status, body) = send(&app, get("/api/interviews", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_authorization");

    let (status, _) = send(
        &app,
        get("/api/interviews", Some("Bearer not-a-jwt".to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/interviews", Some(bearer(manager(4))))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn listing_and_fetching_sessions_include_relations() {
    let store = seeded_store();
    let app = app(&store);
    let session = create_session(&app).await;
    let session_id = session["session_id"].as_i64().unwrap();

    let (status, listed) = send(&app, get("/api/interviews", Some(bearer(manager(4))))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["session_id"], session_id);
    assert_eq!(listed[0]["candidate"]["name"], "Ada");
    assert_eq!(listed[0]["template"]["cbi_template_id"], EXPLICIT_TEMPLATE);

    let (status, fetched) = send(
        &app,
        get(
            &format!("/api/interviews/{}", session_id),
            Some(bearer(manager(4))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["token"], session["token"]);
    assert_eq!(fetched["interviewer"]["surname"], "Hopper");
    assert_eq!(fetched["questions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn roles_and_tenants_gate_staff_operations() {
    let store = seeded_store();
    let app = app(&store);
    let session = create_session(&app).await;
    let session_id = session["session_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/interviews",
            Some(bearer(office_user(4))),
            json!({
                "candidate_id": CANDIDATE,
                "cbi_template_id": EXPLICIT_TEMPLATE,
                "interviewer_id": INTERVIEWER
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        get(
            &format!("/api/interviews/{}", session_id),
            Some(bearer(manager(9))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        get("/api/interviews/999", Some(bearer(manager(4)))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/interviews",
            Some(bearer(manager(4))),
            json!({
                "candidate_id": CANDIDATE,
                "cbi_template_id": EMPTY_TEMPLATE,
                "interviewer_id": INTERVIEWER
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_and_rescore_through_the_api() {
    let store = seeded_store();
    let app = app(&store);
    let pending = create_session(&app).await;
    let completed = create_session(&app).await;
    let completed_token = completed["token"].as_str().unwrap().to_string();
    let completed_id = completed["session_id"].as_i64().unwrap();

    let (status, cancelled) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/interviews/{}", pending["session_id"]))
            .header("authorization", bearer(manager(4)))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "Expired");

    let (status, body) = send(
        &app,
        get(
            &format!("/api/public/interviews/{}", pending["token"].as_str().unwrap()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This interview link has expired");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/public/interviews/{}/submit", completed_token),
            None,
            json!({"responses": [
                {"question_id": 2, "competency_id": 10, "rating": 1},
                {"question_id": 1, "competency_id": 10, "rating": 1}
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, responses) = send(
        &app,
        get(
            &format!("/api/interviews/{}/responses", completed_id),
            Some(bearer(manager(4))),
        ),
    )
    .await;
    let first_response = responses[0]["response_id"].as_i64().unwrap();

    let (status, rescored) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/interviews/{}/score", completed_id),
            Some(bearer(manager(4))),
            json!({"scores": [{"response_id": first_response, "rating": 5}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rescored["total_score"], 6);
    assert_eq!(rescored["percentage"], 60.0);

    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/interviews/{}", completed_id))
            .header("authorization", bearer(manager(4)))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot cancel a completed session");

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/interviews/{}/score", completed_id),
            Some(bearer(manager(4))),
            json!({"scores": []}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn question_listing_honours_visibility() {
    let store = seeded_store();
    let app = app(&store);

    let (status, body) = send(
        &app,
        get(
            "/api/questions?competency_id=10&level=3",
            Some(bearer(office_user(9))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["competency_question_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1]);

    let (status, body) = send(&app, get("/api/questions", Some(bearer(admin())))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn health_and_docs_are_public() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = send(&app, get("/api/docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/public/interviews/{token}/submit"].is_object());
}
