use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use lumina_auth::domain::types::{Purpose, User, VerificationCode};
use lumina_auth::router::build_router;
use lumina_auth::state::AppState;

use crate::helpers::{DeliveryMode, MockCodeStore, MockDelivery, MockUserRepo, email, test_user};

struct Fixture {
    server: TestServer,
    codes: Arc<Mutex<Vec<VerificationCode>>>,
    users: Arc<Mutex<Vec<User>>>,
}

fn fixture_with(users: MockUserRepo, codes: MockCodeStore, expose_codes: bool) -> Fixture {
    let codes_handle = codes.codes_handle();
    let users_handle = users.users_handle();
    let state = AppState {
        users,
        codes,
        delivery: MockDelivery::new(DeliveryMode::Deliver),
        expose_codes,
    };
    Fixture {
        server: TestServer::new(build_router(state)).unwrap(),
        codes: codes_handle,
        users: users_handle,
    }
}

fn fixture(expose_codes: bool) -> Fixture {
    fixture_with(MockUserRepo::empty(), MockCodeStore::empty(), expose_codes)
}

/// Any store access on this server answers 500, so a 400 proves the request
/// was rejected up front.
fn server() -> TestServer {
    fixture_with(MockUserRepo::empty(), MockCodeStore::unavailable(), false).server
}

impl Fixture {
    fn stored_code(&self, purpose: Purpose) -> String {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.purpose == purpose)
            .map(|c| c.code.clone())
            .expect("a stored code for the purpose")
    }

    async fn send(&self, body: Value) -> String {
        self.server
            .post("/api/auth/code/send")
            .json(&body)
            .await
            .assert_status_ok();
        let purpose = match body["purpose"].as_str() {
            Some("register") => Purpose::Register,
            Some("reset") => Purpose::Reset,
            _ => Purpose::Login,
        };
        self.stored_code(purpose)
    }
}

#[tokio::test]
async fn should_serve_health_endpoints() {
    let server = server();
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_logout_with_no_content() {
    let resp = server().post("/api/auth/logout").await;
    resp.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn should_assign_request_id() {
    let resp = server().get("/healthz").await;
    let id = resp.header("x-request-id");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn should_propagate_caller_request_id() {
    let resp = server()
        .get("/healthz")
        .add_header("x-request-id", "req-123")
        .await;
    resp.assert_header("x-request-id", "req-123");
}

#[tokio::test]
async fn should_reject_send_without_identifier() {
    let resp = server()
        .post("/api/auth/code/send")
        .json(&json!({ "purpose": "login" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_IDENTIFIER");
}

#[tokio::test]
async fn should_reject_send_with_both_email_and_phone() {
    let resp = server()
        .post("/api/auth/code/send")
        .json(&json!({ "email": "user@example.com", "phone": "+15551234567" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_IDENTIFIER");
}

#[tokio::test]
async fn should_reject_send_with_malformed_email() {
    let resp = server()
        .post("/api/auth/code/send")
        .json(&json!({ "email": "not-an-email" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_IDENTIFIER");
}

#[tokio::test]
async fn should_reject_send_with_malformed_phone() {
    let resp = server()
        .post("/api/auth/code/send")
        .json(&json!({ "phone": "12" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_IDENTIFIER");
}

#[tokio::test]
async fn should_reject_verify_with_malformed_code() {
    let resp = server()
        .post("/api/auth/code/verify")
        .json(&json!({ "email": "user@example.com", "purpose": "reset", "code": "12ab56" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_CODE_FORMAT");
}

#[tokio::test]
async fn should_reject_login_with_malformed_code() {
    let resp = server()
        .post("/api/auth/login")
        .json(&json!({ "email": "user@example.com", "code": "1234" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_CODE_FORMAT");
}

#[tokio::test]
async fn should_reject_register_with_blank_name() {
    let resp = server()
        .post("/api/auth/register")
        .json(&json!({ "name": "   ", "email": "user@example.com", "code": "123456" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_NAME");
}

#[tokio::test]
async fn should_reject_non_uuid_user_id() {
    let resp = server().get("/api/users/not-a-uuid").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

// ── Send / verify ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_echo_code_when_exposure_enabled() {
    let f = fixture(true);

    let resp = f
        .server
        .post("/api/auth/code/send")
        .json(&json!({ "email": "User@Example.com", "purpose": "register" }))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["message"], "verification code sent");
    assert_eq!(body["cooldownSeconds"], 60);
    assert!(body["expiresAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["code"], f.stored_code(Purpose::Register));

    let codes = f.codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].identifier, email("user@example.com"));
}

#[tokio::test]
async fn should_hide_code_when_exposure_disabled() {
    let f = fixture(false);

    let resp = f
        .server
        .post("/api/auth/code/send")
        .json(&json!({ "phone": "+1 555 123 4567" }))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert!(body.get("code").is_none(), "code leaked: {body}");
    assert_eq!(body["cooldownSeconds"], 60);
    assert!(body["expiresAt"].is_string());

    let codes = f.codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].purpose, Purpose::Login, "purpose defaults to login");
}

#[tokio::test]
async fn should_verify_code_exactly_once() {
    let f = fixture(false);
    let code = f
        .send(json!({ "email": "user@example.com", "purpose": "reset" }))
        .await;
    let body = json!({ "email": "user@example.com", "purpose": "reset", "code": code });

    f.server
        .post("/api/auth/code/verify")
        .json(&body)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let again = f.server.post("/api/auth/code/verify").json(&body).await;
    again.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(again.json::<Value>()["kind"], "INVALID_CODE");
}

#[tokio::test]
async fn should_return_internal_when_store_is_down() {
    let resp = server()
        .post("/api/auth/code/send")
        .json(&json!({ "email": "user@example.com" }))
        .await;

    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INTERNAL");
    assert_eq!(body["message"], "internal error");
}

// ── Register / login / users ─────────────────────────────────────────────────

#[tokio::test]
async fn should_register_then_login_then_fetch_user() {
    let f = fixture(false);

    let code = f
        .send(json!({ "email": "ada@example.com", "purpose": "register" }))
        .await;
    let resp = f
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Ada Lovelace", "email": "ada@example.com", "code": code }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let registered: Value = resp.json();
    assert_eq!(registered["name"], "Ada Lovelace");
    assert_eq!(registered["email"], "ada@example.com");
    assert_eq!(registered["bio"], "New visual creator.");
    assert!(registered.get("phone").is_none());
    assert!(registered["createdAt"].is_string());
    assert_eq!(f.users.lock().unwrap().len(), 1);

    let code = f
        .send(json!({ "email": "ada@example.com", "purpose": "login" }))
        .await;
    let resp = f
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "code": code }))
        .await;
    resp.assert_status_ok();
    let logged_in: Value = resp.json();
    assert_eq!(logged_in["id"], registered["id"]);

    let id = registered["id"].as_str().unwrap();
    let resp = f.server.get(&format!("/api/users/{id}")).await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()["name"], "Ada Lovelace");
}

#[tokio::test]
async fn should_conflict_when_registering_taken_identifier() {
    let taken = email("taken@example.com");
    let f = fixture_with(
        MockUserRepo::new(vec![test_user(&taken)]),
        MockCodeStore::empty(),
        false,
    );
    let code = f
        .send(json!({ "email": "taken@example.com", "purpose": "register" }))
        .await;

    let resp = f
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Someone", "email": "taken@example.com", "code": code }))
        .await;

    resp.assert_status(StatusCode::CONFLICT);
    assert_eq!(resp.json::<Value>()["kind"], "ALREADY_REGISTERED");
    assert_eq!(f.codes.lock().unwrap().len(), 1, "code survives the conflict");
}

#[tokio::test]
async fn should_reject_login_for_unknown_identifier() {
    let f = fixture(false);
    let code = f.send(json!({ "email": "ghost@example.com" })).await;

    let resp = f
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ghost@example.com", "code": code }))
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_CODE");
    assert_eq!(f.codes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_user() {
    let resp = fixture(false)
        .server
        .get(&format!("/api/users/{}", uuid::Uuid::new_v4()))
        .await;

    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["kind"], "USER_NOT_FOUND");
}
