//! HTTP-level tests of the full router on the in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use event_vibe_anthropic::AnthropicClient;
use event_vibe_auth::mocks::MockEmailProvider;
use event_vibe_auth::AuthConfig;
use event_vibe_recommend::error::GENERIC_FAILURE_MESSAGE;
use event_vibe_recommend::model::RECOMMENDATION_TOOL;
use event_vibe_recommend::{ClaudeRecommendationModel, Recommender, RecommenderConfig};
use event_vibe_testing::test_clock;
use event_vibe_web::{build_router, AppState, InMemoryBackend, CORRELATION_ID_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestState = AppState<InMemoryBackend<MockEmailProvider>>;

fn unconfigured_recommender() -> Recommender<ClaudeRecommendationModel> {
    Recommender::new(ClaudeRecommendationModel::unconfigured(), RecommenderConfig::default())
}

fn state(email: MockEmailProvider) -> TestState {
    AppState::in_memory(
        email,
        Arc::new(test_clock()),
        AuthConfig::default().with_app_base_url("https://eventvibe.test"),
        unconfigured_recommender(),
    )
}

struct Harness {
    server: TestServer,
    email: MockEmailProvider,
}

impl Harness {
    fn new() -> Self {
        let email = MockEmailProvider::new();
        Self::with_state(state(email.clone()), email)
    }

    fn with_state(state: TestState, email: MockEmailProvider) -> Self {
        let server = TestServer::new(build_router(state)).unwrap();
        Self { server, email }
    }

    async fn sign_up(&self, email: &str, role: &str) -> TestResponse {
        self.server
            .post("/api/auth/sign-up")
            .json(&json!({
                "email": email,
                "password": "secret123",
                "name": "Ada Lovelace",
                "role": role,
                "location": "Austin, TX",
            }))
            .await
    }

    async fn verify(&self, email: &str) -> TestResponse {
        let code = self.email.last_to(email).and_then(|sent| sent.code()).expect("verification code");
        self.server
            .post("/api/auth/verify-email")
            .json(&json!({"mode": "verifyEmail", "oob_code": code}))
            .await
    }

    async fn sign_in(&self, email: &str) -> TestResponse {
        self.server
            .post("/api/auth/sign-in")
            .json(&json!({"email": email, "password": "secret123"}))
            .await
    }

    /// Sign up, verify and sign in; returns the bearer token.
    async fn signed_in(&self, email: &str, role: &str) -> String {
        self.sign_up(email, role).await.assert_status(StatusCode::CREATED);
        self.verify(email).await.assert_status_ok();
        let body: Value = self.sign_in(email).await.json();
        body["session_token"].as_str().unwrap().to_string()
    }

    async fn create_event(&self, token: &str, name: &str, date: &str) -> TestResponse {
        self.server
            .post("/api/events")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&json!({
                "name": name,
                "category": "Workshop",
                "date": date,
                "location": "Capital Factory",
                "description": "Hands-on session for beginners.",
            }))
            .await
    }
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

#[tokio::test]
async fn health_and_ready() {
    let harness = Harness::new();
    let health: Value = harness.server.get("/health").await.json();
    assert_eq!(health["status"], "ok");

    let ready = harness.server.get("/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let harness = Harness::new();
    let id = "7f1f4c3e-8a61-4c1e-9a3b-2f0c1d5e6a7b";
    let response = harness
        .server
        .get("/health")
        .add_header(HeaderName::from_static("x-correlation-id"), HeaderValue::from_static(id))
        .await;
    assert_eq!(response.header(CORRELATION_ID_HEADER), id);
}

#[tokio::test]
async fn sign_up_leaves_the_user_signed_out_pending_verification() {
    let harness = Harness::new();
    let response = harness.sign_up("ada@example.com", "participant").await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending_verification");
    assert_eq!(body["redirect"], "/verify-email?email=ada%40example.com");
    assert!(body.get("session_token").is_none());

    let link = harness.email.last_to("ada@example.com").unwrap().link;
    assert!(link.starts_with("https://eventvibe.test/verify-email?mode=verifyEmail&oobCode="));
}

#[tokio::test]
async fn duplicate_sign_up_is_a_conflict() {
    let harness = Harness::new();
    harness.sign_up("ada@example.com", "participant").await;
    let response = harness.sign_up("ada@example.com", "organizer").await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "EMAIL_IN_USE");
    assert_eq!(body["message"], "An account with this email already exists. Please sign in.");
}

#[tokio::test]
async fn sign_up_validation_errors_are_bad_requests() {
    let harness = Harness::new();
    let response = harness
        .server
        .post("/api/auth/sign-up")
        .json(&json!({
            "email": "ada@example.com",
            "password": "short",
            "name": "Ada",
            "role": "participant",
            "location": "Austin",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Password must be at least 6 characters.");
}

#[tokio::test]
async fn unverified_sign_in_is_refused_and_resends_the_link() {
    let harness = Harness::new();
    harness.sign_up("ada@example.com", "participant").await;
    let before = harness.email.sent().len();

    let response = harness.sign_in("ada@example.com").await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "EMAIL_NOT_VERIFIED");
    assert_eq!(body["redirect"], "/verify-email?email=ada%40example.com");
    assert_eq!(harness.email.sent().len(), before + 1);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let harness = Harness::new();
    harness.signed_in("ada@example.com", "participant").await;

    let response = harness
        .server
        .post("/api/auth/sign-in")
        .json(&json!({"email": "ada@example.com", "password": "nope-nope"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "The email or password you entered is incorrect.");
}

#[tokio::test]
async fn verified_sign_in_redirects_by_role() {
    let harness = Harness::new();
    harness.sign_up("org@example.com", "organizer").await;
    let verified: Value = harness.verify("org@example.com").await.json();
    assert_eq!(verified["status"], "verified");
    assert_eq!(verified["redirect"], "/login");

    let response = harness.sign_in("org@example.com").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "signed_in");
    assert_eq!(body["redirect"], "/organizer/dashboard");
    assert_eq!(body["user"]["role"], "organizer");
}

#[tokio::test]
async fn verification_links_are_single_use() {
    let harness = Harness::new();
    harness.sign_up("ada@example.com", "participant").await;
    harness.verify("ada@example.com").await.assert_status_ok();

    let again = harness.verify("ada@example.com").await;
    again.assert_status(StatusCode::BAD_REQUEST);

    let wrong_mode = harness
        .server
        .post("/api/auth/verify-email")
        .json(&json!({"mode": "resetPassword", "oob_code": "x"}))
        .await;
    wrong_mode.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_read_and_rename() {
    let harness = Harness::new();
    let token = harness.signed_in("ada@example.com", "participant").await;

    let me: Value = harness
        .server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["location"], "Austin, TX");

    let too_short = harness
        .server
        .patch("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "A"}))
        .await;
    too_short.assert_status(StatusCode::BAD_REQUEST);

    let renamed: Value = harness
        .server
        .patch("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "Ada King"}))
        .await
        .json();
    assert_eq!(renamed["name"], "Ada King");
    assert_eq!(renamed["role"], "participant");
}

#[tokio::test]
async fn signed_out_tokens_stop_working() {
    let harness = Harness::new();
    let token = harness.signed_in("ada@example.com", "participant").await;

    harness
        .server
        .post("/api/auth/sign-out")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    harness
        .server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Signing out twice is fine
    harness
        .server
        .post("/api/auth/sign-out")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let harness = Harness::new();
    harness.server.get("/api/me").await.assert_status(StatusCode::UNAUTHORIZED);
    harness
        .server
        .get("/api/me")
        .add_header(header::AUTHORIZATION, bearer("not-a-session"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn navigation_follows_the_profile_role() {
    let harness = Harness::new();

    let anonymous: Value = harness.server.get("/api/navigation").await.json();
    assert!(anonymous.get("dashboard").is_none());
    assert_eq!(anonymous["items"].as_array().unwrap().len(), 3);

    let token = harness.signed_in("org@example.com", "organizer").await;
    let organizer: Value = harness
        .server
        .get("/api/navigation")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(organizer["dashboard"], "/organizer/dashboard");
    assert_eq!(organizer["items"][0]["href"], "/organizer/dashboard");
}

#[tokio::test]
async fn only_organizers_publish_events() {
    let harness = Harness::new();
    let organizer = harness.signed_in("org@example.com", "organizer").await;
    let participant = harness.signed_in("ada@example.com", "participant").await;

    let created = harness.create_event(&organizer, "Rust Workshop", "2030-05-01T18:00").await;
    created.assert_status(StatusCode::CREATED);
    let event: Value = created.json();
    assert_eq!(event["category"], "Workshop");

    let denied = harness.create_event(&participant, "Sneaky Event", "2030-05-01").await;
    denied.assert_status(StatusCode::FORBIDDEN);

    harness
        .server
        .get("/api/organizer/events")
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    harness
        .server
        .post("/api/events")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn event_form_errors_name_the_field() {
    let harness = Harness::new();
    let organizer = harness.signed_in("org@example.com", "organizer").await;

    let response = harness.create_event(&organizer, "Hi", "2030-05-01").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Event name must be at least 3 characters.");

    let response = harness.create_event(&organizer, "Rust Meetup", "someday").await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Please enter a valid date.");
}

#[tokio::test]
async fn events_list_in_start_order_and_organizer_list_newest_first() {
    let harness = Harness::new();
    let organizer = harness.signed_in("org@example.com", "organizer").await;
    harness.create_event(&organizer, "Later Event", "2030-09-01").await;
    harness.create_event(&organizer, "Sooner Event", "2030-01-01").await;

    let upcoming: Value = harness.server.get("/api/events").await.json();
    let names: Vec<&str> = upcoming["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sooner Event", "Later Event"]);

    let recent: Value = harness
        .server
        .get("/api/organizer/events")
        .add_header(header::AUTHORIZATION, bearer(&organizer))
        .await
        .json();
    assert_eq!(recent["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn event_detail_and_unknown_ids() {
    let harness = Harness::new();
    let organizer = harness.signed_in("org@example.com", "organizer").await;
    let event: Value = harness.create_event(&organizer, "Rust Workshop", "2030-05-01").await.json();
    let id = event["id"].as_str().unwrap();

    let detail: Value = harness.server.get(&format!("/api/events/{id}")).await.json();
    assert_eq!(detail["name"], "Rust Workshop");

    harness
        .server
        .get("/api/events/2b1f0a7e-0000-4000-8000-000000000000")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    harness.server.get("/api/events/garbage").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registering_twice_keeps_one_registration() {
    let harness = Harness::new();
    let organizer = harness.signed_in("org@example.com", "organizer").await;
    let participant = harness.signed_in("ada@example.com", "participant").await;
    let event: Value = harness.create_event(&organizer, "Rust Workshop", "2030-05-01").await.json();
    let url = format!("/api/events/{}/registration", event["id"].as_str().unwrap());

    let status: Value = harness
        .server
        .get(&url)
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await
        .json();
    assert_eq!(status["status"], "unregistered");

    let first = harness
        .server
        .post(&url)
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await;
    first.assert_status(StatusCode::CREATED);
    let registration: Value = first.json();
    assert_eq!(registration["event_name"], "Rust Workshop");

    harness
        .server
        .post(&url)
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await
        .assert_status_ok();

    let status: Value = harness
        .server
        .get(&url)
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await
        .json();
    assert_eq!(status["status"], "registered");

    let mine: Value = harness
        .server
        .get("/api/me/registrations")
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await
        .json();
    assert_eq!(mine["registrations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn registering_for_a_missing_event_is_not_found() {
    let harness = Harness::new();
    let participant = harness.signed_in("ada@example.com", "participant").await;
    harness
        .server
        .post("/api/events/2b1f0a7e-0000-4000-8000-000000000000/registration")
        .add_header(header::AUTHORIZATION, bearer(&participant))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resend_does_not_reveal_accounts_and_is_rate_limited() {
    let harness = Harness::new();
    for _ in 0..3 {
        harness
            .server
            .post("/api/auth/resend-verification")
            .json(&json!({"email": "nobody@example.com"}))
            .await
            .assert_status(StatusCode::ACCEPTED);
    }
    assert!(harness.email.sent().is_empty());

    let limited = harness
        .server
        .post("/api/auth/resend-verification")
        .json(&json!({"email": "nobody@example.com"}))
        .await;
    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn recommendations_validate_input_before_calling_the_model() {
    let harness = Harness::new();
    let response = harness
        .server
        .post("/api/recommendations")
        .json(&json!({"interests": "food", "location": "  ", "date": "2024-06-01"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Please enter a location.");
}

#[tokio::test]
async fn recommendations_without_a_model_fail_with_the_generic_message() {
    let harness = Harness::new();
    let response = harness
        .server
        .post("/api/recommendations")
        .json(&json!({"interests": "food, art", "location": "Austin, TX", "date": "2024-06-01"}))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "RECOMMENDATION_FAILED");
    assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn recommendations_return_the_exact_shape() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "type": "message",
            "model": "claude-sonnet-4-5-20250929",
            "role": "assistant",
            "content": [{
                "type": "tool_use",
                "id": "toolu_01",
                "name": RECOMMENDATION_TOOL,
                "input": {"eventRecommendations": [
                    {"id": "evt-1", "name": "East Austin Studio Tour", "venue": "East Austin", "description": "Open studios."}
                ]}
            }],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 200, "output_tokens": 150}
        })))
        .mount(&upstream)
        .await;

    let email = MockEmailProvider::new();
    let mut app_state = state(email.clone());
    app_state.recommender = Recommender::new(
        ClaudeRecommendationModel::new(AnthropicClient::new("test-key").with_base_url(upstream.uri())),
        RecommenderConfig::default().with_timeout(Duration::from_secs(5)),
    );
    let harness = Harness::with_state(app_state, email);

    let response = harness
        .server
        .post("/api/recommendations")
        .json(&json!({"interests": "food, art", "location": "Austin, TX", "date": "2024-06-01", "groupSize": "small"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({"eventRecommendations": [
            {"id": "evt-1", "name": "East Austin Studio Tour", "venue": "East Austin", "description": "Open studios."}
        ]})
    );
}
