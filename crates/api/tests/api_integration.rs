//! Integration tests for the signup API server.

use std::sync::Arc;

use account_store::{BusinessWriteFailure, InMemoryAccountRepository};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::ProvisioningSaga;
use tower::ServiceExt;

use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let (app, _) = setup_with_repo();
    app
}

fn setup_with_repo() -> (axum::Router, InMemoryAccountRepository) {
    let repo = InMemoryAccountRepository::new();
    let state = Arc::new(api::routes::signup::AppState {
        saga: ProvisioningSaga::new(repo.clone()),
    });
    let app = api::create_app(state, get_metrics_handle());
    (app, repo)
}

fn signup_body(business_name: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "business_name": business_name,
        "business_description": "Wood-fired pizza",
        "owner_name": "Joe Owner",
        "email": email,
        "password": "s3cret-password",
        "category": "restaurant",
        "plan_id": "free"
    })
}

async fn post_signup(app: axum::Router, body: serde_json::Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/signup")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_signup_success() {
    let (app, repo) = setup_with_repo();

    let response = post_signup(app, signup_body("Joe's Pizza", "joe@example.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["slug"], "joes-pizza");
    assert!(json["user_id"].as_str().is_some());
    assert!(json["business_id"].as_str().is_some());

    assert_eq!(repo.identity_count(), 1);
    assert_eq!(repo.business_count(), 1);
    assert_eq!(repo.subscription_count(), 1);
    assert_eq!(repo.settings_count(), 1);
    assert_eq!(repo.branding_count(), 1);
}

#[tokio::test]
async fn test_signup_missing_field() {
    let app = setup();

    let mut body = signup_body("Joe's Pizza", "joe@example.com");
    body.as_object_mut().unwrap().remove("owner_name");

    let response = post_signup(app, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("missing required field"));
    assert!(message.contains("owner_name"));
}

#[tokio::test]
async fn test_signup_invalid_email() {
    let app = setup();

    let response = post_signup(app, signup_body("Joe's Pizza", "not-an-email")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("invalid email"));
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let (app, _repo) = setup_with_repo();

    let first = post_signup(app.clone(), signup_body("Joe's Pizza", "joe@example.com")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_signup(app, signup_body("Another Biz", "joe@example.com")).await;
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = response_json(second).await;
    assert!(json["error"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn test_signup_same_name_gets_distinct_slug() {
    let (app, _repo) = setup_with_repo();

    let first = post_signup(app.clone(), signup_body("Joe's Pizza", "joe@example.com")).await;
    let first_json = response_json(first).await;
    assert_eq!(first_json["slug"], "joes-pizza");

    let second = post_signup(app, signup_body("Joe's Pizza", "maria@example.com")).await;
    assert_eq!(second.status(), StatusCode::CREATED);

    let second_json = response_json(second).await;
    let second_slug = second_json["slug"].as_str().unwrap();
    assert_ne!(second_slug, "joes-pizza");
    assert!(second_slug.starts_with("joes-pizza-"));
}

#[tokio::test]
async fn test_signup_aux_failure_still_succeeds() {
    let (app, repo) = setup_with_repo();
    repo.set_fail_on_create_settings(true);

    let response = post_signup(app, signup_body("Joe's Pizza", "joe@example.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(repo.settings_count(), 0);
    assert_eq!(repo.subscription_count(), 1);
}

#[tokio::test]
async fn test_signup_business_failure_rolls_back() {
    let (app, repo) = setup_with_repo();
    repo.push_business_failure(BusinessWriteFailure::Generic);

    let response = post_signup(app, signup_body("Joe's Pizza", "joe@example.com")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = response_json(response).await;
    assert!(json["error"].as_str().is_some());

    // The partially created identity must be compensated away.
    assert_eq!(repo.identity_count(), 0);
    assert_eq!(repo.business_count(), 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
