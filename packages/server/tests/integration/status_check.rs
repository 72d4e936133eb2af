use serde_json::json;

use crate::common::{TestApp, routes};

async fn mock_success_server() -> mockito::ServerGuard {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/models")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
}

#[tokio::test]
async fn integration_without_credentials_is_not_configured() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "not_configured");
    assert_eq!(res.body["integration_id"], openai);
}

#[tokio::test]
async fn saved_but_never_probed_credential_is_untested() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;
    app.create_credential(openai, "sk-x", &token).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "untested");
}

#[tokio::test]
async fn failed_last_probe_means_error() {
    // Probes point at an unroutable address, so the test fails.
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;
    let credential_id = app.create_credential(openai, "sk-x", &token).await;
    app.test_credential(credential_id, &token).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "error");
}

#[tokio::test]
async fn expiry_takes_precedence_over_a_successful_probe() {
    let server = mock_success_server().await;
    let app = TestApp::spawn_with_probe_base(&server.url()).await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;

    let res = app
        .post_with_token(
            routes::CREDENTIALS,
            &json!({
                "integration_id": openai,
                "secrets": {"api_key": "sk-x"},
                "expires_at": "2020-01-01T00:00:00Z",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 201, "create failed: {}", res.text);
    let credential_id = res.id();

    let probe = app.test_credential(credential_id, &token).await;
    assert_eq!(probe.body["success"], json!(true));

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "error");
}

#[tokio::test]
async fn token_usage_over_the_window_quota_means_quota_exceeded() {
    let server = mock_success_server().await;
    let app = TestApp::spawn_with_probe_base(&server.url()).await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;
    let credential_id = app.create_credential(openai, "sk-x", &token).await;
    app.test_credential(credential_id, &token).await;

    app.record_usage(openai, 600_000, 10, &token).await;
    app.record_usage(openai, 500_000, 10, &token).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "quota_exceeded");
}

#[tokio::test]
async fn cost_over_the_window_quota_means_quota_exceeded() {
    let server = mock_success_server().await;
    let app = TestApp::spawn_with_probe_base(&server.url()).await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;
    let credential_id = app.create_credential(openai, "sk-x", &token).await;
    app.test_credential(credential_id, &token).await;

    app.record_usage(openai, 100, 10_001, &token).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "quota_exceeded");
}

#[tokio::test]
async fn healthy_credential_under_quota_is_active() {
    let server = mock_success_server().await;
    let app = TestApp::spawn_with_probe_base(&server.url()).await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;
    let credential_id = app.create_credential(openai, "sk-x", &token).await;
    app.test_credential(credential_id, &token).await;

    app.record_usage(openai, 50_000, 120, &token).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "active");
}

#[tokio::test]
async fn status_follows_the_most_recent_credential() {
    let server = mock_success_server().await;
    let app = TestApp::spawn_with_probe_base(&server.url()).await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;

    let first = app.create_credential(openai, "sk-old", &token).await;
    app.test_credential(first, &token).await;
    app.create_credential(openai, "sk-new", &token).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &token)
        .await;

    assert_eq!(res.body["status"], "untested");
}

#[tokio::test]
async fn usage_is_scoped_per_user() {
    let server = mock_success_server().await;
    let app = TestApp::spawn_with_probe_base(&server.url()).await;
    let alice = app.create_authenticated_user("alice", "securepass").await;
    let bob = app.create_authenticated_user("bob", "securepass").await;
    let openai = app.integration_id("openai").await;

    let alice_credential = app.create_credential(openai, "sk-alice", &alice).await;
    app.test_credential(alice_credential, &alice).await;
    let bob_credential = app.create_credential(openai, "sk-bob", &bob).await;
    app.test_credential(bob_credential, &bob).await;

    app.record_usage(openai, 2_000_000, 0, &bob).await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &alice)
        .await;
    assert_eq!(res.body["status"], "active");

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": openai}), &bob)
        .await;
    assert_eq!(res.body["status"], "quota_exceeded");
}

#[tokio::test]
async fn unknown_integration_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;

    let res = app
        .post_with_token(routes::STATUS, &json!({"integration_id": 999999}), &token)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
