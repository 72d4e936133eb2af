use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn recorded_samples_show_up_in_the_rolling_summary() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;

    app.record_usage(openai, 1_200, 3, &token).await;
    app.record_usage(openai, 800, 2, &token).await;

    let res = app
        .get_with_token(&routes::usage_summary(openai), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["tokens_used"], 2_000);
    assert_eq!(res.body["cost_cents"], 5);
    assert_eq!(res.body["window_days"], 30);
    assert_eq!(res.body["tokens_limit"], 1_000_000);
    assert_eq!(res.body["cost_cents_limit"], 10_000);
}

#[tokio::test]
async fn summary_is_empty_without_samples() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let gemini = app.integration_id("gemini").await;

    let res = app
        .get_with_token(&routes::usage_summary(gemini), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["tokens_used"], 0);
    assert_eq!(res.body["cost_cents"], 0);
}

#[tokio::test]
async fn summary_only_counts_the_requested_integration() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;
    let gemini = app.integration_id("gemini").await;

    app.record_usage(openai, 500, 1, &token).await;
    app.record_usage(gemini, 9_000, 20, &token).await;

    let res = app
        .get_with_token(&routes::usage_summary(openai), &token)
        .await;

    assert_eq!(res.body["tokens_used"], 500);
    assert_eq!(res.body["cost_cents"], 1);
}

#[tokio::test]
async fn negative_counters_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;
    let openai = app.integration_id("openai").await;

    let res = app
        .post_with_token(
            routes::USAGE,
            &json!({"integration_id": openai, "tokens_used": -1, "cost_cents": 0}),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn usage_for_an_unknown_integration_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;

    let res = app
        .post_with_token(
            routes::USAGE,
            &json!({"integration_id": 999999, "tokens_used": 1, "cost_cents": 0}),
            &token,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
