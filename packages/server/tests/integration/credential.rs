use serde_json::json;

use crate::common::{TestApp, routes};

mod saving {
    use super::*;

    #[tokio::test]
    async fn credential_is_saved_untested_with_field_names_only() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;

        let res = app
            .post_with_token(
                routes::CREDENTIALS,
                &json!({
                    "integration_id": openai,
                    "secrets": {"api_key": "sk-test-abcdefghijklmnopqrst", "org_id": "org-42"},
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["last_test_status"], "untested");
        assert!(res.body["last_tested_at"].is_null());
        assert_eq!(res.body["field_names"], json!(["api_key", "org_id"]));
        // Secret values never leave the server.
        assert!(!res.text.contains("sk-test-abcdefghijklmnopqrst"));
        assert!(!res.text.contains("org-42"));
    }

    #[tokio::test]
    async fn missing_required_field_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;

        let res = app
            .post_with_token(
                routes::CREDENTIALS,
                &json!({"integration_id": openai, "secrets": {"org_id": "org-42"}}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn field_outside_the_schema_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let anthropic = app.integration_id("anthropic").await;

        let res = app
            .post_with_token(
                routes::CREDENTIALS,
                &json!({
                    "integration_id": anthropic,
                    "secrets": {"api_key": "sk-ant-x", "region": "us-east-1"},
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_integration_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .post_with_token(
                routes::CREDENTIALS,
                &json!({"integration_id": 999999, "secrets": {"api_key": "k"}}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn users_only_see_their_own_credentials() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let openai = app.integration_id("openai").await;
        app.create_credential(openai, "sk-alice", &alice).await;

        let res = app.get_with_token(routes::CREDENTIALS, &bob).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().map(Vec::len), Some(0));

        let res = app.get_with_token(routes::CREDENTIALS, &alice).await;
        assert_eq!(res.body.as_array().map(Vec::len), Some(1));
        assert!(!res.text.contains("sk-alice"));
    }

    #[tokio::test]
    async fn list_can_be_filtered_by_integration() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;
        let deepgram = app.integration_id("deepgram").await;
        app.create_credential(openai, "sk-one", &token).await;
        app.create_credential(deepgram, "dg-key", &token).await;

        let res = app
            .get_with_token(
                &format!("{}?integration_id={openai}", routes::CREDENTIALS),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        let rows = res.body.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["integration_id"], openai);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn own_credential_can_be_deleted() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-x", &token).await;

        let res = app
            .delete_with_token(&routes::credential(credential_id), &token)
            .await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(routes::CREDENTIALS, &token).await;
        assert_eq!(res.body.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn foreign_credential_is_invisible_to_delete() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-x", &alice).await;

        let res = app
            .delete_with_token(&routes::credential(credential_id), &bob)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn installed_credential_cannot_be_deleted() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let app = TestApp::spawn_with_probe_base(&server.url()).await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-x", &token).await;
        app.test_credential(credential_id, &token).await;
        app.install_integration(openai, credential_id, &token).await;

        let res = app
            .delete_with_token(&routes::credential(credential_id), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}

mod probing {
    use super::*;

    #[tokio::test]
    async fn accepted_probe_marks_the_credential_successful() {
        let mut server = mockito::Server::new_async().await;
        let models = server
            .mock("GET", "/v1/models")
            .match_header("authorization", "Bearer sk-good")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;
        let app = TestApp::spawn_with_probe_base(&server.url()).await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-good", &token).await;

        let res = app.test_credential(credential_id, &token).await;

        models.assert_async().await;
        assert_eq!(res.body["success"], json!(true));
        assert_eq!(res.body["status"], "success");
        assert!(res.body["latency_ms"].is_number());

        let list = app.get_with_token(routes::CREDENTIALS, &token).await;
        assert_eq!(list.body[0]["last_test_status"], "success");
        assert!(list.body[0]["last_tested_at"].is_string());
        assert!(list.body[0]["last_test_error"].is_null());
    }

    #[tokio::test]
    async fn rejected_probe_is_a_failed_test_not_an_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/v1/models")
            .with_status(401)
            .with_body(r#"{"error": "bad key"}"#)
            .create_async()
            .await;
        let app = TestApp::spawn_with_probe_base(&server.url()).await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-bad", &token).await;

        let res = app.test_credential(credential_id, &token).await;

        assert_eq!(res.body["success"], json!(false));
        assert_eq!(res.body["status"], "failed");
        assert_eq!(res.body["error"]["provider_status"], 401);

        let list = app.get_with_token(routes::CREDENTIALS, &token).await;
        assert_eq!(list.body[0]["last_test_status"], "failed");
        assert!(list.body[0]["last_test_error"]["message"].is_string());
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_failed_test() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let deepgram = app.integration_id("deepgram").await;
        let credential_id = app.create_credential(deepgram, "dg-key", &token).await;

        let res = app.test_credential(credential_id, &token).await;

        assert_eq!(res.body["success"], json!(false));
        assert_eq!(res.body["status"], "failed");
        assert!(res.body["error"]["provider_status"].is_null());
    }

    #[tokio::test]
    async fn provider_without_a_probe_returns_not_implemented() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let elevenlabs = app.add_catalog_integration("elevenlabs", "ElevenLabs").await;
        let credential_id = app.create_credential(elevenlabs, "xi-key", &token).await;

        let res = app
            .post_with_token(
                routes::CREDENTIAL_TEST,
                &json!({"credential_id": credential_id}),
                &token,
            )
            .await;

        assert_eq!(res.status, 501);
        assert_eq!(res.body["code"], "NOT_IMPLEMENTED");

        // The log row is appended even when no probe exists.
        let logs = app
            .get_with_token(&routes::test_logs("elevenlabs"), &token)
            .await;
        assert_eq!(logs.body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(logs.body["data"][0]["success"], json!(false));

        // But the credential row itself is left untested.
        let list = app.get_with_token(routes::CREDENTIALS, &token).await;
        assert_eq!(list.body[0]["last_test_status"], "untested");
    }

    #[tokio::test]
    async fn every_probe_appends_a_test_log_row() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let app = TestApp::spawn_with_probe_base(&server.url()).await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-good", &token).await;

        app.test_credential(credential_id, &token).await;
        app.test_credential(credential_id, &token).await;

        let logs = app.get_with_token(&routes::test_logs("openai"), &token).await;
        assert_eq!(logs.status, 200);
        assert_eq!(logs.body["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(logs.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn foreign_credential_cannot_be_probed() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let openai = app.integration_id("openai").await;
        let credential_id = app.create_credential(openai, "sk-x", &alice).await;

        let res = app
            .post_with_token(
                routes::CREDENTIAL_TEST,
                &json!({"credential_id": credential_id}),
                &bob,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
