use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn members_cannot_list_users() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "securepass").await;

    let res = app.get_with_token(routes::ADMIN_USERS, &token).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn admins_can_list_users() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("alice", "securepass").await;
    let admin = app.create_user_with_role("boss", "securepass", "admin").await;

    let res = app.get_with_token(routes::ADMIN_USERS, &admin).await;

    assert_eq!(res.status, 200);
    let usernames: Vec<&str> = res.body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(usernames, vec!["alice", "boss"]);
    assert_eq!(res.body["pagination"]["total"], 2);
}

#[tokio::test]
async fn role_change_takes_effect_on_next_login() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("alice", "securepass").await;
    let admin = app.create_user_with_role("boss", "securepass", "admin").await;

    let users = app.get_with_token(routes::ADMIN_USERS, &admin).await;
    let alice_id = users.body["data"][0]["id"].as_i64().unwrap() as i32;

    let res = app
        .patch_with_token(
            &routes::admin_user_role(alice_id),
            &json!({"role": "admin"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["role"], "admin");

    let login = app
        .post_without_token(
            routes::LOGIN,
            &json!({"username": "alice", "password": "securepass"}),
        )
        .await;
    assert_eq!(login.body["role"], "admin");
    let permissions = login.body["permissions"].as_array().expect("permissions");
    assert!(permissions.contains(&json!("user:manage")));
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("alice", "securepass").await;
    let admin = app.create_user_with_role("boss", "securepass", "admin").await;

    let users = app.get_with_token(routes::ADMIN_USERS, &admin).await;
    let alice_id = users.body["data"][0]["id"].as_i64().unwrap() as i32;

    let res = app
        .patch_with_token(
            &routes::admin_user_role(alice_id),
            &json!({"role": "emperor"}),
            &admin,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
