use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "clerkId": "u1",
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z"
    })
}

fn write_config(home: &Path, base_url: &str) {
    fs::write(
        home.join("config.toml"),
        format!("base_url = \"{base_url}\"\n\n[auth]\nprincipal_id = \"u1\"\n"),
    )
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_prints_server_sessions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cafe"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            session_json("c1", "Todo App"),
            session_json("c2", "Weather Bot"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    write_config(dir.path(), &server.uri());

    cargo_bin_cmd!("cafe")
        .env("CAFE_HOME", dir.path())
        .env("CAFE_TOKEN", "secret")
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c1  Todo App"))
        .stdout(predicate::str::contains("c2  Weather Bot"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_names_session_in_notices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cafe"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([session_json("c1", "Todo App")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cafe"))
        .and(body_json(json!({"cafeId": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("c1", "Todo App")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    write_config(dir.path(), &server.uri());

    cargo_bin_cmd!("cafe")
        .env("CAFE_HOME", dir.path())
        .env("CAFE_TOKEN", "secret")
        .args(["sessions", "delete", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleting cafe Todo App..."))
        .stdout(predicate::str::contains("Todo App deleted successfully"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_list_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cafe"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    write_config(dir.path(), &server.uri());

    cargo_bin_cmd!("cafe")
        .env("CAFE_HOME", dir.path())
        .env("CAFE_TOKEN", "expired")
        .args(["sessions", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("list cafes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_prints_transcript() {
    let server = MockServer::start().await;
    let mut body = session_json("c1", "Todo App");
    body["messages"] = json!([
        {
            "id": "m1",
            "cafeId": "c1",
            "sender": "USER",
            "content": "build a todo app",
            "createdAt": "2024-05-01T10:00:01Z"
        },
        {
            "id": "m2",
            "cafeId": "c1",
            "sender": "ASSISTANT",
            "content": "Here is your app.",
            "createdAt": "2024-05-01T10:00:05Z"
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/api/cafe/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    write_config(dir.path(), &server.uri());

    cargo_bin_cmd!("cafe")
        .env("CAFE_HOME", dir.path())
        .env("CAFE_TOKEN", "secret")
        .args(["sessions", "show", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Todo App  c1"))
        .stdout(predicate::str::contains("you:"))
        .stdout(predicate::str::contains("build a todo app"))
        .stdout(predicate::str::contains("assistant:"));
}
