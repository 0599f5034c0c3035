use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::TempDir;
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a config with an unreachable upstream and a throwaway database.
fn test_config(port: u16, dir: &TempDir) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[database]
path = "{}"

[upstream]
base_url = "http://127.0.0.1:1"
min_request_interval_ms = 0

[upstream.retry]
max_retries = 0
initial_delay_ms = 1
max_delay_ms = 1

[sync]
batch_pause_ms = 0
"#,
        port,
        dir.path().join("binder.db").display()
    )
}

struct TestServer {
    port: u16,
    _child: tokio::process::Child,
    _config: tempfile::NamedTempFile,
    _dir: TempDir,
}

async fn spawn_server() -> TestServer {
    let port = get_available_port();
    let dir = TempDir::new().unwrap();

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file
        .write_all(test_config(port, &dir).as_bytes())
        .unwrap();
    config_file.flush().unwrap();

    let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_binder"))
        .env("BINDER_CONFIG", config_file.path())
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");

    let server = TestServer {
        port,
        _child: child,
        _config: config_file,
        _dir: dir,
    };

    assert!(
        wait_for_server(server.port, 100).await,
        "Server did not start in time"
    );
    server
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

fn url(server: &TestServer, path: &str) -> String {
    format!("http://127.0.0.1:{}{}", server.port, path)
}

#[tokio::test]
async fn test_health_and_config() {
    let server = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(url(&server, "/api/v1/health"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let response = client
        .get(url(&server, "/api/v1/config"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["upstream_base_url"], "http://127.0.0.1:1");
}

#[tokio::test]
async fn test_search_on_empty_catalog() {
    let server = spawn_server().await;
    let client = Client::new();

    // A too-short query is an empty result, not an error.
    let response = client
        .get(url(&server, "/api/v1/cards/search?q=L"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);

    // So is a normal query with no matches, filters included.
    let response = client
        .get(url(
            &server,
            "/api/v1/cards/search?q=Llanowar&colors=g,w&rarity=common&extras=false",
        ))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_sets_endpoints() {
    let server = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(url(&server, "/api/v1/sets"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);

    let response = client
        .get(url(&server, "/api/v1/sets/dom"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_with_unreachable_upstream_fails_and_is_recorded() {
    let server = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(url(&server, "/api/v1/sync"))
        .json(&serde_json::json!({"type": "sets"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

    // The failed run landed in the ledger.
    let response = client
        .get(url(&server, "/api/v1/sync/runs?type=sets"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["runs"][0]["status"], "failed");

    // Status endpoint reflects the same.
    let response = client
        .get(url(&server, "/api/v1/sync/status"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["runs"][0]["sync_type"], "sets");
}

#[tokio::test]
async fn test_sync_rejects_unknown_type() {
    let server = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(url(&server, "/api/v1/sync"))
        .json(&serde_json::json!({"type": "decks"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = spawn_server().await;
    let client = Client::new();

    let response = client.get(url(&server, "/metrics")).send().await.unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("binder_"));
}
