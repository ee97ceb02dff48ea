//! API client tests against a local mock server.
//!
//! The client is blocking, so each call runs on a blocking task while the
//! mock server keeps serving on the runtime.

use std::time::Duration;

use nuc::api::{ApiClient, ContainerCommand, ServiceCommand};
use nuc::cli::session::{login_and_seal, unlock_and_renew};
use nuc::crypto::{Argon2Params, KdfChoice};
use nuc::errors::NucError;
use nuc::vault::TokenVault;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5))
}

async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}

#[tokio::test(flavor = "multi_thread")]
async fn ping_reports_online_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "pong"})))
        .mount(&server)
        .await;

    let api = client(&server);
    assert!(blocking(move || api.ping()).await);
}

#[tokio::test(flavor = "multi_thread")]
async fn ping_treats_error_status_as_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client(&server);
    assert!(!blocking(move || api.ping()).await);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_posts_credentials_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"username": "admin", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "access_token": "abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let resp = blocking(move || api.login("admin", "hunter22")).await.unwrap();
    assert_eq!(resp.access_token, "abc123");
    assert_eq!(resp.message.as_deref(), Some("Login successful"));
    assert_eq!(resp.expiration, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let api = client(&server);
    match blocking(move || api.login("admin", "nope")).await {
        Err(NucError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn version_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"version": "1.2.0", "user": "admin"})),
        )
        .mount(&server)
        .await;

    let api = client(&server);
    let info = blocking(move || api.version("abc123")).await.unwrap();
    assert_eq!(info.version, "1.2.0");
    assert_eq!(info.user.as_deref(), Some("admin"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_units_splits_services_and_sockets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/io/system/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "services": [
                {"UNIT": "nginx.service", "LOAD": "loaded", "ACTIVE": "active", "SUB": "running", "DESCRIPTION": "nginx"}
            ],
            "sockets": [
                {"UNIT": "docker.socket", "LOAD": "loaded", "ACTIVE": "active", "SUB": "listening", "DESCRIPTION": "Docker Socket"}
            ]
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let listing = blocking(move || api.list_units("abc123")).await.unwrap();
    assert_eq!(listing.services.len(), 1);
    assert_eq!(listing.services[0].unit, "nginx.service");
    assert_eq!(listing.sockets[0].sub, "listening");
}

#[tokio::test(flavor = "multi_thread")]
async fn service_command_targets_named_unit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/system/services/restart"))
        .and(query_param("target", "nginx.service"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Service nginx.service restarted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    blocking(move || api.service("abc123", ServiceCommand::Restart, "nginx.service"))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_service_command_falls_back_to_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/system/services/stop"))
        .respond_with(ResponseTemplate::new(500).set_body_string("unit not loaded"))
        .mount(&server)
        .await;

    let api = client(&server);
    match blocking(move || api.service("abc123", ServiceCommand::Stop, "ghost.service")).await {
        Err(NucError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "unit not loaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn docker_endpoints_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/io/docker/running"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "containers": [{
                "CONTAINER_ID": "f00dbabe",
                "IMAGE": "redis:7",
                "COMMAND": "redis-server",
                "CREATED": "2 hours ago",
                "STATUS": "Up 2 hours",
                "PORTS": "6379/tcp",
                "NAMES": "cache"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/io/docker/stop"))
        .and(query_param("target", "cache"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/docker/image/rm"))
        .and(query_param("targetid", "redis:7"))
        .and(query_param("toforce", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Image redis:7 removed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let (containers, removed) = blocking(move || {
        let containers = api.running_containers("abc123").unwrap();
        api.container("abc123", ContainerCommand::Stop, "cache").unwrap();
        let removed = api.remove_image("abc123", "redis:7", true).unwrap();
        (containers, removed)
    })
    .await;

    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id, "f00dbabe");
    assert_eq!(containers[0].names, "cache");
    assert_eq!(removed, "Image redis:7 removed");
}

#[tokio::test(flavor = "multi_thread")]
async fn login_seal_then_renew_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "access_token": "abc123"
        })))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let vault = TokenVault::new(
        tmp.path().join("data.bin"),
        KdfChoice::Sha256,
        Argon2Params::default(),
    );
    let api = client(&server);

    let (sealed, renewed) = blocking(move || {
        let sealed = login_and_seal(
            &api,
            &vault,
            "admin",
            "hunter22",
            b"correct-horse",
            1_000,
            100,
        )
        .unwrap();
        let renewed = unlock_and_renew(&vault, b"correct-horse", 1_050, 100).unwrap();
        (sealed, renewed)
    })
    .await;

    assert_eq!(sealed.expires_at, 1_100);
    assert_eq!(sealed.message.as_deref(), Some("Login successful"));
    assert_eq!(renewed.access_token, "abc123");
    assert_eq!(renewed.expires_at, 1_150);
}
