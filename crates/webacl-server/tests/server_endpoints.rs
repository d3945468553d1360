use std::sync::Arc;

use serde_json::{Value, json};
use tokio::task::JoinHandle;
use webacl_provider_memory::{InMemoryWebAclProvider, ProviderOperation};
use webacl_reconciler::{ControllerSettings, WebAclController};
use webacl_server::{AppConfig, build_app};

struct TestServer {
    base: String,
    provider: Arc<InMemoryWebAclProvider>,
    shutdown: tokio::sync::oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

async fn start_server(finalize_enabled: bool) -> TestServer {
    let mut cfg = AppConfig::default();
    cfg.controller.captain_domain = "test.example.com".into();
    cfg.controller.finalize_enabled = finalize_enabled;

    let provider = Arc::new(InMemoryWebAclProvider::new());
    let controller = WebAclController::new(provider.clone(), cfg.controller_settings());
    let app = build_app(&cfg, controller);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        base: format!("http://{addr}"),
        provider,
        shutdown: tx,
        handle,
    }
}

fn hook_body(definition: &str, status: Option<&Value>) -> Value {
    let mut parent = json!({
        "metadata": {"name": "foo", "namespace": "default"},
        "spec": {"web_acl_definition": definition},
    });
    if let Some(status) = status {
        parent["status"] = status.clone();
    }
    json!({"parent": parent, "children": {}})
}

async fn post(client: &reqwest::Client, url: String, body: &Value) -> (u16, Value) {
    let resp = client.post(url).json(body).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_endpoints_work() {
    let server = start_server(false).await;
    let client = reqwest::Client::new();
    let base = &server.base;

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "WebACL Controller");
    assert_eq!(body["backend"], "memory");

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    server.stop().await;
}

#[tokio::test]
async fn sync_creates_then_settles() {
    let server = start_server(false).await;
    let client = reqwest::Client::new();
    let url = format!("{}/sync", server.base);

    let (code, first) = post(&client, url.clone(), &hook_body(r#"{"Rules": []}"#, None)).await;
    assert_eq!(code, 200);
    let status = &first["status"];
    assert_eq!(status["HEALTHY"], "True");
    assert_eq!(status["CRC32_HASH"], 4_069_420_096u32);
    assert_eq!(status["web_acl_request"]["Name"], "foo");
    assert!(status["web_acl_request"]["ARN"].as_str().unwrap().contains("/webacl/foo/"));
    assert!(status.get("error_message").is_none());
    assert_eq!(server.provider.count_of(ProviderOperation::Create).await, 1);

    server.provider.reset_journal().await;
    let (code, second) = post(&client, url, &hook_body(r#"{"Rules": []}"#, Some(status))).await;
    assert_eq!(code, 200);
    assert_eq!(second["status"], first["status"]);
    assert_eq!(server.provider.mutation_count().await, 0);

    server.stop().await;
}

#[tokio::test]
async fn sync_failure_is_reported_in_status() {
    let server = start_server(false).await;
    server
        .provider
        .fail_operation(ProviderOperation::Create, "throttled")
        .await;
    let client = reqwest::Client::new();

    let (code, body) = post(
        &client,
        format!("{}/sync", server.base),
        &hook_body(r#"{"Rules": []}"#, None),
    )
    .await;
    assert_eq!(code, 200);
    assert_eq!(body["status"]["HEALTHY"], "False");
    assert!(body["status"]["error_message"]
        .as_str()
        .unwrap()
        .contains("throttled"));

    server.stop().await;
}

#[tokio::test]
async fn malformed_body_is_a_500_with_detail() {
    let server = start_server(false).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/sync", server.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("invalid hook request"));
    assert!(server.provider.calls().await.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn finalize_is_a_stub_by_default() {
    let server = start_server(false).await;
    let client = reqwest::Client::new();

    let (_, synced) = post(
        &client,
        format!("{}/sync", server.base),
        &hook_body(r#"{"Rules": []}"#, None),
    )
    .await;
    let (code, body) = post(
        &client,
        format!("{}/finalize", server.base),
        &hook_body(r#"{"Rules": []}"#, Some(&synced["status"])),
    )
    .await;
    assert_eq!(code, 200);
    assert_eq!(body, json!({"finalized": true}));
    assert_eq!(server.provider.len().await, 1);

    server.stop().await;
}

#[tokio::test]
async fn enabled_finalizer_deletes_tagged_webacl() {
    let server = start_server(true).await;
    let client = reqwest::Client::new();

    post(
        &client,
        format!("{}/sync", server.base),
        &hook_body(r#"{"Rules": []}"#, None),
    )
    .await;
    assert_eq!(server.provider.len().await, 1);

    let (code, body) = post(
        &client,
        format!("{}/finalize", server.base),
        &hook_body(r#"{"Rules": []}"#, None),
    )
    .await;
    assert_eq!(code, 200);
    assert_eq!(body, json!({"finalized": true}));
    assert!(server.provider.is_empty().await);

    server.stop().await;
}

#[tokio::test]
async fn tags_use_configured_domain() {
    let server = start_server(false).await;
    let client = reqwest::Client::new();

    let (_, body) = post(
        &client,
        format!("{}/sync", server.base),
        &hook_body(r#"{"Rules": []}"#, None),
    )
    .await;
    let arn = body["status"]["web_acl_request"]["ARN"].as_str().unwrap();
    let tags = server.provider.stored_tags(arn).await.unwrap();
    let settings = ControllerSettings::new("test.example.com");
    assert_eq!(tags, webacl_reconciler::resource_tags("foo", &settings));

    server.stop().await;
}
