//! End-to-end coverage of the three pipeline stages wired together the way
//! `vkbridge_node::server::run` wires them, but with stub `SourceClient`/
//! `SinkClient` implementations in place of real VK/Telegram calls. Pins
//! the concrete scenarios the render contract must reproduce byte-for-byte.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::Request, routing::post, Router};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use vkbridge_core::{
    deliver::{delivery_loop, SinkClient},
    enrich::{enrichment_loop, SourceClient},
    message::{HookId, Message, Sender},
    metrics::Metrics,
    queue,
    registry::{Tenant, TenantRegistry},
};
use vkbridge_node::http::{callback::handle_callback, AppState};

struct StubSource;

#[async_trait]
impl SourceClient for StubSource {
    async fn lookup_user(&self, user_id: i64) -> anyhow::Result<Option<Sender>> {
        if user_id == 1234 {
            Ok(Some(Sender {
                first_name: "John".into(),
                last_name: "Doe".into(),
            }))
        } else {
            Ok(None)
        }
    }
}

struct RecordingSink {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl SinkClient for RecordingSink {
    async fn send_message(&self, chat_id: i64, html: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((chat_id, html.to_string()));
        Ok(())
    }
}

fn registry() -> TenantRegistry {
    TenantRegistry::new(vec![Tenant::new(
        HookId::parse("H1").unwrap(),
        "s3cr3t".into(),
        "CONFIRM".into(),
        4321,
    )
    .unwrap()])
    .unwrap()
}

async fn run_request(registry: TenantRegistry, body: &'static str) -> (Router, queue::QueueRx<Message>) {
    let (tx, rx) = queue::channel::<Message>();
    let state = AppState {
        registry,
        ingest_tx: tx,
        metrics: Arc::new(Metrics::new()),
        metrics_auth_token: None,
        cancel: CancellationToken::new(),
    };
    let router = Router::new()
        .route("/api/vk/callback/:hook_id", post(handle_callback))
        .with_state(state);
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/vk/callback/H1")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    (router, rx)
}

#[tokio::test]
async fn new_message_flows_through_ingest_enrich_deliver() {
    let (_router, ingest_rx) = run_request(
        registry(),
        r#"{"type":"message_new","object":{"message":{"from_id":1234,"text":"Hello"}}}"#,
    )
    .await;

    let (deliver_tx, deliver_rx) = queue::channel::<Message>();
    let cancel = CancellationToken::new();
    let source: Arc<dyn SourceClient> = Arc::new(StubSource);
    let enrich_handle = tokio::spawn(enrichment_loop(
        ingest_rx,
        deliver_tx,
        source,
        cancel.clone(),
    ));

    let sink = Arc::new(RecordingSink {
        sent: Mutex::new(Vec::new()),
    });
    let metrics = Arc::new(Metrics::new());
    let deliver_handle = tokio::spawn(delivery_loop(
        deliver_rx,
        sink.clone(),
        registry(),
        metrics.clone(),
        cancel.clone(),
    ));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    cancel.cancel();
    enrich_handle.await.unwrap();
    deliver_handle.await.unwrap();

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 4321);
    assert_eq!(
        sent[0].1,
        "👤 <a href=\"https://vk.com/id1234\">John Doe</a>\n💬 Hello"
    );
    assert!(metrics.render().contains("messages_forwarded 1"));
}

#[tokio::test]
async fn reply_with_html_unsafe_text_escapes_on_delivery() {
    let body = r#"{"type":"message_reply","object":{"from_id":1,"text":"<a href=\"https://x.com\">&</a>"}}"#;
    let (_router, ingest_rx) = run_request(registry(), body).await;

    let (deliver_tx, deliver_rx) = queue::channel::<Message>();
    let cancel = CancellationToken::new();
    let source: Arc<dyn SourceClient> = Arc::new(StubSource);
    let enrich_handle = tokio::spawn(enrichment_loop(
        ingest_rx,
        deliver_tx,
        source,
        cancel.clone(),
    ));

    let sink = Arc::new(RecordingSink {
        sent: Mutex::new(Vec::new()),
    });
    let metrics = Arc::new(Metrics::new());
    let deliver_handle = tokio::spawn(delivery_loop(
        deliver_rx,
        sink.clone(),
        registry(),
        metrics,
        cancel.clone(),
    ));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    cancel.cancel();
    enrich_handle.await.unwrap();
    deliver_handle.await.unwrap();

    let sent = sink.sent.lock().unwrap();
    assert_eq!(
        sent[0].1,
        "👤 <a href=\"https://vk.com/id1\">1</a>\n↩️ &lt;a href=&#34;https://x.com&#34;&gt;&amp;&lt;/a&gt;"
    );
}
