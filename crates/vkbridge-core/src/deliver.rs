//! Delivery stage: renders an enriched message and sends it to the Sink.
//!
//! A tenant miss (config reloaded out from under an in-flight message, or a
//! bug upstream) and a Sink send failure are both logged and dropped, never
//! propagated to the supervisor — the spec reserves [`crate::error::StageError`]
//! for failures that mean the stage itself can no longer make progress, and
//! neither of these does.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    message::Message,
    metrics::Metrics,
    queue::QueueRx,
    registry::TenantRegistry,
    render::render,
};

/// Abstraction over the Sink's send API, so the stage can be tested without
/// a network call.
#[async_trait]
pub trait SinkClient: Send + Sync {
    async fn send_message(&self, chat_id: i64, html: &str) -> anyhow::Result<()>;
}

/// Drains `rx`, rendering and delivering each message. Runs until cancelled
/// or until `rx` closes.
pub async fn delivery_loop(
    mut rx: QueueRx<Message>,
    client: Arc<dyn SinkClient>,
    registry: TenantRegistry,
    metrics: Arc<Metrics>,
    cancel: CancellationToken,
) {
    while let Some(message) = rx.take(&cancel).await {
        let Some(tenant) = registry.lookup(&message.hook_id) else {
            error!(hook_id = %message.hook_id, "delivery: unknown tenant, dropping message");
            continue;
        };

        let html = render(&message);
        match client.send_message(tenant.dest_chat_id, &html).await {
            Ok(()) => {
                metrics.record_message_forwarded();
                info!(hook_id = %message.hook_id, chat_id = tenant.dest_chat_id, "message forwarded");
            }
            Err(err) => {
                error!(hook_id = %message.hook_id, chat_id = tenant.dest_chat_id, error = %err, "sink delivery failed");
            }
        }
    }
}
