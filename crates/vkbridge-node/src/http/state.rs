use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vkbridge_core::{message::Message, metrics::Metrics, queue::QueueTx, registry::TenantRegistry};

/// Shared state every Axum handler reads from. Cheap to clone: everything
/// inside is already an `Arc` or a `Clone`-cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub registry: TenantRegistry,
    pub ingest_tx: QueueTx<Message>,
    pub metrics: Arc<Metrics>,
    pub metrics_auth_token: Option<String>,
    pub cancel: CancellationToken,
}
