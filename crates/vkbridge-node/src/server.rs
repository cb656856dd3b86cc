//! Assembles the tenant registry, handoff queues, pipeline stages, HTTP
//! server, and lifecycle supervisor, then runs until shutdown.
//!
//! Startup sequence mirrors the teacher's own `gateway::run`/`node::run`:
//! build the long-lived collaborators first (registry, clients), wire the
//! stages through their queues, bind the listener last so a config error
//! never leaves a half-open socket behind.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::info;

use vkbridge_core::{
    deliver::{self, SinkClient},
    enrich::{self, SourceClient},
    message::Message,
    metrics::Metrics,
    queue,
    registry::TenantRegistry,
    sink_client::TelegramSinkClient,
    source_client::VkSourceClient,
    supervisor::Supervisor,
};

use crate::{
    config::BridgeConfig,
    error::GatewayError,
    http::{self, AppState},
};

pub async fn run(config: BridgeConfig) -> Result<(), GatewayError> {
    let tenants = config.tenants().map_err(GatewayError::Config)?;
    let registry = TenantRegistry::new(tenants).map_err(|err| GatewayError::Config(err.into()))?;
    let metrics = Arc::new(Metrics::new());

    let (ingest_tx, ingest_rx) = queue::channel::<Message>();
    let (deliver_tx, deliver_rx) = queue::channel::<Message>();

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.vk.lookup_timeout_secs))
        .build()
        .map_err(|err| GatewayError::Config(err.into()))?;
    let source_client: Arc<dyn SourceClient> = Arc::new(VkSourceClient::new(
        http_client,
        config.vk.api_token.clone(),
    ));
    let telegram_http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.telegram.send_timeout_secs))
        .build()
        .map_err(|err| GatewayError::Config(err.into()))?;
    let sink_client: Arc<dyn SinkClient> = Arc::new(TelegramSinkClient::new(
        config.telegram.bot_token.clone(),
        telegram_http_client,
    ));

    let mut supervisor = Supervisor::new();
    let cancel = supervisor.cancellation_token();

    supervisor.spawn({
        let cancel = cancel.clone();
        async move {
            enrich::enrichment_loop(ingest_rx, deliver_tx, source_client, cancel).await;
            Ok(())
        }
    });

    supervisor.spawn({
        let registry = registry.clone();
        let metrics = metrics.clone();
        let cancel = cancel.clone();
        async move {
            deliver::delivery_loop(deliver_rx, sink_client, registry, metrics, cancel).await;
            Ok(())
        }
    });

    let state = AppState {
        registry,
        ingest_tx,
        metrics,
        metrics_auth_token: config.metrics_auth_token.clone(),
        cancel: cancel.clone(),
    };
    let router = http::router(state, config.http.max_body_bytes);

    let listener = TcpListener::bind(&config.http.bind)
        .await
        .map_err(|err| GatewayError::Bind {
            addr: config.http.bind.clone(),
            source: err,
        })?;
    info!(addr = %config.http.bind, "listening");

    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(server_cancel.cancelled_owned())
            .await
    });

    supervisor
        .run_until_shutdown(shutdown_signal())
        .await
        .map_err(GatewayError::from)?;

    if let Ok(Err(err)) = server_handle.await {
        tracing::error!(error = %err, "http server exited with error");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
