//! `POST /api/vk/callback/{HookId}` — the Ingest stage's HTTP surface.
//!
//! Implements the Source callback pipeline step by step: hookId extraction,
//! tenant lookup, envelope parse, opportunistic secret check, event-type
//! dispatch, per-kind payload parse, and the rendezvous `Put` onto the
//! Enrichment queue. Every rejection path returns a short, stable 400 body
//! the Source logs verbatim.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use vkbridge_core::{
    error::ValidationError,
    message::{HookId, Message, MessageKind},
    queue::PutOutcome,
};

use super::state::AppState;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    object: Value,
}

#[derive(Debug, Deserialize)]
struct NewMessagePayload {
    message: FromIdTextPayload,
}

#[derive(Debug, Deserialize)]
struct FromIdTextPayload {
    from_id: i64,
    /// Absent entirely (not merely empty) is a spec §4.3 step 7 validation
    /// error, distinct from a malformed envelope/payload — so this can't be
    /// a plain required `String` field, or a missing key would surface as a
    /// `json unmarshal error` instead.
    #[serde(default)]
    text: Option<String>,
}

pub async fn handle_callback(
    State(state): State<AppState>,
    Path(hook_id_raw): Path<String>,
    body: Bytes,
) -> Response {
    let hook_id = match HookId::parse(hook_id_raw) {
        Ok(hook_id) => hook_id,
        Err(err) => return validation_response(err),
    };

    let Some(tenant) = state.registry.lookup(&hook_id).cloned() else {
        return validation_response(ValidationError::HookIdNotFound);
    };

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => return validation_response(ValidationError::JsonUnmarshal(err.to_string())),
    };

    if let Some(secret) = &envelope.secret {
        if secret != &tenant.secret_key {
            return validation_response(ValidationError::SecretMismatch);
        }
    }

    state.metrics.record_event_received(&envelope.kind);

    match envelope.kind.as_str() {
        "confirmation" => (
            StatusCode::OK,
            [("content-type", "text/plain")],
            tenant.confirmation_string.clone(),
        )
            .into_response(),
        "message_new" => {
            let payload: NewMessagePayload = match serde_json::from_value(envelope.object) {
                Ok(payload) => payload,
                Err(err) => {
                    return validation_response(ValidationError::JsonUnmarshal(err.to_string()))
                }
            };
            enqueue(
                &state,
                hook_id,
                MessageKind::New,
                payload.message.text,
                payload.message.from_id,
            )
            .await
        }
        "message_edit" => dispatch_from_id_text(&state, hook_id, MessageKind::Edit, envelope.object).await,
        "message_reply" => {
            dispatch_from_id_text(&state, hook_id, MessageKind::Reply, envelope.object).await
        }
        other => validation_response(ValidationError::UnsupportedType(other.to_string())),
    }
}

async fn dispatch_from_id_text(
    state: &AppState,
    hook_id: HookId,
    kind: MessageKind,
    object: Value,
) -> Response {
    let payload: FromIdTextPayload = match serde_json::from_value(object) {
        Ok(payload) => payload,
        Err(err) => return validation_response(ValidationError::JsonUnmarshal(err.to_string())),
    };
    enqueue(state, hook_id, kind, payload.text, payload.from_id).await
}

async fn enqueue(
    state: &AppState,
    hook_id: HookId,
    kind: MessageKind,
    text: Option<String>,
    from_id: i64,
) -> Response {
    let Some(text) = text else {
        return validation_response(ValidationError::MissingText);
    };

    let message = match Message::new(hook_id, kind, text, from_id) {
        Ok(message) => message,
        Err(err) => return validation_response(err),
    };

    match state.ingest_tx.put(message, &state.cancel).await {
        PutOutcome::Delivered => (StatusCode::OK, [("content-type", "text/plain")], "ok").into_response(),
        PutOutcome::Cancelled => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

fn validation_response(err: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [("content-type", "text/plain")],
        err.to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{routing::post, Router};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;
    use vkbridge_core::{metrics::Metrics, queue, registry::{Tenant, TenantRegistry}};

    fn router(registry: TenantRegistry) -> (Router, queue::QueueRx<Message>) {
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
        (router, rx)
    }

    fn registry_with_h1() -> TenantRegistry {
        TenantRegistry::new(vec![Tenant::new(
            HookId::parse("H1").unwrap(),
            "s3cr3t".into(),
            "CONFIRM".into(),
            4321,
        )
        .unwrap()])
        .unwrap()
    }

    #[tokio::test]
    async fn confirmation_handshake_replies_with_confirmation_string() {
        let (router, _rx) = router(registry_with_h1());
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(
                        r#"{"type":"confirmation","group_id":12345}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"CONFIRM");
    }

    #[tokio::test]
    async fn unknown_tenant_is_rejected() {
        let (router, _rx) = router(registry_with_h1());
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/UNKNOWN")
                    .body(axum::body::Body::from(r#"{"type":"confirmation"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("hookId not found"));
    }

    #[tokio::test]
    async fn new_message_enqueues_and_replies_ok() {
        let (router, mut rx) = router(registry_with_h1());
        let body = r#"{"type":"message_new","object":{"message":{"from_id":1234,"text":"Hello"}}}"#;
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancel = CancellationToken::new();
        let message = rx.take(&cancel).await.unwrap();
        assert_eq!(message.sender_id, 1234);
        assert_eq!(message.text, "Hello");
        assert!(matches!(message.kind, MessageKind::New));
    }

    #[tokio::test]
    async fn community_edit_enqueues_with_negative_sender() {
        let (router, mut rx) = router(registry_with_h1());
        let body = r#"{"type":"message_edit","object":{"from_id":-123,"text":"Edit"}}"#;
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancel = CancellationToken::new();
        let message = rx.take(&cancel).await.unwrap();
        assert_eq!(message.sender_id, -123);
        assert!(matches!(message.kind, MessageKind::Edit));
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_with_reason() {
        let (router, _rx) = router(registry_with_h1());
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(r#"{"type":"member_joined"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("unsupported message type: member_joined"));
    }

    #[tokio::test]
    async fn secret_mismatch_is_rejected() {
        let (router, _rx) = router(registry_with_h1());
        let body = r#"{"type":"confirmation","secret":"wrong"}"#;
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn secret_omitted_skips_check() {
        let (router, _rx) = router(registry_with_h1());
        let body = r#"{"type":"confirmation"}"#;
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn zero_sender_id_is_rejected_as_validation_error() {
        let (router, _rx) = router(registry_with_h1());
        let body = r#"{"type":"message_new","object":{"message":{"from_id":0,"text":"Hi"}}}"#;
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("validation error"));
    }

    #[tokio::test]
    async fn missing_text_is_rejected_as_validation_error_not_json_unmarshal() {
        let (router, _rx) = router(registry_with_h1());
        let body = r#"{"type":"message_edit","object":{"from_id":1}}"#;
        let response = router
            .oneshot(
                axum::http::Request::post("/api/vk/callback/H1")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"validation error");
    }
}
