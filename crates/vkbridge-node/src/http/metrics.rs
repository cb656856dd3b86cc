//! `GET /metrics` — bearer-token-guarded Prometheus scrape endpoint.
//!
//! Token comparison is constant-time, mirroring the teacher's own
//! `http::slack::verify_slack_signature` HMAC check: a timing side-channel
//! on a bearer token used purely for scrape authentication is a small but
//! free-to-close gap.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use super::state::AppState;

pub async fn handle_metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(expected) = &state.metrics_auth_token else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let authorized = match provided {
        Some(token) => bool::from(token.as_bytes().ct_eq(expected.as_bytes())),
        None => false,
    };

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            [("content-type", "text/plain")],
            "unauthorized",
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}
