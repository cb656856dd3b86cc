use thiserror::Error;

/// Errors surfaced to the Source as HTTP 400s at the Ingest boundary.
///
/// Variant ordering matches the order Ingest checks them in (spec §4.3):
/// hookId extraction, tenant lookup, JSON parse, secret, message type,
/// field validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid hookId")]
    InvalidHookId,

    #[error("hookId not found")]
    HookIdNotFound,

    #[error("json unmarshal error: {0}")]
    JsonUnmarshal(String),

    #[error("secret mismatch")]
    SecretMismatch,

    #[error("unsupported message type: {0}")]
    UnsupportedType(String),

    #[error("validation error")]
    InvalidSenderId,

    #[error("validation error")]
    MissingText,
}

/// Terminal errors a pipeline stage can report to the supervisor. A stage
/// returns at most one of these before exiting; everything else (lookup
/// failures, Sink send failures, tenant misses in Delivery) is logged and
/// swallowed per spec §7, never propagated here.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("enrichment stage: {0}")]
    Enrichment(#[source] anyhow::Error),

    #[error("delivery stage: {0}")]
    Delivery(#[source] anyhow::Error),
}
