//! Node-level fatal errors — config, bind, startup. Distinct from
//! [`vkbridge_core::error::ValidationError`], which is per-request and
//! handled entirely inside the Ingest handler.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[source] anyhow::Error),

    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Stage(#[from] vkbridge_core::error::StageError),
}
