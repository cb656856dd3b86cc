//! Pipeline core: message model, tenant registry, handoff queues, and the
//! Enrichment/Delivery stage implementations. The Ingest stage itself lives
//! in `vkbridge-node` since it is inseparable from the HTTP server.

pub mod deliver;
pub mod enrich;
pub mod error;
pub mod message;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod render;
pub mod sink_client;
pub mod source_client;
pub mod supervisor;
