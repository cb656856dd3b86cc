//! Enrichment stage: attaches sender identity to user-authored messages.
//!
//! At most one upstream lookup per message, and only when
//! [`Message::is_from_user`] — community/bot senders are never looked up.
//! A failed or empty lookup is logged and the message is forwarded anyway
//! with `sender` left `None`; enrichment failure is never fatal to the
//! pipeline, mirroring the stage's one job being "best effort identity,
//! never blocks delivery."

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    message::{Message, Sender},
    queue::{QueueRx, QueueTx},
};

/// Abstraction over the Source's user-lookup API (`users.get`), so the
/// stage can be tested without a network call.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Resolve a positive sender id to a profile. `Ok(None)` means the
    /// Source reported no such user (deactivated, deleted, privacy
    /// settings); `Err` means the call itself failed.
    async fn lookup_user(&self, user_id: i64) -> anyhow::Result<Option<Sender>>;
}

/// Drains `rx`, enriches each message, and forwards it on `tx`. Runs until
/// cancelled or until `rx` closes (every producer dropped).
pub async fn enrichment_loop(
    mut rx: QueueRx<Message>,
    tx: QueueTx<Message>,
    client: Arc<dyn SourceClient>,
    cancel: CancellationToken,
) {
    while let Some(mut message) = rx.take(&cancel).await {
        if message.is_from_user() {
            match client.lookup_user(message.sender_id).await {
                Ok(Some(sender)) => message.sender = Some(sender),
                Ok(None) => {
                    warn!(sender_id = message.sender_id, "source reported no such user");
                }
                Err(err) => {
                    warn!(sender_id = message.sender_id, error = %err, "user lookup failed");
                }
            }
        }

        if tx.put(message, &cancel).await == crate::queue::PutOutcome::Cancelled {
            break;
        }
    }
}
