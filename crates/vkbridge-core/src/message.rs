//! The in-flight record that flows through Ingest → Enrichment → Delivery.

use std::fmt;

use crate::error::ValidationError;

/// Per-tenant identifier embedded in the callback URL path.
///
/// Opaque and non-empty; also the join key into the [`crate::registry::TenantRegistry`]
/// and the routing key carried end-to-end on every in-flight [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(String);

impl HookId {
    /// Parse a path segment into a `HookId`. Rejects the empty string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::InvalidHookId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of Source event kinds this bridge forwards. Any other
/// `envelope.type` is rejected at Ingest and never reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    New,
    Edit,
    Reply,
}

impl MessageKind {
    /// The emoji prefixed to the rendered text body, per the render contract.
    pub fn icon(self) -> &'static str {
        match self {
            MessageKind::New => "💬",
            MessageKind::Edit => "✏️",
            MessageKind::Reply => "↩️",
        }
    }
}

/// Sender profile resolved by the Enrichment stage. Absent when the sender
/// is a community/bot (negative `sender_id`) or when the upstream lookup
/// failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub first_name: String,
    pub last_name: String,
}

/// The in-flight record. Created by Ingest, mutated exactly once by
/// Enrichment (attaching `sender`), consumed by Delivery, then dropped.
#[derive(Debug, Clone)]
pub struct Message {
    pub hook_id: HookId,
    pub kind: MessageKind,
    pub text: String,
    pub sender_id: i64,
    pub sender: Option<Sender>,
}

impl Message {
    /// Construct a new, not-yet-enriched message. Validates `sender_id != 0`
    /// per spec: zero is never a valid VK sender id (neither a user nor a
    /// community).
    pub fn new(
        hook_id: HookId,
        kind: MessageKind,
        text: String,
        sender_id: i64,
    ) -> Result<Self, ValidationError> {
        if sender_id == 0 {
            return Err(ValidationError::InvalidSenderId);
        }
        Ok(Self {
            hook_id,
            kind,
            text,
            sender_id,
            sender: None,
        })
    }

    /// A positive sender id identifies a user (subject to Enrichment
    /// lookup); negative identifies a community or bot.
    pub fn is_from_user(&self) -> bool {
        self.sender_id > 0
    }
}
