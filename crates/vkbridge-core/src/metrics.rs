//! In-process counters exposed over `GET /metrics` in Prometheus exposition
//! format.
//!
//! Two shapes are needed: a single unlabeled counter (`messages_forwarded`)
//! and a counter keyed by message type (`events_received{type="..."}`). A
//! plain `AtomicU64` covers the former; `dashmap` covers the latter without
//! a global lock on the hot path, the same tradeoff the teacher makes for
//! its own concurrent maps.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Process-wide counters. Cheap to clone (an `Arc` around the only mutable
/// field would be redundant here since both fields are already
/// independently shareable).
#[derive(Debug, Default)]
pub struct Metrics {
    events_received: DashMap<String, AtomicU64>,
    messages_forwarded: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `events_received{type=kind}` by one, where `kind` is the
    /// raw Source envelope `type` string (spec: "labeled by raw Source type
    /// string") — this fires for every accepted callback, including
    /// `confirmation` and unrecognized types, not only forwarded message
    /// kinds.
    pub fn record_event_received(&self, kind: &str) {
        self.events_received
            .entry(kind.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Increment `messages_forwarded` by one. Called only after a
    /// successful Sink send — failed deliveries are not counted.
    pub fn record_message_forwarded(&self) {
        self.messages_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Render all counters in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP events_received Total number of Source callback events received, labeled by message type.\n");
        out.push_str("# TYPE events_received counter\n");
        let mut rows: Vec<(String, u64)> = self
            .events_received
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (kind, count) in rows {
            out.push_str(&format!("events_received{{type=\"{kind}\"}} {count}\n"));
        }

        out.push_str("# HELP messages_forwarded Total number of messages successfully delivered to the Sink.\n");
        out.push_str("# TYPE messages_forwarded counter\n");
        out.push_str(&format!(
            "messages_forwarded {}\n",
            self.messages_forwarded.load(Ordering::Relaxed)
        ));

        out
    }
}
