//! `HookId → Tenant` lookup.
//!
//! Populated once at startup and never mutated afterwards, so `Lookup` can
//! be wait-free for every reader: each [`TenantRegistry`] clone shares one
//! `Arc<HashMap<..>>` and `lookup` is a single `Arc` deref + hash lookup,
//! no lock in the read path.

use std::{collections::HashMap, sync::Arc};

use crate::message::HookId;

/// One configured mapping from a Source community to a Sink chat.
///
/// Invariants (enforced by [`Tenant::new`]): `hook_id` non-empty (guaranteed
/// by the [`HookId`] type itself), `secret_key` and `confirmation_string`
/// non-empty, `dest_chat_id` non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub hook_id: HookId,
    pub secret_key: String,
    pub confirmation_string: String,
    pub dest_chat_id: i64,
}

/// Error constructing a [`Tenant`] from configuration — a misconfigured
/// community entry, caught at startup rather than at first use.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("community {hook_id}: secret_key must not be empty")]
    EmptySecret { hook_id: String },
    #[error("community {hook_id}: confirmation_string must not be empty")]
    EmptyConfirmation { hook_id: String },
    #[error("community {hook_id}: dest_chat_id must not be zero")]
    ZeroChatId { hook_id: String },
    #[error("duplicate hookId in configuration: {hook_id}")]
    Duplicate { hook_id: String },
}

impl Tenant {
    pub fn new(
        hook_id: HookId,
        secret_key: String,
        confirmation_string: String,
        dest_chat_id: i64,
    ) -> Result<Self, TenantError> {
        if secret_key.is_empty() {
            return Err(TenantError::EmptySecret {
                hook_id: hook_id.to_string(),
            });
        }
        if confirmation_string.is_empty() {
            return Err(TenantError::EmptyConfirmation {
                hook_id: hook_id.to_string(),
            });
        }
        if dest_chat_id == 0 {
            return Err(TenantError::ZeroChatId {
                hook_id: hook_id.to_string(),
            });
        }
        Ok(Self {
            hook_id,
            secret_key,
            confirmation_string,
            dest_chat_id,
        })
    }
}

/// Read-mostly `HookId → Tenant` mapping, safe to share across every
/// Ingest and Delivery task via a cheap clone.
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    tenants: Arc<HashMap<HookId, Tenant>>,
}

impl TenantRegistry {
    /// Build the registry from the startup configuration. Rejects duplicate
    /// `hookId`s — the spec requires `HookId` uniqueness.
    pub fn new(tenants: Vec<Tenant>) -> Result<Self, TenantError> {
        let mut map = HashMap::with_capacity(tenants.len());
        for tenant in tenants {
            if map.contains_key(&tenant.hook_id) {
                return Err(TenantError::Duplicate {
                    hook_id: tenant.hook_id.to_string(),
                });
            }
            map.insert(tenant.hook_id.clone(), tenant);
        }
        Ok(Self {
            tenants: Arc::new(map),
        })
    }

    /// Pure, wait-free read. Safe under concurrent callers.
    pub fn lookup(&self, hook_id: &HookId) -> Option<&Tenant> {
        self.tenants.get(hook_id)
    }
}
