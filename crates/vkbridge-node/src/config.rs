//! YAML configuration, loaded once from the path given on `--config`.
//!
//! No hot reload, no layered/merged config search path — a single explicit
//! file, matching the one-shot `LoadConfigFromFile` call the original
//! implementation makes at startup. Validation happens here, at load time,
//! so a misconfigured deployment fails before binding a listener rather
//! than at first request.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use vkbridge_core::{message::HookId, registry::Tenant};

/// Root of the YAML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub http: HttpConfig,
    pub vk: VkConfig,
    pub telegram: TelegramConfig,
    /// `/metrics` is disabled entirely when this is absent or empty.
    #[serde(default)]
    pub metrics_auth_token: Option<String>,
    pub communities: Vec<CommunityConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// `host:port` to bind the listener to.
    pub bind: String,
    /// Caps the size of an inbound callback body. Default mirrors the
    /// teacher's own `max_body_bytes` field.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct VkConfig {
    pub api_token: String,
    /// Seconds. Default mirrors spec's "finite timeout (default 10s)".
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_send_timeout_secs() -> u64 {
    10
}

/// One entry in `communities:`, maps 1:1 onto a [`Tenant`] at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityConfig {
    pub hook_id: String,
    pub secret_key: String,
    pub confirmation_string: String,
    pub dest_chat_id: i64,
}

impl BridgeConfig {
    /// Load and validate the config at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: BridgeConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.http.bind.is_empty() {
            anyhow::bail!("http.bind must not be empty");
        }
        if self.vk.api_token.is_empty() {
            anyhow::bail!("vk.api_token must not be empty");
        }
        if self.telegram.bot_token.is_empty() {
            anyhow::bail!("telegram.bot_token must not be empty");
        }
        if self.communities.is_empty() {
            anyhow::bail!("communities must not be empty");
        }
        Ok(())
    }

    /// Build the startup [`Tenant`] list from `communities`. Propagates the
    /// first per-community validation error ([`Tenant::new`]'s own
    /// non-empty/non-zero checks) or [`HookId::parse`]'s empty-string
    /// rejection.
    pub fn tenants(&self) -> anyhow::Result<Vec<Tenant>> {
        self.communities
            .iter()
            .map(|community| {
                let hook_id = HookId::parse(community.hook_id.clone())
                    .with_context(|| format!("community entry {:?}", community.hook_id))?;
                let tenant = Tenant::new(
                    hook_id,
                    community.secret_key.clone(),
                    community.confirmation_string.clone(),
                    community.dest_chat_id,
                )
                .with_context(|| format!("community entry {:?}", community.hook_id))?;
                Ok(tenant)
            })
            .collect()
    }
}
