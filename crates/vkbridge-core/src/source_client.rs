//! HTTP `SourceClient` implementation: VK's `users.get` method.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{enrich::SourceClient, message::Sender};

const USERS_GET_URL: &str = "https://api.vk.com/method/users.get";

/// VK API version pinned at construction time; a mismatch between what this
/// client sends and what a community's token was issued against would
/// otherwise surface as a hard-to-diagnose silent behavior change.
const API_VERSION: &str = "5.131";

/// `lang=ru` (not `lang=0`, VK's numeric codes are inconsistent across
/// endpoints) tells `users.get` to return Cyrillic names as-is instead of
/// transliterating them to Latin script.
const LANG_RU: &str = "ru";

pub struct VkSourceClient {
    http: reqwest::Client,
    access_token: String,
}

impl VkSourceClient {
    pub fn new(http: reqwest::Client, access_token: String) -> Self {
        Self { http, access_token }
    }
}

#[derive(Debug, Deserialize)]
struct UsersGetResponse {
    #[serde(default)]
    response: Vec<UserProfile>,
    #[serde(default)]
    error: Option<VkApiError>,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    first_name: String,
    last_name: String,
}

#[derive(Debug, Deserialize)]
struct VkApiError {
    error_code: i64,
    error_msg: String,
}

#[async_trait]
impl SourceClient for VkSourceClient {
    async fn lookup_user(&self, user_id: i64) -> anyhow::Result<Option<Sender>> {
        let response = self
            .http
            .get(USERS_GET_URL)
            .query(&[
                ("user_ids", user_id.to_string()),
                ("access_token", self.access_token.clone()),
                ("v", API_VERSION.to_string()),
                ("lang", LANG_RU.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<UsersGetResponse>()
            .await?;

        if let Some(error) = response.error {
            anyhow::bail!(
                "vk users.get error {}: {}",
                error.error_code,
                error.error_msg
            );
        }

        Ok(response.response.into_iter().next().map(|profile| Sender {
            first_name: profile.first_name,
            last_name: profile.last_name,
        }))
    }
}
