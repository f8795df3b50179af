//! Conversation service reached over its HTTP API.

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::debug,
};

use adjutant_common::{AssetUploadResponse, BotId, ConversationService, OutboundMessage};

/// HTTP implementation of the outbound service seam. One instance is shared
/// by every bot; the target conversation is addressed per call.
pub struct HttpConversationService {
    http: reqwest::Client,
    base: String,
    token: Option<Secret<String>>,
}

#[derive(Deserialize)]
struct UserRecord {
    name: String,
}

impl HttpConversationService {
    #[must_use]
    pub fn new(base: impl Into<String>, token: Option<Secret<String>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_owned(),
            token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.request(method, format!("{}{path}", self.base));
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl ConversationService for HttpConversationService {
    async fn send_message(&self, bot: &BotId, message: OutboundMessage) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, &format!("/bots/{bot}/messages"))
            .json(&message)
            .send()
            .await
            .context("conversation service unreachable")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("message send failed ({status}): {body}");
        }
        Ok(())
    }

    async fn upload_asset(
        &self,
        bot: &BotId,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<AssetUploadResponse> {
        debug!(bot = %bot, size = body.len(), "uploading asset");
        let response = self
            .request(reqwest::Method::POST, &format!("/bots/{bot}/assets"))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .context("conversation service unreachable")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("asset upload failed ({status}): {body}");
        }
        response.json().await.context("asset response was not JSON")
    }

    async fn user_name(&self, _bot: &BotId, user_id: &str) -> Result<String> {
        let response = self
            .request(reqwest::Method::GET, "/bot/users")
            .query(&[("ids", user_id)])
            .send()
            .await
            .context("conversation service unreachable")?;
        if !response.status().is_success() {
            anyhow::bail!("user lookup failed ({})", response.status());
        }
        let users: Vec<UserRecord> = response.json().await.context("user list was not JSON")?;
        users
            .into_iter()
            .next()
            .map(|user| user.name)
            .with_context(|| format!("no user record for {user_id}"))
    }
}
