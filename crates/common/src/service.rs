use {
    crate::{message::OutboundMessage, types::BotId},
    anyhow::Result,
    async_trait::async_trait,
    serde::Deserialize,
};

/// Response from the asset store after a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetUploadResponse {
    pub key: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Outbound seam to the conversation service.
///
/// The binary provides the HTTP implementation; tests substitute mocks. The
/// facade never talks to the network directly.
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Deliver a message into the bot's conversation.
    async fn send_message(&self, bot: &BotId, message: OutboundMessage) -> Result<()>;

    /// Upload a pre-composed multipart body to the asset store.
    async fn upload_asset(
        &self,
        bot: &BotId,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<AssetUploadResponse>;

    /// Resolve a conversation member id to a display name.
    async fn user_name(&self, bot: &BotId, user_id: &str) -> Result<String>;
}
