//! Seal-and-announce pipeline for outbound assets.

use {
    adjutant_common::{
        AssetKeys, AssetMeta, BotId, ConversationService, ImageMeta, OutboundMessage,
    },
    base64::{Engine as _, engine::general_purpose::STANDARD},
    std::sync::Arc,
    tracing::debug,
};

use crate::{Error, Result, crypto, multipart};

/// Sends files into a conversation: encrypt, upload the blob, then post
/// the message carrying the decryption material and asset handle.
pub struct AssetPipeline {
    service: Arc<dyn ConversationService>,
}

impl AssetPipeline {
    #[must_use]
    pub fn new(service: Arc<dyn ConversationService>) -> Self {
        Self { service }
    }

    /// Seal `data` and announce it. Returns the asset id the store issued.
    /// A failed upload announces nothing and leaves no state behind.
    pub async fn send_asset(
        &self,
        bot: &BotId,
        data: &[u8],
        mime_type: &str,
        image: Option<ImageMeta>,
    ) -> Result<String> {
        let sealed = crypto::encrypt(data);
        let body = multipart::compose(mime_type, &sealed.blob);
        debug!(
            bot = %bot,
            plain = data.len(),
            sealed = sealed.blob.len(),
            "uploading asset"
        );
        let uploaded = self
            .service
            .upload_asset(bot, multipart::CONTENT_TYPE, body)
            .await
            .map_err(Error::upload)?;

        let message = OutboundMessage::asset(
            AssetMeta {
                mime_type: mime_type.to_owned(),
                size: data.len() as u64,
                image,
            },
            AssetKeys {
                otr_key: STANDARD.encode(sealed.key),
                sha256: STANDARD.encode(sealed.sha256),
                asset_id: uploaded.key.clone(),
                asset_token: uploaded.token,
            },
        );
        self.service
            .send_message(bot, message)
            .await
            .map_err(Error::send)?;
        Ok(uploaded.key)
    }
}
