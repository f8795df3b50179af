use {serde::Serialize, uuid::Uuid};

/// Outbound message envelope handed to the conversation service.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub message_id: String,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl OutboundMessage {
    /// Wrap a plain text reply.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            body: MessageBody::Text {
                text: TextContent {
                    content: content.into(),
                },
            },
        }
    }

    /// Wrap a reference to an uploaded encrypted asset.
    #[must_use]
    pub fn asset(original: AssetMeta, uploaded: AssetKeys) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            body: MessageBody::Asset {
                asset: AssetBody { original, uploaded },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageBody {
    Text { text: TextContent },
    Asset { asset: AssetBody },
}

#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetBody {
    pub original: AssetMeta,
    pub uploaded: AssetKeys,
}

/// Describes the plaintext the recipient will see after decryption.
#[derive(Debug, Clone, Serialize)]
pub struct AssetMeta {
    pub mime_type: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
}

/// Everything the recipient needs to fetch and decrypt the asset: the
/// symmetric key and ciphertext digest (both base64) plus the asset
/// store's returned id/token pair.
#[derive(Debug, Clone, Serialize)]
pub struct AssetKeys {
    pub otr_key: String,
    pub sha256: String,
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_token: Option<String>,
}
