//! Shared types and the conversation-service seam used across all adjutant
//! crates.

pub mod events;
pub mod message;
pub mod service;
pub mod types;

pub use {
    events::{BotEvent, EventReceiver, EventSender},
    message::{AssetBody, AssetKeys, AssetMeta, ImageMeta, MessageBody, OutboundMessage},
    service::{AssetUploadResponse, ConversationService},
    types::BotId,
};
