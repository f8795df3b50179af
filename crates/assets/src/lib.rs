//! Encrypted asset pipeline: seal a file, upload the blob, announce it.

pub mod crypto;
pub mod error;
pub mod multipart;
pub mod pipeline;

pub use {
    crypto::EncryptedAsset,
    error::{Error, Result},
    pipeline::AssetPipeline,
};
