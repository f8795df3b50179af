use std::error::Error as StdError;

/// Crate-wide result type for asset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for the encrypted asset pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The blob is too short or not block-aligned.
    #[error("asset blob has an invalid layout")]
    Layout,

    /// Padding did not check out after decryption.
    #[error("asset decrypt failed: wrong key or corrupted data")]
    Decrypt,

    /// The asset store refused the upload; nothing was announced.
    #[error("asset upload failed: {source}")]
    Upload {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The asset went up but the announcement message did not.
    #[error("asset message failed: {source}")]
    Send {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn upload(source: anyhow::Error) -> Self {
        Self::Upload {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn send(source: anyhow::Error) -> Self {
        Self::Send {
            source: source.into(),
        }
    }
}
