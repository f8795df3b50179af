use std::error::Error as StdError;

/// Crate-wide result type for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for the JIRA integration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any state change or network call; the message is
    /// meant to be shown to the user verbatim.
    #[error("{message}")]
    Invalid { message: String },

    /// The tracker answered with its own error list.
    #[error("tracker rejected the request: {}", messages.join("; "))]
    Api { messages: Vec<String> },

    /// The tracker answered with something that does not parse.
    #[error("unusable tracker response: {context}")]
    Malformed { context: String },

    /// Wrapped transport error.
    #[error("jira request failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Persistence failed underneath the integration.
    #[error(transparent)]
    Store(#[from] adjutant_store::Error),
}

impl Error {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn api(messages: Vec<String>) -> Self {
        Self::Api { messages }
    }

    #[must_use]
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
