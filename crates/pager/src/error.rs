/// Crate-wide result type for paging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for the paging integration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The paging service answered but refused the request.
    #[error("paging service declined (status {status})")]
    Declined { status: i64 },

    /// The paging service answered with something that does not parse.
    #[error("unusable paging response")]
    Malformed,

    /// Wrapped transport error.
    #[error("page request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Persistence failed underneath the integration.
    #[error(transparent)]
    Store(#[from] adjutant_store::Error),
}
