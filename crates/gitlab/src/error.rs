/// Crate-wide result type for the CI webhook integration.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for the CI webhook integration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The public address of this host could not be determined.
    #[error("address lookup failed: {0}")]
    AddressLookup(#[source] reqwest::Error),

    /// The address service answered with something unusable.
    #[error("address lookup returned an empty answer")]
    EmptyAddress,

    /// Persistence failed underneath the integration.
    #[error(transparent)]
    Store(#[from] adjutant_store::Error),
}
