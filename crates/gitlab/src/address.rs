//! Public address discovery for composing webhook URLs.

use async_trait::async_trait;

use crate::{Error, Result};

/// Default "what is my IP" endpoint.
pub const LOOKUP_ENDPOINT: &str = "https://api.ipify.org";

/// Resolves the address this host is reachable at from the outside. The
/// address is looked up per request rather than cached, so hosts behind
/// changing NAT keep handing out working hook URLs.
#[async_trait]
pub trait PublicAddressResolver: Send + Sync {
    async fn public_address(&self) -> Result<String>;
}

/// Resolver backed by an ipify-style plain-text lookup service.
pub struct HttpAddressResolver {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAddressResolver {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: LOOKUP_ENDPOINT.to_owned(),
        }
    }

    /// Point the resolver at a different lookup service. Used by tests.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl PublicAddressResolver for HttpAddressResolver {
    async fn public_address(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(Error::AddressLookup)?;
        let body = response.text().await.map_err(Error::AddressLookup)?;
        let address = body.trim();
        if address.is_empty() {
            return Err(Error::EmptyAddress);
        }
        Ok(address.to_owned())
    }
}

/// Fixed-answer resolver for deployments that know their address.
pub struct StaticAddressResolver(pub String);

#[async_trait]
impl PublicAddressResolver for StaticAddressResolver {
    async fn public_address(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
