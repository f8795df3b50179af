//! Persisted tracker endpoint + alias map, one `jira.json` record per bot.

use std::collections::BTreeMap;

use {
    adjutant_common::BotId,
    adjutant_store::ConfigStore,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    sha2::{Digest, Sha256},
};

use crate::error::{Error, Result};

/// Record name under the bot's store namespace.
pub const RECORD: &str = "jira.json";

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_PATH: &str = "/rest/api/latest";

/// Tracker endpoint and alias map for one bot.
///
/// The auth credential is a pre-encoded basic-auth token. It is stored raw
/// (outbound calls need it) and only ever rendered back as a SHA-256 digest.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    #[serde(serialize_with = "serialize_secret")]
    pub auth: Secret<String>,
    pub aliases: BTreeMap<String, String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_owned(),
            auth: Secret::new(String::new()),
            aliases: BTreeMap::new(),
        }
    }
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("auth", &"[REDACTED]")
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl TrackerConfig {
    /// Replace host/port/path from a user-supplied endpoint string.
    ///
    /// Accepted forms: `host`, `host:port`, `host:port/path`, optionally
    /// prefixed with `https://`. Anything else is a validation error.
    pub fn apply_url(&mut self, raw: &str) -> Result<()> {
        let (host, port, path) = parse_endpoint(raw)?;
        self.host = host;
        self.port = port;
        self.path = path;
        Ok(())
    }

    pub fn set_auth(&mut self, token: &str) {
        self.auth = Secret::new(token.trim().to_owned());
    }

    #[must_use]
    pub fn has_auth(&self) -> bool {
        !self.auth.expose_secret().is_empty()
    }

    /// Raw credential for the `Authorization` header.
    #[must_use]
    pub fn auth_raw(&self) -> &str {
        self.auth.expose_secret()
    }

    /// Web link for a created or updated issue.
    #[must_use]
    pub fn browse_url(&self, issue_key: &str) -> String {
        format!("https://{}:{}/browse/{issue_key}", self.host, self.port)
    }

    /// User-facing rendering with the credential replaced by its digest.
    #[must_use]
    pub fn redacted(&self) -> serde_json::Value {
        let auth_sha256 = if self.has_auth() {
            let digest = Sha256::digest(self.auth.expose_secret().as_bytes());
            format!("{digest:x}")
        } else {
            String::new()
        };
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "path": self.path,
            "auth_sha256": auth_sha256,
            "aliases": self.aliases,
        })
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn parse_endpoint(raw: &str) -> Result<(String, u16, String)> {
    let trimmed = raw.trim();
    let rest = if let Some(stripped) = strip_scheme(trimmed, "https://") {
        stripped
    } else if trimmed.contains("://") {
        return Err(Error::invalid(
            "only https is supported; e.g. jira.example.com:8443/rest/api/latest",
        ));
    } else {
        trimmed
    };

    let (authority, path) = match rest.split_once('/') {
        Some((authority, path)) => (authority, format!("/{}", path.trim_end_matches('/'))),
        None => (rest, DEFAULT_PATH.to_owned()),
    };

    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| Error::invalid(format!("invalid port \"{port}\"")))?;
            (host, port)
        }
        None => (authority, DEFAULT_PORT),
    };

    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(Error::invalid(format!("invalid host \"{host}\"")));
    }

    Ok((host.to_owned(), port, path))
}

fn strip_scheme<'a>(raw: &'a str, scheme: &str) -> Option<&'a str> {
    let head = raw.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme).then(|| &raw[scheme.len()..])
}

/// Load the bot's tracker config, synthesizing defaults when absent.
pub async fn load_or_default(store: &ConfigStore, bot: &BotId) -> Result<TrackerConfig> {
    Ok(store.load(bot, RECORD).await?.unwrap_or_default())
}

/// Persist the bot's tracker config.
pub async fn save(store: &ConfigStore, bot: &BotId, config: &TrackerConfig) -> Result<()> {
    Ok(store.store(bot, RECORD, config).await?)
}
