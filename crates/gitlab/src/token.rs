//! Per-bot webhook secret tokens: issue, reuse, and reset.

use {
    adjutant_common::BotId,
    adjutant_store::ConfigStore,
    sha2::{Digest, Sha256},
    std::sync::Arc,
    tracing::info,
    uuid::Uuid,
};

use crate::Result;

/// Secret file holding a bot's webhook token inside its store namespace.
pub const SECRET_FILE: &str = "gitlab.secret";

/// Issues and persists the secret token callers must present on the
/// webhook. A token survives restarts; reset breaks every hook configured
/// with the old one.
pub struct TokenManager {
    store: Arc<ConfigStore>,
}

impl TokenManager {
    #[must_use]
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// The bot's token, minting a fresh one when none exists yet or when
    /// `reset` is set.
    pub async fn get_or_create(&self, bot: &BotId, reset: bool) -> Result<String> {
        let _guard = self.store.lock(bot).await;
        if !reset && let Some(token) = self.store.read_secret(bot, SECRET_FILE).await? {
            return Ok(token);
        }
        let token = mint_token();
        self.store.write_secret(bot, SECRET_FILE, &token).await?;
        info!(bot = %bot, reset, "issued webhook token");
        Ok(token)
    }

    /// The stored token, if one was ever issued. Verification paths use
    /// this; they must never mint on demand.
    pub async fn current(&self, bot: &BotId) -> Result<Option<String>> {
        Ok(self.store.read_secret(bot, SECRET_FILE).await?)
    }
}

/// 64 hex chars derived from a fresh UUID. Unguessable, and shaped like
/// the tokens CI systems issue themselves.
fn mint_token() -> String {
    let digest = Sha256::digest(Uuid::new_v4().to_string().as_bytes());
    format!("{digest:x}")
}
