//! Alias rules and the cached per-bot alias map.

use std::{collections::BTreeMap, sync::Arc};

use {adjutant_common::BotId, adjutant_store::ConfigStore, tokio::sync::RwLock};

use crate::{
    config::{self, TrackerConfig},
    error::{Error, Result},
};

/// Hard cap on registered aliases per bot.
pub const MAX_ALIASES: usize = 10;

/// Tokens that show up as `word:` in ordinary messages (URL schemes, reply
/// prefixes) and therefore can never be registered or matched as aliases.
pub const RESERVED: [&str; 7] = ["http", "https", "ftp", "gopher", "smtp", "ws", "re"];

#[must_use]
pub fn is_reserved(alias: &str) -> bool {
    RESERVED.contains(&alias)
}

/// Aliases are lowercase ASCII letters, nothing else.
#[must_use]
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty() && alias.chars().all(|c| c.is_ascii_lowercase())
}

/// Keys are letters with an optional `-digits` suffix (`PROJ`, `PROJ-10`),
/// accepted in any case.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    let (letters, digits) = match key.split_once('-') {
        Some((letters, digits)) => (letters, Some(digits)),
        None => (key, None),
    };
    let letters_ok = !letters.is_empty() && letters.chars().all(|c| c.is_ascii_alphabetic());
    let digits_ok = digits.is_none_or(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()));
    letters_ok && digits_ok
}

/// Cached view over the alias map inside the bot's tracker config.
///
/// Mutations are store-then-invalidate. A read miss reloads the record once
/// and retries, which doubles as warm-up after a process restart.
pub struct AliasStore {
    store: Arc<ConfigStore>,
    bot: BotId,
    cache: RwLock<Option<BTreeMap<String, String>>>,
}

impl AliasStore {
    #[must_use]
    pub fn new(store: Arc<ConfigStore>, bot: BotId) -> Self {
        Self {
            store,
            bot,
            cache: RwLock::new(None),
        }
    }

    /// Register or update an alias. Returns the normalized pair.
    pub async fn set_alias(&self, alias: &str, key: &str) -> Result<(String, String)> {
        let alias = alias.to_ascii_lowercase();
        if !is_valid_alias(&alias) || !is_valid_key(key) {
            return Err(Error::invalid(
                "Please make sure it's in alias=key format. No space, one pair per command. \
                 alias is letters only, and key is letters plus an optional -number",
            ));
        }
        if is_reserved(&alias) {
            return Err(Error::invalid(format!(
                "\"{alias}\" is reserved and cannot be used as an alias"
            )));
        }
        let key = key.to_ascii_uppercase();

        let _guard = self.store.lock(&self.bot).await;
        let mut config = config::load_or_default(&self.store, &self.bot).await?;
        if config.aliases.len() >= MAX_ALIASES && !config.aliases.contains_key(&alias) {
            return Err(Error::invalid(format!(
                "alias limit of {MAX_ALIASES} reached; remove one first"
            )));
        }
        config.aliases.insert(alias.clone(), key.clone());
        config::save(&self.store, &self.bot, &config).await?;
        self.invalidate().await;
        Ok((alias, key))
    }

    /// Delete an alias. Returns whether it existed.
    pub async fn remove_alias(&self, alias: &str) -> Result<bool> {
        let alias = alias.to_ascii_lowercase();
        let _guard = self.store.lock(&self.bot).await;
        let mut config = config::load_or_default(&self.store, &self.bot).await?;
        let removed = config.aliases.remove(&alias).is_some();
        if removed {
            config::save(&self.store, &self.bot, &config).await?;
            self.invalidate().await;
        }
        Ok(removed)
    }

    /// Resolve an alias to its stored key.
    ///
    /// Reserved words never match. A cache miss triggers exactly one reload
    /// from the store before giving up; that reload is the only automatic
    /// resync path.
    pub async fn resolve(&self, alias: &str) -> Result<Option<String>> {
        let alias = alias.to_ascii_lowercase();
        if is_reserved(&alias) {
            return Ok(None);
        }
        {
            let cache = self.cache.read().await;
            if let Some(key) = cache.as_ref().and_then(|map| map.get(&alias)) {
                return Ok(Some(key.clone()));
            }
        }
        let reloaded = self.reload().await?;
        Ok(reloaded.get(&alias).cloned())
    }

    /// Copy of the alias map, read through the store so display is current.
    pub async fn list(&self) -> Result<BTreeMap<String, String>> {
        self.reload().await
    }

    /// Drop the cached map; the next read reloads from disk.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn reload(&self) -> Result<BTreeMap<String, String>> {
        let config: TrackerConfig = config::load_or_default(&self.store, &self.bot).await?;
        let mut cache = self.cache.write().await;
        *cache = Some(config.aliases.clone());
        Ok(config.aliases)
    }
}
