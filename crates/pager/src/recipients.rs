//! Per-bot paging roster loaded from the config store.

use {
    adjutant_common::BotId,
    adjutant_store::ConfigStore,
    serde::{Deserialize, Serialize},
};

use crate::{Result, mentions::PageTargets};

/// Record holding the paging roster inside a bot's store namespace.
pub const RECORD: &str = "pushover.json";

/// One person who can be paged, with the chat handles that reach them and
/// the delivery tokens for their device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Chat handles (lowercase) that resolve to this person.
    #[serde(default)]
    pub handles: Vec<String>,
    /// Application token for the paging service.
    #[serde(default)]
    pub app_token: String,
    /// The person's own delivery token.
    #[serde(default)]
    pub user_token: String,
    /// Name shown in the page text.
    pub nick: String,
}

impl Recipient {
    /// Whether both delivery tokens are present. Roster entries without
    /// tokens are placeholders and are skipped silently.
    #[must_use]
    pub fn can_page(&self) -> bool {
        !self.app_token.is_empty() && !self.user_token.is_empty()
    }

    /// Whether this person is addressed by the given target set. A
    /// broadcast matches everyone; otherwise any one registered handle in
    /// the set is enough.
    #[must_use]
    pub fn matches(&self, targets: &PageTargets) -> bool {
        targets.broadcast || self.handles.iter().any(|handle| targets.contains(handle))
    }
}

/// Load the bot's roster. A missing record means nobody is pageable.
pub async fn load(store: &ConfigStore, bot: &BotId) -> Result<Vec<Recipient>> {
    Ok(store.load(bot, RECORD).await?.unwrap_or_default())
}
