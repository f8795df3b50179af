//! JSON records and raw secret files, one directory per bot, atomic writes.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    adjutant_common::BotId,
    serde::{Serialize, de::DeserializeOwned},
    tokio::{
        fs,
        sync::{Mutex, OwnedMutexGuard},
    },
};

use crate::error::{Error, Result};

/// Per-bot record store rooted at a single directory.
///
/// Layout: `<root>/<bot-id>/<record>`, where a record is either a JSON file
/// or a raw secret file. Writes go through a temp-then-rename sequence and
/// the previous version is kept as `.bak`.
pub struct ConfigStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConfigStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Acquire the bot's write lock.
    ///
    /// Read-modify-write sequences hold this across load and store so two
    /// racing configuration commands cannot drop each other's updates.
    pub async fn lock(&self, bot: &BotId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(bot.as_str().to_owned()).or_default())
        };
        lock.lock_owned().await
    }

    /// Load a JSON record. A missing file is `None`, not an error.
    pub async fn load<T: DeserializeOwned>(&self, bot: &BotId, record: &str) -> Result<Option<T>> {
        let path = self.record_path(bot, record);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;
        let value = serde_json::from_str(&data).map_err(|e| Error::malformed(&path, e))?;
        Ok(Some(value))
    }

    /// Persist a JSON record, replacing any previous version.
    pub async fn store<T: Serialize>(&self, bot: &BotId, record: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.atomic_write(&self.record_path(bot, record), json.as_bytes())
            .await
    }

    /// Read a raw secret file, trimmed. Missing or empty yields `None`.
    pub async fn read_secret(&self, bot: &BotId, name: &str) -> Result<Option<String>> {
        let path = self.record_path(bot, name);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;
        let secret = data.trim().to_owned();
        Ok((!secret.is_empty()).then_some(secret))
    }

    /// Persist a raw secret file, replacing any previous version.
    pub async fn write_secret(&self, bot: &BotId, name: &str, value: &str) -> Result<()> {
        self.atomic_write(&self.record_path(bot, name), value.as_bytes())
            .await
    }

    fn record_path(&self, bot: &BotId, record: &str) -> PathBuf {
        self.root.join(bot.as_str()).join(record)
    }

    /// Atomic write: write to temp, rename over target, keep `.bak`.
    async fn atomic_write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        let tmp = sibling(path, ".tmp");
        fs::write(&tmp, bytes).await.map_err(|e| Error::io(&tmp, e))?;

        // Back up the existing file.
        if fs::try_exists(path).await.unwrap_or(false) {
            let _ = fs::rename(path, sibling(path, ".bak")).await;
        }

        fs::rename(&tmp, path)
            .await
            .map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
