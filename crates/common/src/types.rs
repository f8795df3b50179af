use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Identity of one conversation-scoped bot.
///
/// Doubles as the storage namespace directory name, so the charset is
/// restricted to characters that are safe as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(String);

impl BotId {
    /// Parse an identifier, accepting `[A-Za-z0-9_-]+` up to 128 chars.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.len() > 128 {
            return None;
        }
        raw.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            .then(|| Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_style_ids() {
        assert!(BotId::parse("1c0552ae-32c0-47e9-b61f-a9265dcb4c0d").is_some());
        assert!(BotId::parse("bot_42").is_some());
    }

    #[test]
    fn rejects_path_unsafe_ids() {
        assert!(BotId::parse("").is_none());
        assert!(BotId::parse("../etc").is_none());
        assert!(BotId::parse("a/b").is_none());
        assert!(BotId::parse("a b").is_none());
        assert!(BotId::parse(&"x".repeat(129)).is_none());
    }
}
