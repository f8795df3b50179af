//! Mention scanning and the normalized paging target set.

use std::collections::BTreeSet;

/// Mentions that page every recipient instead of a named set.
pub const BROADCAST: [&str; 3] = ["here", "everyone", "all"];

/// Scan a message for `@token` mentions, anywhere in the text.
///
/// Tokens are ASCII alphanumerics; an `@` inside a longer word counts too,
/// so `oli@example.com` yields `example`.
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut token = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() {
                token.push(next.to_ascii_lowercase());
                chars.next();
            } else {
                break;
            }
        }
        if !token.is_empty() {
            mentions.push(token);
        }
    }
    mentions
}

/// Lower-cased, de-duplicated mention set with the broadcast flag split out.
#[derive(Debug, Clone, Default)]
pub struct PageTargets {
    pub broadcast: bool,
    handles: BTreeSet<String>,
}

impl PageTargets {
    /// Normalize raw mentions. Any broadcast keyword flips the flag and the
    /// individual handles become irrelevant.
    #[must_use]
    pub fn from_mentions<I, S>(mentions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut targets = Self::default();
        for mention in mentions {
            let handle = mention.as_ref().to_ascii_lowercase();
            if BROADCAST.contains(&handle.as_str()) {
                targets.broadcast = true;
            } else if !handle.is_empty() {
                targets.handles.insert(handle);
            }
        }
        targets
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.broadcast && self.handles.is_empty()
    }

    #[must_use]
    pub fn contains(&self, handle: &str) -> bool {
        self.handles.contains(&handle.to_ascii_lowercase())
    }
}
