//! Inbound push notifications: token verification, payload shape, and the
//! chat rendering.

use {adjutant_common::BotId, serde::Deserialize};

/// Header the CI system sends its secret token in.
pub const TOKEN_HEADER: &str = "X-Gitlab-Token";

/// Webhook URL a CI system should be configured with for this bot.
#[must_use]
pub fn hook_url(address: &str, port: u16, bot: &BotId) -> String {
    format!("https://{address}:{port}/bots/{bot}/gitlab")
}

/// Compare the presented token against the stored secret without leaking
/// the mismatch position through timing.
#[must_use]
pub fn verify_token(presented: &str, expected: &str) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .bytes()
        .zip(expected.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// The slice of a push payload the bot announces. Unknown fields are
/// ignored so payload schema growth never breaks intake.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    pub user_name: String,
    pub project: PushProject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushProject {
    pub name: String,
    #[serde(default)]
    pub homepage: String,
}

impl PushEvent {
    /// One-line conversation announcement for the push.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{} pushed to project {} (url: {})",
            self.user_name, self.project.name, self.project.homepage
        )
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_token() {
        assert!(verify_token("abc123", "abc123"));
        assert!(!verify_token("abc123", "abc124"));
        assert!(!verify_token("abc", "abc123"));
        assert!(!verify_token("", "abc"));
        assert!(verify_token("", ""));
    }

    #[test]
    fn test_hook_url_shape() {
        let bot = BotId::parse("bot-1").unwrap();
        assert_eq!(
            hook_url("198.51.100.7", 8443, &bot),
            "https://198.51.100.7:8443/bots/bot-1/gitlab"
        );
    }

    #[test]
    fn push_event_parses_and_renders() {
        let raw = r#"{
            "object_kind": "push",
            "user_name": "Oli",
            "commits": [{"id": "abc"}],
            "project": {"name": "adjutant", "homepage": "https://git.example.com/ops/adjutant"}
        }"#;
        let event: PushEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event.render(),
            "Oli pushed to project adjutant (url: https://git.example.com/ops/adjutant)"
        );
    }

    #[test]
    fn push_event_requires_pusher_and_project() {
        assert!(serde_json::from_str::<PushEvent>(r#"{"project":{"name":"x"}}"#).is_err());
        assert!(serde_json::from_str::<PushEvent>(r#"{"user_name":"Oli"}"#).is_err());
    }
}
