use {serde::Deserialize, tokio::sync::mpsc};

/// One inbound event for a single bot, consumed sequentially by that bot's
/// dispatch loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    /// A text message from a conversation member.
    Message { from: String, text: String },
    /// Members were added to the conversation.
    MemberJoin { members: Vec<String> },
    /// Members left the conversation.
    MemberLeave { members: Vec<String> },
    /// The conversation was renamed.
    Rename { name: String },
    /// A push payload delivered through the per-bot webhook URL.
    GitlabPush { payload: serde_json::Value },
}

/// Receiver end of a bot's event channel.
pub type EventReceiver = mpsc::Receiver<BotEvent>;

/// Sender end of a bot's event channel.
pub type EventSender = mpsc::Sender<BotEvent>;
