//! First-match routing of inbound conversation text.

/// Reply for a `set jira` / `remove jira alias` line with the wrong shape.
pub const INVALID_FORMAT: &str = "Invalid format. Type \"jira help\" for more info";

/// Reply for a malformed `set jira alias` argument. Matches the wording of
/// the alias store's own validation so both paths read the same.
pub const ALIAS_FORMAT: &str =
    "Please make sure it's in alias=key format. No space, one pair per command. \
     alias is letters only, and key is letters plus an optional -number";

/// One recognized action for a message. Keyword matching is
/// case-insensitive; payloads keep their original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    GitlabHook,
    GitlabToken { reset: bool },
    JiraHelp,
    SetJiraUrl { url: String },
    SetJiraAuth { token: String },
    SetJiraAlias { alias: String, key: String },
    RemoveJiraAlias { alias: String },
    JiraConfig,
    JiraAliases,
    /// `word: text` shape. Whether the word is a live alias, the loot
    /// keyword, or nothing is decided at dispatch, where the alias store
    /// can be consulted.
    Prefixed { token: String, text: String },
    /// A recognized command with a malformed argument, plus its canned
    /// reply. Nothing is mutated for these.
    Invalid { reply: &'static str },
}

/// Match a message against the ordered grammar. `None` is ordinary
/// conversation text the bot stays silent about.
#[must_use]
pub fn classify(raw: &str) -> Option<Command> {
    let text = raw.trim();
    let lower = text.to_lowercase();
    let exact = match lower.as_str() {
        "help" => Some(Command::Help),
        "get gitlab hook" => Some(Command::GitlabHook),
        "get gitlab token" => Some(Command::GitlabToken { reset: false }),
        "reset gitlab token" => Some(Command::GitlabToken { reset: true }),
        "jira help" => Some(Command::JiraHelp),
        "jira config" => Some(Command::JiraConfig),
        "jira alias" => Some(Command::JiraAliases),
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }
    if lower.starts_with("set jira") {
        return Some(set_jira(text));
    }
    if lower.starts_with("remove jira alias") {
        return Some(remove_jira_alias(text));
    }
    prefixed(text)
}

fn set_jira(text: &str) -> Command {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() == 3 {
        return Command::SetJiraUrl {
            url: words[2].to_owned(),
        };
    }
    if words.len() == 4 && words[2].eq_ignore_ascii_case("auth") {
        return Command::SetJiraAuth {
            token: words[3].to_owned(),
        };
    }
    if words.len() >= 4 && words[2].eq_ignore_ascii_case("alias") {
        if words.len() > 4 {
            return Command::Invalid {
                reply: ALIAS_FORMAT,
            };
        }
        return match words[3].split_once('=') {
            Some((alias, key)) if !alias.is_empty() && !key.is_empty() => Command::SetJiraAlias {
                alias: alias.to_owned(),
                key: key.to_owned(),
            },
            _ => Command::Invalid {
                reply: ALIAS_FORMAT,
            },
        };
    }
    Command::Invalid {
        reply: INVALID_FORMAT,
    }
}

fn remove_jira_alias(text: &str) -> Command {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() == 4 {
        Command::RemoveJiraAlias {
            alias: words[3].to_owned(),
        }
    } else {
        Command::Invalid {
            reply: INVALID_FORMAT,
        }
    }
}

/// `word: rest` with an all-letter word. Any other shape is plain text.
fn prefixed(text: &str) -> Option<Command> {
    let (head, rest) = text.split_once(':')?;
    if head.is_empty() || !head.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(Command::Prefixed {
        token: head.to_ascii_lowercase(),
        text: rest.trim().to_owned(),
    })
}
