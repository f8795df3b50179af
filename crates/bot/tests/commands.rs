#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end command handling through the bot facade, with the
//! conversation service mocked and the HTTP integrations pointed at local
//! test servers.

use std::sync::{Arc, Mutex};

use {
    adjutant_bot::BotFacade,
    adjutant_common::{
        AssetUploadResponse, BotEvent, BotId, ConversationService, OutboundMessage,
    },
    adjutant_gitlab::StaticAddressResolver,
    adjutant_jira::JiraClient,
    adjutant_pager::{PushoverClient, Recipient, recipients},
    adjutant_store::ConfigStore,
    base64::{Engine as _, engine::general_purpose::STANDARD},
    mockito::Matcher,
    sha2::{Digest, Sha256},
};

/// Conversation service double that records everything sent through it.
#[derive(Default)]
struct ChatLog {
    sent: Mutex<Vec<serde_json::Value>>,
}

impl ChatLog {
    fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m["text"]["content"].as_str().map(str::to_owned))
            .collect()
    }

    fn raw(&self) -> Vec<serde_json::Value> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ConversationService for ChatLog {
    async fn send_message(&self, _bot: &BotId, message: OutboundMessage) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(serde_json::to_value(&message)?);
        Ok(())
    }

    async fn upload_asset(
        &self,
        _bot: &BotId,
        _content_type: &str,
        _body: Vec<u8>,
    ) -> anyhow::Result<AssetUploadResponse> {
        Ok(AssetUploadResponse {
            key: "3-2-asset".into(),
            token: None,
        })
    }

    async fn user_name(&self, _bot: &BotId, _user_id: &str) -> anyhow::Result<String> {
        Ok("Oli".into())
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    chat: Arc<ChatLog>,
    store: Arc<ConfigStore>,
    bot: BotId,
    facade: BotFacade,
}

impl Harness {
    async fn new(build: impl FnOnce(BotFacade) -> BotFacade) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(ConfigStore::new(dir.path().to_path_buf()));
        let chat = Arc::new(ChatLog::default());
        let bot = BotId::parse("bot-1").unwrap();
        let facade = build(BotFacade::new(bot.clone(), chat.clone(), store.clone()));
        Self {
            _dir: dir,
            chat,
            store,
            bot,
            facade,
        }
    }

    async fn plain() -> Self {
        Self::new(|facade| facade).await
    }

    /// Deliver one message and wait for any spawned integration calls.
    async fn say(&mut self, text: &str) {
        self.say_as("member-7", text).await;
    }

    async fn say_as(&mut self, from: &str, text: &str) {
        self.facade
            .handle(BotEvent::Message {
                from: from.into(),
                text: text.into(),
            })
            .await;
        self.facade.drain().await;
    }
}

/// Point the facade's ticketing client at a test server and configure the
/// endpoint the way a user would.
async fn jira_harness(server: &mockito::Server) -> Harness {
    let client = JiraClient::new(reqwest::Client::new()).with_base_url(server.url());
    let mut h = Harness::new(|facade| facade.with_jira_client(client)).await;
    h.say("set jira jira.example.com").await;
    h.say("set jira auth dXNlcjpwdw==").await;
    h
}

#[tokio::test]
async fn help_replies_with_the_command_block() {
    let mut h = Harness::plain().await;
    h.say("help").await;
    let texts = h.chat.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("```"));
    assert!(texts[0].contains("get gitlab hook"));
    assert!(texts[0].contains("jira help"));
}

#[tokio::test]
async fn keywords_are_case_insensitive() {
    let mut h = Harness::plain().await;
    h.say("JIRA Help").await;
    let texts = h.chat.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("set jira alias"));
}

#[tokio::test]
async fn plain_chatter_gets_no_reply() {
    let mut h = Harness::plain().await;
    h.say("morning everyone, standup in 5").await;
    h.say("deploy at 5:30").await;
    assert!(h.chat.texts().is_empty());
}

#[tokio::test]
async fn test_gitlab_token_is_stable_until_reset() {
    let mut h = Harness::plain().await;
    h.say("get gitlab token").await;
    h.say("get gitlab token").await;
    h.say("reset gitlab token").await;
    let texts = h.chat.texts();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], texts[1]);
    assert_ne!(texts[1], texts[2]);
    assert_eq!(texts[2].len(), 64);
    assert!(texts[2].chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_hook_url_carries_resolved_address_and_port() {
    let mut h = Harness::new(|facade| {
        facade
            .with_resolver(Arc::new(StaticAddressResolver("203.0.113.9".into())))
            .with_public_port(9443)
    })
    .await;
    h.say("get gitlab hook").await;
    assert_eq!(
        h.chat.texts(),
        vec!["https://203.0.113.9:9443/bots/bot-1/gitlab".to_owned()]
    );
}

#[tokio::test]
async fn test_alias_create_files_a_ticket_and_links_it() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/latest/issue")
        .match_header("authorization", "Basic dXNlcjpwdw==")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "fields": {
                "project": { "key": "PROJ" },
                "summary": "fixed crash",
                "description": "fixed crash\n\nReported by Oli",
            }
        })))
        .with_status(201)
        .with_body(r#"{"id":"101","key":"PROJ-7"}"#)
        .create_async()
        .await;

    let mut h = jira_harness(&server).await;
    h.say("set jira alias note=proj").await;
    h.say("Note: fixed crash").await;

    assert_eq!(
        h.chat.texts(),
        vec!["https://jira.example.com:443/browse/PROJ-7".to_owned()]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_alias_append_merges_descriptions() {
    let mut server = mockito::Server::new_async().await;
    let get = server
        .mock("GET", "/rest/api/latest/issue/PROJ-10")
        .with_status(200)
        .with_body(r#"{"fields":{"description":"first report"}}"#)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/rest/api/latest/issue/PROJ-10")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "fields": { "description": "first report\n\nOli added:\nstill broken" }
        })))
        .with_status(204)
        .create_async()
        .await;

    let mut h = jira_harness(&server).await;
    h.say("set jira alias note=PROJ-10").await;
    h.say("note: still broken").await;

    assert_eq!(
        h.chat.texts(),
        vec!["https://jira.example.com:443/browse/PROJ-10".to_owned()]
    );
    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_duplicate_alias_message_fires_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/latest/issue")
        .with_status(201)
        .with_body(r#"{"key":"PROJ-8"}"#)
        .expect(1)
        .create_async()
        .await;

    let mut h = jira_harness(&server).await;
    h.say("set jira alias note=PROJ").await;
    h.say("note: same text").await;
    h.say("note: same text").await;

    mock.assert_async().await;
    // One link for the first, silence for the echo.
    assert_eq!(h.chat.texts().len(), 1);
}

#[tokio::test]
async fn test_duplicate_from_another_sender_still_fires() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/latest/issue")
        .with_status(201)
        .with_body(r#"{"key":"PROJ-9"}"#)
        .expect(2)
        .create_async()
        .await;

    let mut h = jira_harness(&server).await;
    h.say("set jira alias note=PROJ").await;
    h.say_as("member-1", "note: same text").await;
    h.say_as("member-2", "note: same text").await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_loot_always_fires_under_its_project() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/latest/issue")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "fields": {
                "project": { "key": "LOOT" },
                "description": "shiny artifact\n\nReported by Oli",
            }
        })))
        .with_status(201)
        .with_body(r#"{"key":"LOOT-3"}"#)
        .expect(2)
        .create_async()
        .await;

    let mut h = jira_harness(&server).await;
    h.say("loot: shiny artifact").await;
    h.say("loot: shiny artifact").await;
    mock.assert_async().await;
}

#[tokio::test]
async fn unknown_alias_gets_a_nudge() {
    let mut h = Harness::plain().await;
    h.say("nosuch: does not go anywhere").await;
    assert_eq!(
        h.chat.texts(),
        vec!["alias doesn't exist or there is no content".to_owned()]
    );
}

#[tokio::test]
async fn registered_alias_without_content_gets_the_same_nudge() {
    let mut h = Harness::plain().await;
    h.say("set jira alias note=PROJ").await;
    h.say("note:").await;
    assert_eq!(
        h.chat.texts(),
        vec!["alias doesn't exist or there is no content".to_owned()]
    );
}

#[tokio::test]
async fn pasted_urls_stay_silent() {
    let mut h = Harness::plain().await;
    h.say("https://example.com/some/path").await;
    h.say("ftp://files.example.com").await;
    h.say("re: yesterday's incident").await;
    assert!(h.chat.texts().is_empty());
}

#[tokio::test]
async fn test_alias_validation_replies() {
    let mut h = Harness::plain().await;
    h.say("set jira alias note").await;
    h.say("set jira alias a=B c=D").await;
    h.say("set jira alias note7=PROJ").await;
    h.say("set jira alias https=PROJ").await;
    h.say("set jira one two three four").await;
    let texts = h.chat.texts();
    assert_eq!(texts.len(), 5);
    assert!(texts[0].contains("alias=key format"));
    assert!(texts[1].contains("alias=key format"));
    assert!(texts[2].contains("alias=key format"));
    assert!(texts[3].contains("reserved"));
    assert!(texts[4].contains("Invalid format"));
}

#[tokio::test]
async fn test_alias_limit_is_enforced() {
    let mut h = Harness::plain().await;
    for alias in [
        "aa", "bb", "cc", "dd", "ee", "ff", "gg", "hh", "ii", "jj",
    ] {
        h.say(&format!("set jira alias {alias}=PROJ")).await;
    }
    assert!(h.chat.texts().is_empty());

    // Updating an existing alias is fine, an eleventh is not.
    h.say("set jira alias aa=OTHER").await;
    assert!(h.chat.texts().is_empty());
    h.say("set jira alias kk=PROJ").await;
    let texts = h.chat.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("alias limit"));
}

#[tokio::test]
async fn test_removed_alias_stops_matching() {
    let mut h = Harness::plain().await;
    h.say("set jira alias note=PROJ").await;
    h.say("remove jira alias note").await;
    h.say("note: anyone home").await;
    assert_eq!(
        h.chat.texts(),
        vec!["alias doesn't exist or there is no content".to_owned()]
    );
}

#[tokio::test]
async fn test_jira_config_redacts_the_credential() {
    let mut h = Harness::plain().await;
    h.say("set jira jira.example.com:8443/rest/api/2").await;
    h.say("set jira auth s3cret-token").await;
    h.say("set jira alias note=PROJ").await;
    h.say("jira config").await;

    let texts = h.chat.texts();
    assert_eq!(texts.len(), 1);
    let config: serde_json::Value = serde_json::from_str(&texts[0]).unwrap();
    assert_eq!(config["host"], "jira.example.com");
    assert_eq!(config["port"], 8443);
    assert_eq!(config["path"], "/rest/api/2");
    assert_eq!(config["aliases"]["note"], "PROJ");
    let expected = format!("{:x}", Sha256::digest(b"s3cret-token"));
    assert_eq!(config["auth_sha256"], expected.as_str());
    assert!(!texts[0].contains("s3cret-token"));
}

#[tokio::test]
async fn test_alias_listing_is_json() {
    let mut h = Harness::plain().await;
    h.say("set jira alias note=PROJ").await;
    h.say("set jira alias bug=ops-1").await;
    h.say("jira alias").await;

    let texts = h.chat.texts();
    let aliases: serde_json::Value = serde_json::from_str(&texts[0]).unwrap();
    assert_eq!(aliases["note"], "PROJ");
    assert_eq!(aliases["bug"], "OPS-1");
}

#[tokio::test]
async fn test_invalid_jira_url_is_rejected_with_a_reply() {
    let mut h = Harness::plain().await;
    h.say("set jira http://insecure.example.com").await;
    let texts = h.chat.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("https"));
}

async fn roster(h: &Harness, entries: &[(&str, &str)]) {
    let roster: Vec<Recipient> = entries
        .iter()
        .map(|(nick, handle)| Recipient {
            handles: vec![(*handle).to_owned()],
            app_token: format!("app-{nick}"),
            user_token: format!("user-{nick}"),
            nick: (*nick).to_owned(),
        })
        .collect();
    h.store
        .store(&h.bot, recipients::RECORD, &roster)
        .await
        .unwrap();
}

fn pager_for(server: &mockito::Server) -> PushoverClient {
    PushoverClient::new(reqwest::Client::new()).with_base_url(server.url())
}

#[tokio::test]
async fn test_mention_pages_the_roster() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/1/messages.json")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("token".into(), "app-Oli".into()),
            Matcher::UrlEncoded("message".into(), "Paging Oli".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"status":1}"#)
        .expect(1)
        .create_async()
        .await;

    let mut h = Harness::new({
        let pager = pager_for(&server);
        move |facade| facade.with_pager_client(pager)
    })
    .await;
    roster(&h, &[("Oli", "oli")]).await;

    h.say("deploy is done @oli").await;
    mock.assert_async().await;
    assert!(h.chat.texts().is_empty());
}

#[tokio::test]
async fn test_broadcast_mention_pages_everyone() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/1/messages.json")
        .with_status(200)
        .with_body(r#"{"status":1}"#)
        .expect(2)
        .create_async()
        .await;

    let mut h = Harness::new({
        let pager = pager_for(&server);
        move |facade| facade.with_pager_client(pager)
    })
    .await;
    roster(&h, &[("Oli", "oli"), ("Bob", "bob")]).await;

    h.say("@here fire drill").await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_mentions_fire_alongside_replies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/1/messages.json")
        .with_status(200)
        .with_body(r#"{"status":1}"#)
        .expect(1)
        .create_async()
        .await;

    let mut h = Harness::new({
        let pager = pager_for(&server);
        move |facade| facade.with_pager_client(pager)
    })
    .await;
    roster(&h, &[("Oli", "oli")]).await;

    // The nudge still goes out; mention handling is independent.
    h.say("nosuch: ping @oli").await;
    mock.assert_async().await;
    assert_eq!(
        h.chat.texts(),
        vec!["alias doesn't exist or there is no content".to_owned()]
    );
}

#[tokio::test]
async fn test_failed_page_is_reported_per_recipient() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/1/messages.json")
        .match_body(Matcher::UrlEncoded("token".into(), "app-Oli".into()))
        .with_status(200)
        .with_body(r#"{"status":1}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/1/messages.json")
        .match_body(Matcher::UrlEncoded("token".into(), "app-Bob".into()))
        .with_status(200)
        .with_body(r#"{"status":0}"#)
        .create_async()
        .await;

    let mut h = Harness::new({
        let pager = pager_for(&server);
        move |facade| facade.with_pager_client(pager)
    })
    .await;
    roster(&h, &[("Oli", "oli"), ("Bob", "bob")]).await;

    h.say("@oli @bob ship it").await;
    assert_eq!(h.chat.texts(), vec!["could not page Bob".to_owned()]);
}

#[tokio::test]
async fn test_push_event_is_announced() {
    let mut h = Harness::plain().await;
    h.facade
        .handle(BotEvent::GitlabPush {
            payload: serde_json::json!({
                "object_kind": "push",
                "user_name": "Oli",
                "project": { "name": "adjutant", "homepage": "https://git.example.com/ops/adjutant" }
            }),
        })
        .await;
    assert_eq!(
        h.chat.texts(),
        vec!["Oli pushed to project adjutant (url: https://git.example.com/ops/adjutant)".to_owned()]
    );
}

#[tokio::test]
async fn membership_events_only_log() {
    let mut h = Harness::plain().await;
    h.facade
        .handle(BotEvent::MemberJoin {
            members: vec!["member-1".into()],
        })
        .await;
    h.facade
        .handle(BotEvent::Rename {
            name: "ops war room".into(),
        })
        .await;
    assert!(h.chat.texts().is_empty());
}

#[tokio::test]
async fn test_send_asset_announces_the_upload() {
    let h = Harness::plain().await;
    let asset_id = h
        .facade
        .send_asset(b"pretend png bytes", "image/png", None)
        .await
        .unwrap();
    assert_eq!(asset_id, "3-2-asset");

    let sent = h.chat.raw();
    assert_eq!(sent.len(), 1);
    let uploaded = &sent[0]["asset"]["uploaded"];
    assert_eq!(uploaded["asset_id"], "3-2-asset");
    let key = STANDARD.decode(uploaded["otr_key"].as_str().unwrap()).unwrap();
    assert_eq!(key.len(), 32);
    assert_eq!(sent[0]["asset"]["original"]["mime_type"], "image/png");
}
