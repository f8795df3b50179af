//! Per-conversation bot facade: one event loop owning command dispatch,
//! with integration calls spawned so the conversation never waits.

use std::{collections::HashMap, sync::Arc};

use {
    adjutant_assets::AssetPipeline,
    adjutant_common::{
        BotEvent, BotId, ConversationService, EventReceiver, ImageMeta, OutboundMessage,
    },
    adjutant_gitlab::{HttpAddressResolver, PublicAddressResolver, PushEvent, TokenManager},
    adjutant_jira::{
        AliasStore, JiraClient, NewIssue, alias, config, is_project_key, summarize,
    },
    adjutant_pager::{PageTargets, PushoverClient, extract_mentions},
    adjutant_store::ConfigStore,
    tokio::task::JoinSet,
    tracing::{debug, info, warn},
};

use crate::{
    help,
    router::{self, Command},
};

/// Port advertised in webhook URLs when none is configured.
pub const DEFAULT_PUBLIC_PORT: u16 = 8443;

/// Built-in quick-note keyword and the project it files under.
const LOOT_TOKEN: &str = "loot";
const LOOT_PROJECT: &str = "LOOT";

/// Reply when a `word:` message names no live alias or carries no text.
const NO_ALIAS_REPLY: &str = "alias doesn't exist or there is no content";

/// One conversation's bot. Owns the per-sender dedup state and every
/// integration handle; driven by [`BotFacade::run`] on its own task.
pub struct BotFacade {
    bot: BotId,
    service: Arc<dyn ConversationService>,
    store: Arc<ConfigStore>,
    aliases: AliasStore,
    jira: Arc<JiraClient>,
    pager: Arc<PushoverClient>,
    tokens: TokenManager,
    resolver: Arc<dyn PublicAddressResolver>,
    assets: AssetPipeline,
    public_port: u16,
    last_message: HashMap<String, String>,
    tasks: JoinSet<()>,
}

impl BotFacade {
    #[must_use]
    pub fn new(
        bot: BotId,
        service: Arc<dyn ConversationService>,
        store: Arc<ConfigStore>,
    ) -> Self {
        let http = reqwest::Client::new();
        Self {
            aliases: AliasStore::new(store.clone(), bot.clone()),
            tokens: TokenManager::new(store.clone()),
            jira: Arc::new(JiraClient::new(http.clone())),
            pager: Arc::new(PushoverClient::new(http.clone())),
            resolver: Arc::new(HttpAddressResolver::new(http)),
            assets: AssetPipeline::new(service.clone()),
            public_port: DEFAULT_PUBLIC_PORT,
            last_message: HashMap::new(),
            tasks: JoinSet::new(),
            bot,
            service,
            store,
        }
    }

    /// Swap the ticketing client, e.g. to point at a test server.
    #[must_use]
    pub fn with_jira_client(mut self, jira: JiraClient) -> Self {
        self.jira = Arc::new(jira);
        self
    }

    /// Swap the paging client.
    #[must_use]
    pub fn with_pager_client(mut self, pager: PushoverClient) -> Self {
        self.pager = Arc::new(pager);
        self
    }

    /// Swap the public-address resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn PublicAddressResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Port advertised in webhook URLs.
    #[must_use]
    pub fn with_public_port(mut self, port: u16) -> Self {
        self.public_port = port;
        self
    }

    #[must_use]
    pub fn bot(&self) -> &BotId {
        &self.bot
    }

    /// Consume events until the channel closes, reaping finished
    /// integration tasks along the way, then wait for the in-flight ones.
    pub async fn run(mut self, mut events: EventReceiver) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                Some(finished) = self.tasks.join_next() => {
                    if let Err(error) = finished {
                        warn!(bot = %self.bot, %error, "integration task failed");
                    }
                }
            }
        }
        self.drain().await;
        debug!(bot = %self.bot, "event loop stopped");
    }

    /// Wait for every spawned integration call to finish.
    pub async fn drain(&mut self) {
        while let Some(finished) = self.tasks.join_next().await {
            if let Err(error) = finished {
                warn!(bot = %self.bot, %error, "integration task failed");
            }
        }
    }

    /// Dispatch one event.
    pub async fn handle(&mut self, event: BotEvent) {
        match event {
            BotEvent::Message { from, text } => self.on_message(&from, &text).await,
            BotEvent::MemberJoin { members } => {
                info!(bot = %self.bot, ?members, "members joined");
            }
            BotEvent::MemberLeave { members } => {
                info!(bot = %self.bot, ?members, "members left");
            }
            BotEvent::Rename { name } => {
                info!(bot = %self.bot, %name, "conversation renamed");
            }
            BotEvent::GitlabPush { payload } => self.on_push(payload).await,
        }
    }

    /// Encrypt and post a file into the conversation.
    pub async fn send_asset(
        &self,
        data: &[u8],
        mime_type: &str,
        image: Option<ImageMeta>,
    ) -> adjutant_assets::Result<String> {
        self.assets.send_asset(&self.bot, data, mime_type, image).await
    }

    async fn on_message(&mut self, from: &str, text: &str) {
        debug!(bot = %self.bot, from, "message received");
        let is_repeat = self
            .last_message
            .get(from)
            .is_some_and(|last| last == text);
        self.last_message.insert(from.to_owned(), text.to_owned());

        match router::classify(text) {
            Some(Command::Help) => self.reply(help::GENERAL).await,
            Some(Command::GitlabHook) => self.send_hook_url(),
            Some(Command::GitlabToken { reset }) => self.send_token(reset).await,
            Some(Command::JiraHelp) => self.reply(help::JIRA).await,
            Some(Command::SetJiraUrl { url }) => self.set_jira_url(&url).await,
            Some(Command::SetJiraAuth { token }) => self.set_jira_auth(&token).await,
            Some(Command::SetJiraAlias { alias, key }) => self.set_alias(&alias, &key).await,
            Some(Command::RemoveJiraAlias { alias }) => self.remove_alias(&alias).await,
            Some(Command::JiraConfig) => self.send_jira_config().await,
            Some(Command::JiraAliases) => self.send_alias_list().await,
            Some(Command::Prefixed { token, text }) => {
                self.dispatch_prefixed(from, &token, &text, is_repeat).await;
            }
            Some(Command::Invalid { reply }) => self.reply(reply).await,
            None => {}
        }

        let targets = PageTargets::from_mentions(extract_mentions(text));
        if !targets.is_empty() {
            self.spawn_page(targets);
        }
    }

    /// A `word: text` message: a live alias files a ticket (with echo
    /// suppression), the loot keyword always files, reserved words stay
    /// silent, anything else gets a nudge.
    async fn dispatch_prefixed(&mut self, from: &str, token: &str, text: &str, is_repeat: bool) {
        if alias::is_reserved(token) {
            return;
        }
        let resolved = match self.aliases.resolve(token).await {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(bot = %self.bot, %error, "alias lookup failed");
                self.reply(error.to_string()).await;
                return;
            }
        };
        match resolved {
            Some(key) => {
                if text.is_empty() {
                    self.reply(NO_ALIAS_REPLY).await;
                    return;
                }
                if is_repeat {
                    debug!(bot = %self.bot, alias = token, "duplicate suppressed");
                    return;
                }
                self.spawn_ticket(from.to_owned(), key, text.to_owned()).await;
            }
            None if token == LOOT_TOKEN => {
                if text.is_empty() {
                    return;
                }
                self.spawn_ticket(from.to_owned(), LOOT_PROJECT.to_owned(), text.to_owned())
                    .await;
            }
            None => self.reply(NO_ALIAS_REPLY).await,
        }
    }

    /// File against the tracker off the event loop: resolve the reporter's
    /// display name, create or append, then report the outcome.
    async fn spawn_ticket(&mut self, from: String, target: String, text: String) {
        let config = match config::load_or_default(&self.store, &self.bot).await {
            Ok(config) => config,
            Err(error) => {
                warn!(bot = %self.bot, %error, "tracker config unreadable");
                self.reply(error.to_string()).await;
                return;
            }
        };
        let bot = self.bot.clone();
        let service = self.service.clone();
        let jira = self.jira.clone();
        self.tasks.spawn(async move {
            let reporter = match service.user_name(&bot, &from).await {
                Ok(name) => name,
                Err(error) => {
                    debug!(bot = %bot, %error, "name lookup failed");
                    "Unknown".to_owned()
                }
            };
            let outcome = if is_project_key(&target) {
                jira.create(&config, NewIssue {
                    project_key: &target,
                    summary: &summarize(&text),
                    description: &text,
                    reporter: &reporter,
                })
                .await
            } else {
                jira.append(&config, &target, &reporter, &text)
                    .await
                    .map(|()| target.clone())
            };
            let reply = match outcome {
                Ok(issue_key) => config.browse_url(&issue_key),
                Err(error) => error.to_string(),
            };
            send_text(&service, &bot, reply).await;
        });
    }

    /// Page everyone the message mentions; failures are reported per
    /// recipient, deliveries are silent.
    fn spawn_page(&mut self, targets: PageTargets) {
        let bot = self.bot.clone();
        let service = self.service.clone();
        let store = self.store.clone();
        let pager = self.pager.clone();
        self.tasks.spawn(async move {
            let outcomes = match pager.fan_out(&store, &bot, &targets).await {
                Ok(outcomes) => outcomes,
                Err(error) => {
                    warn!(bot = %bot, %error, "paging fan-out failed");
                    return;
                }
            };
            for outcome in outcomes.iter().filter(|o| !o.delivered()) {
                send_text(&service, &bot, format!("could not page {}", outcome.nick)).await;
            }
        });
    }

    /// Resolve the public address and reply with the webhook URL.
    fn send_hook_url(&mut self) {
        let bot = self.bot.clone();
        let service = self.service.clone();
        let resolver = self.resolver.clone();
        let port = self.public_port;
        self.tasks.spawn(async move {
            let reply = match resolver.public_address().await {
                Ok(address) => adjutant_gitlab::hook_url(&address, port, &bot),
                Err(error) => {
                    warn!(bot = %bot, %error, "address lookup failed");
                    error.to_string()
                }
            };
            send_text(&service, &bot, reply).await;
        });
    }

    async fn send_token(&self, reset: bool) {
        match self.tokens.get_or_create(&self.bot, reset).await {
            Ok(token) => self.reply(token).await,
            Err(error) => {
                warn!(bot = %self.bot, %error, "token issue failed");
                self.reply(error.to_string()).await;
            }
        }
    }

    async fn set_jira_url(&self, url: &str) {
        if let Err(error) = self.update_config(|config| config.apply_url(url)).await {
            self.reply(error.to_string()).await;
        }
    }

    async fn set_jira_auth(&self, token: &str) {
        let applied = self
            .update_config(|config| {
                config.set_auth(token);
                Ok(())
            })
            .await;
        if let Err(error) = applied {
            self.reply(error.to_string()).await;
        }
    }

    async fn set_alias(&self, alias: &str, key: &str) {
        match self.aliases.set_alias(alias, key).await {
            Ok((alias, key)) => debug!(bot = %self.bot, %alias, %key, "alias set"),
            Err(error) => self.reply(error.to_string()).await,
        }
    }

    async fn remove_alias(&self, alias: &str) {
        match self.aliases.remove_alias(alias).await {
            Ok(removed) => debug!(bot = %self.bot, alias, removed, "alias removed"),
            Err(error) => self.reply(error.to_string()).await,
        }
    }

    async fn send_jira_config(&self) {
        match config::load_or_default(&self.store, &self.bot).await {
            Ok(config) => self.reply(config.redacted().to_string()).await,
            Err(error) => self.reply(error.to_string()).await,
        }
    }

    async fn send_alias_list(&self) {
        match self.aliases.list().await {
            Ok(aliases) => {
                let rendered =
                    serde_json::to_string(&aliases).unwrap_or_else(|_| "{}".to_owned());
                self.reply(rendered).await;
            }
            Err(error) => self.reply(error.to_string()).await,
        }
    }

    async fn on_push(&self, payload: serde_json::Value) {
        match serde_json::from_value::<PushEvent>(payload) {
            Ok(event) => {
                info!(bot = %self.bot, project = %event.project.name, "push received");
                self.reply(event.render()).await;
            }
            Err(error) => warn!(bot = %self.bot, %error, "unusable push payload"),
        }
    }

    /// Read-modify-write of the tracker config under the bot's store lock.
    async fn update_config<F>(&self, mutate: F) -> adjutant_jira::Result<()>
    where
        F: FnOnce(&mut adjutant_jira::TrackerConfig) -> adjutant_jira::Result<()>,
    {
        let _guard = self.store.lock(&self.bot).await;
        let mut tracker = config::load_or_default(&self.store, &self.bot).await?;
        mutate(&mut tracker)?;
        config::save(&self.store, &self.bot, &tracker).await?;
        Ok(())
    }

    async fn reply(&self, text: impl Into<String>) {
        send_text(&self.service, &self.bot, text).await;
    }
}

async fn send_text(
    service: &Arc<dyn ConversationService>,
    bot: &BotId,
    text: impl Into<String>,
) {
    if let Err(error) = service.send_message(bot, OutboundMessage::text(text)).await {
        warn!(bot = %bot, %error, "reply failed");
    }
}
