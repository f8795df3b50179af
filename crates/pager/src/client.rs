//! Delivery client for the Pushover-style paging service.

use {adjutant_common::BotId, adjutant_store::ConfigStore, tracing::debug};

use crate::{
    Result,
    error::Error,
    mentions::PageTargets,
    recipients::{self, Recipient},
};

/// Production endpoint of the paging service.
pub const PUSHOVER_BASE: &str = "https://api.pushover.net";

/// What happened to one recipient's page. Delivery failures carry the
/// rendered error so the conversation can be told who was missed.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub nick: String,
    pub error: Option<String>,
}

impl PageOutcome {
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Client for the paging API. One instance serves every bot; recipient
/// rosters are loaded per call.
pub struct PushoverClient {
    http: reqwest::Client,
    base_url: String,
}

impl PushoverClient {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: PUSHOVER_BASE.to_owned(),
        }
    }

    /// Redirect requests to a different endpoint. Used by tests.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    /// Page everyone the target set addresses, at most once each. Requests
    /// run concurrently and one failure never stops the others; each
    /// recipient's result is reported in the returned list.
    pub async fn fan_out(
        &self,
        store: &ConfigStore,
        bot: &BotId,
        targets: &PageTargets,
    ) -> Result<Vec<PageOutcome>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let roster = recipients::load(store, bot).await?;
        let pages = roster
            .iter()
            .filter(|person| person.matches(targets) && person.can_page())
            .map(|person| async move {
                let error = self.page(person).await.err().map(|e| e.to_string());
                PageOutcome {
                    nick: person.nick.clone(),
                    error,
                }
            });
        let outcomes = futures::future::join_all(pages).await;
        debug!(
            bot = %bot,
            paged = outcomes.iter().filter(|o| o.delivered()).count(),
            failed = outcomes.iter().filter(|o| !o.delivered()).count(),
            "paging fan-out finished"
        );
        Ok(outcomes)
    }

    /// Send one page. The service answers 2xx with a JSON body whose
    /// `status` field is 1 on acceptance; anything else is a decline.
    async fn page(&self, recipient: &Recipient) -> Result<()> {
        let message = format!("Paging {}", recipient.nick);
        let form = [
            ("token", recipient.app_token.as_str()),
            ("user", recipient.user_token.as_str()),
            ("message", message.as_str()),
        ];
        let response = self
            .http
            .post(format!("{}/1/messages.json", self.base_url))
            .form(&form)
            .send()
            .await?;
        let value: serde_json::Value = response.json().await.map_err(|_| Error::Malformed)?;
        match value["status"].as_i64() {
            Some(1) => Ok(()),
            Some(status) => Err(Error::Declined { status }),
            None => Err(Error::Malformed),
        }
    }
}
