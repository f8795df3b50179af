//! HTTP ticketing client: create, get, and the two-phase append.

use {reqwest::RequestBuilder, serde_json::Value, tracing::debug};

use crate::{
    config::TrackerConfig,
    error::{Error, Result},
};

// Fixed metadata for created tickets (standard task type, default priority).
const ISSUE_TYPE_ID: &str = "10001";
const PRIORITY_ID: &str = "3";

/// A resolved alias target that is a bare project key triggers create;
/// anything else is treated as an issue key and appended to.
#[must_use]
pub fn is_project_key(target: &str) -> bool {
    !target.is_empty() && target.chars().all(|c| c.is_ascii_uppercase())
}

/// Ticket summary: first 60 characters of the text, newlines flattened.
#[must_use]
pub fn summarize(text: &str) -> String {
    text.chars()
        .take(60)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// Payload for a new ticket.
#[derive(Debug, Clone, Copy)]
pub struct NewIssue<'a> {
    pub project_key: &'a str,
    pub summary: &'a str,
    pub description: &'a str,
    pub reporter: &'a str,
}

/// Thin client over the tracker's REST surface. Endpoint settings come from
/// the per-bot [`TrackerConfig`] on every call, so configuration changes
/// apply immediately.
pub struct JiraClient {
    http: reqwest::Client,
    base_override: Option<String>,
}

impl JiraClient {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_override: None,
        }
    }

    /// Point the client at a different scheme/authority while keeping the
    /// configured API path. Used by tests and local proxies.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_override = Some(base.into());
        self
    }

    /// POST a new issue; returns the created issue key.
    pub async fn create(&self, config: &TrackerConfig, issue: NewIssue<'_>) -> Result<String> {
        let url = format!("{}{}/issue", self.base(config), config.path);
        let body = serde_json::json!({
            "fields": {
                "project": { "key": issue.project_key },
                "summary": issue.summary,
                "issuetype": { "id": ISSUE_TYPE_ID },
                "priority": { "id": PRIORITY_ID },
                "description": format!("{}\n\nReported by {}", issue.description, issue.reporter),
            }
        });
        debug!(project = issue.project_key, "creating issue");
        let response = self
            .authorized(self.http.post(&url), config)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::external("create issue", e))?;
        let value = parse_json(response).await?;
        value["key"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::malformed("create response carries no issue key"))
    }

    /// GET an issue's current description. First phase of append.
    pub async fn get_description(&self, config: &TrackerConfig, issue_key: &str) -> Result<String> {
        let url = format!("{}{}/issue/{issue_key}", self.base(config), config.path);
        let response = self
            .authorized(self.http.get(&url), config)
            .send()
            .await
            .map_err(|e| Error::external("get issue", e))?;
        let value = parse_json(response).await?;
        Ok(value["fields"]["description"]
            .as_str()
            .unwrap_or_default()
            .to_owned())
    }

    /// Two-phase append: fetch the current description, then PUT it back
    /// with the new text attached, so prior content is never discarded.
    pub async fn append(
        &self,
        config: &TrackerConfig,
        issue_key: &str,
        reporter: &str,
        text: &str,
    ) -> Result<()> {
        let current = self.get_description(config, issue_key).await?;
        let merged = if current.is_empty() {
            format!("{reporter} added:\n{text}")
        } else {
            format!("{current}\n\n{reporter} added:\n{text}")
        };

        let url = format!("{}{}/issue/{issue_key}", self.base(config), config.path);
        let body = serde_json::json!({ "fields": { "description": merged } });
        debug!(issue = issue_key, "appending to issue");
        let response = self
            .authorized(self.http.put(&url), config)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::external("update issue", e))?;

        // A successful PUT comes back 204 with an empty body.
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let raw = response.text().await.unwrap_or_default();
        match error_messages(&raw) {
            Some(messages) => Err(Error::api(messages)),
            None => Err(Error::malformed(format!("update returned {status}"))),
        }
    }

    fn base(&self, config: &TrackerConfig) -> String {
        self.base_override
            .clone()
            .unwrap_or_else(|| format!("https://{}:{}", config.host, config.port))
    }

    fn authorized(&self, request: RequestBuilder, config: &TrackerConfig) -> RequestBuilder {
        let request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
        if config.has_auth() {
            request.header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", config.auth_raw()),
            )
        } else {
            request
        }
    }
}

/// The tracker reports failures as an `errorMessages` array in the body, so
/// the body is inspected before the status code.
async fn parse_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let raw = response
        .text()
        .await
        .map_err(|e| Error::external("read response", e))?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => match value.get("errorMessages") {
            Some(messages) => Err(Error::api(string_list(messages))),
            None if status.is_success() => Ok(value),
            None => Err(Error::malformed(format!("tracker returned {status}"))),
        },
        Err(_) => Err(Error::malformed(format!(
            "tracker response not JSON (status {status})"
        ))),
    }
}

fn error_messages(raw: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    value.get("errorMessages").map(string_list)
}

fn string_list(value: &Value) -> Vec<String> {
    value.as_array().map_or_else(
        || vec![value.to_string()],
        |items| {
            items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_owned))
                .collect()
        },
    )
}
