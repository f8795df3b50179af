//! JIRA-style ticketing integration: endpoint configuration, command
//! aliases, and the create/append client.

pub mod alias;
pub mod client;
pub mod config;
pub mod error;

pub use {
    alias::{AliasStore, MAX_ALIASES, RESERVED},
    client::{JiraClient, NewIssue, is_project_key, summarize},
    config::TrackerConfig,
    error::{Error, Result},
};
