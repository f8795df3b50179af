//! Paging fan-out: mention extraction, recipient records, and the
//! Pushover-style delivery client.

pub mod client;
pub mod error;
pub mod mentions;
pub mod recipients;

pub use {
    client::{PageOutcome, PushoverClient},
    error::{Error, Result},
    mentions::{PageTargets, extract_mentions},
    recipients::Recipient,
};
