//! CI webhook integration: per-bot secret tokens, hook URL composition,
//! and push-event intake.

pub mod address;
pub mod error;
pub mod token;
pub mod webhook;

pub use {
    address::{HttpAddressResolver, PublicAddressResolver, StaticAddressResolver},
    error::{Error, Result},
    token::{SECRET_FILE, TokenManager},
    webhook::{PushEvent, TOKEN_HEADER, hook_url, verify_token},
};
