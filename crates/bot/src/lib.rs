//! Per-conversation bot: command routing, dispatch, and replies.

pub mod facade;
pub mod help;
pub mod router;

pub use {
    facade::{BotFacade, DEFAULT_PUBLIC_PORT},
    router::Command,
};
