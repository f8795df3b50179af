//! Event intake gateway: the HTTP surface in front of per-bot dispatch
//! loops.

pub mod registry;
pub mod server;

pub use {
    registry::BotRegistry,
    server::{AppState, build_app, serve},
};
