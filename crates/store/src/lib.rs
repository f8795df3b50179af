//! Per-bot durable configuration: JSON records plus raw secret files,
//! namespaced by bot identity, with atomic writes and a per-bot write lock.

pub mod error;
pub mod store;

pub use {
    error::{Error, Result},
    store::ConfigStore,
};
