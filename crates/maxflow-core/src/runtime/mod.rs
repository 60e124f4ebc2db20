//! Event routing and handlers.

pub mod callbacks;
pub mod chat;
pub mod commands;
pub mod context;
pub mod dedup;
pub mod dispatcher;
pub mod flows;
pub mod outbound;

pub use context::BotContext;
pub use dedup::DedupCache;
pub use dispatcher::Dispatcher;
