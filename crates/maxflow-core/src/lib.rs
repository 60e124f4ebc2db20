//! MaxFlow Core - conversation flow engine for the MAX messenger
//!
//! The engine routes inbound messenger events through a JSON-configured
//! conversation tree. Users navigate menus of flows; static flows render
//! fixed content, extended flows open nested menus, managed flows hand
//! free-text questions to an AI search backend and paginate the results.
//!
//! Layering:
//! - [`config`] loads the flow tree, button templates and texts
//! - [`channel`] talks to the messenger (long polling + REST)
//! - [`flow`] holds the pure navigation and pagination rules
//! - [`ai`] is the search backend client
//! - [`runtime`] wires it all together per inbound event

pub mod ai;
pub mod channel;
pub mod config;
pub mod flow;
pub mod runtime;

pub use ai::{HttpSearchClient, SearchBackend, SearchOutcome};
pub use channel::{ChatClient, Event, MaxClient};
pub use config::{load_bot_config, BotConfig, ConfigError};
pub use runtime::{BotContext, Dispatcher};
