//! # Parley
//!
//! A teachable chat responder.
//!
//! Users teach the bot answers in conversation: `/learn` asks for a question
//! and then an answer, `/forget` removes one. Questions are either matched
//! exactly or, when they start with `^`, compiled as regular expressions
//! whose named groups fill `{name}` placeholders in the answer.
//!
//! ## Modules
//!
//! - [`bot`] - Event routing facade shared by transports
//! - [`conversation`] - Per-conversation teaching state machine
//! - [`lookup`] - Answer resolution and templates
//! - [`cache`] - Compiled pattern-key snapshot
//! - [`store`] - Knowledge store backends, export and import
//! - [`hooks`] - Conversation lifecycle hooks
//! - [`gateway`] - Newline-delimited JSON transport
//! - [`cli`] - Command line interface
//! - [`types`] - Shared types

pub mod bot;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod conversation;
pub mod gateway;
pub mod hooks;
pub mod lookup;
pub mod store;
pub mod types;

pub use bot::Bot;
pub use types::config::Config;
pub use types::errors::{BotError, BotResult};
