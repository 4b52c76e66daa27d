//! Shared types.

pub mod config;
pub mod errors;
pub mod messages;

pub use messages::{ChatId, ChatKind, Command, InboundEvent, OutboundReply};
