//! Gateway: runs the bot over newline-delimited JSON.
//!
//! Stands in for a messaging platform. Each input line is an
//! [`InboundEvent`](crate::types::InboundEvent), each output line an
//! [`OutboundReply`](crate::types::OutboundReply).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use parley::bot::Bot;
//! use parley::gateway::{BotServer, StdioTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = parley::Config::load_or_default();
//!     let store = parley::store::open(&config.store).unwrap();
//!     let bot = Arc::new(Bot::new(store, &config.bot));
//!     BotServer::new(StdioTransport::stdio(), bot).run().await.unwrap();
//! }
//! ```

mod server;
mod transport;

pub use server::{BotServer, ServeSummary};
pub use transport::{LineTransport, StdioTransport};
