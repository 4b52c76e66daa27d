//! Conversations: addressing, per-chat state and the teaching state machine.

mod address;
mod machine;
pub mod replies;
mod state;

pub use address::WakeWords;
pub use machine::ConversationMachine;
pub use state::{ConversationHandle, ConversationRegistry, ConversationState, Status};
