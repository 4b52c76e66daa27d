//! Per-conversation state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::types::ChatId;

/// Where a conversation is in the teaching workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Answering messages from the knowledge base.
    #[default]
    Idle,
    /// Waiting for the key to learn.
    LearningQuestion,
    /// Waiting for the answer to `pending_question`.
    LearningAnswer,
    /// Waiting for the key to delete.
    Forgetting,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::LearningQuestion => write!(f, "learning_question"),
            Status::LearningAnswer => write!(f, "learning_answer"),
            Status::Forgetting => write!(f, "forgetting"),
        }
    }
}

/// State of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub status: Status,
    pub pending_question: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to idle, dropping any half-taught question.
    pub fn reset(&mut self) {
        self.status = Status::Idle;
        self.pending_question = None;
    }
}

/// Handle to one conversation's state. Holding the lock serialises the
/// conversation's messages without blocking any other conversation.
pub type ConversationHandle = Arc<Mutex<ConversationState>>;

/// Every conversation seen by this process, created on first access.
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    conversations: RwLock<HashMap<ChatId, ConversationHandle>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `chat_id`, creating an idle conversation if none exists.
    pub async fn entry(&self, chat_id: ChatId) -> ConversationHandle {
        if let Some(handle) = self.conversations.read().await.get(&chat_id) {
            return handle.clone();
        }

        let mut conversations = self.conversations.write().await;
        conversations
            .entry(chat_id)
            .or_insert_with(|| {
                tracing::debug!(chat_id = %chat_id, "New conversation");
                Arc::new(Mutex::new(ConversationState::new()))
            })
            .clone()
    }

    /// Copy of the state of `chat_id`, if the conversation exists.
    pub async fn get(&self, chat_id: ChatId) -> Option<ConversationState> {
        let handle = self.conversations.read().await.get(&chat_id).cloned()?;
        let state = handle.lock().await;
        Some(state.clone())
    }

    /// Number of known conversations.
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Whether no conversation has been seen yet.
    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_creates_idle_state() {
        let registry = ConversationRegistry::new();
        assert!(registry.get(ChatId(1)).await.is_none());

        let handle = registry.entry(ChatId(1)).await;
        assert_eq!(*handle.lock().await, ConversationState::new());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_entry_returns_same_conversation() {
        let registry = ConversationRegistry::new();

        registry.entry(ChatId(1)).await.lock().await.status = Status::Forgetting;

        let state = registry.get(ChatId(1)).await.unwrap();
        assert_eq!(state.status, Status::Forgetting);
        assert_eq!(registry.get(ChatId(2)).await, None);
    }

    #[test]
    fn test_reset() {
        let mut state = ConversationState {
            status: Status::LearningAnswer,
            pending_question: Some("q".to_string()),
        };
        state.reset();
        assert_eq!(state, ConversationState::new());
    }
}
