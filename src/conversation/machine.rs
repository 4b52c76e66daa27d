//! The teaching state machine.
//!
//! ```text
//! Idle --/learn--> LearningQuestion --key--> LearningAnswer --value--> Idle
//! Idle --/forget--> Forgetting --key--> Idle
//! any  --/cancel--> Idle
//! ```
//!
//! A failed message leaves the conversation exactly as it was, so the user
//! can simply send it again.

use std::sync::Arc;

use crate::cache::{PatternCache, PatternCacheEntry};
use crate::lookup::{LookupEngine, Resolution};
use crate::store::{is_pattern_key, KnowledgeStore};
use crate::types::Command;
use crate::{BotError, BotResult};

use super::replies;
use super::state::{ConversationState, Status};

/// Drives one conversation's state through the teaching workflow.
#[derive(Clone)]
pub struct ConversationMachine {
    store: Arc<dyn KnowledgeStore>,
    cache: Arc<PatternCache>,
    lookup: LookupEngine,
}

impl ConversationMachine {
    pub fn new(store: Arc<dyn KnowledgeStore>, cache: Arc<PatternCache>) -> Self {
        let lookup = LookupEngine::new(store.clone(), cache.clone());
        Self {
            store,
            cache,
            lookup,
        }
    }

    pub fn lookup(&self) -> &LookupEngine {
        &self.lookup
    }

    /// Applies a conversation command. Admin commands are not handled here
    /// and yield `None`.
    pub fn on_command(&self, state: &mut ConversationState, command: Command) -> Option<&'static str> {
        let reply = match command {
            Command::Start => replies::GREETING,
            Command::Learn => {
                state.status = Status::LearningQuestion;
                state.pending_question = None;
                replies::ASK_QUESTION
            }
            Command::Forget => {
                state.status = Status::Forgetting;
                state.pending_question = None;
                replies::ASK_FORGET
            }
            Command::Cancel => {
                state.reset();
                replies::CANCELED
            }
            Command::Keys | Command::Stats => return None,
        };

        tracing::debug!(command = %command, status = %state.status, "Command applied");
        Some(reply)
    }

    /// Processes a message and returns the reply text.
    pub async fn on_message(&self, state: &mut ConversationState, text: &str) -> String {
        let before = state.clone();

        match self.step(state, text).await {
            Ok(reply) => reply,
            Err(err) => {
                *state = before;
                Self::reply_for_error(&err).to_string()
            }
        }
    }

    async fn step(&self, state: &mut ConversationState, text: &str) -> BotResult<String> {
        match state.status {
            Status::Idle => self.answer(text).await,
            Status::LearningQuestion => self.take_question(state, text),
            Status::LearningAnswer => self.take_answer(state, text).await,
            Status::Forgetting => self.forget(state, text).await,
        }
    }

    async fn answer(&self, text: &str) -> BotResult<String> {
        let reply = match self.lookup.resolve(text).await? {
            Resolution::Answer(answer) => answer,
            Resolution::Unknown => replies::UNKNOWN.to_string(),
            Resolution::Desync { .. } => replies::DESYNC.to_string(),
        };
        Ok(reply)
    }

    fn take_question(&self, state: &mut ConversationState, text: &str) -> BotResult<String> {
        if is_pattern_key(text) {
            PatternCacheEntry::compile(text)?;
        }

        state.pending_question = Some(text.to_string());
        state.status = Status::LearningAnswer;
        Ok(replies::ASK_ANSWER.to_string())
    }

    async fn take_answer(&self, state: &mut ConversationState, text: &str) -> BotResult<String> {
        let Some(question) = state.pending_question.clone() else {
            // No question to attach the answer to; ask for one again.
            state.status = Status::LearningQuestion;
            return Ok(replies::ASK_QUESTION.to_string());
        };

        self.store.set(&question, text).await?;
        tracing::info!(key = %question, pattern = is_pattern_key(&question), "Learned answer");

        if is_pattern_key(&question) {
            if let Err(e) = self.cache.rebuild(self.store.as_ref()).await {
                // The answer is stored; the next lookup rebuilds instead.
                tracing::warn!(error = %e, "Cache rebuild after learning failed, invalidating");
                self.cache.invalidate().await;
            }
        }

        state.reset();
        Ok(replies::acknowledgement().to_string())
    }

    async fn forget(&self, state: &mut ConversationState, text: &str) -> BotResult<String> {
        let deleted = self.store.delete(text).await?;

        if deleted > 0 && is_pattern_key(text) {
            self.cache.invalidate().await;
        }

        tracing::info!(key = %text, deleted, "Forget requested");
        state.reset();

        Ok(if deleted == 0 {
            replies::NOT_FOUND.to_string()
        } else {
            replies::FORGOTTEN.to_string()
        })
    }

    fn reply_for_error(err: &BotError) -> &'static str {
        match err {
            BotError::InvalidPattern(e) => {
                tracing::debug!(error = %e, "Rejected pattern key");
                replies::INVALID_PATTERN
            }
            BotError::Template(e) => {
                tracing::warn!(error = %e, "Learned template cannot be rendered");
                replies::BROKEN_TEMPLATE
            }
            e if e.is_retryable() => {
                tracing::warn!(error = %e, "Knowledge store unavailable");
                replies::STORE_FAILURE
            }
            e => {
                tracing::error!(error = %e, "Message handling failed");
                replies::STORE_FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn machine() -> (Arc<MemoryStore>, Arc<PatternCache>, ConversationMachine) {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(PatternCache::new());
        let machine = ConversationMachine::new(store.clone(), cache.clone());
        (store, cache, machine)
    }

    #[tokio::test]
    async fn test_learn_then_recall() {
        let (store, _, machine) = machine();
        let mut state = ConversationState::new();

        assert_eq!(machine.on_command(&mut state, Command::Learn), Some(replies::ASK_QUESTION));
        assert_eq!(state.status, Status::LearningQuestion);

        assert_eq!(machine.on_message(&mut state, "ping").await, replies::ASK_ANSWER);
        assert_eq!(state.status, Status::LearningAnswer);
        assert_eq!(state.pending_question.as_deref(), Some("ping"));

        let ack = machine.on_message(&mut state, "pong").await;
        assert!(replies::ACKNOWLEDGEMENTS.contains(&ack.as_str()));
        assert_eq!(state, ConversationState::new());

        assert_eq!(store.get("ping").await.unwrap().as_deref(), Some("pong"));
        assert_eq!(machine.on_message(&mut state, "ping").await, "pong");
    }

    #[tokio::test]
    async fn test_invalid_pattern_stays_in_learning_question() {
        let (store, _, machine) = machine();
        let mut state = ConversationState::new();
        machine.on_command(&mut state, Command::Learn);

        assert_eq!(
            machine.on_message(&mut state, "^(unclosed").await,
            replies::INVALID_PATTERN
        );
        assert_eq!(state.status, Status::LearningQuestion);
        assert!(state.pending_question.is_none());
        assert!(store.is_empty().await);

        // The next message is still taken as the question.
        assert_eq!(machine.on_message(&mut state, "^ok").await, replies::ASK_ANSWER);
    }

    #[tokio::test]
    async fn test_learning_pattern_rebuilds_cache() {
        let (_, cache, machine) = machine();
        let mut state = ConversationState::new();

        // Build an empty cache first so a stale snapshot exists.
        assert_eq!(machine.on_message(&mut state, "my name is Bob").await, replies::UNKNOWN);

        machine.on_command(&mut state, Command::Learn);
        machine.on_message(&mut state, r"^my name is (?P<name>\w+)").await;
        machine.on_message(&mut state, "Hi {name}!").await;

        assert_eq!(cache.stats().await.entries, Some(1));
        assert_eq!(machine.on_message(&mut state, "my name is Bob").await, "Hi Bob!");
    }

    #[tokio::test]
    async fn test_relearning_overwrites() {
        let (_, _, machine) = machine();
        let mut state = ConversationState::new();

        for answer in ["first", "second"] {
            machine.on_command(&mut state, Command::Learn);
            machine.on_message(&mut state, "q").await;
            machine.on_message(&mut state, answer).await;
        }

        assert_eq!(machine.on_message(&mut state, "q").await, "second");
    }

    #[tokio::test]
    async fn test_cancel_discards_pending_question() {
        let (store, _, machine) = machine();
        let mut state = ConversationState::new();

        machine.on_command(&mut state, Command::Learn);
        machine.on_message(&mut state, "q").await;
        assert_eq!(machine.on_command(&mut state, Command::Cancel), Some(replies::CANCELED));

        assert_eq!(state, ConversationState::new());
        assert!(store.is_empty().await);
        assert_eq!(machine.on_message(&mut state, "q").await, replies::UNKNOWN);
    }

    #[tokio::test]
    async fn test_cancel_from_forgetting() {
        let (store, _, machine) = machine();
        store.set("keep", "1").await.unwrap();
        let mut state = ConversationState::new();

        machine.on_command(&mut state, Command::Forget);
        assert_eq!(state.status, Status::Forgetting);
        assert_eq!(machine.on_command(&mut state, Command::Cancel), Some(replies::CANCELED));
        assert_eq!(state, ConversationState::new());

        // The next message is a lookup, not a deletion.
        assert_eq!(machine.on_message(&mut state, "keep").await, "1");
        assert_eq!(store.get("keep").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_lookup_shares_the_machine_cache() {
        let (store, cache, machine) = machine();
        let mut state = ConversationState::new();
        machine.on_command(&mut state, Command::Learn);
        machine.on_message(&mut state, r"^(?P<x>\d+) again").await;
        machine.on_message(&mut state, "{x}!").await;

        assert_eq!(
            machine.lookup().resolve("3 again").await.unwrap(),
            Resolution::Answer("3!".to_string())
        );
        assert_eq!(cache.stats().await.entries, Some(1));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_forget() {
        let (store, _, machine) = machine();
        store.set("keep", "1").await.unwrap();
        store.set("drop", "2").await.unwrap();
        let mut state = ConversationState::new();

        machine.on_command(&mut state, Command::Forget);
        assert_eq!(machine.on_message(&mut state, "never learned").await, replies::NOT_FOUND);
        assert_eq!(state.status, Status::Idle);

        machine.on_command(&mut state, Command::Forget);
        assert_eq!(machine.on_message(&mut state, "drop").await, replies::FORGOTTEN);

        assert_eq!(machine.on_message(&mut state, "drop").await, replies::UNKNOWN);
        assert_eq!(store.get("keep").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_forgetting_pattern_invalidates_cache() {
        let (store, cache, machine) = machine();
        store.set("^hi", "hello").await.unwrap();
        let mut state = ConversationState::new();

        assert_eq!(machine.on_message(&mut state, "hi").await, "hello");

        machine.on_command(&mut state, Command::Forget);
        machine.on_message(&mut state, "^hi").await;
        assert!(!cache.is_built().await);

        // Rebuilt cleanly, no desync on the way.
        assert_eq!(machine.on_message(&mut state, "hi").await, replies::UNKNOWN);
    }

    #[tokio::test]
    async fn test_store_outage_keeps_state() {
        let (store, _, machine) = machine();
        let mut state = ConversationState::new();

        machine.on_command(&mut state, Command::Learn);
        machine.on_message(&mut state, "q").await;

        store.set_available(false);
        assert_eq!(machine.on_message(&mut state, "a").await, replies::STORE_FAILURE);
        assert_eq!(state.status, Status::LearningAnswer);
        assert_eq!(state.pending_question.as_deref(), Some("q"));

        store.set_available(true);
        let ack = machine.on_message(&mut state, "a").await;
        assert!(replies::ACKNOWLEDGEMENTS.contains(&ack.as_str()));
        assert_eq!(store.get("q").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_broken_template_is_soft() {
        let (store, _, machine) = machine();
        store.set(r"^hi (?P<who>\w+)", "Hello {nobody}").await.unwrap();
        let mut state = ConversationState::new();

        assert_eq!(machine.on_message(&mut state, "hi there").await, replies::BROKEN_TEMPLATE);
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn test_start_does_not_change_state() {
        let (_, _, machine) = machine();
        let mut state = ConversationState {
            status: Status::Forgetting,
            pending_question: None,
        };

        assert_eq!(machine.on_command(&mut state, Command::Start), Some(replies::GREETING));
        assert_eq!(state.status, Status::Forgetting);
        assert_eq!(machine.on_command(&mut state, Command::Keys), None);
    }
}
