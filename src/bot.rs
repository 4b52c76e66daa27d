//! Bot facade: routes transport events to conversations.
//!
//! `Bot` is shared behind an `Arc` by every transport task. Conversations
//! only contend on their own lock.

use std::sync::Arc;

use tracing::Instrument;

use crate::cache::{PatternCache, PatternCacheStats};
use crate::conversation::{
    replies, ConversationMachine, ConversationRegistry, ConversationState, WakeWords,
};
use crate::hooks::{ActivityLedger, HookContext, HookSystem};
use crate::store::KnowledgeStore;
use crate::types::config::BotConfig;
use crate::types::{ChatId, Command, InboundEvent, OutboundReply};

/// Teachable responder.
pub struct Bot {
    store: Arc<dyn KnowledgeStore>,
    cache: Arc<PatternCache>,
    machine: ConversationMachine,
    conversations: ConversationRegistry,
    wake_words: WakeWords,
    hooks: HookSystem,
    activity: ActivityLedger,
    admin_id: Option<i64>,
}

impl Bot {
    /// Creates a bot over `store` with logging and activity hooks.
    pub fn new(store: Arc<dyn KnowledgeStore>, config: &BotConfig) -> Self {
        let cache = Arc::new(PatternCache::new());
        let activity = ActivityLedger::new();

        Self {
            machine: ConversationMachine::new(store.clone(), cache.clone()),
            store,
            cache,
            conversations: ConversationRegistry::new(),
            wake_words: WakeWords::new(config.wake_words.iter().cloned()),
            hooks: HookSystem::with_activity(activity.clone()),
            activity,
            admin_id: config.admin_id,
        }
    }

    /// Replaces the hook system.
    pub fn with_hooks(mut self, hooks: HookSystem) -> Self {
        self.hooks = hooks;
        self
    }

    /// Handles one inbound event and returns the reply to send, if any.
    pub async fn handle(&self, event: InboundEvent) -> Option<OutboundReply> {
        let span = tracing::debug_span!(
            "event",
            id = %uuid::Uuid::new_v4(),
            chat_id = %event.chat_id()
        );

        async move {
            match event {
                InboundEvent::Message {
                    chat_id,
                    chat_kind,
                    text,
                    ..
                } => {
                    let Some(text) = self.wake_words.resolve(chat_kind, &text) else {
                        tracing::trace!("Message not addressed to the bot");
                        return None;
                    };
                    let reply = self.on_text(chat_id, &text).await;
                    Some(OutboundReply::new(chat_id, reply))
                }
                InboundEvent::Command {
                    chat_id,
                    sender_id,
                    name,
                    ..
                } => {
                    let Some(command) = Command::parse(&name) else {
                        tracing::debug!(command = %name, "Ignoring unknown command");
                        return None;
                    };
                    let reply = self.on_command(chat_id, sender_id, command).await?;
                    Some(OutboundReply::new(chat_id, reply))
                }
                InboundEvent::Joined { chat_id, chat_kind } => {
                    self.run_hooks(HookContext::BotAdded { chat_id, chat_kind })
                        .await;
                    None
                }
                InboundEvent::Left { chat_id, chat_kind } => {
                    self.run_hooks(HookContext::BotRemoved { chat_id, chat_kind })
                        .await;
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn on_text(&self, chat_id: ChatId, text: &str) -> String {
        let handle = self.conversations.entry(chat_id).await;
        let mut state = handle.lock().await;

        let status = state.status;
        let reply = self.machine.on_message(&mut state, text).await;
        tracing::debug!(from = %status, to = %state.status, "Message handled");
        reply
    }

    async fn on_command(
        &self,
        chat_id: ChatId,
        sender_id: Option<i64>,
        command: Command,
    ) -> Option<String> {
        if command.is_admin_only() {
            if self.admin_id.is_none() || sender_id != self.admin_id {
                tracing::debug!(command = %command, sender_id = ?sender_id, "Admin command from non-admin");
                return None;
            }
            return Some(self.admin_readout(command).await);
        }

        if command == Command::Start {
            self.run_hooks(HookContext::ConversationStarted { chat_id, sender_id })
                .await;
        }

        let handle = self.conversations.entry(chat_id).await;
        let mut state = handle.lock().await;
        self.machine
            .on_command(&mut state, command)
            .map(str::to_string)
    }

    async fn admin_readout(&self, command: Command) -> String {
        match command {
            Command::Keys => match self.store.keys().await {
                Ok(keys) if keys.is_empty() => replies::NO_KEYS.to_string(),
                Ok(keys) => keys.join("\n"),
                Err(e) => {
                    tracing::warn!(error = %e, "Listing keys failed");
                    replies::STORE_FAILURE.to_string()
                }
            },
            _ => self
                .activity
                .render()
                .await
                .unwrap_or_else(|| replies::NO_ACTIVITY.to_string()),
        }
    }

    async fn run_hooks(&self, context: HookContext) {
        if let Err(e) = self.hooks.run(&context).await {
            tracing::warn!(event = %context.event(), error = %e, "Hook failed");
        }
    }

    /// Copy of a conversation's state, if it has been seen.
    pub async fn conversation(&self, chat_id: ChatId) -> Option<ConversationState> {
        self.conversations.get(chat_id).await
    }

    /// Pattern cache statistics.
    pub async fn cache_stats(&self) -> PatternCacheStats {
        self.cache.stats().await
    }

    /// Lifecycle counters.
    pub fn activity(&self) -> &ActivityLedger {
        &self.activity
    }

    /// Underlying knowledge store.
    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }
}
