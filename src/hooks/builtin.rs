//! Built-in hooks.
//!
//! - `LoggingHook`: logs lifecycle events
//! - `ActivityHook`: counts lifecycle events per conversation

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::types::ChatId;
use crate::BotResult;

use super::{Hook, HookContext, HookEvent};

// ═══════════════════════════════════════════════════════════════════════════
// LoggingHook
// ═══════════════════════════════════════════════════════════════════════════

/// Logs lifecycle events through `tracing`.
#[derive(Debug)]
pub struct LoggingHook {
    event: HookEvent,
}

impl LoggingHook {
    pub fn new(event: HookEvent) -> Self {
        Self { event }
    }
}

#[async_trait]
impl Hook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    fn event(&self) -> HookEvent {
        self.event
    }

    async fn execute(&self, context: &HookContext) -> BotResult<()> {
        match context {
            HookContext::ConversationStarted { chat_id, sender_id } => {
                tracing::info!(chat_id = %chat_id, sender_id = ?sender_id, "Conversation started");
            }
            HookContext::BotAdded { chat_id, chat_kind } => {
                tracing::info!(chat_id = %chat_id, chat_kind = ?chat_kind, "Added to conversation");
            }
            HookContext::BotRemoved { chat_id, chat_kind } => {
                tracing::info!(chat_id = %chat_id, chat_kind = ?chat_kind, "Removed from conversation");
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ActivityHook
// ═══════════════════════════════════════════════════════════════════════════

/// Lifecycle counters of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCounters {
    pub starts: u64,
    pub joins: u64,
    pub leaves: u64,
    pub last_seen: DateTime<Utc>,
}

impl ActivityCounters {
    fn new() -> Self {
        Self {
            starts: 0,
            joins: 0,
            leaves: 0,
            last_seen: Utc::now(),
        }
    }
}

/// Shared per-conversation activity record.
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    inner: Arc<RwLock<BTreeMap<ChatId, ActivityCounters>>>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts `event` for `chat_id`.
    pub async fn record(&self, chat_id: ChatId, event: HookEvent) {
        let mut inner = self.inner.write().await;
        let counters = inner.entry(chat_id).or_insert_with(ActivityCounters::new);
        match event {
            HookEvent::ConversationStarted => counters.starts += 1,
            HookEvent::BotAdded => counters.joins += 1,
            HookEvent::BotRemoved => counters.leaves += 1,
        }
        counters.last_seen = Utc::now();
    }

    /// Counters of one conversation.
    pub async fn get(&self, chat_id: ChatId) -> Option<ActivityCounters> {
        self.inner.read().await.get(&chat_id).cloned()
    }

    /// All counters ordered by conversation id.
    pub async fn snapshot(&self) -> Vec<(ChatId, ActivityCounters)> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(id, c)| (*id, c.clone()))
            .collect()
    }

    /// One line per conversation, for the admin read-out.
    pub async fn render(&self) -> Option<String> {
        let snapshot = self.snapshot().await;
        if snapshot.is_empty() {
            return None;
        }

        let lines: Vec<String> = snapshot
            .iter()
            .map(|(id, c)| {
                format!(
                    "{}: started {}, joined {}, left {} (last {})",
                    id,
                    c.starts,
                    c.joins,
                    c.leaves,
                    c.last_seen.format("%Y-%m-%d %H:%M")
                )
            })
            .collect();
        Some(lines.join("\n"))
    }
}

/// Records lifecycle events in an [`ActivityLedger`].
#[derive(Debug)]
pub struct ActivityHook {
    event: HookEvent,
    ledger: ActivityLedger,
}

impl ActivityHook {
    pub fn new(event: HookEvent, ledger: ActivityLedger) -> Self {
        Self { event, ledger }
    }
}

#[async_trait]
impl Hook for ActivityHook {
    fn name(&self) -> &str {
        "activity"
    }

    fn event(&self) -> HookEvent {
        self.event
    }

    async fn execute(&self, context: &HookContext) -> BotResult<()> {
        self.ledger.record(context.chat_id(), context.event()).await;
        Ok(())
    }
}
