//! Lifecycle hooks.
//!
//! Hooks observe conversation lifecycle events reported by the transport:
//!
//! - `conversation_started`: a user sent `/start`
//! - `bot_added`: the bot joined a conversation
//! - `bot_removed`: the bot left or was removed from a conversation

mod builtin;

pub use builtin::{ActivityCounters, ActivityHook, ActivityLedger, LoggingHook};

use async_trait::async_trait;

use crate::types::{ChatId, ChatKind};
use crate::BotResult;

// ═══════════════════════════════════════════════════════════════════════════
// Event types
// ═══════════════════════════════════════════════════════════════════════════

/// Event that triggers a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// `/start` received.
    ConversationStarted,

    /// Bot added to a conversation.
    BotAdded,

    /// Bot removed from a conversation.
    BotRemoved,
}

impl HookEvent {
    pub const ALL: [HookEvent; 3] = [
        HookEvent::ConversationStarted,
        HookEvent::BotAdded,
        HookEvent::BotRemoved,
    ];
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::ConversationStarted => write!(f, "conversation_started"),
            HookEvent::BotAdded => write!(f, "bot_added"),
            HookEvent::BotRemoved => write!(f, "bot_removed"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Hook context
// ═══════════════════════════════════════════════════════════════════════════

/// Context passed to hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookContext {
    ConversationStarted {
        chat_id: ChatId,
        sender_id: Option<i64>,
    },

    BotAdded {
        chat_id: ChatId,
        chat_kind: ChatKind,
    },

    BotRemoved {
        chat_id: ChatId,
        chat_kind: ChatKind,
    },
}

impl HookContext {
    /// Event corresponding to the context.
    pub fn event(&self) -> HookEvent {
        match self {
            HookContext::ConversationStarted { .. } => HookEvent::ConversationStarted,
            HookContext::BotAdded { .. } => HookEvent::BotAdded,
            HookContext::BotRemoved { .. } => HookEvent::BotRemoved,
        }
    }

    /// Conversation the event happened in.
    pub fn chat_id(&self) -> ChatId {
        match self {
            HookContext::ConversationStarted { chat_id, .. }
            | HookContext::BotAdded { chat_id, .. }
            | HookContext::BotRemoved { chat_id, .. } => *chat_id,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Hook trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for lifecycle hooks.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Hook name.
    fn name(&self) -> &str;

    /// Event that triggers this hook.
    fn event(&self) -> HookEvent;

    /// Runs the hook.
    async fn execute(&self, context: &HookContext) -> BotResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Hook system
// ═══════════════════════════════════════════════════════════════════════════

/// Hook registry.
pub struct HookSystem {
    on_started: Vec<Box<dyn Hook>>,
    on_added: Vec<Box<dyn Hook>>,
    on_removed: Vec<Box<dyn Hook>>,
}

impl HookSystem {
    /// Creates an empty hook system.
    pub fn new() -> Self {
        Self {
            on_started: Vec::new(),
            on_added: Vec::new(),
            on_removed: Vec::new(),
        }
    }

    /// Creates a system with the default hooks (logging).
    pub fn with_defaults() -> Self {
        let mut system = Self::new();
        for event in HookEvent::ALL {
            system.register(Box::new(LoggingHook::new(event)));
        }
        system
    }

    /// Default hooks plus activity counting into `ledger`.
    pub fn with_activity(ledger: ActivityLedger) -> Self {
        let mut system = Self::with_defaults();
        for event in HookEvent::ALL {
            system.register(Box::new(ActivityHook::new(event, ledger.clone())));
        }
        system
    }

    /// Registers a hook.
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        let event = hook.event();
        tracing::debug!(
            hook_name = hook.name(),
            event = %event,
            "Registering hook"
        );

        match event {
            HookEvent::ConversationStarted => self.on_started.push(hook),
            HookEvent::BotAdded => self.on_added.push(hook),
            HookEvent::BotRemoved => self.on_removed.push(hook),
        }
    }

    /// Runs every hook registered for the context's event, in order.
    pub async fn run(&self, context: &HookContext) -> BotResult<()> {
        let hooks = match context.event() {
            HookEvent::ConversationStarted => &self.on_started,
            HookEvent::BotAdded => &self.on_added,
            HookEvent::BotRemoved => &self.on_removed,
        };

        for hook in hooks {
            hook.execute(context).await?;
        }

        Ok(())
    }

    /// Total number of registered hooks.
    pub fn count(&self) -> usize {
        self.on_started.len() + self.on_added.len() + self.on_removed.len()
    }

    /// Number of hooks for one event.
    pub fn count_for_event(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::ConversationStarted => self.on_started.len(),
            HookEvent::BotAdded => self.on_added.len(),
            HookEvent::BotRemoved => self.on_removed.len(),
        }
    }
}

impl Default for HookSystem {
    fn default() -> Self {
        Self::new()
    }
}
