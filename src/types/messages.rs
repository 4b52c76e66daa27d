//! Inbound events and outbound replies exchanged with the messaging transport.

use serde::{Deserialize, Serialize};

/// Identifier of a conversation (a private chat or a group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// One-to-one conversation with the bot.
    #[default]
    Private,
    /// Multi-party conversation.
    Group,
    /// Large multi-party conversation.
    Supergroup,
}

impl ChatKind {
    /// Private chats skip wake-word addressing.
    pub fn is_private(&self) -> bool {
        matches!(self, ChatKind::Private)
    }
}

/// Event delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Plain text message.
    Message {
        chat_id: ChatId,
        #[serde(default)]
        chat_kind: ChatKind,
        #[serde(default)]
        sender_id: Option<i64>,
        text: String,
    },

    /// Command such as `/learn`. `name` excludes the slash.
    Command {
        chat_id: ChatId,
        #[serde(default)]
        chat_kind: ChatKind,
        #[serde(default)]
        sender_id: Option<i64>,
        name: String,
    },

    /// The bot was added to a conversation.
    Joined {
        chat_id: ChatId,
        #[serde(default)]
        chat_kind: ChatKind,
    },

    /// The bot was removed from a conversation.
    Left {
        chat_id: ChatId,
        #[serde(default)]
        chat_kind: ChatKind,
    },
}

impl InboundEvent {
    /// Creates a private-chat text message.
    pub fn private(chat_id: i64, text: impl Into<String>) -> Self {
        Self::Message {
            chat_id: ChatId(chat_id),
            chat_kind: ChatKind::Private,
            sender_id: Some(chat_id),
            text: text.into(),
        }
    }

    /// Creates a group text message.
    pub fn group(chat_id: i64, text: impl Into<String>) -> Self {
        Self::Message {
            chat_id: ChatId(chat_id),
            chat_kind: ChatKind::Group,
            sender_id: None,
            text: text.into(),
        }
    }

    /// Creates a command in a private chat.
    pub fn command(chat_id: i64, name: impl Into<String>) -> Self {
        Self::Command {
            chat_id: ChatId(chat_id),
            chat_kind: ChatKind::Private,
            sender_id: Some(chat_id),
            name: name.into(),
        }
    }

    /// Sets the sender of a message or command.
    pub fn from_sender(mut self, id: i64) -> Self {
        match &mut self {
            Self::Message { sender_id, .. } | Self::Command { sender_id, .. } => {
                *sender_id = Some(id);
            }
            Self::Joined { .. } | Self::Left { .. } => {}
        }
        self
    }

    /// Conversation the event belongs to.
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Message { chat_id, .. }
            | Self::Command { chat_id, .. }
            | Self::Joined { chat_id, .. }
            | Self::Left { chat_id, .. } => *chat_id,
        }
    }
}

/// Reply sent back through the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub chat_id: ChatId,
    pub text: String,
}

impl OutboundReply {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// Commands recognised by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Learn,
    Forget,
    Cancel,
    /// Admin only: list every key.
    Keys,
    /// Admin only: activity counters.
    Stats,
}

impl Command {
    /// Parses a command name, accepting an optional leading `/` and a
    /// trailing `@botname` suffix. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/');
        let name = name.split('@').next().unwrap_or(name);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "learn" => Some(Command::Learn),
            "forget" => Some(Command::Forget),
            "cancel" => Some(Command::Cancel),
            "keys" => Some(Command::Keys),
            "stats" => Some(Command::Stats),
            _ => None,
        }
    }

    /// Whether the command is restricted to the admin identity.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, Command::Keys | Command::Stats)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Learn => write!(f, "learn"),
            Command::Forget => write!(f, "forget"),
            Command::Cancel => write!(f, "cancel"),
            Command::Keys => write!(f, "keys"),
            Command::Stats => write!(f, "stats"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("learn"), Some(Command::Learn));
        assert_eq!(Command::parse("/forget"), Some(Command::Forget));
        assert_eq!(Command::parse("/cancel@parley_bot"), Some(Command::Cancel));
        assert_eq!(Command::parse("START"), Some(Command::Start));
        assert_eq!(Command::parse("shrug"), None);
    }

    #[test]
    fn test_inbound_event_wire_format() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"message","chat_id":5,"chat_kind":"group","text":"hey hi"}"#,
        )
        .unwrap();

        assert_eq!(event, InboundEvent::group(5, "hey hi"));
    }

    #[test]
    fn test_inbound_event_defaults_to_private() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type":"command","chat_id":3,"name":"learn"}"#).unwrap();

        match event {
            InboundEvent::Command {
                chat_kind,
                sender_id,
                ..
            } => {
                assert_eq!(chat_kind, ChatKind::Private);
                assert!(sender_id.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_outbound_reply_serializes_flat() {
        let reply = OutboundReply::new(ChatId(9), "OK");
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"chat_id":9,"text":"OK"}"#);
    }
}
