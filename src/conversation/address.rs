//! Wake-word addressing.
//!
//! In a group the bot only reacts to messages that start with one of its
//! wake-words; in a private chat it reacts to everything.

use crate::types::ChatKind;

/// Configured wake-words, matched case-sensitively in order.
#[derive(Debug, Clone)]
pub struct WakeWords {
    words: Vec<String>,
}

impl WakeWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words
            .into_iter()
            .map(|w| w.into().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Text to dispatch for `text`, or `None` if the bot was not addressed.
    ///
    /// A wake-word followed by whitespace is stripped together with that
    /// whitespace. A message that is only a wake-word is dispatched as is.
    ///
    /// Private chats dispatch every non-empty message; when stripping would
    /// leave nothing, the original text goes through unchanged. In groups a
    /// message with nothing after the wake-word is dropped.
    pub fn resolve(&self, kind: ChatKind, text: &str) -> Option<String> {
        if kind.is_private() {
            if text.is_empty() {
                return None;
            }
            let resolved = match self.strip(text) {
                Some(rest) if !rest.trim().is_empty() => rest,
                _ => text,
            };
            return Some(resolved.to_string());
        }

        let resolved = self.strip(text)?;
        if resolved.trim().is_empty() {
            None
        } else {
            Some(resolved.to_string())
        }
    }

    fn strip<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.words.iter().find_map(|word| {
            let rest = text.strip_prefix(word.as_str())?;
            if rest.is_empty() {
                Some(text)
            } else if rest.starts_with(char::is_whitespace) {
                Some(rest.trim_start())
            } else {
                None
            }
        })
    }
}

impl Default for WakeWords {
    fn default() -> Self {
        Self::new(["hey", "Hey", "HEY"])
    }
}
