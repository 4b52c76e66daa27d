//! Answer templates for pattern keys.
//!
//! `{name}` is replaced by the capture called `name`; `{{` and `}}` stand for
//! literal braces. Anything else between braces is an error.

use std::collections::HashMap;

use thiserror::Error;

/// Why a template could not be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("placeholder '{0}' has no matching capture group")]
    UnknownPlaceholder(String),

    #[error("placeholder '{0}' is not a capture name")]
    InvalidPlaceholder(String),

    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),

    #[error("single '}}' at byte {0}")]
    StrayBrace(usize),
}

/// Substitutes `captures` into `template`.
pub fn render(template: &str, captures: &HashMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::Unclosed(pos));
                }
                if !is_capture_name(&name) {
                    return Err(TemplateError::InvalidPlaceholder(name));
                }

                match captures.get(&name) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::UnknownPlaceholder(name)),
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::StrayBrace(pos));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Group names accepted by the regex crate: a letter or `_`, then word chars.
fn is_capture_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
