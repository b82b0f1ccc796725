//! Message parser - Parses raw text into structured messages

use crate::domain::entities::{Content, Message, User};

/// Parses incoming text into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message; `/` is accepted alongside the configured prefix
    pub fn parse(
        &self,
        chat_id: impl Into<String>,
        text: impl Into<String>,
        sender: Option<User>,
    ) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        let stripped = text
            .strip_prefix(&self.command_prefix)
            .or_else(|| text.strip_prefix('/'));

        match stripped {
            Some(rest) if !rest.trim().is_empty() => {
                let mut parts = rest.split_whitespace();
                let name = parts.next().unwrap_or_default().to_string();
                let args: Vec<String> = parts.map(|s| s.to_string()).collect();
                Message::from_command(chat_id, name, args).with_sender_opt(sender)
            }
            _ => Message::new(chat_id, Content::Text(text)).with_sender_opt(sender),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_commands_with_args() {
        let parser = MessageParser::new("!");
        let msg = parser.parse("chat", "!jisho word 鳥", None);
        assert_eq!(
            msg.content,
            Content::Command {
                name: "jisho".to_string(),
                args: vec!["word".to_string(), "鳥".to_string()],
            }
        );
    }

    #[test]
    fn slash_prefix_is_always_accepted() {
        let parser = MessageParser::new("!");
        let msg = parser.parse("chat", "/kotd", None);
        assert!(msg.content.is_command());
    }

    #[test]
    fn plain_text_stays_text() {
        let parser = MessageParser::new("!");
        let msg = parser.parse("chat", "hello there", None);
        assert_eq!(msg.content.text(), Some("hello there"));
    }

    #[test]
    fn bare_prefix_is_not_a_command() {
        let parser = MessageParser::new("!");
        let msg = parser.parse("chat", "!", None);
        assert!(!msg.content.is_command());
    }
}
