use crate::application::errors::BotError;
use async_trait::async_trait;
use std::path::Path;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Send a text message to a chat
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// Send a local image file with a caption to a chat
    async fn send_photo(
        &self,
        chat_id: &str,
        caption: &str,
        photo: &Path,
    ) -> Result<String, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
