//! Command group trait and reply type

use crate::application::errors::CommandError;
use crate::domain::entities::{CommandSpec, Message};
use async_trait::async_trait;
use std::path::PathBuf;

/// A cohesive bundle of related commands, instantiated once per load
///
/// Groups are constructed by their extension's factory with a shared
/// [`super::BotContext`] and live in the [`super::GroupRegistry`] until
/// their extension is unloaded. The registrar never calls `on_ready`
/// itself; the host fires it after registration completes.
#[async_trait]
pub trait CommandGroup: Send + Sync {
    /// Stable identity, used as the registration key
    fn name(&self) -> &str;

    /// Commands this group declares; may be empty for listener-only groups
    fn commands(&self) -> Vec<CommandSpec> {
        Vec::new()
    }

    /// Lifecycle hook, invoked by the host once the group is registered
    async fn on_ready(&self) {}

    /// Handle one of this group's declared commands
    async fn handle(
        &self,
        command: &str,
        args: &[String],
        message: &Message,
    ) -> Result<Reply, CommandError> {
        let _ = (args, message);
        Err(CommandError::NotFound(command.to_string()))
    }

    /// Release background resources; invoked when the group is removed
    fn cleanup(&self) {}
}

/// Outgoing reply produced by a command handler
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub photo: Option<PathBuf>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: impl Into<PathBuf>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}
