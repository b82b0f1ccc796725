//! Admin extension: owner-only load/unload/reload of extensions

use crate::application::errors::{CommandError, ExtensionError};
use crate::domain::entities::{CommandSpec, Message};
use crate::extensions::context::BotContext;
use crate::extensions::group::{CommandGroup, Reply};
use crate::extensions::loader::{ExtensionLoader, LoadOutcome};
use crate::extensions::manifest::{ExtensionDescriptor, GroupFactory};
use async_trait::async_trait;
use std::sync::Arc;

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor {
        name: "admin",
        description: "Extension management commands",
        setup,
    }
}

fn setup(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![GroupFactory::new("admin", |ctx| {
        Ok(Arc::new(Admin::new(ctx.clone())))
    })])
}

/// Owner-only extension management
pub struct Admin {
    ctx: Arc<BotContext>,
}

impl Admin {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    fn loader(&self) -> Result<Arc<ExtensionLoader>, CommandError> {
        self.ctx
            .loader()
            .ok_or_else(|| CommandError::ExecutionFailed("extension host unavailable".to_string()))
    }

    /// Fire the ready hook on the groups a load just produced
    async fn ready_new_groups(&self, loader: &ExtensionLoader, outcome: &LoadOutcome) {
        for name in &outcome.groups {
            if let Some(group) = loader.registry().get(name) {
                group.on_ready().await;
            }
        }
    }

    fn describe(verb: &str, outcome: &LoadOutcome) -> String {
        let mut text = format!("Successfully {} extension '{}'", verb, outcome.extension);
        if !outcome.failures.is_empty() {
            let reasons: Vec<String> = outcome.failures.iter().map(|f| f.to_string()).collect();
            text.push_str(&format!("\nWarnings:\n{}", reasons.join("\n")));
        }
        text
    }
}

#[async_trait]
impl CommandGroup for Admin {
    fn name(&self) -> &str {
        "admin"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("load")
                .with_description("Load an extension by name")
                .with_usage("load <extension>")
                .owner_only(),
            CommandSpec::new("unload")
                .with_description("Unload an extension by name")
                .with_usage("unload <extension>")
                .owner_only(),
            CommandSpec::new("reload")
                .with_description("Reload an extension by name")
                .with_usage("reload <extension>")
                .owner_only(),
            CommandSpec::new("extensions")
                .with_description("List loaded extensions")
                .owner_only(),
        ]
    }

    async fn on_ready(&self) {
        tracing::info!(
            "Group 'admin' ready on {}",
            self.ctx.adapter.bot_info().username
        );
    }

    async fn handle(
        &self,
        command: &str,
        args: &[String],
        _message: &Message,
    ) -> Result<Reply, CommandError> {
        let loader = self.loader()?;

        if command == "extensions" {
            let loaded = loader.loaded();
            if loaded.is_empty() {
                return Ok(Reply::text("No extensions loaded."));
            }
            return Ok(Reply::text(format!("Loaded: {}", loaded.join(", "))));
        }

        let Some(name) = args.first() else {
            return Err(CommandError::InvalidArgs(format!(
                "usage: {} <extension>",
                command
            )));
        };

        match command {
            "load" => {
                let outcome = loader
                    .load(name, &self.ctx)
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                self.ready_new_groups(&loader, &outcome).await;
                Ok(Reply::text(Self::describe("loaded", &outcome)))
            }
            "unload" => {
                loader
                    .unload(name)
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                Ok(Reply::text(format!(
                    "Successfully unloaded extension '{}'",
                    name
                )))
            }
            "reload" => {
                let outcome = loader
                    .reload(name, &self.ctx)
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                self.ready_new_groups(&loader, &outcome).await;
                Ok(Reply::text(Self::describe("reloaded", &outcome)))
            }
            other => Err(CommandError::NotFound(other.to_string())),
        }
    }
}
