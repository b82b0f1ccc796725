//! Moderation extension

use crate::application::errors::ExtensionError;
use crate::extensions::context::BotContext;
use crate::extensions::group::CommandGroup;
use crate::extensions::manifest::{ExtensionDescriptor, GroupFactory};
use async_trait::async_trait;
use std::sync::Arc;

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor {
        name: "moderation",
        description: "Moderation tools",
        setup,
    }
}

fn setup(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![GroupFactory::new("moderation", |ctx| {
        Ok(Arc::new(Moderation::new(ctx.clone())))
    })])
}

/// Listener-only group; declares no commands
pub struct Moderation {
    ctx: Arc<BotContext>,
}

impl Moderation {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CommandGroup for Moderation {
    fn name(&self) -> &str {
        "moderation"
    }

    async fn on_ready(&self) {
        tracing::info!(
            "Group 'moderation' ready on {}",
            self.ctx.adapter.bot_info().username
        );
    }
}
