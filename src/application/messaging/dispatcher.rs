//! Message dispatcher - routes commands to registered groups

use crate::application::messaging::middleware::{Middleware, Rejection};
use crate::application::messaging::parser::MessageParser;
use crate::domain::entities::{Content, Message};
use crate::extensions::context::BotContext;
use crate::extensions::group::Reply;
use crate::extensions::registry::GroupRegistry;
use std::sync::Arc;

/// Routes inbound messages through middleware to command group handlers
pub struct MessageDispatcher {
    parser: MessageParser,
    middleware: Vec<Arc<dyn Middleware>>,
    ctx: Arc<BotContext>,
    registry: Arc<GroupRegistry>,
}

impl MessageDispatcher {
    pub fn new(ctx: Arc<BotContext>, registry: Arc<GroupRegistry>) -> Self {
        let parser = MessageParser::new(&ctx.config.bot.prefix);
        Self {
            parser,
            middleware: Vec::new(),
            ctx,
            registry,
        }
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Process a message; `None` means nothing should be sent back
    pub async fn dispatch(&self, message: Message) -> Option<Reply> {
        for middleware in &self.middleware {
            match middleware.check(&message) {
                Ok(()) => {}
                Err(Rejection::RateLimited { .. }) => {
                    return Some(Reply::text("Rate limited. Please try again later."));
                }
                Err(Rejection::Drop) => return None,
            }
        }

        let Content::Command { name, args } = &message.content else {
            return None;
        };

        if name.eq_ignore_ascii_case("help") {
            return Some(Reply::text(self.help_text()));
        }

        let Some((group, spec)) = self.registry.resolve_command(name) else {
            return Some(Reply::text(format!("Unknown command: {}", name)));
        };

        if spec.owner_only {
            let is_owner = message
                .sender_id()
                .map(|id| self.ctx.config.is_owner(id))
                .unwrap_or(false);
            if !is_owner {
                return Some(Reply::text("This command is restricted to the bot owner."));
            }
        }

        // The registry guard was dropped inside resolve_command; awaiting
        // the handler here holds only the cloned Arc.
        match group.handle(&spec.name, args, &message).await {
            Ok(reply) => Some(reply),
            Err(e) => Some(Reply::text(format!("Error: {}", e))),
        }
    }

    /// Render a help listing from the registered command specs
    pub fn help_text(&self) -> String {
        let specs = self.registry.command_specs();
        if specs.is_empty() {
            return "No commands available.".to_string();
        }

        let mut help = "Available commands:\n".to_string();
        for spec in specs {
            help.push_str(&format!(
                "  {}{} - {}\n",
                self.parser.prefix(),
                spec.name,
                spec.description.as_deref().unwrap_or("")
            ));
        }
        help
    }
}
