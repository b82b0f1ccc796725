//! Shared bot context handed to every command group

use crate::domain::traits::Bot;
use crate::extensions::loader::ExtensionLoader;
use crate::infrastructure::config::Config;
use std::sync::{Arc, Weak};

/// The running bot instance as seen by command groups
///
/// Constructed once at startup and passed to every group factory. The
/// loader is held weakly so that groups (which the loader's registry owns)
/// never keep the extension host alive through a reference cycle.
pub struct BotContext {
    pub config: Arc<Config>,
    pub adapter: Arc<dyn Bot>,
    loader: Weak<ExtensionLoader>,
}

impl BotContext {
    pub fn new(
        config: Arc<Config>,
        adapter: Arc<dyn Bot>,
        loader: Weak<ExtensionLoader>,
    ) -> Self {
        Self {
            config,
            adapter,
            loader,
        }
    }

    /// The extension loader, if the host is still alive
    pub fn loader(&self) -> Option<Arc<ExtensionLoader>> {
        self.loader.upgrade()
    }
}
