//! Extension manifest: the explicit list of loadable extensions
//!
//! Every extension ships a compiled-in descriptor; there is no directory
//! scanning or runtime discovery. The manifest preserves declaration order,
//! though load order between independent extensions carries no guarantee.

use crate::application::errors::ExtensionError;
use crate::extensions::context::BotContext;
use crate::extensions::group::CommandGroup;
use crate::extensions::{admin, dictionary, kotd, moderation};
use std::sync::Arc;

/// Registration entry point of an extension
pub type SetupFn = fn(&Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError>;

type BuildFn =
    Box<dyn FnOnce(&Arc<BotContext>) -> Result<Arc<dyn CommandGroup>, ExtensionError> + Send>;

/// A named constructor for one command group
///
/// The name is known before construction so the registrar can honor
/// exclusion lists and detect duplicates without building the group.
pub struct GroupFactory {
    name: &'static str,
    build: BuildFn,
}

impl GroupFactory {
    pub fn new(
        name: &'static str,
        build: impl FnOnce(&Arc<BotContext>) -> Result<Arc<dyn CommandGroup>, ExtensionError>
            + Send
            + 'static,
    ) -> Self {
        Self {
            name,
            build: Box::new(build),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Construct the group, consuming the factory
    pub fn build(self, ctx: &Arc<BotContext>) -> Result<Arc<dyn CommandGroup>, ExtensionError> {
        (self.build)(ctx)
    }
}

/// Metadata describing a loadable extension
#[derive(Clone, Copy)]
pub struct ExtensionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub setup: SetupFn,
}

/// Ordered collection of extension descriptors
pub struct ExtensionManifest {
    entries: Vec<ExtensionDescriptor>,
}

impl ExtensionManifest {
    pub fn new(entries: Vec<ExtensionDescriptor>) -> Self {
        Self { entries }
    }

    /// All extensions this binary ships
    pub fn builtin() -> Self {
        Self::new(vec![
            dictionary::descriptor(),
            kotd::descriptor(),
            moderation::descriptor(),
            admin::descriptor(),
        ])
    }

    /// Keep only the extensions named in `enabled`, preserving manifest order
    pub fn filtered(self, enabled: &[String]) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .filter(|d| enabled.iter().any(|name| name == d.name))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.entries.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
