//! Extension registry: compiled-in extensions contributing command groups
//!
//! An extension is described by an [`ExtensionDescriptor`] in an explicit
//! manifest. Its `setup` entry point returns one named [`GroupFactory`] per
//! command group; the [`GroupRegistry`] constructs and registers each group,
//! and the [`ExtensionLoader`] drives load/unload/reload with per-extension
//! failure isolation. There is no runtime discovery: everything loadable is
//! declared in the manifest and filtered by config.

pub mod admin;
pub mod context;
pub mod dictionary;
pub mod group;
pub mod kotd;
pub mod loader;
pub mod manifest;
pub mod moderation;
pub mod registry;

pub use context::BotContext;
pub use group::{CommandGroup, Reply};
pub use loader::{ExtensionLoader, LoadOutcome};
pub use manifest::{ExtensionDescriptor, ExtensionManifest, GroupFactory};
pub use registry::GroupRegistry;
