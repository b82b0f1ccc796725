//! Extension loader: load, unload and reload extensions by name
//!
//! Loading is one extension at a time. During a startup batch every failure
//! is caught at the per-extension boundary, logged and skipped; under an
//! explicit admin command the error propagates to the command handler,
//! which reports it back to the invoker.

use crate::application::errors::ExtensionError;
use crate::extensions::context::BotContext;
use crate::extensions::manifest::ExtensionManifest;
use crate::extensions::registry::GroupRegistry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Result of loading one extension
///
/// `failures` carries group-level construction errors; per the
/// partial-success policy they do not prevent sibling groups of the same
/// extension from registering.
#[derive(Debug)]
pub struct LoadOutcome {
    pub extension: String,
    pub groups: Vec<String>,
    pub failures: Vec<ExtensionError>,
}

/// Drives extension lifecycle against the manifest and the registry
pub struct ExtensionLoader {
    manifest: ExtensionManifest,
    registry: Arc<GroupRegistry>,
    /// Extension name -> names of the groups it registered
    loaded: RwLock<HashMap<String, Vec<String>>>,
}

impl ExtensionLoader {
    pub fn new(manifest: ExtensionManifest, registry: Arc<GroupRegistry>) -> Self {
        Self {
            manifest,
            registry,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<GroupRegistry> {
        &self.registry
    }

    /// Load every manifest entry, isolating failures per extension
    ///
    /// Never aborts early: a broken extension is logged and the batch
    /// continues with the next one.
    pub fn load_all(&self, ctx: &Arc<BotContext>) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();

        for name in self.manifest.names() {
            match self.load(name, ctx) {
                Ok(outcome) => {
                    for failure in &outcome.failures {
                        tracing::error!("Extension '{}': {}", name, failure);
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    tracing::error!("Failed to load extension '{}': {}", name, e);
                }
            }
        }

        outcomes
    }

    /// Load one extension by name
    pub fn load(&self, name: &str, ctx: &Arc<BotContext>) -> Result<LoadOutcome, ExtensionError> {
        let descriptor = self
            .manifest
            .get(name)
            .copied()
            .ok_or_else(|| ExtensionError::Unknown(name.to_string()))?;

        if self.is_loaded(name) {
            return Err(ExtensionError::AlreadyLoaded(name.to_string()));
        }

        let factories = (descriptor.setup)(ctx)?;

        let exclude = &ctx.config.extensions.exclude_groups;
        let (groups, failures) = self.registry.install(name, factories, exclude, ctx);

        {
            let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
            loaded.insert(name.to_string(), groups.clone());
        }

        tracing::info!(
            "Loaded extension '{}' ({} group(s), {} failure(s))",
            name,
            groups.len(),
            failures.len()
        );

        Ok(LoadOutcome {
            extension: name.to_string(),
            groups,
            failures,
        })
    }

    /// Unload an extension and every group it registered
    ///
    /// Safe to call when some of those groups were already removed; each
    /// removed group's `cleanup` hook runs before it is dropped.
    pub fn unload(&self, name: &str) -> Result<Vec<String>, ExtensionError> {
        let groups = {
            let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
            loaded
                .remove(name)
                .ok_or_else(|| ExtensionError::NotLoaded(name.to_string()))?
        };

        for group_name in &groups {
            if let Some(group) = self.registry.remove(group_name) {
                group.cleanup();
            }
        }

        tracing::info!("Unloaded extension '{}'", name);
        Ok(groups)
    }

    /// Unload then load, producing fresh group instances
    pub fn reload(
        &self,
        name: &str,
        ctx: &Arc<BotContext>,
    ) -> Result<LoadOutcome, ExtensionError> {
        self.unload(name)?;
        self.load(name, ctx)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
        loaded.contains_key(name)
    }

    /// Names of the currently loaded extensions
    pub fn loaded(&self) -> Vec<String> {
        let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = loaded.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
