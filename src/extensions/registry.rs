//! Group registry: owns command group instances and the dispatch table

use crate::application::errors::ExtensionError;
use crate::domain::entities::CommandSpec;
use crate::extensions::context::BotContext;
use crate::extensions::group::CommandGroup;
use crate::extensions::manifest::GroupFactory;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

struct RegistryInner {
    groups: HashMap<String, Arc<dyn CommandGroup>>,
    /// Lowercase command name or alias -> owning group name
    commands: HashMap<String, String>,
}

/// Registry for command groups, keyed by group name
///
/// Mutated only from the loader (startup batch or an admin command); reads
/// happen on every dispatch. Locks are never held across await points:
/// callers clone the `Arc<dyn CommandGroup>` out and drop the guard before
/// awaiting the handler.
pub struct GroupRegistry {
    inner: RwLock<RegistryInner>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                groups: HashMap::new(),
                commands: HashMap::new(),
            }),
        }
    }

    /// Construct and register one group per factory not in `exclude`
    ///
    /// A factory that fails to construct, or whose group name or command
    /// names collide with an existing registration, is recorded as a
    /// failure without aborting the remaining factories. Returns the names
    /// of the groups that were registered alongside the failures.
    pub fn install(
        &self,
        extension: &str,
        factories: Vec<GroupFactory>,
        exclude: &[String],
        ctx: &Arc<BotContext>,
    ) -> (Vec<String>, Vec<ExtensionError>) {
        let mut registered = Vec::new();
        let mut failures = Vec::new();

        for factory in factories {
            let name = factory.name();

            if exclude.iter().any(|e| e == name) {
                tracing::debug!("Skipping excluded group '{}'", name);
                continue;
            }

            if self.contains(name) {
                failures.push(ExtensionError::DuplicateGroup(name.to_string()));
                continue;
            }

            let group = match factory.build(ctx) {
                Ok(group) => group,
                Err(e) => {
                    failures.push(e);
                    continue;
                }
            };

            if let Err(e) = self.register(extension, group) {
                failures.push(e);
                continue;
            }

            registered.push(name.to_string());
        }

        (registered, failures)
    }

    fn register(
        &self,
        extension: &str,
        group: Arc<dyn CommandGroup>,
    ) -> Result<(), ExtensionError> {
        let name = group.name().to_string();
        let specs = group.commands();

        let mut keys = Vec::new();
        for spec in &specs {
            keys.push(spec.name.to_lowercase());
            keys.extend(spec.aliases.iter().map(|a| a.to_lowercase()));
        }

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        if inner.groups.contains_key(&name) {
            return Err(ExtensionError::DuplicateGroup(name));
        }

        if let Some(taken) = keys.iter().find(|k| inner.commands.contains_key(*k)) {
            return Err(ExtensionError::Construction {
                extension: extension.to_string(),
                group: name,
                reason: format!("command '{}' is already taken", taken),
            });
        }

        for key in keys {
            inner.commands.insert(key, name.clone());
        }
        inner.groups.insert(name.clone(), group);

        tracing::info!("Registered group '{}' from extension '{}'", name, extension);
        Ok(())
    }

    /// Remove a group by name; `None` when it was already deregistered
    pub fn remove(&self, name: &str) -> Option<Arc<dyn CommandGroup>> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let group = inner.groups.remove(name)?;
        inner.commands.retain(|_, owner| owner != name);
        tracing::info!("Removed group '{}'", name);
        Some(group)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandGroup>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.groups.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.groups.contains_key(name)
    }

    /// Resolve a command or alias to its owning group and declared spec
    pub fn resolve_command(&self, input: &str) -> Option<(Arc<dyn CommandGroup>, CommandSpec)> {
        let key = input.to_lowercase();
        let group = {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            let owner = inner.commands.get(&key)?;
            inner.groups.get(owner).cloned()?
        };
        let spec = group.commands().into_iter().find(|s| s.matches(input))?;
        Some((group, spec))
    }

    /// All registered groups, in no particular order
    pub fn groups(&self) -> Vec<Arc<dyn CommandGroup>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.groups.values().cloned().collect()
    }

    /// Declared specs of every registered command, for help output
    pub fn command_specs(&self) -> Vec<CommandSpec> {
        let mut specs: Vec<CommandSpec> = self
            .groups()
            .iter()
            .flat_map(|g| g.commands())
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}
