//! Command registry
//!
//! Holds registered commands and the alias index. Registration is atomic: every
//! name and alias of an incoming command is checked before anything is inserted.

use crate::error::{RegistrationError, RegistrationResult};
use crate::model::Command;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    commands: HashMap<String, Arc<Command>>,
    /// alias -> canonical name
    aliases: HashMap<String, String>,
}

/// Thread-safe store of commands keyed by canonical name
#[derive(Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a command. Fails without modifying the registry on any collision.
    pub fn register(&self, command: Command) -> RegistrationResult<Arc<Command>> {
        // A poisoned lock only means a writer panicked; the maps are never left half-written
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.commands.contains_key(command.name()) {
            return Err(RegistrationError::CommandAlreadyExists(
                command.name().to_string(),
            ));
        }
        if state.aliases.contains_key(command.name()) {
            return Err(RegistrationError::AliasAlreadyExists(
                command.name().to_string(),
            ));
        }

        let mut incoming = HashSet::new();
        for alias in command.aliases() {
            let collides = alias == command.name()
                || !incoming.insert(alias.as_str())
                || state.commands.contains_key(alias)
                || state.aliases.contains_key(alias);
            if collides {
                return Err(RegistrationError::AliasAlreadyExists(alias.clone()));
            }
        }

        let command = Arc::new(command);
        for alias in command.aliases() {
            state
                .aliases
                .insert(alias.clone(), command.name().to_string());
        }
        state
            .commands
            .insert(command.name().to_string(), Arc::clone(&command));

        debug!(
            command = command.name(),
            aliases = ?command.aliases(),
            parameters = command.parameters().len(),
            "registered command"
        );
        Ok(command)
    }

    /// Look up a command by canonical name or alias
    pub fn resolve(&self, token: &str) -> Option<Arc<Command>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(command) = state.commands.get(token) {
            return Some(Arc::clone(command));
        }
        state
            .aliases
            .get(token)
            .and_then(|name| state.commands.get(name))
            .map(Arc::clone)
    }

    /// Snapshot of all commands, sorted by canonical name
    pub fn all(&self) -> impl Iterator<Item = Arc<Command>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut commands: Vec<Arc<Command>> = state.commands.values().cloned().collect();
        drop(state);
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands.into_iter()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .commands
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
