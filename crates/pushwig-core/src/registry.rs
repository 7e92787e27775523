//! Keyed store of cooperating strategy objects
//!
//! Modes and views are registered once at startup and live until the engine
//! is dropped. There is deliberately no removal operation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Registry failures (wiring bugs, never runtime conditions)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate registration for id {0}")]
    Duplicate(String),

    #[error("Nothing registered for id {0}")]
    NotFound(String),
}

/// One instance per id, with an optional default id
pub struct Registry<Id, T> {
    entries: HashMap<Id, T>,
    /// Registration order, for deterministic iteration
    order: Vec<Id>,
    default_id: Option<Id>,
}

impl<Id, T> Registry<Id, T>
where
    Id: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            default_id: None,
        }
    }

    /// Store `instance` under `id`
    ///
    /// Fails if the id is already taken; the existing instance is kept.
    pub fn register(&mut self, id: Id, instance: T) -> Result<(), RegistryError> {
        if self.entries.contains_key(&id) {
            return Err(RegistryError::Duplicate(format!("{:?}", id)));
        }
        log::debug!("register: {:?}", id);
        self.entries.insert(id, instance);
        self.order.push(id);
        Ok(())
    }

    pub fn get(&self, id: Id) -> Result<&T, RegistryError> {
        self.entries
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("{:?}", id)))
    }

    pub fn get_mut(&mut self, id: Id) -> Result<&mut T, RegistryError> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("{:?}", id)))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains_key(&id)
    }

    /// Mark the fallback id used at startup and when a restore has no target
    ///
    /// The id must already be registered.
    pub fn set_default_id(&mut self, id: Id) -> Result<(), RegistryError> {
        if !self.entries.contains_key(&id) {
            return Err(RegistryError::NotFound(format!("{:?}", id)));
        }
        self.default_id = Some(id);
        Ok(())
    }

    pub fn default_id(&self) -> Option<Id> {
        self.default_id
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Id, T> Default for Registry<Id, T>
where
    Id: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
