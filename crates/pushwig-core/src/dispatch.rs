//! Active-strategy switching with transient restore
//!
//! A [`Dispatcher`] owns every registered mode (or view) and tracks which one
//! is active. Switching calls `on_deactivate` on the old instance and
//! `on_activate` on the new one; activating the already-active id is a no-op.
//!
//! Transient strategies (add-track, colour picker) remember what they
//! replaced in a single restore slot. Entering a transient while another
//! transient is active keeps the original persistent target, so a chain of
//! transients always restores back to where it started.

use crate::context::Context;
use crate::registry::{Registry, RegistryError};
use crate::SurfaceError;
use std::fmt::Debug;
use std::hash::Hash;

/// Activation hooks shared by modes and views
pub trait Lifecycle {
    fn on_activate(&mut self, _ctx: &mut Context<'_>) {}
    fn on_deactivate(&mut self, _ctx: &mut Context<'_>) {}
    /// Transient strategies are left via `restore`
    fn is_transient(&self) -> bool {
        false
    }
}

/// Registry plus active / previous tracking
pub struct Dispatcher<Id, S: ?Sized> {
    registry: Registry<Id, Box<S>>,
    active: Option<Id>,
    /// Restore target while a transient is active
    previous: Option<Id>,
    /// Used in log lines ("mode", "view")
    kind: &'static str,
}

impl<Id, S> Dispatcher<Id, S>
where
    Id: Copy + Eq + Hash + Debug,
    S: ?Sized + Lifecycle,
{
    pub fn new(kind: &'static str) -> Self {
        Self {
            registry: Registry::new(),
            active: None,
            previous: None,
            kind,
        }
    }

    pub fn register(&mut self, id: Id, instance: Box<S>) -> Result<(), RegistryError> {
        self.registry.register(id, instance)
    }

    pub fn set_default_id(&mut self, id: Id) -> Result<(), RegistryError> {
        self.registry.set_default_id(id)
    }

    pub fn default_id(&self) -> Option<Id> {
        self.registry.default_id()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.registry.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.registry.ids()
    }

    pub fn get(&self, id: Id) -> Result<&S, RegistryError> {
        self.registry.get(id).map(|instance| &**instance)
    }

    pub fn get_mut(&mut self, id: Id) -> Result<&mut S, RegistryError> {
        self.registry.get_mut(id).map(|instance| &mut **instance)
    }

    pub fn active_id(&self) -> Option<Id> {
        self.active
    }

    pub fn previous_id(&self) -> Option<Id> {
        self.previous
    }

    pub fn is_active(&self, id: Id) -> bool {
        self.active == Some(id)
    }

    pub fn active(&self) -> Option<&S> {
        let id = self.active?;
        self.get(id).ok()
    }

    pub fn active_mut(&mut self) -> Option<&mut S> {
        let id = self.active?;
        self.get_mut(id).ok()
    }

    /// Make `id` the active instance
    ///
    /// Unknown ids are an error and leave the current state untouched.
    pub fn set_active(&mut self, id: Id, ctx: &mut Context<'_>) -> Result<(), SurfaceError> {
        let entering_transient = self.registry.get(id)?.is_transient();
        if self.active == Some(id) {
            return Ok(());
        }

        if entering_transient {
            match self.active {
                Some(current) if self.is_transient_id(current) => {
                    // Keep the original persistent target
                    log::debug!(
                        "set_active: {} {:?} replaces transient {:?}, restore target stays {:?}",
                        self.kind,
                        id,
                        current,
                        self.previous
                    );
                }
                current => self.previous = current,
            }
        } else {
            self.previous = None;
        }

        if let Some(current) = self.active {
            self.registry.get_mut(current)?.on_deactivate(ctx);
        }
        log::info!("set_active: {} {:?} -> {:?}", self.kind, self.active, id);
        self.active = Some(id);
        self.registry.get_mut(id)?.on_activate(ctx);
        Ok(())
    }

    /// Leave the active transient, returning to what it replaced
    ///
    /// Falls back to the default id when nothing is remembered; does nothing
    /// if there is no default either.
    pub fn restore(&mut self, ctx: &mut Context<'_>) -> Result<(), SurfaceError> {
        match self.previous.take().or_else(|| self.registry.default_id()) {
            Some(target) => self.set_active(target, ctx),
            None => {
                log::warn!("restore: No {} to restore to", self.kind);
                Ok(())
            }
        }
    }

    /// Activate the registered default, if one is set
    pub fn activate_default(&mut self, ctx: &mut Context<'_>) -> Result<(), SurfaceError> {
        match self.registry.default_id() {
            Some(id) => self.set_active(id, ctx),
            None => Ok(()),
        }
    }

    fn is_transient_id(&self, id: Id) -> bool {
        self.registry
            .get(id)
            .map(|instance| instance.is_transient())
            .unwrap_or(false)
    }
}
