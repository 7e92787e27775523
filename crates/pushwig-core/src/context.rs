//! Per-event context handed to modes and views
//!
//! A mode never holds references into the engine. Each callback receives a
//! [`Context`] borrowing the model, banks, settings and scheduler for the
//! duration of that one call. Changes that affect the engine itself (switching
//! modes, consuming a held modifier) are queued as [`Request`]s and applied by
//! the controller once the callback returns.

use crate::bank::Banks;
use crate::config::Settings;
use crate::model::DawModel;
use crate::modes::ModeId;
use crate::scheduler::{DeferredTask, Scheduler, TaskKey};
use crate::types::{Modifier, Modifiers};
use crate::views::ViewId;
use std::time::Instant;

/// Engine change requested from inside a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Switch to a mode; a transient mode remembers the mode it replaced
    ActivateMode(ModeId),
    /// Return from a transient mode (or to the default mode)
    RestoreMode,
    ActivateView(ViewId),
    RestoreView,
    /// Mark a held modifier as used so its own release action is skipped
    Consume(Modifier),
}

/// Mutable access for input callbacks and lifecycle hooks
pub struct Context<'a> {
    pub daw: &'a mut dyn DawModel,
    pub banks: &'a mut Banks,
    pub settings: &'a Settings,
    pub scheduler: &'a mut Scheduler,
    /// Modifier snapshot taken when the event fired
    pub modifiers: Modifiers,
    pub now: Instant,
    pub active_mode: Option<ModeId>,
    pub active_view: Option<ViewId>,
    requests: &'a mut Vec<Request>,
}

impl<'a> Context<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        daw: &'a mut dyn DawModel,
        banks: &'a mut Banks,
        settings: &'a Settings,
        scheduler: &'a mut Scheduler,
        requests: &'a mut Vec<Request>,
        modifiers: Modifiers,
        now: Instant,
    ) -> Self {
        Self {
            daw,
            banks,
            settings,
            scheduler,
            modifiers,
            now,
            active_mode: None,
            active_view: None,
            requests,
        }
    }

    pub fn request(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn activate_mode(&mut self, id: ModeId) {
        self.request(Request::ActivateMode(id));
    }

    pub fn restore_mode(&mut self) {
        self.request(Request::RestoreMode);
    }

    pub fn activate_view(&mut self, id: ViewId) {
        self.request(Request::ActivateView(id));
    }

    pub fn restore_view(&mut self) {
        self.request(Request::RestoreView);
    }

    /// Consume `modifier` if it is physically held (locks are never consumed)
    pub fn consume(&mut self, modifier: Modifier) {
        if self.modifiers.is_held(modifier) {
            self.request(Request::Consume(modifier));
        }
    }

    /// Read-only view of the same state, for shared colour/label logic
    pub fn view(&self) -> RenderContext<'_> {
        RenderContext {
            daw: &*self.daw,
            banks: &*self.banks,
            settings: self.settings,
            modifiers: self.modifiers,
            active_mode: self.active_mode,
            active_view: self.active_view,
        }
    }

    /// Schedule `task` after `delay` from now, superseding pending work for `key`
    pub fn schedule(&mut self, key: TaskKey, task: DeferredTask, delay: std::time::Duration) {
        self.scheduler.schedule(key, task, self.now + delay);
    }
}

/// Read-only access for render passes and colour queries
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub daw: &'a dyn DawModel,
    pub banks: &'a Banks,
    pub settings: &'a Settings,
    pub modifiers: Modifiers,
    pub active_mode: Option<ModeId>,
    pub active_view: Option<ViewId>,
}

impl<'a> RenderContext<'a> {
    pub fn new(daw: &'a dyn DawModel, banks: &'a Banks, settings: &'a Settings) -> Self {
        Self {
            daw,
            banks,
            settings,
            modifiers: Modifiers::default(),
            active_mode: None,
            active_view: None,
        }
    }
}
