//! Single-shot deferred tasks
//!
//! The engine's only asynchrony: "do X after N milliseconds", used for the
//! startup default selection, re-selecting after a bank scroll settles, and
//! inserting a favourite device once the host has created a new track.
//!
//! Each logical operation ([`TaskKey`]) owns an epoch counter. Scheduling or
//! cancelling bumps the epoch; a task whose captured epoch no longer matches
//! when it comes due is stale and dropped. A second action inside the delay
//! window therefore supersedes the first instead of racing it.
//!
//! Time is driven by the caller's tick (`take_due(now)`), so nothing runs
//! outside the UI thread.

use crate::model::TrackKind;
use std::collections::HashMap;
use std::time::Instant;

/// Logical operation a deferred task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    Startup,
    BankSettle,
    DeviceInsert,
}

/// Work performed when a task comes due
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredTask {
    /// Activate the configured default mode and view
    ActivateDefaults,
    /// Select the track at an absolute index in the current scope
    SelectTrack { index: usize },
    /// Insert the favourite device for `kind` into the selected track
    InsertFavorite { kind: TrackKind },
}

#[derive(Debug)]
struct Pending {
    key: TaskKey,
    epoch: u64,
    due: Instant,
    task: DeferredTask,
}

/// Epoch-stamped single-shot timers
#[derive(Debug, Default)]
pub struct Scheduler {
    epochs: HashMap<TaskKey, u64>,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run at `due`, superseding any pending task for `key`
    pub fn schedule(&mut self, key: TaskKey, task: DeferredTask, due: Instant) {
        let epoch = self.bump(key);
        log::debug!("schedule: {:?} epoch {} -> {:?}", key, epoch, task);
        self.pending.push(Pending {
            key,
            epoch,
            due,
            task,
        });
    }

    /// Invalidate whatever is pending for `key`
    pub fn cancel(&mut self, key: TaskKey) {
        let epoch = self.bump(key);
        log::debug!("cancel: {:?} now at epoch {}", key, epoch);
    }

    /// Whether a live (non-stale) task is waiting for `key`
    pub fn is_pending(&self, key: TaskKey) -> bool {
        let current = self.epoch(key);
        self.pending
            .iter()
            .any(|p| p.key == key && p.epoch == current)
    }

    /// Remove every task due at `now`, appending the live ones to `out` in due order
    pub fn take_due(&mut self, now: Instant, out: &mut Vec<DeferredTask>) {
        let mut due: Vec<Pending> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| p.due);

        for pending in due {
            if pending.epoch == self.epoch(pending.key) {
                out.push(pending.task);
            } else {
                log::warn!(
                    "take_due: Dropping stale {:?} task {:?} (epoch {} superseded)",
                    pending.key,
                    pending.task,
                    pending.epoch
                );
            }
        }
    }

    fn epoch(&self, key: TaskKey) -> u64 {
        self.epochs.get(&key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: TaskKey) -> u64 {
        let epoch = self.epochs.entry(key).or_insert(0);
        *epoch += 1;
        *epoch
    }
}
