//! Mode-switching control surface engine for a DAW
//!
//! This crate provides:
//! - Input classification (short/long press, held modifiers, chords)
//! - Keyed registries of modes and views with transient-mode restore
//! - Bank paging over tracks, scenes, sends, devices and parameter pages
//! - A parameter layer binding the eight knobs to model parameters
//! - Pure render passes writing display cells, button and pad LEDs
//! - Single-shot deferred tasks with supersede-on-reschedule semantics
//!
//! # Architecture
//!
//! ```text
//! RawEvent → InputClassifier → Controller → active Mode / View → DawModel
//!                                   │
//!                                   └─ tick: Scheduler → render → Surface
//! ```
//!
//! Everything runs on the caller's thread. Raw events may arrive from another
//! thread through the flume sender returned by [`Controller::input_sender`];
//! they are drained on the next [`Controller::tick`].

pub mod bank;
pub mod config;
mod context;
mod controller;
mod dispatch;
pub mod input;
pub mod model;
pub mod modes;
mod params;
mod registry;
pub mod render;
mod scheduler;
pub mod surface;
mod types;
pub mod views;

pub use bank::{Bank, Banks, Overflow, SEND_PAGE_SIZE};
pub use config::{default_settings_path, load_settings, save_settings, Favorites, KnobSpeed, Settings};
pub use context::{Context, RenderContext, Request};
pub use controller::Controller;
pub use dispatch::{Dispatcher, Lifecycle};
pub use input::{ButtonEvent, ButtonState, InputClassifier, InputEvent, RawEvent};
pub use model::{DawCall, DawModel, MemoryDaw, ParameterId, TrackKind, Transport};
pub use modes::{Mode, ModeId};
pub use params::{
    DeviceParameters, Parameter, ParameterBinding, ParameterProvider, SelectedTrackParameters,
    TrackParameter, TrackParameters,
};
pub use registry::{Registry, RegistryError};
pub use scheduler::{DeferredTask, Scheduler, TaskKey};
pub use surface::{DiffSurface, Frame, Surface};
pub use types::{
    check_index, ButtonId, Color, Modifier, Modifiers, DISPLAY_ROWS, KNOB_COUNT, PAD_COLUMNS,
    PAD_COUNT,
};
pub use views::{NoteInput, View, ViewId};

/// Error type for engine operations
///
/// Every variant is a wiring bug (unknown id, control index outside its
/// group), never a normal runtime condition. Absent tracks, sends or devices
/// are silently skipped instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Control index {index} out of range (group has {count})")]
    ControlIndexOutOfRange { index: usize, count: usize },
}
