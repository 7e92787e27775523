//! DAW model facade
//!
//! The engine never owns DAW state. It reads and mutates it through
//! [`DawModel`], which the host integration implements on top of its own
//! object model. Indices are absolute within the current track scope; paging
//! over them is done by the engine's banks, not by the facade.
//!
//! Every read accessor returns `Option` and is expected to be cheap and free of
//! side effects. Absence is ordinary (an empty slot, a track with fewer sends),
//! so callers treat `None` as "render blank / do nothing".

mod memory;

pub use memory::{DawCall, MemoryDaw};

/// What a track is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Instrument,
    Effect,
    Group,
    Master,
}

/// Snapshot of one automatable value
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterState {
    /// Display name
    pub name: String,
    /// Normalized value (0.0-1.0)
    pub value: f64,
    /// Normalized default value, restored by reset
    pub default: f64,
    /// Host-formatted value text
    pub display: String,
}

impl ParameterState {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            default: value,
            display: format!("{:.0}%", value * 100.0),
        }
    }
}

/// Channel strip state of one track
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub kind: TrackKind,
    pub color: [u8; 3],
    pub muted: bool,
    pub soloed: bool,
    pub armed: bool,
    /// Group tracks only: children visible in the parent scope
    pub expanded: bool,
    pub volume: ParameterState,
    pub pan: ParameterState,
    pub sends: Vec<ParameterState>,
}

impl Track {
    pub fn is_group(&self) -> bool {
        self.kind == TrackKind::Group
    }
}

/// A device in the selected track's chain
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    pub enabled: bool,
}

/// A clip slot
#[derive(Debug, Clone, Default)]
pub struct Clip {
    pub has_content: bool,
    pub playing: bool,
    pub recording: bool,
    pub queued: bool,
}

/// Transport state
#[derive(Debug, Clone, Default)]
pub struct Transport {
    pub playing: bool,
    pub recording: bool,
    pub tempo: f64,
}

/// Address of an automatable value
///
/// Device parameters are addressed relative to the cursor device, so the same
/// id names a different parameter once another device is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    Volume { track: usize },
    Pan { track: usize },
    Send { track: usize, send: usize },
    Device { page: usize, index: usize },
}

/// Read and mutate access to the host's DAW state
pub trait DawModel {
    // --- Tracks ---

    /// Number of tracks in the current scope (top level or inside a group)
    fn track_count(&self) -> usize;
    fn track(&self, index: usize) -> Option<&Track>;
    fn selected_track(&self) -> Option<usize>;
    fn select_track(&mut self, index: usize);
    /// The current track scope is the inside of a group
    fn has_parent_group(&self) -> bool;
    /// Navigate from a group scope to its parent scope
    fn exit_group(&mut self);
    fn toggle_group_expanded(&mut self, index: usize);
    fn toggle_mute(&mut self, index: usize);
    fn toggle_solo(&mut self, index: usize);
    fn toggle_arm(&mut self, index: usize);
    fn stop_track(&mut self, index: usize);
    fn delete_track(&mut self, index: usize);
    fn duplicate_track(&mut self, index: usize);
    fn set_track_color(&mut self, index: usize, color: [u8; 3]);
    /// Request a new track; hosts may create it asynchronously
    fn add_track(&mut self, kind: TrackKind);
    /// Insert a device by name at the end of a track's chain
    fn insert_device(&mut self, track: usize, name: &str);

    // --- Sends ---

    fn send_count(&self) -> usize;
    fn send_name(&self, send: usize) -> Option<&str>;

    // --- Devices of the selected track ---

    fn device_count(&self) -> usize;
    fn device(&self, index: usize) -> Option<&Device>;
    fn selected_device(&self) -> Option<usize>;
    fn select_device(&mut self, index: usize);
    fn parameter_page_count(&self) -> usize;
    fn parameter_page_name(&self, page: usize) -> Option<&str>;
    fn selected_parameter_page(&self) -> usize;
    fn select_parameter_page(&mut self, page: usize);

    // --- Parameters ---

    fn parameter(&self, id: ParameterId) -> Option<&ParameterState>;
    /// Apply a normalized relative change
    fn change_parameter(&mut self, id: ParameterId, delta: f64);
    /// Begin or end a touch (gates automation writes)
    fn touch_parameter(&mut self, id: ParameterId, touched: bool);
    fn reset_parameter(&mut self, id: ParameterId);

    // --- Clips ---

    fn scene_count(&self) -> usize;
    fn clip(&self, track: usize, scene: usize) -> Option<&Clip>;
    fn launch_clip(&mut self, track: usize, scene: usize);
    fn delete_clip(&mut self, track: usize, scene: usize);
    fn duplicate_clip(&mut self, track: usize, scene: usize);
    fn launch_scene(&mut self, scene: usize);

    // --- Notes / transport ---

    fn play_note(&mut self, note: u8, velocity: u8);
    fn transport(&self) -> &Transport;
}
