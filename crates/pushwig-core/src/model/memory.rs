//! In-memory DAW model
//!
//! A flat, synchronous implementation of [`DawModel`] used for offline runs and
//! tests. Every mutating call is also appended to a call log so behaviour can be
//! asserted on ("reset was called, touch was not").

use super::{
    Clip, DawModel, Device, ParameterId, ParameterState, Track, TrackKind, Transport,
};
use std::collections::HashMap;

/// A mutating call received by [`MemoryDaw`]
#[derive(Debug, Clone, PartialEq)]
pub enum DawCall {
    SelectTrack(usize),
    ExitGroup,
    ToggleGroupExpanded(usize),
    ToggleMute(usize),
    ToggleSolo(usize),
    ToggleArm(usize),
    StopTrack(usize),
    DeleteTrack(usize),
    DuplicateTrack(usize),
    SetTrackColor(usize, [u8; 3]),
    AddTrack(TrackKind),
    InsertDevice { track: usize, name: String },
    SelectDevice(usize),
    SelectParameterPage(usize),
    ChangeParameter(ParameterId, f64),
    TouchParameter(ParameterId, bool),
    ResetParameter(ParameterId),
    LaunchClip(usize, usize),
    DeleteClip(usize, usize),
    DuplicateClip(usize, usize),
    LaunchScene(usize),
    PlayNote(u8, u8),
}

/// Parameter page of the cursor device
#[derive(Debug, Clone)]
pub struct ParameterPage {
    pub name: String,
    pub parameters: Vec<ParameterState>,
}

/// Flat in-memory DAW
#[derive(Debug, Default)]
pub struct MemoryDaw {
    pub tracks: Vec<Track>,
    pub selected_track: Option<usize>,
    /// Whether the current track scope sits inside a group
    pub inside_group: bool,
    pub send_names: Vec<String>,
    pub devices: Vec<Device>,
    pub selected_device: Option<usize>,
    pub pages: Vec<ParameterPage>,
    pub selected_page: usize,
    pub scene_count: usize,
    pub clips: HashMap<(usize, usize), Clip>,
    pub transport: Transport,
    /// Log of every mutating call, oldest first
    pub calls: Vec<DawCall>,
}

impl MemoryDaw {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model with `count` tracks of `kind`, each carrying every send
    pub fn with_tracks(count: usize, sends: usize) -> Self {
        let mut daw = Self::new();
        daw.send_names = (0..sends).map(|s| format!("FX {}", s + 1)).collect();
        for i in 0..count {
            daw.push_track(&format!("Track {}", i + 1), TrackKind::Audio);
        }
        daw.scene_count = 8;
        daw
    }

    /// Append a track carrying one send per configured send name
    pub fn push_track(&mut self, name: &str, kind: TrackKind) -> usize {
        let sends = self
            .send_names
            .iter()
            .map(|s| ParameterState::new(s.clone(), 0.0))
            .collect();
        self.tracks.push(Track {
            name: name.to_string(),
            kind,
            color: [127, 127, 127],
            muted: false,
            soloed: false,
            armed: false,
            expanded: false,
            volume: ParameterState::new("Volume", 0.79),
            pan: ParameterState::new("Pan", 0.5),
            sends,
        });
        self.tracks.len() - 1
    }

    /// Give the cursor device `pages` parameter pages of eight parameters
    pub fn with_device_pages(mut self, device: &str, pages: usize) -> Self {
        self.devices.push(Device {
            name: device.to_string(),
            enabled: true,
        });
        self.selected_device = Some(self.devices.len() - 1);
        for p in 0..pages {
            self.pages.push(ParameterPage {
                name: format!("Page {}", p + 1),
                parameters: (0..8)
                    .map(|i| ParameterState::new(format!("P{}.{}", p + 1, i + 1), 0.5))
                    .collect(),
            });
        }
        self
    }

    /// Drop the call log
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn parameter_mut(&mut self, id: ParameterId) -> Option<&mut ParameterState> {
        match id {
            ParameterId::Volume { track } => self.tracks.get_mut(track).map(|t| &mut t.volume),
            ParameterId::Pan { track } => self.tracks.get_mut(track).map(|t| &mut t.pan),
            ParameterId::Send { track, send } => {
                self.tracks.get_mut(track).and_then(|t| t.sends.get_mut(send))
            }
            ParameterId::Device { page, index } => {
                self.selected_device?;
                self.pages.get_mut(page).and_then(|p| p.parameters.get_mut(index))
            }
        }
    }

    fn set_value(param: &mut ParameterState, value: f64) {
        param.value = value.clamp(0.0, 1.0);
        param.display = format!("{:.0}%", param.value * 100.0);
    }
}

impl DawModel for MemoryDaw {
    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    fn selected_track(&self) -> Option<usize> {
        self.selected_track.filter(|i| *i < self.tracks.len())
    }

    fn select_track(&mut self, index: usize) {
        self.calls.push(DawCall::SelectTrack(index));
        if index < self.tracks.len() {
            self.selected_track = Some(index);
        }
    }

    fn has_parent_group(&self) -> bool {
        self.inside_group
    }

    fn exit_group(&mut self) {
        self.calls.push(DawCall::ExitGroup);
        self.inside_group = false;
    }

    fn toggle_group_expanded(&mut self, index: usize) {
        self.calls.push(DawCall::ToggleGroupExpanded(index));
        if let Some(track) = self.tracks.get_mut(index) {
            if track.is_group() {
                track.expanded = !track.expanded;
            }
        }
    }

    fn toggle_mute(&mut self, index: usize) {
        self.calls.push(DawCall::ToggleMute(index));
        if let Some(track) = self.tracks.get_mut(index) {
            track.muted = !track.muted;
        }
    }

    fn toggle_solo(&mut self, index: usize) {
        self.calls.push(DawCall::ToggleSolo(index));
        if let Some(track) = self.tracks.get_mut(index) {
            track.soloed = !track.soloed;
        }
    }

    fn toggle_arm(&mut self, index: usize) {
        self.calls.push(DawCall::ToggleArm(index));
        if let Some(track) = self.tracks.get_mut(index) {
            track.armed = !track.armed;
        }
    }

    fn stop_track(&mut self, index: usize) {
        self.calls.push(DawCall::StopTrack(index));
        for ((track, _), clip) in self.clips.iter_mut() {
            if *track == index {
                clip.playing = false;
                clip.queued = false;
            }
        }
    }

    fn delete_track(&mut self, index: usize) {
        self.calls.push(DawCall::DeleteTrack(index));
        if index < self.tracks.len() {
            self.tracks.remove(index);
            self.selected_track = match self.selected_track {
                Some(s) if s == index => None,
                Some(s) if s > index => Some(s - 1),
                other => other,
            };
        }
    }

    fn duplicate_track(&mut self, index: usize) {
        self.calls.push(DawCall::DuplicateTrack(index));
        if let Some(track) = self.tracks.get(index).cloned() {
            self.tracks.insert(index + 1, track);
        }
    }

    fn set_track_color(&mut self, index: usize, color: [u8; 3]) {
        self.calls.push(DawCall::SetTrackColor(index, color));
        if let Some(track) = self.tracks.get_mut(index) {
            track.color = color;
        }
    }

    fn add_track(&mut self, kind: TrackKind) {
        self.calls.push(DawCall::AddTrack(kind));
        let name = format!("{:?} {}", kind, self.tracks.len() + 1);
        let index = self.push_track(&name, kind);
        self.selected_track = Some(index);
    }

    fn insert_device(&mut self, track: usize, name: &str) {
        self.calls.push(DawCall::InsertDevice {
            track,
            name: name.to_string(),
        });
        if self.selected_track == Some(track) {
            self.devices.push(Device {
                name: name.to_string(),
                enabled: true,
            });
        }
    }

    fn send_count(&self) -> usize {
        self.send_names.len()
    }

    fn send_name(&self, send: usize) -> Option<&str> {
        self.send_names.get(send).map(String::as_str)
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    fn selected_device(&self) -> Option<usize> {
        self.selected_device.filter(|i| *i < self.devices.len())
    }

    fn select_device(&mut self, index: usize) {
        self.calls.push(DawCall::SelectDevice(index));
        if index < self.devices.len() {
            self.selected_device = Some(index);
        }
    }

    fn parameter_page_count(&self) -> usize {
        self.pages.len()
    }

    fn parameter_page_name(&self, page: usize) -> Option<&str> {
        self.pages.get(page).map(|p| p.name.as_str())
    }

    fn selected_parameter_page(&self) -> usize {
        self.selected_page
    }

    fn select_parameter_page(&mut self, page: usize) {
        self.calls.push(DawCall::SelectParameterPage(page));
        if page < self.pages.len() {
            self.selected_page = page;
        }
    }

    fn parameter(&self, id: ParameterId) -> Option<&ParameterState> {
        match id {
            ParameterId::Volume { track } => self.tracks.get(track).map(|t| &t.volume),
            ParameterId::Pan { track } => self.tracks.get(track).map(|t| &t.pan),
            ParameterId::Send { track, send } => {
                self.tracks.get(track).and_then(|t| t.sends.get(send))
            }
            ParameterId::Device { page, index } => {
                self.selected_device()?;
                self.pages.get(page).and_then(|p| p.parameters.get(index))
            }
        }
    }

    fn change_parameter(&mut self, id: ParameterId, delta: f64) {
        self.calls.push(DawCall::ChangeParameter(id, delta));
        if let Some(param) = self.parameter_mut(id) {
            let value = param.value + delta;
            Self::set_value(param, value);
        }
    }

    fn touch_parameter(&mut self, id: ParameterId, touched: bool) {
        self.calls.push(DawCall::TouchParameter(id, touched));
    }

    fn reset_parameter(&mut self, id: ParameterId) {
        self.calls.push(DawCall::ResetParameter(id));
        if let Some(param) = self.parameter_mut(id) {
            let value = param.default;
            Self::set_value(param, value);
        }
    }

    fn scene_count(&self) -> usize {
        self.scene_count
    }

    fn clip(&self, track: usize, scene: usize) -> Option<&Clip> {
        if track >= self.tracks.len() || scene >= self.scene_count {
            return None;
        }
        self.clips.get(&(track, scene))
    }

    fn launch_clip(&mut self, track: usize, scene: usize) {
        self.calls.push(DawCall::LaunchClip(track, scene));
        if let Some(clip) = self.clips.get_mut(&(track, scene)) {
            if clip.has_content {
                clip.queued = true;
            }
        }
    }

    fn delete_clip(&mut self, track: usize, scene: usize) {
        self.calls.push(DawCall::DeleteClip(track, scene));
        self.clips.remove(&(track, scene));
    }

    fn duplicate_clip(&mut self, track: usize, scene: usize) {
        self.calls.push(DawCall::DuplicateClip(track, scene));
        if let Some(clip) = self.clips.get(&(track, scene)).cloned() {
            self.clips.insert((track, scene + 1), clip);
        }
    }

    fn launch_scene(&mut self, scene: usize) {
        self.calls.push(DawCall::LaunchScene(scene));
    }

    fn play_note(&mut self, note: u8, velocity: u8) {
        self.calls.push(DawCall::PlayNote(note, velocity));
    }

    fn transport(&self) -> &Transport {
        &self.transport
    }
}
