//! Modes: what the knobs, the two button rows and the display do
//!
//! Exactly one mode is active at a time. The controller routes knob, knob
//! touch, row button and page button events to it, and asks it for row
//! button colours and display content on every render pass.
//!
//! Modes never switch modes themselves. They queue a
//! [`Request`](crate::Request) on the context and the controller applies it
//! after the callback returns.

mod add_track;
mod device;
mod mixer;
mod track;
mod track_rows;

pub use add_track::AddTrackMode;
pub use device::DeviceMode;
pub use mixer::MixerMode;
pub use track::TrackMode;
pub use track_rows::{last_send_is_accessible, TrackRows};

use crate::context::{Context, RenderContext};
use crate::dispatch::{Dispatcher, Lifecycle};
use crate::input::ButtonState;
use crate::registry::RegistryError;
use crate::surface::Surface;
use crate::types::{ButtonId, Color};
use serde::{Deserialize, Serialize};

/// Number of send modes registered (sends past this are not selectable)
pub const SEND_MODES: usize = 16;

/// Identity of a mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeId {
    Volume,
    Pan,
    /// Send level of absolute send `n` across the track bank
    Send(u8),
    Track,
    Device,
    AddTrack,
}

impl ModeId {
    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Volume => "Volume",
            Self::Pan => "Pan",
            Self::Send(_) => "Send",
            Self::Track => "Track",
            Self::Device => "Device",
            Self::AddTrack => "Add Track",
        }
    }

    /// Volume, pan and send modes share the mode-menu lit state of Pan/Send
    pub fn is_pan_or_send(&self) -> bool {
        matches!(self, Self::Pan | Self::Send(_))
    }
}

/// A surface mode
///
/// Every input hook defaults to doing nothing so modes only implement what
/// they use.
pub trait Mode: Lifecycle {
    fn id(&self) -> ModeId;

    fn on_knob_value(&mut self, _index: usize, _delta: i32, _ctx: &mut Context<'_>) {}

    fn on_knob_touch(&mut self, _index: usize, _touched: bool, _ctx: &mut Context<'_>) {}

    /// Upper row button event (index 0-7)
    fn on_first_row(&mut self, _index: usize, _event: &ButtonState, _ctx: &mut Context<'_>) {}

    /// Lower row button event (index 0-7)
    fn on_second_row(&mut self, _index: usize, _event: &ButtonState, _ctx: &mut Context<'_>) {}

    /// Page left / right
    fn on_page(&mut self, _forward: bool, _ctx: &mut Context<'_>) {}

    /// Colour of a mode-owned button (rows and page buttons)
    ///
    /// Must be a pure function of mode state and the model: same inputs,
    /// same colour.
    fn button_color(&self, button: ButtonId, ctx: &RenderContext<'_>) -> Color;

    /// Write the display
    fn render(&mut self, ctx: &RenderContext<'_>, surface: &mut dyn Surface);
}

/// Register every built-in mode
pub fn register_modes(modes: &mut Dispatcher<ModeId, dyn Mode>) -> Result<(), RegistryError> {
    modes.register(ModeId::Volume, Box::new(MixerMode::volume()))?;
    modes.register(ModeId::Pan, Box::new(MixerMode::pan()))?;
    for send in 0..SEND_MODES {
        modes.register(ModeId::Send(send as u8), Box::new(MixerMode::send(send)))?;
    }
    modes.register(ModeId::Track, Box::new(TrackMode::new()))?;
    modes.register(ModeId::Device, Box::new(DeviceMode::new()))?;
    modes.register(ModeId::AddTrack, Box::new(AddTrackMode::new()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_id_serde() {
        let parsed: ModeId = serde_yaml::from_str("add_track").unwrap();
        assert_eq!(parsed, ModeId::AddTrack);
        let yaml = serde_yaml::to_string(&ModeId::Send(2)).unwrap();
        assert_eq!(serde_yaml::from_str::<ModeId>(&yaml).unwrap(), ModeId::Send(2));
    }

    #[test]
    fn test_register_modes() {
        let mut modes: Dispatcher<ModeId, dyn Mode> = Dispatcher::new("mode");
        register_modes(&mut modes).unwrap();
        assert!(modes.contains(ModeId::Send(0)));
        assert!(modes.contains(ModeId::Send(SEND_MODES as u8 - 1)));
        assert!(modes.get(ModeId::AddTrack).unwrap().is_transient());
        assert!(!modes.get(ModeId::Track).unwrap().is_transient());
        assert!(matches!(
            register_modes(&mut modes),
            Err(RegistryError::Duplicate(_))
        ));
    }
}
