//! Control map: which MIDI message drives which surface control
//!
//! Stored as YAML:
//!
//! ```yaml
//! mappings:
//!   - midi: { type: control_change, channel: 0, number: 71 }
//!     control: { type: knob, index: 0 }
//!   - midi: { type: note, channel: 0, number: 0 }
//!     control: { type: knob_touch, index: 0 }
//!   - midi: { type: control_change, channel: 0, number: 49 }
//!     control: { type: button, button: shift }
//! ```
//!
//! [`ControlMap::push`] is the built-in layout of an Ableton Push (first
//! generation) in its user port configuration.

use crate::MidiMapError;
use pushwig_core::{check_index, ButtonId, KNOB_COUNT, PAD_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// MIDI message address (Note or CC)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MidiAddress {
    /// Note On/Off message
    Note {
        /// MIDI channel (0-15)
        channel: u8,
        /// Note number (0-127)
        number: u8,
    },
    /// Control Change message
    ControlChange {
        /// MIDI channel (0-15)
        channel: u8,
        /// CC number (0-127)
        number: u8,
    },
}

impl MidiAddress {
    pub fn note(channel: u8, number: u8) -> Self {
        Self::Note { channel, number }
    }

    pub fn cc(channel: u8, number: u8) -> Self {
        Self::ControlChange { channel, number }
    }

    pub fn channel(&self) -> u8 {
        match self {
            Self::Note { channel, .. } | Self::ControlChange { channel, .. } => *channel,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::Note { number, .. } | Self::ControlChange { number, .. } => *number,
        }
    }

    fn validate(&self) -> Result<(), MidiMapError> {
        if self.channel() > 15 || self.number() > 127 {
            return Err(MidiMapError::InvalidAddress {
                channel: self.channel(),
                number: self.number(),
            });
        }
        Ok(())
    }
}

/// Surface control a message is routed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlTarget {
    /// Any non-row button
    Button { button: ButtonId },
    /// Upper button row (0-7)
    FirstRow { index: u8 },
    /// Lower button row (0-7)
    SecondRow { index: u8 },
    /// Relative encoder (0-7)
    Knob { index: usize },
    /// Capacitive touch line of an encoder (0-7)
    KnobTouch { index: usize },
    /// Velocity-sensitive pad (0-63, bottom left first)
    Pad { index: usize },
}

impl ControlTarget {
    fn validate(&self) -> Result<(), MidiMapError> {
        match *self {
            Self::Button { button } => {
                if let Some(index) = button.row_index() {
                    check_index(index, KNOB_COUNT)?;
                }
            }
            Self::FirstRow { index } | Self::SecondRow { index } => {
                check_index(index as usize, KNOB_COUNT)?;
            }
            Self::Knob { index } | Self::KnobTouch { index } => {
                check_index(index, KNOB_COUNT)?;
            }
            Self::Pad { index } => {
                check_index(index, PAD_COUNT)?;
            }
        }
        Ok(())
    }
}

/// How a relative encoder encodes its movement in the CC value
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncoderMode {
    /// 1-63 = clockwise, 65-127 = counter-clockwise as value - 128 (Push)
    #[default]
    TwosComplement,
    /// 1-63 = clockwise, 65-127 = counter-clockwise as -(value - 64)
    SignMagnitude,
    /// Signed around 64: <64 = counter-clockwise, >64 = clockwise
    Offset,
}

/// One message-to-control entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlMapping {
    pub midi: MidiAddress,
    pub control: ControlTarget,
    /// Only meaningful for knobs
    #[serde(default, skip_serializing_if = "is_default_encoder")]
    pub encoder: EncoderMode,
}

fn is_default_encoder(mode: &EncoderMode) -> bool {
    *mode == EncoderMode::default()
}

impl ControlMapping {
    pub fn new(midi: MidiAddress, control: ControlTarget) -> Self {
        Self {
            midi,
            control,
            encoder: EncoderMode::default(),
        }
    }
}

/// Complete control map for one device
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ControlMap {
    #[serde(default)]
    pub mappings: Vec<ControlMapping>,
}

impl ControlMap {
    /// Check every address and control index, and that no address is used twice
    pub fn validate(&self) -> Result<(), MidiMapError> {
        let mut seen = HashSet::new();
        for mapping in &self.mappings {
            mapping.midi.validate()?;
            mapping.control.validate()?;
            if !seen.insert(mapping.midi) {
                return Err(MidiMapError::DuplicateAddress(mapping.midi));
            }
        }
        Ok(())
    }

    /// Built-in layout of a first generation Ableton Push (user port)
    pub fn push() -> Self {
        let mut mappings = Vec::new();
        let mut add = |midi, control| mappings.push(ControlMapping::new(midi, control));

        for i in 0..KNOB_COUNT {
            add(MidiAddress::cc(0, 71 + i as u8), ControlTarget::Knob { index: i });
            add(MidiAddress::note(0, i as u8), ControlTarget::KnobTouch { index: i });
            add(MidiAddress::cc(0, 20 + i as u8), ControlTarget::FirstRow { index: i as u8 });
            add(MidiAddress::cc(0, 102 + i as u8), ControlTarget::SecondRow { index: i as u8 });
        }
        for i in 0..PAD_COUNT {
            add(MidiAddress::note(0, 36 + i as u8), ControlTarget::Pad { index: i });
        }

        let buttons = [
            (49, ButtonId::Shift),
            (118, ButtonId::Delete),
            (88, ButtonId::Duplicate),
            (86, ButtonId::Record),
            (61, ButtonId::Solo),
            (60, ButtonId::Mute),
            (29, ButtonId::StopClip),
            (114, ButtonId::Volume),
            (115, ButtonId::PanSend),
            (112, ButtonId::Track),
            (110, ButtonId::Device),
            (53, ButtonId::AddTrack),
            (51, ButtonId::Session),
            (50, ButtonId::Note),
            (44, ButtonId::Left),
            (45, ButtonId::Right),
            (46, ButtonId::Up),
            (47, ButtonId::Down),
            (62, ButtonId::PageLeft),
            (63, ButtonId::PageRight),
            (55, ButtonId::OctaveUp),
            (54, ButtonId::OctaveDown),
        ];
        for (cc, button) in buttons {
            add(MidiAddress::cc(0, cc), ControlTarget::Button { button });
        }

        Self { mappings }
    }
}

/// Get the default control map path
///
/// Returns `~/.config/pushwig/control-map.yaml`
pub fn default_control_map_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pushwig")
        .join("control-map.yaml")
}

/// Load a control map from a YAML file
///
/// Falls back to the built-in Push layout if the file is missing, unreadable,
/// unparsable or invalid.
pub fn load_control_map(path: &Path) -> ControlMap {
    log::info!("load_control_map: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_control_map: Control map doesn't exist, using the Push layout");
        return ControlMap::push();
    }

    let map = match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<ControlMap>(&contents) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("load_control_map: Failed to parse control map: {}", e);
                return ControlMap::push();
            }
        },
        Err(e) => {
            log::warn!("load_control_map: Failed to read control map: {}", e);
            return ControlMap::push();
        }
    };

    match map.validate() {
        Ok(()) => {
            log::info!("load_control_map: Loaded {} mappings", map.mappings.len());
            map
        }
        Err(e) => {
            log::warn!("load_control_map: Invalid control map: {}", e);
            ControlMap::push()
        }
    }
}

/// Save a control map to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_control_map(map: &ControlMap, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_control_map: Saving {} mappings to {:?}", map.mappings.len(), path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create control map directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(map).context("Failed to serialize control map to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write control map: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_layout_is_valid() {
        let map = ControlMap::push();
        map.validate().unwrap();
        // 8 knobs, 8 touches, 16 row buttons, 64 pads, 22 other buttons
        assert_eq!(map.mappings.len(), 8 + 8 + 16 + 64 + 22);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
mappings:
  - midi: { type: control_change, channel: 0, number: 71 }
    control: { type: knob, index: 0 }
    encoder: sign_magnitude
  - midi: { type: note, channel: 1, number: 36 }
    control: { type: pad, index: 0 }
  - midi: { type: control_change, channel: 0, number: 49 }
    control: { type: button, button: shift }
"#;
        let map: ControlMap = serde_yaml::from_str(yaml).unwrap();
        map.validate().unwrap();
        assert_eq!(map.mappings[0].encoder, EncoderMode::SignMagnitude);
        assert_eq!(map.mappings[1].midi, MidiAddress::note(1, 36));
        assert_eq!(map.mappings[1].encoder, EncoderMode::TwosComplement);
        assert_eq!(
            map.mappings[2].control,
            ControlTarget::Button { button: ButtonId::Shift }
        );
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let duplicate = ControlMap {
            mappings: vec![
                ControlMapping::new(MidiAddress::cc(0, 71), ControlTarget::Knob { index: 0 }),
                ControlMapping::new(MidiAddress::cc(0, 71), ControlTarget::Knob { index: 1 }),
            ],
        };
        assert!(matches!(
            duplicate.validate(),
            Err(MidiMapError::DuplicateAddress(_))
        ));

        let out_of_range = ControlMap {
            mappings: vec![ControlMapping::new(
                MidiAddress::note(0, 36),
                ControlTarget::Pad { index: 64 },
            )],
        };
        assert!(matches!(out_of_range.validate(), Err(MidiMapError::Control(_))));

        let bad_channel = ControlMap {
            mappings: vec![ControlMapping::new(
                MidiAddress::note(16, 36),
                ControlTarget::Pad { index: 0 },
            )],
        };
        assert!(matches!(
            bad_channel.validate(),
            Err(MidiMapError::InvalidAddress { channel: 16, .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("control-map.yaml");

        let mut map = ControlMap::default();
        map.mappings.push(ControlMapping::new(
            MidiAddress::cc(2, 10),
            ControlTarget::SecondRow { index: 3 },
        ));
        save_control_map(&map, &path).unwrap();

        assert_eq!(load_control_map(&path), map);
    }

    #[test]
    fn test_load_falls_back_to_push() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_control_map(&dir.path().join("missing.yaml")), ControlMap::push());

        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "mappings: [ { midi: 3 } ]").unwrap();
        assert_eq!(load_control_map(&path), ControlMap::push());
    }
}
