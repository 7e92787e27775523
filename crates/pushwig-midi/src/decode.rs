//! Raw MIDI bytes → surface control events
//!
//! Bytes are parsed with midly into a [`MidiInputEvent`], then routed through
//! the control map to a [`RawEvent`] the engine understands. Messages with no
//! mapping (aftertouch, clock, unmapped notes) are dropped.

use crate::config::{ControlMap, ControlTarget, EncoderMode, MidiAddress};
use crate::MidiMapError;
use midly::live::LiveEvent;
use midly::MidiMessage;
use pushwig_core::{ButtonId, RawEvent};
use std::collections::HashMap;

/// Channel message relevant to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiInputEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, cc: u8, value: u8 },
}

impl MidiInputEvent {
    /// Parse one complete MIDI message
    ///
    /// Note On with velocity 0 is treated as Note Off.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let event = match LiveEvent::parse(data) {
            Ok(event) => event,
            Err(e) => {
                log::debug!("parse: Ignoring malformed message {:02X?}: {}", data, e);
                return None;
            }
        };
        let LiveEvent::Midi { channel, message } = event else {
            return None;
        };
        let channel = channel.as_int();

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Some(Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: 0,
            }),
            MidiMessage::NoteOn { key, vel } => Some(Self::NoteOn {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::NoteOff { key, vel } => Some(Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::Controller { controller, value } => Some(Self::ControlChange {
                channel,
                cc: controller.as_int(),
                value: value.as_int(),
            }),
            _ => None,
        }
    }

    pub fn address(&self) -> MidiAddress {
        match *self {
            Self::NoteOn { channel, note, .. } | Self::NoteOff { channel, note, .. } => {
                MidiAddress::note(channel, note)
            }
            Self::ControlChange { channel, cc, .. } => MidiAddress::cc(channel, cc),
        }
    }

    /// Velocity for notes, value for CC
    pub fn value(&self) -> u8 {
        match *self {
            Self::NoteOn { velocity, .. } | Self::NoteOff { velocity, .. } => velocity,
            Self::ControlChange { value, .. } => value,
        }
    }

    /// Note On, or a CC in the upper half
    pub fn is_press(&self) -> bool {
        match *self {
            Self::NoteOn { velocity, .. } => velocity > 0,
            Self::ControlChange { value, .. } => value > 63,
            Self::NoteOff { .. } => false,
        }
    }
}

/// Convert a relative encoder CC value to signed steps
pub fn encoder_to_delta(value: u8, mode: EncoderMode) -> i32 {
    let value = i32::from(value & 0x7F);
    match mode {
        EncoderMode::TwosComplement => {
            if value < 64 {
                value
            } else {
                value - 128
            }
        }
        EncoderMode::SignMagnitude => {
            if value < 64 {
                value
            } else {
                -(value - 64)
            }
        }
        EncoderMode::Offset => value - 64,
    }
}

#[derive(Debug, Clone, Copy)]
struct Route {
    control: ControlTarget,
    encoder: EncoderMode,
}

/// Control-map lookup from MIDI address to surface control
#[derive(Debug, Clone)]
pub struct MidiDecoder {
    routes: HashMap<MidiAddress, Route>,
}

impl MidiDecoder {
    /// Build the lookup from a validated map
    pub fn new(map: &ControlMap) -> Result<Self, MidiMapError> {
        map.validate()?;
        let routes = map
            .mappings
            .iter()
            .map(|m| {
                (
                    m.midi,
                    Route {
                        control: m.control,
                        encoder: m.encoder,
                    },
                )
            })
            .collect();
        Ok(Self { routes })
    }

    /// Parse and route raw bytes
    pub fn decode(&self, data: &[u8]) -> Option<RawEvent> {
        self.route(MidiInputEvent::parse(data)?)
    }

    /// Route a parsed message
    pub fn route(&self, event: MidiInputEvent) -> Option<RawEvent> {
        let Some(route) = self.routes.get(&event.address()) else {
            log::trace!("route: Unmapped {:?}", event);
            return None;
        };

        let raw = match route.control {
            ControlTarget::Button { button } => RawEvent::Button {
                id: button,
                pressed: event.is_press(),
            },
            ControlTarget::FirstRow { index } => RawEvent::Button {
                id: ButtonId::Row1(index),
                pressed: event.is_press(),
            },
            ControlTarget::SecondRow { index } => RawEvent::Button {
                id: ButtonId::Row2(index),
                pressed: event.is_press(),
            },
            ControlTarget::Knob { index } => {
                // Encoders only turn through CC
                let MidiInputEvent::ControlChange { value, .. } = event else {
                    return None;
                };
                let delta = encoder_to_delta(value, route.encoder);
                if delta == 0 {
                    return None;
                }
                RawEvent::Knob { index, delta }
            }
            ControlTarget::KnobTouch { index } => RawEvent::KnobTouch {
                index,
                touched: event.is_press(),
            },
            ControlTarget::Pad { index } => RawEvent::Pad {
                index,
                velocity: if event.is_press() { event.value() } else { 0 },
            },
        };
        Some(raw)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
