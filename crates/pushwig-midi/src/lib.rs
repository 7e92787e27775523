//! MIDI input adapter for the pushwig surface engine
//!
//! This crate provides:
//! - A YAML control map from MIDI addresses to surface controls, with the
//!   layout of a first generation Ableton Push built in
//! - MIDI message parsing via midly and relative encoder decoding
//! - A flume bridge from the MIDI driver callback into the engine
//!
//! # Architecture
//!
//! ```text
//! MIDI driver callback → MidiDecoder → flume channel → Controller::tick
//! ```
//!
//! Port discovery and the transport itself belong to the host; this crate
//! only needs the raw bytes of each message.

mod bridge;
mod config;
mod decode;

pub use bridge::MidiBridge;
pub use config::{
    default_control_map_path, load_control_map, save_control_map, ControlMap, ControlMapping,
    ControlTarget, EncoderMode, MidiAddress,
};
pub use decode::{encoder_to_delta, MidiDecoder, MidiInputEvent};

use pushwig_core::SurfaceError;

/// Error type for control map and bridge operations
#[derive(Debug, thiserror::Error)]
pub enum MidiMapError {
    #[error("MIDI address out of range: channel {channel}, number {number}")]
    InvalidAddress { channel: u8, number: u8 },

    #[error("MIDI address mapped twice: {0:?}")]
    DuplicateAddress(MidiAddress),

    #[error("Invalid control: {0}")]
    Control(#[from] SurfaceError),

    #[error("Engine input channel is closed")]
    Disconnected,
}
