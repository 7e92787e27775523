//! MIDI callback → engine bridge
//!
//! The host's MIDI driver calls back on its own thread. [`MidiBridge`] decodes
//! there and forwards the result through the engine's flume sender; the
//! engine drains it on its next tick.

use crate::config::ControlMap;
use crate::decode::MidiDecoder;
use crate::MidiMapError;
use flume::Sender;
use pushwig_core::RawEvent;

pub struct MidiBridge {
    decoder: MidiDecoder,
    sender: Sender<RawEvent>,
    forwarded: u64,
    ignored: u64,
}

impl MidiBridge {
    pub fn new(decoder: MidiDecoder, sender: Sender<RawEvent>) -> Self {
        Self {
            decoder,
            sender,
            forwarded: 0,
            ignored: 0,
        }
    }

    /// Build the decoder from `map` and bridge into `sender`
    pub fn from_map(map: &ControlMap, sender: Sender<RawEvent>) -> Result<Self, MidiMapError> {
        Ok(Self::new(MidiDecoder::new(map)?, sender))
    }

    /// Decode one message and forward it
    ///
    /// Returns whether an event was forwarded.
    pub fn handle(&mut self, data: &[u8]) -> Result<bool, MidiMapError> {
        let Some(event) = self.decoder.decode(data) else {
            self.ignored += 1;
            return Ok(false);
        };
        self.sender
            .send(event)
            .map_err(|_| MidiMapError::Disconnected)?;
        self.forwarded += 1;
        Ok(true)
    }

    /// Callback in the shape MIDI input drivers expect (`timestamp, bytes, data`)
    ///
    /// Must be fast and non-blocking; the engine channel is unbounded.
    pub fn midi_callback(_timestamp: u64, data: &[u8], bridge: &mut Self) {
        if let Err(e) = bridge.handle(data) {
            log::warn!("midi_callback: Dropping {:02X?}: {}", data, e);
        }
    }

    pub fn decoder(&self) -> &MidiDecoder {
        &self.decoder
    }

    /// Number of messages forwarded to the engine
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Number of messages with no mapping
    pub fn ignored(&self) -> u64 {
        self.ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushwig_core::{Controller, Frame, MemoryDaw, ModeId, ParameterId, DawCall, Settings};
    use std::time::Instant;

    #[test]
    fn test_bridge_drives_engine() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut engine =
            Controller::new(MemoryDaw::with_tracks(4, 2), Frame::new(), Settings::default()).unwrap();
        engine.activate_defaults(Instant::now()).unwrap();
        let mut bridge = MidiBridge::from_map(&ControlMap::push(), engine.input_sender()).unwrap();

        let thread = std::thread::spawn(move || {
            // Volume button press and release, then turn knob 2 one step left
            MidiBridge::midi_callback(0, &[0xB0, 114, 127], &mut bridge);
            MidiBridge::midi_callback(1, &[0xB0, 114, 0], &mut bridge);
            MidiBridge::midi_callback(2, &[0xB0, 73, 127], &mut bridge);
            // Aftertouch is not mapped
            MidiBridge::midi_callback(3, &[0xA0, 36, 20], &mut bridge);
            bridge
        });
        let bridge = thread.join().unwrap();
        assert_eq!(bridge.forwarded(), 3);
        assert_eq!(bridge.ignored(), 1);

        engine.tick(Instant::now()).unwrap();
        assert_eq!(engine.active_mode(), Some(ModeId::Volume));
        assert!(matches!(
            engine.daw().calls.last(),
            Some(DawCall::ChangeParameter(ParameterId::Volume { track: 2 }, delta)) if *delta < 0.0
        ));
    }

    #[test]
    fn test_closed_engine_reports_disconnect() {
        let (tx, rx) = flume::unbounded();
        let mut bridge = MidiBridge::from_map(&ControlMap::push(), tx).unwrap();
        drop(rx);
        assert!(matches!(
            bridge.handle(&[0xB0, 49, 127]),
            Err(MidiMapError::Disconnected)
        ));
        // Unmapped messages never touch the channel
        assert!(!bridge.handle(&[0xB0, 3, 1]).unwrap());
    }
}
