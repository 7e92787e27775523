//! Chromatic note grid
//!
//! Rows are a fourth apart (five semitones), columns a semitone. The bottom
//! left pad plays C at the current octave. Pads whose note would fall outside
//! 0-127 stay dark and silent.

use super::{NoteInput, View, ViewId};
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::types::{Color, PAD_COLUMNS, PAD_COUNT};

/// Note of the bottom left pad at octave 0 (C1)
const BASE_NOTE: i32 = 36;
const ROW_INTERVAL: i32 = 5;
const MIN_OCTAVE: i8 = -3;
const MAX_OCTAVE: i8 = 5;

pub struct PlayView {
    octave: i8,
    /// Notes currently sounding, so octave changes and deactivation can release them
    held: [Option<u8>; PAD_COUNT],
}

impl PlayView {
    pub fn new() -> Self {
        Self {
            octave: 0,
            held: [None; PAD_COUNT],
        }
    }

    /// MIDI note for a pad at the current octave
    pub fn note_for_pad(&self, index: usize) -> Option<u8> {
        if index >= PAD_COUNT {
            return None;
        }
        let row = (index / PAD_COLUMNS) as i32;
        let column = (index % PAD_COLUMNS) as i32;
        let note = BASE_NOTE + i32::from(self.octave) * 12 + row * ROW_INTERVAL + column;
        u8::try_from(note).ok().filter(|n| *n <= 127)
    }

    fn release_all(&mut self, ctx: &mut Context<'_>) {
        for slot in self.held.iter_mut() {
            if let Some(note) = slot.take() {
                ctx.daw.play_note(note, 0);
            }
        }
    }
}

impl Default for PlayView {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for PlayView {
    fn on_deactivate(&mut self, ctx: &mut Context<'_>) {
        self.release_all(ctx);
    }
}

impl View for PlayView {
    fn id(&self) -> ViewId {
        ViewId::Play
    }

    fn on_pad(&mut self, index: usize, velocity: u8, ctx: &mut Context<'_>) {
        if velocity == 0 {
            // Release the note that was struck, even if the octave moved since
            if let Some(note) = self.held.get_mut(index).and_then(Option::take) {
                ctx.daw.play_note(note, 0);
            }
            return;
        }
        let Some(note) = self.note_for_pad(index) else {
            return;
        };
        if let Some(previous) = self.held[index].replace(note) {
            ctx.daw.play_note(previous, 0);
        }
        ctx.daw.play_note(note, velocity);
    }

    fn pad_color(&self, index: usize, _ctx: &RenderContext<'_>) -> Color {
        if self.held.get(index).is_some_and(Option::is_some) {
            return Color::GreenHi;
        }
        match self.note_for_pad(index) {
            Some(note) if note % 12 == 0 => Color::BlueHi,
            Some(_) => Color::WhiteLo,
            None => Color::Off,
        }
    }

    fn as_note_input(&mut self) -> Option<&mut dyn NoteInput> {
        Some(self)
    }
}

impl NoteInput for PlayView {
    fn octave_up(&mut self) -> bool {
        if self.octave >= MAX_OCTAVE {
            return false;
        }
        self.octave += 1;
        true
    }

    fn octave_down(&mut self) -> bool {
        if self.octave <= MIN_OCTAVE {
            return false;
        }
        self.octave -= 1;
        true
    }

    fn octave(&self) -> i8 {
        self.octave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let view = PlayView::new();
        assert_eq!(view.note_for_pad(0), Some(36));
        assert_eq!(view.note_for_pad(1), Some(37));
        // One row up is a fourth
        assert_eq!(view.note_for_pad(8), Some(41));
        assert_eq!(view.note_for_pad(63), Some(36 + 7 * 5 + 7));
        assert_eq!(view.note_for_pad(64), None);
    }

    #[test]
    fn test_octave_limits() {
        let mut view = PlayView::new();
        while view.octave_up() {}
        assert_eq!(view.octave(), MAX_OCTAVE);
        // Top rows run past 127
        assert_eq!(view.note_for_pad(63), None);
        assert!(view.note_for_pad(0).is_some());

        while view.octave_down() {}
        assert_eq!(view.octave(), MIN_OCTAVE);
        assert_eq!(view.note_for_pad(0), Some(0));
    }
}
