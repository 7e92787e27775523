//! Surface output
//!
//! [`Surface`] is the write side of the hardware: display cells, button LEDs
//! and pad LEDs. The engine rewrites the complete surface state every tick;
//! turning that into the few hardware messages that actually changed is the
//! job of [`DiffSurface`], which wraps any surface with last-written-value
//! tracking.
//!
//! [`Frame`] is an in-memory surface holding the latest state, used for
//! offline runs and tests.

use crate::types::{ButtonId, Color, DISPLAY_ROWS, KNOB_COUNT, PAD_COUNT};
use std::collections::HashMap;
use std::hash::Hash;

/// Cells spanned by one display block
pub const CELLS_PER_BLOCK: usize = 2;

/// Write access to the physical surface
pub trait Surface {
    /// Write one display cell (row 0-3, column 0-7)
    fn set_cell(&mut self, row: usize, column: usize, text: &str);
    /// Write a block spanning two cells (row 0-3, block 0-3)
    fn set_block(&mut self, row: usize, block: usize, text: &str);
    fn update_button(&mut self, id: ButtonId, color: Color);
    fn update_pad(&mut self, index: usize, color: Color);
    /// End of a render pass
    fn flush(&mut self) {}
}

/// Remembers the last value written per key to skip redundant writes
///
/// Used by [`DiffSurface`] for cells, buttons and pads.
pub struct ChangeTracker<K, V> {
    last_values: HashMap<K, V>,
}

impl<K: Eq + Hash, V: PartialEq> ChangeTracker<K, V> {
    pub fn new() -> Self {
        Self {
            last_values: HashMap::new(),
        }
    }

    /// Check if value has changed and update tracker
    ///
    /// Returns `true` if the value changed (should send), `false` if unchanged.
    pub fn update(&mut self, key: K, value: V) -> bool {
        if self.last_values.get(&key) == Some(&value) {
            false
        } else {
            self.last_values.insert(key, value);
            true
        }
    }

    /// Forget one key so its next write goes through
    pub fn invalidate(&mut self, key: &K) {
        self.last_values.remove(key);
    }

    /// Clear all tracked state
    pub fn clear(&mut self) {
        self.last_values.clear();
    }
}

impl<K: Eq + Hash> ChangeTracker<K, String> {
    /// Text variant of [`update`](Self::update) that reuses the stored buffer
    pub fn update_text(&mut self, key: K, text: &str) -> bool {
        match self.last_values.get_mut(&key) {
            Some(last) if last.as_str() == text => false,
            Some(last) => {
                last.clear();
                last.push_str(text);
                true
            }
            None => {
                self.last_values.insert(key, text.to_string());
                true
            }
        }
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for ChangeTracker<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Text address on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TextKey {
    Cell(usize, usize),
    Block(usize, usize),
}

/// Forwards only changed values to the wrapped surface
pub struct DiffSurface<S> {
    inner: S,
    text: ChangeTracker<TextKey, String>,
    buttons: ChangeTracker<ButtonId, Color>,
    pads: ChangeTracker<usize, Color>,
}

impl<S: Surface> DiffSurface<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            text: ChangeTracker::new(),
            buttons: ChangeTracker::new(),
            pads: ChangeTracker::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Forget everything written so the next pass repaints the whole surface
    ///
    /// Needed after the hardware was reset or reconnected.
    pub fn invalidate(&mut self) {
        self.text.clear();
        self.buttons.clear();
        self.pads.clear();
    }
}

impl<S: Surface> Surface for DiffSurface<S> {
    fn set_cell(&mut self, row: usize, column: usize, text: &str) {
        if self.text.update_text(TextKey::Cell(row, column), text) {
            // The enclosing block no longer shows what was tracked for it
            self.text.invalidate(&TextKey::Block(row, column / CELLS_PER_BLOCK));
            self.inner.set_cell(row, column, text);
        }
    }

    fn set_block(&mut self, row: usize, block: usize, text: &str) {
        if self.text.update_text(TextKey::Block(row, block), text) {
            for column in block * CELLS_PER_BLOCK..(block + 1) * CELLS_PER_BLOCK {
                self.text.invalidate(&TextKey::Cell(row, column));
            }
            self.inner.set_block(row, block, text);
        }
    }

    fn update_button(&mut self, id: ButtonId, color: Color) {
        if self.buttons.update(id, color) {
            self.inner.update_button(id, color);
        }
    }

    fn update_pad(&mut self, index: usize, color: Color) {
        if self.pads.update(index, color) {
            self.inner.update_pad(index, color);
        }
    }

    fn flush(&mut self) {
        self.inner.flush();
    }
}

/// In-memory surface state
#[derive(Debug, Clone)]
pub struct Frame {
    cells: [[String; KNOB_COUNT]; DISPLAY_ROWS],
    buttons: HashMap<ButtonId, Color>,
    pads: [Color; PAD_COUNT],
    /// Number of write calls received
    pub writes: usize,
    /// Number of completed render passes
    pub flushes: usize,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            cells: Default::default(),
            buttons: HashMap::new(),
            pads: [Color::Off; PAD_COUNT],
            writes: 0,
            flushes: 0,
        }
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// One display row as its eight cells
    pub fn row(&self, row: usize) -> Vec<&str> {
        (0..KNOB_COUNT).map(|c| self.cell(row, c)).collect()
    }

    pub fn button(&self, id: ButtonId) -> Color {
        self.buttons.get(&id).copied().unwrap_or_default()
    }

    pub fn pad(&self, index: usize) -> Color {
        self.pads.get(index).copied().unwrap_or_default()
    }
}

impl Surface for Frame {
    fn set_cell(&mut self, row: usize, column: usize, text: &str) {
        self.writes += 1;
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            cell.clear();
            cell.push_str(text);
        }
    }

    fn set_block(&mut self, row: usize, block: usize, text: &str) {
        self.writes += 1;
        let first = block * CELLS_PER_BLOCK;
        if let Some(cells) = self.cells.get_mut(row) {
            for (offset, cell) in cells.iter_mut().skip(first).take(CELLS_PER_BLOCK).enumerate() {
                cell.clear();
                if offset == 0 {
                    cell.push_str(text);
                }
            }
        }
    }

    fn update_button(&mut self, id: ButtonId, color: Color) {
        self.writes += 1;
        self.buttons.insert(id, color);
    }

    fn update_pad(&mut self, index: usize, color: Color) {
        self.writes += 1;
        if let Some(pad) = self.pads.get_mut(index) {
            *pad = color;
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_tracker() {
        let mut tracker = ChangeTracker::new();

        // First update should always go through
        assert!(tracker.update(ButtonId::Shift, Color::WhiteHi));

        // Same value is suppressed
        assert!(!tracker.update(ButtonId::Shift, Color::WhiteHi));

        // Different value goes through
        assert!(tracker.update(ButtonId::Shift, Color::Off));
    }

    #[test]
    fn test_text_tracker() {
        let mut tracker: ChangeTracker<u8, String> = ChangeTracker::new();
        assert!(tracker.update_text(0, "Volume"));
        assert!(!tracker.update_text(0, "Volume"));
        assert!(tracker.update_text(0, "Pan"));
        tracker.invalidate(&0);
        assert!(tracker.update_text(0, "Pan"));
    }

    #[test]
    fn test_diff_surface_suppresses_repeats() {
        let mut surface = DiffSurface::new(Frame::new());
        surface.set_cell(0, 0, "Volume");
        surface.set_cell(0, 0, "Volume");
        surface.update_button(ButtonId::Mute, Color::YellowLo);
        surface.update_button(ButtonId::Mute, Color::YellowLo);
        surface.update_pad(3, Color::GreenHi);
        surface.update_pad(3, Color::GreenHi);
        assert_eq!(surface.inner().writes, 3);

        surface.invalidate();
        surface.set_cell(0, 0, "Volume");
        assert_eq!(surface.inner().writes, 4);
    }

    #[test]
    fn test_diff_surface_block_and_cell_interplay() {
        let mut surface = DiffSurface::new(Frame::new());
        surface.set_cell(1, 0, "A");
        surface.set_block(1, 0, "Please select a track...");
        assert_eq!(surface.inner().cell(1, 0), "Please select a track...");
        assert_eq!(surface.inner().cell(1, 1), "");

        // Writing the same cell text again must reach hardware: the block overwrote it
        surface.set_cell(1, 0, "A");
        assert_eq!(surface.inner().cell(1, 0), "A");
        surface.set_block(1, 0, "Please select a track...");
        assert_eq!(surface.inner().cell(1, 0), "Please select a track...");
    }

    #[test]
    fn test_frame_ignores_out_of_range() {
        let mut frame = Frame::new();
        frame.set_cell(9, 9, "x");
        frame.update_pad(99, Color::RedHi);
        assert_eq!(frame.cell(9, 9), "");
        assert_eq!(frame.pad(99), Color::Off);
        assert_eq!(frame.button(ButtonId::Shift), Color::Off);
    }
}
