//! Render helpers shared by every mode and view
//!
//! Render output must be a pure function of mode state and the DAW snapshot:
//! no frame counters, no blinking driven by hidden state. Two helpers recur
//! across all channel-strip-like rows and are defined once here:
//!
//! - [`channel_strip_color`]: off / armed red / unarmed orange-yellow, with a
//!   bright variant for the selected slot.
//! - [`MenuItems`]: the eight `(label, selected)` pairs of a soft-menu row,
//!   rewritten in place every tick without reallocating.

use crate::model::Transport;
use crate::types::{Color, KNOB_COUNT};
use std::fmt::Write;

/// Colour of a channel-strip button (track select row and friends)
///
/// - does not exist → off
/// - armed → red, bright when selected
/// - not armed → yellow dim, orange bright when selected
pub fn channel_strip_color(exists: bool, armed: bool, selected: bool) -> Color {
    if !exists {
        Color::Off
    } else if armed {
        Color::intensity(Color::RedLo, Color::RedHi, selected)
    } else {
        Color::intensity(Color::YellowLo, Color::OrangeHi, selected)
    }
}

/// Colour of a menu button: lit when it exists, bright when selected
pub fn menu_color(exists: bool, selected: bool) -> Color {
    if !exists {
        Color::Off
    } else {
        Color::intensity(Color::WhiteLo, Color::WhiteHi, selected)
    }
}

/// Colour of the Record button
///
/// Held wins so the chord reads back; otherwise red while the transport
/// records, dim red while it plays.
pub fn record_color(transport: &Transport, held: bool) -> Color {
    if held {
        Color::WhiteHi
    } else if transport.recording {
        Color::RedHi
    } else if transport.playing {
        Color::RedLo
    } else {
        Color::WhiteLo
    }
}

/// One soft-menu entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub selected: bool,
}

impl MenuItem {
    /// Overwrite in place, keeping the label's allocation
    pub fn set(&mut self, label: &str, selected: bool) {
        self.label.clear();
        self.label.push_str(label);
        self.selected = selected;
    }

    /// Overwrite with formatted text, keeping the label's allocation
    pub fn set_fmt(&mut self, args: std::fmt::Arguments<'_>, selected: bool) {
        self.label.clear();
        // Only a failing Display impl errors; show nothing rather than half a label
        if self.label.write_fmt(args).is_err() {
            self.label.clear();
        }
        self.selected = selected;
    }

    pub fn clear(&mut self) {
        self.label.clear();
        self.selected = false;
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Label with a selection marker, as shown on the display
    pub fn display_into(&self, out: &mut String) {
        out.clear();
        if self.selected {
            out.push('>');
        }
        out.push_str(&self.label);
    }
}

/// Fixed eight-entry menu row, allocated once per mode instance
#[derive(Debug, Clone, Default)]
pub struct MenuItems {
    items: [MenuItem; KNOB_COUNT],
}

impl MenuItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MenuItem> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MenuItem> {
        self.items.iter_mut()
    }

    pub fn clear(&mut self) {
        self.items.iter_mut().for_each(MenuItem::clear);
    }

    /// Write the row to a display row, one entry per cell
    pub fn write_row(&self, surface: &mut dyn crate::surface::Surface, row: usize, scratch: &mut String) {
        for (column, item) in self.items.iter().enumerate() {
            item.display_into(scratch);
            surface.set_cell(row, column, scratch);
        }
    }
}

/// Format a normalized value as a coarse text bar (for the value row)
pub fn value_bar(value: f64, out: &mut String) {
    const WIDTH: usize = 8;
    out.clear();
    let filled = (value.clamp(0.0, 1.0) * WIDTH as f64).round() as usize;
    for i in 0..WIDTH {
        out.push(if i < filled { '|' } else { ' ' });
    }
}
