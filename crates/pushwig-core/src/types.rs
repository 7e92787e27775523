//! Physical control identities, LED colours and modifier state
//!
//! These types describe the fixed control set of the surface: two rows of
//! eight buttons around the display, eight touch-sensitive knobs, an 8×8 pad
//! grid and the named function buttons. Everything that is indexed (rows,
//! knobs, pads) is range-checked by [`check_index`] at the input boundary.

use crate::SurfaceError;
use serde::{Deserialize, Serialize};

/// Number of knobs (and cells per display row, and buttons per row)
pub const KNOB_COUNT: usize = 8;

/// Number of text rows on the display
pub const DISPLAY_ROWS: usize = 4;

/// Number of pads in the grid (8×8)
pub const PAD_COUNT: usize = 64;

/// Pads per grid row
pub const PAD_COLUMNS: usize = 8;

/// Validate a control index against the size of its control group
///
/// An out-of-range index means the caller was wired to the wrong control,
/// so this is surfaced as an error rather than ignored.
pub fn check_index(index: usize, count: usize) -> Result<usize, SurfaceError> {
    if index < count {
        Ok(index)
    } else {
        Err(SurfaceError::ControlIndexOutOfRange { index, count })
    }
}

/// Identity of a physical button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    /// Upper row of eight buttons (track / device select)
    Row1(u8),
    /// Lower row of eight buttons (mode menu)
    Row2(u8),

    // Modifiers
    Shift,
    Delete,
    Duplicate,
    Record,
    Solo,
    Mute,
    StopClip,

    // Mode buttons
    Volume,
    PanSend,
    Track,
    Device,
    AddTrack,

    // View buttons
    Session,
    Note,

    // Navigation
    Left,
    Right,
    Up,
    Down,
    PageLeft,
    PageRight,
    OctaveUp,
    OctaveDown,
}

impl ButtonId {
    /// The modifier this button acts as while held, if any
    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            Self::Shift => Some(Modifier::Shift),
            Self::Delete => Some(Modifier::Delete),
            Self::Duplicate => Some(Modifier::Duplicate),
            Self::Record => Some(Modifier::Record),
            Self::Solo => Some(Modifier::Solo),
            Self::Mute => Some(Modifier::Mute),
            Self::StopClip => Some(Modifier::StopClip),
            _ => None,
        }
    }

    /// Row index for row buttons
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Self::Row1(i) | Self::Row2(i) => Some(*i as usize),
            _ => None,
        }
    }
}

/// Held-state buttons that change the meaning of other controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Delete,
    Duplicate,
    Record,
    Solo,
    Mute,
    StopClip,
}

impl Modifier {
    /// The button that acts as this modifier
    pub fn button(&self) -> ButtonId {
        match self {
            Self::Shift => ButtonId::Shift,
            Self::Delete => ButtonId::Delete,
            Self::Duplicate => ButtonId::Duplicate,
            Self::Record => ButtonId::Record,
            Self::Solo => ButtonId::Solo,
            Self::Mute => ButtonId::Mute,
            Self::StopClip => ButtonId::StopClip,
        }
    }
}

/// Snapshot of modifier state at the instant an event fires
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub delete: bool,
    pub duplicate: bool,
    pub record: bool,
    pub solo: bool,
    pub mute: bool,
    pub stop_clip: bool,
    /// Mute latched by a long press
    pub mute_lock: bool,
    /// Solo latched by a long press
    pub solo_lock: bool,
}

impl Modifiers {
    /// Set the held flag of one modifier
    pub fn set(&mut self, modifier: Modifier, held: bool) {
        match modifier {
            Modifier::Shift => self.shift = held,
            Modifier::Delete => self.delete = held,
            Modifier::Duplicate => self.duplicate = held,
            Modifier::Record => self.record = held,
            Modifier::Solo => self.solo = held,
            Modifier::Mute => self.mute = held,
            Modifier::StopClip => self.stop_clip = held,
        }
    }

    /// Check whether a modifier is currently held
    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Delete => self.delete,
            Modifier::Duplicate => self.duplicate,
            Modifier::Record => self.record,
            Modifier::Solo => self.solo,
            Modifier::Mute => self.mute,
            Modifier::StopClip => self.stop_clip,
        }
    }

    /// Mute is either held or latched
    pub fn mute_active(&self) -> bool {
        self.mute || self.mute_lock
    }

    /// Solo is either held or latched
    pub fn solo_active(&self) -> bool {
        self.solo || self.solo_lock
    }

    /// Fine knob resolution (Shift held)
    pub fn is_slow(&self) -> bool {
        self.shift
    }
}

/// LED colour
///
/// Named entries cover the two-level (dim/bright) palette used by button rows;
/// `Rgb` is used by pads that mirror DAW colours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Off,
    WhiteLo,
    WhiteHi,
    RedLo,
    RedHi,
    OrangeLo,
    OrangeHi,
    YellowLo,
    YellowHi,
    GreenLo,
    GreenHi,
    BlueLo,
    BlueHi,
    Rgb([u8; 3]),
}

impl Color {
    /// Pick the dim or bright variant of a colour pair
    pub fn intensity(lo: Color, hi: Color, bright: bool) -> Color {
        if bright {
            hi
        } else {
            lo
        }
    }
}
