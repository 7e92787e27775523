//! Input event classification
//!
//! Turns raw control edges (button down/up, encoder deltas, knob touch lines,
//! pad hits) into semantic events:
//!
//! - A press becomes [`ButtonEvent::Long`] once it has been held past the
//!   configured threshold without a release. [`ButtonEvent::Up`] always follows.
//! - Modifier buttons (Shift, Delete, Duplicate, Record, Solo, Mute, StopClip)
//!   are tracked as held flags and every event carries a [`Modifiers`] snapshot
//!   taken at the instant it fired, so chords need no combinatorial table.
//! - A held button can be *consumed*: its release is then flagged so the
//!   button's own single-press action is skipped. Consumption lasts for one
//!   press and is re-armed on release.
//!
//! Timing uses [`Instant`] values supplied by the caller (monotonic clock),
//! sampled once at press time and again on every tick.

use crate::types::{check_index, ButtonId, Modifier, Modifiers, KNOB_COUNT, PAD_COUNT};
use crate::SurfaceError;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Raw edge from the surface, before classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// Button pressed or released
    Button { id: ButtonId, pressed: bool },
    /// Relative encoder movement (positive = clockwise)
    Knob { index: usize, delta: i32 },
    /// Capacitive touch line of a knob
    KnobTouch { index: usize, touched: bool },
    /// Pad hit (velocity 0 = release)
    Pad { index: usize, velocity: u8 },
}

/// Semantic kind of a button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Down,
    /// Held past the long-press threshold (fires once per press)
    Long,
    Up,
}

/// Classified button event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonState {
    pub id: ButtonId,
    pub event: ButtonEvent,
    /// How long the button has been held (zero for `Down`)
    pub held: Duration,
    /// A `Long` already fired for this press
    pub long_fired: bool,
    /// The press was consumed by a chord
    pub consumed: bool,
    pub modifiers: Modifiers,
}

impl ButtonState {
    /// Released before the threshold and not used in a chord
    pub fn is_short_press(&self) -> bool {
        self.event == ButtonEvent::Up && !self.long_fired && !self.consumed
    }

    /// The modifier chorded with this button, by priority
    ///
    /// The button's own modifier role is ignored (Shift is not chorded with
    /// itself).
    pub fn chord(&self) -> Option<Modifier> {
        let own = self.id.modifier();
        [
            Modifier::Shift,
            Modifier::Delete,
            Modifier::Duplicate,
            Modifier::Record,
            Modifier::Mute,
            Modifier::Solo,
            Modifier::StopClip,
        ]
        .into_iter()
        .find(|m| Some(*m) != own && self.modifiers.is_held(*m))
    }
}

/// Classified input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Button(ButtonState),
    Knob {
        index: usize,
        delta: i32,
        modifiers: Modifiers,
    },
    KnobTouch {
        index: usize,
        touched: bool,
        modifiers: Modifiers,
    },
    Pad {
        index: usize,
        velocity: u8,
        modifiers: Modifiers,
    },
}

/// Per-press bookkeeping
#[derive(Debug, Clone, Copy)]
struct Press {
    since: Instant,
    long_fired: bool,
    consumed: bool,
}

/// Stateful classifier for one surface
pub struct InputClassifier {
    long_press: Duration,
    pressed: HashMap<ButtonId, Press>,
    modifiers: Modifiers,
}

impl InputClassifier {
    pub fn new(long_press: Duration) -> Self {
        Self {
            long_press,
            pressed: HashMap::new(),
            modifiers: Modifiers::default(),
        }
    }

    /// Current modifier snapshot
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_held(&self, id: ButtonId) -> bool {
        self.pressed.contains_key(&id)
    }

    /// Latch or release the Mute / Solo lock
    pub fn set_lock(&mut self, modifier: Modifier, locked: bool) {
        match modifier {
            Modifier::Mute => self.modifiers.mute_lock = locked,
            Modifier::Solo => self.modifiers.solo_lock = locked,
            _ => log::debug!("set_lock: {:?} cannot be latched", modifier),
        }
    }

    /// Mark a held button as used by a chord
    ///
    /// Idempotent; a no-op for buttons that are not held.
    pub fn consume(&mut self, id: ButtonId) {
        if let Some(press) = self.pressed.get_mut(&id) {
            press.consumed = true;
        }
    }

    pub fn is_consumed(&self, id: ButtonId) -> bool {
        self.pressed.get(&id).is_some_and(|p| p.consumed)
    }

    /// Classify one raw event
    ///
    /// Returns `Ok(None)` for redundant edges (a second down without an up).
    pub fn process(
        &mut self,
        raw: RawEvent,
        now: Instant,
    ) -> Result<Option<InputEvent>, SurfaceError> {
        let event = match raw {
            RawEvent::Button { id, pressed } => {
                if let Some(index) = id.row_index() {
                    check_index(index, KNOB_COUNT)?;
                }
                return Ok(if pressed {
                    self.press(id, now)
                } else {
                    self.release(id, now)
                });
            }
            RawEvent::Knob { index, delta } => InputEvent::Knob {
                index: check_index(index, KNOB_COUNT)?,
                delta,
                modifiers: self.modifiers,
            },
            RawEvent::KnobTouch { index, touched } => InputEvent::KnobTouch {
                index: check_index(index, KNOB_COUNT)?,
                touched,
                modifiers: self.modifiers,
            },
            RawEvent::Pad { index, velocity } => InputEvent::Pad {
                index: check_index(index, PAD_COUNT)?,
                velocity,
                modifiers: self.modifiers,
            },
        };
        Ok(Some(event))
    }

    /// Emit `Long` for every press that crossed the threshold since the last poll
    pub fn poll(&mut self, now: Instant, out: &mut Vec<InputEvent>) {
        let modifiers = self.modifiers;
        let mut fired: Vec<(ButtonId, Press)> = Vec::new();
        for (id, press) in self.pressed.iter_mut() {
            let held = now.saturating_duration_since(press.since);
            if !press.long_fired && held >= self.long_press {
                press.long_fired = true;
                fired.push((*id, *press));
            }
        }
        // HashMap order is arbitrary; keep output stable
        fired.sort_by_key(|(_, press)| press.since);
        for (id, press) in fired {
            log::debug!("poll: long press {:?}", id);
            out.push(InputEvent::Button(ButtonState {
                id,
                event: ButtonEvent::Long,
                held: now.saturating_duration_since(press.since),
                long_fired: true,
                consumed: press.consumed,
                modifiers,
            }));
        }
    }

    fn press(&mut self, id: ButtonId, now: Instant) -> Option<InputEvent> {
        if self.pressed.contains_key(&id) {
            return None;
        }
        self.pressed.insert(
            id,
            Press {
                since: now,
                long_fired: false,
                consumed: false,
            },
        );
        if let Some(modifier) = id.modifier() {
            self.modifiers.set(modifier, true);
        }
        Some(InputEvent::Button(ButtonState {
            id,
            event: ButtonEvent::Down,
            held: Duration::ZERO,
            long_fired: false,
            consumed: false,
            modifiers: self.modifiers,
        }))
    }

    fn release(&mut self, id: ButtonId, now: Instant) -> Option<InputEvent> {
        let press = self.pressed.remove(&id)?;
        if let Some(modifier) = id.modifier() {
            self.modifiers.set(modifier, false);
        }
        Some(InputEvent::Button(ButtonState {
            id,
            event: ButtonEvent::Up,
            held: now.saturating_duration_since(press.since),
            long_fired: press.long_fired,
            consumed: press.consumed,
            modifiers: self.modifiers,
        }))
    }
}
