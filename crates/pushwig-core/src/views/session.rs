//! Clip launcher grid
//!
//! Columns are the visible tracks of the track bank, rows the visible scenes
//! of the scene bank with the first scene on the top row.
//!
//! | Held      | Pad press           |
//! |-----------|---------------------|
//! | (none)    | launch clip         |
//! | Delete    | delete clip         |
//! | Duplicate | duplicate clip      |
//! | Shift     | launch the scene    |

use super::{View, ViewId};
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::types::{Color, Modifier, PAD_COLUMNS, PAD_COUNT};

const ROWS: usize = PAD_COUNT / PAD_COLUMNS;

/// Track slot and scene slot of a pad
fn slots(index: usize) -> Option<(usize, usize)> {
    if index >= PAD_COUNT {
        return None;
    }
    let column = index % PAD_COLUMNS;
    let row_from_top = ROWS - 1 - index / PAD_COLUMNS;
    Some((column, row_from_top))
}

#[derive(Debug, Default)]
pub struct SessionView;

impl SessionView {
    pub fn new() -> Self {
        Self
    }
}

impl Lifecycle for SessionView {}

impl View for SessionView {
    fn id(&self) -> ViewId {
        ViewId::Session
    }

    fn on_pad(&mut self, index: usize, velocity: u8, ctx: &mut Context<'_>) {
        if velocity == 0 {
            return;
        }
        let Some((track_slot, scene_slot)) = slots(index) else {
            return;
        };
        let Some(scene) = ctx.banks.scenes.absolute(scene_slot) else {
            return;
        };

        if ctx.modifiers.shift {
            ctx.daw.launch_scene(scene);
            ctx.consume(Modifier::Shift);
            return;
        }

        let Some(track) = ctx.banks.tracks.absolute(track_slot) else {
            return;
        };
        if ctx.modifiers.delete {
            ctx.daw.delete_clip(track, scene);
            ctx.consume(Modifier::Delete);
        } else if ctx.modifiers.duplicate {
            ctx.daw.duplicate_clip(track, scene);
            ctx.consume(Modifier::Duplicate);
        } else {
            ctx.daw.launch_clip(track, scene);
        }
    }

    fn pad_color(&self, index: usize, ctx: &RenderContext<'_>) -> Color {
        let Some((track_slot, scene_slot)) = slots(index) else {
            return Color::Off;
        };
        let (Some(track_index), Some(scene)) = (
            ctx.banks.tracks.absolute(track_slot),
            ctx.banks.scenes.absolute(scene_slot),
        ) else {
            return Color::Off;
        };
        let Some(track) = ctx.daw.track(track_index) else {
            return Color::Off;
        };

        match ctx.daw.clip(track_index, scene) {
            Some(clip) if clip.recording => Color::RedHi,
            Some(clip) if clip.playing => Color::GreenHi,
            Some(clip) if clip.queued => Color::GreenLo,
            Some(clip) if clip.has_content => Color::Rgb(track.color),
            _ if track.armed => Color::RedLo,
            _ => Color::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_slots() {
        // Bottom left pad is the last visible scene of the first track
        assert_eq!(slots(0), Some((0, 7)));
        // Top left pad is the first scene
        assert_eq!(slots(56), Some((0, 0)));
        assert_eq!(slots(63), Some((7, 0)));
        assert_eq!(slots(64), None);
    }
}
