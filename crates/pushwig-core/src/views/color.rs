//! Track colour picker (transient)
//!
//! The first sixteen pads show the palette. Hitting one recolours the
//! selected track and returns to the previous view.

use super::{View, ViewId};
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::types::Color;

/// Colours offered by the picker, bottom row first
pub const PALETTE: [[u8; 3]; 16] = [
    [217, 46, 36],
    [255, 87, 6],
    [217, 157, 16],
    [115, 152, 20],
    [0, 157, 71],
    [0, 166, 148],
    [0, 153, 217],
    [92, 113, 221],
    [149, 73, 203],
    [217, 56, 113],
    [236, 97, 87],
    [255, 131, 62],
    [228, 183, 78],
    [160, 192, 76],
    [62, 187, 98],
    [68, 200, 255],
];

#[derive(Debug, Default)]
pub struct ColorView;

impl ColorView {
    pub fn new() -> Self {
        Self
    }
}

impl Lifecycle for ColorView {
    fn is_transient(&self) -> bool {
        true
    }
}

impl View for ColorView {
    fn id(&self) -> ViewId {
        ViewId::Color
    }

    fn on_pad(&mut self, index: usize, velocity: u8, ctx: &mut Context<'_>) {
        if velocity == 0 {
            return;
        }
        let Some(color) = PALETTE.get(index) else {
            return;
        };
        if let Some(track) = ctx.daw.selected_track() {
            log::debug!("on_pad: Track {} colour {:?}", track, color);
            ctx.daw.set_track_color(track, *color);
        }
        ctx.restore_view();
    }

    fn pad_color(&self, index: usize, _ctx: &RenderContext<'_>) -> Color {
        PALETTE.get(index).map_or(Color::Off, |rgb| Color::Rgb(*rgb))
    }
}
