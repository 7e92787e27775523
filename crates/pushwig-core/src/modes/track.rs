//! Track mode: the mixer parameters of the selected track
//!
//! Knob 0 volume, knob 1 pan, knobs 4-7 the visible send slots. Without a
//! selected track the parameter rows show a placeholder instead.

use super::{Mode, ModeId, TrackRows};
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::input::ButtonState;
use crate::params::{ParameterBinding, SelectedTrackParameters};
use crate::surface::{Surface, CELLS_PER_BLOCK};
use crate::types::{ButtonId, Color, KNOB_COUNT};

const NO_TRACK: &str = "Please select a track...";

pub struct TrackMode {
    binding: ParameterBinding,
    rows: TrackRows,
}

impl TrackMode {
    pub fn new() -> Self {
        Self {
            binding: ParameterBinding::new(),
            rows: TrackRows::new(),
        }
    }

    pub fn binding(&self) -> &ParameterBinding {
        &self.binding
    }
}

impl Default for TrackMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for TrackMode {
    fn on_activate(&mut self, ctx: &mut Context<'_>) {
        self.binding.set_parameter_provider(Some(Box::new(SelectedTrackParameters)), ctx.daw);
    }

    fn on_deactivate(&mut self, ctx: &mut Context<'_>) {
        self.binding.set_parameter_provider(None, ctx.daw);
    }
}

impl Mode for TrackMode {
    fn id(&self) -> ModeId {
        ModeId::Track
    }

    fn on_knob_value(&mut self, index: usize, delta: i32, ctx: &mut Context<'_>) {
        self.binding.on_knob_value(index, delta, ctx);
    }

    fn on_knob_touch(&mut self, index: usize, touched: bool, ctx: &mut Context<'_>) {
        self.binding.on_knob_touch(index, touched, ctx);
    }

    fn on_first_row(&mut self, index: usize, event: &ButtonState, ctx: &mut Context<'_>) {
        self.rows.on_first_row(index, event, ctx);
    }

    fn on_second_row(&mut self, index: usize, event: &ButtonState, ctx: &mut Context<'_>) {
        self.rows.on_second_row(index, event, &self.binding, ctx);
    }

    fn on_page(&mut self, forward: bool, ctx: &mut Context<'_>) {
        self.rows.on_page(forward, ctx);
    }

    fn button_color(&self, button: ButtonId, ctx: &RenderContext<'_>) -> Color {
        match button {
            ButtonId::Row1(i) => self.rows.first_row_color(i as usize, ctx),
            ButtonId::Row2(i) => self.rows.second_row_color(i as usize, &self.binding, ctx),
            ButtonId::PageLeft | ButtonId::PageRight => self.rows.page_color(ctx),
            _ => Color::Off,
        }
    }

    fn render(&mut self, ctx: &RenderContext<'_>, surface: &mut dyn Surface) {
        if ctx.daw.selected_track().is_some() {
            self.rows.render(&self.binding, ctx, surface);
            return;
        }

        for row in 0..2 {
            for block in 0..KNOB_COUNT / CELLS_PER_BLOCK {
                let text = if row == 0 && block == 0 { NO_TRACK } else { "" };
                surface.set_block(row, block, text);
            }
        }
        self.rows.render_menu_and_tracks(&self.binding, ctx, surface);
    }
}
