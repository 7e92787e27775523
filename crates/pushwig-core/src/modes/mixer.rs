//! Volume, pan and send modes: one knob per visible track

use super::{Mode, ModeId, TrackRows};
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::input::ButtonState;
use crate::params::{ParameterBinding, TrackParameter, TrackParameters};
use crate::surface::Surface;
use crate::types::{ButtonId, Color};

/// A track-bank-wide mixer parameter on the knobs
pub struct MixerMode {
    id: ModeId,
    parameter: TrackParameter,
    binding: ParameterBinding,
    rows: TrackRows,
}

impl MixerMode {
    fn new(id: ModeId, parameter: TrackParameter) -> Self {
        Self {
            id,
            parameter,
            binding: ParameterBinding::new(),
            rows: TrackRows::new(),
        }
    }

    pub fn volume() -> Self {
        Self::new(ModeId::Volume, TrackParameter::Volume)
    }

    pub fn pan() -> Self {
        Self::new(ModeId::Pan, TrackParameter::Pan)
    }

    pub fn send(send: usize) -> Self {
        Self::new(ModeId::Send(send as u8), TrackParameter::Send(send))
    }

    pub fn binding(&self) -> &ParameterBinding {
        &self.binding
    }
}

impl Lifecycle for MixerMode {
    fn on_activate(&mut self, ctx: &mut Context<'_>) {
        let provider = TrackParameters::new(self.parameter);
        self.binding.set_parameter_provider(Some(Box::new(provider)), ctx.daw);
    }

    fn on_deactivate(&mut self, ctx: &mut Context<'_>) {
        self.binding.set_parameter_provider(None, ctx.daw);
    }
}

impl Mode for MixerMode {
    fn id(&self) -> ModeId {
        self.id
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
        self.rows.render(&self.binding, ctx, surface);
    }
}
