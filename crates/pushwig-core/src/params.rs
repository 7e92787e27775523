//! Knob-to-parameter binding
//!
//! A [`ParameterProvider`] maps the eight knob slots of a mode to parameter
//! handles. Providers resolve fresh on every access, so a slot follows bank
//! scrolling and track/device selection without re-binding.
//!
//! [`ParameterBinding`] is the piece every knob-driven mode embeds: it owns
//! the current provider and the per-knob touch state, and turns knob events
//! into parameter edits.
//!
//! # Touch semantics
//!
//! - Touch-begin with Delete held resets the parameter to its default and
//!   does not begin a touch. Delete is consumed.
//! - Touch-begin on an already-touched knob does nothing (the host only sees
//!   state changes).
//! - Touch-end always releases, whatever modifiers are held. The release
//!   goes to the handle that was touched, even if the bank scrolled or the
//!   selection changed in between.
//! - Swapping the provider releases every touch held through the old one.

use crate::bank::Banks;
use crate::context::Context;
use crate::model::{DawModel, ParameterId, ParameterState};
use crate::types::{Modifier, KNOB_COUNT};

/// Handle to one parameter in the model
///
/// The handle may point at something that no longer exists (the track was
/// deleted, the device has fewer pages). Every operation checks first and
/// does nothing in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter {
    id: ParameterId,
}

impl Parameter {
    pub fn new(id: ParameterId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn exists(&self, daw: &dyn DawModel) -> bool {
        daw.parameter(self.id).is_some()
    }

    pub fn state<'d>(&self, daw: &'d dyn DawModel) -> Option<&'d ParameterState> {
        daw.parameter(self.id)
    }

    /// Change by a normalized amount
    pub fn inc(&self, daw: &mut dyn DawModel, delta: f64) {
        if self.exists(daw) {
            daw.change_parameter(self.id, delta);
        }
    }

    pub fn touch(&self, daw: &mut dyn DawModel, touched: bool) {
        if self.exists(daw) {
            daw.touch_parameter(self.id, touched);
        }
    }

    pub fn reset(&self, daw: &mut dyn DawModel) {
        if self.exists(daw) {
            daw.reset_parameter(self.id);
        }
    }
}

/// Source of parameter handles for the eight knob slots
pub trait ParameterProvider {
    /// Number of slots (fixed for the lifetime of the provider)
    fn size(&self) -> usize {
        KNOB_COUNT
    }

    /// Handle for `index`, or `None` for an unbound slot
    fn get(&self, index: usize, daw: &dyn DawModel, banks: &Banks) -> Option<Parameter>;
}

/// Per-track parameter shown across the track bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackParameter {
    Volume,
    Pan,
    Send(usize),
}

impl TrackParameter {
    pub fn id(&self, track: usize) -> ParameterId {
        match *self {
            Self::Volume => ParameterId::Volume { track },
            Self::Pan => ParameterId::Pan { track },
            Self::Send(send) => ParameterId::Send { track, send },
        }
    }
}

/// One knob per visible track, all bound to the same kind of parameter
#[derive(Debug, Clone, Copy)]
pub struct TrackParameters {
    pub parameter: TrackParameter,
}

impl TrackParameters {
    pub fn new(parameter: TrackParameter) -> Self {
        Self { parameter }
    }
}

impl ParameterProvider for TrackParameters {
    fn get(&self, index: usize, _daw: &dyn DawModel, banks: &Banks) -> Option<Parameter> {
        let track = banks.tracks.absolute(index)?;
        Some(Parameter::new(self.parameter.id(track)))
    }
}

/// Mixer parameters of the selected track
///
/// Knob 0 is volume, knob 1 pan, knobs 2-3 unbound, knobs 4-7 the four
/// visible send slots (following send paging and the Shift toggle).
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectedTrackParameters;

impl ParameterProvider for SelectedTrackParameters {
    fn get(&self, index: usize, daw: &dyn DawModel, banks: &Banks) -> Option<Parameter> {
        let track = daw.selected_track()?;
        let id = match index {
            0 => ParameterId::Volume { track },
            1 => ParameterId::Pan { track },
            4..=7 => ParameterId::Send {
                track,
                send: banks.send_index(index - 4)?,
            },
            _ => return None,
        };
        Some(Parameter::new(id))
    }
}

/// The selected parameter page of the cursor device
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceParameters;

impl ParameterProvider for DeviceParameters {
    fn get(&self, index: usize, daw: &dyn DawModel, _banks: &Banks) -> Option<Parameter> {
        if index >= KNOB_COUNT {
            return None;
        }
        Some(Parameter::new(ParameterId::Device {
            page: daw.selected_parameter_page(),
            index,
        }))
    }
}

/// Knob state embedded in every knob-driven mode
#[derive(Default)]
pub struct ParameterBinding {
    provider: Option<Box<dyn ParameterProvider>>,
    touched: [Option<Parameter>; KNOB_COUNT],
}

impl ParameterBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the provider, releasing any touch held through the old one
    pub fn set_parameter_provider(
        &mut self,
        provider: Option<Box<dyn ParameterProvider>>,
        daw: &mut dyn DawModel,
    ) {
        self.release_all(daw);
        self.provider = provider;
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Handle for knob `index` through the current provider
    pub fn parameter(&self, index: usize, daw: &dyn DawModel, banks: &Banks) -> Option<Parameter> {
        let provider = self.provider.as_ref()?;
        if index >= provider.size() {
            return None;
        }
        provider.get(index, daw, banks)
    }

    /// Parameter state behind knob `index`, if it exists right now
    pub fn state<'d>(&self, index: usize, daw: &'d dyn DawModel, banks: &Banks) -> Option<&'d ParameterState> {
        self.parameter(index, daw, banks)?.state(daw)
    }

    pub fn is_touched(&self, index: usize) -> bool {
        self.touched.get(index).is_some_and(Option::is_some)
    }

    /// Handle currently held through knob `index`
    pub fn touched_parameter(&self, index: usize) -> Option<Parameter> {
        self.touched.get(index).copied().flatten()
    }

    pub fn on_knob_value(&self, index: usize, delta: i32, ctx: &mut Context<'_>) {
        if let Some(parameter) = self.parameter(index, &*ctx.daw, ctx.banks) {
            let amount = ctx.settings.knob_speed.scale(delta, ctx.modifiers.is_slow());
            parameter.inc(ctx.daw, amount);
        }
    }

    pub fn on_knob_touch(&mut self, index: usize, touched: bool, ctx: &mut Context<'_>) {
        if index >= KNOB_COUNT {
            return;
        }
        let parameter = self.parameter(index, &*ctx.daw, ctx.banks);

        if touched && ctx.modifiers.delete {
            if let Some(parameter) = parameter {
                log::debug!("on_knob_touch: Reset {:?}", parameter.id());
                parameter.reset(ctx.daw);
            }
            ctx.consume(Modifier::Delete);
            return;
        }

        if touched {
            if self.touched[index].is_some() {
                return;
            }
            if let Some(parameter) = parameter {
                self.touched[index] = Some(parameter);
                parameter.touch(ctx.daw, true);
            }
        } else if let Some(held) = self.touched[index].take().or(parameter) {
            held.touch(ctx.daw, false);
        }
    }

    /// Release every held touch
    pub fn release_all(&mut self, daw: &mut dyn DawModel) {
        for held in self.touched.iter_mut().filter_map(Option::take) {
            held.touch(daw, false);
        }
    }
}
