//! Device mode: parameters of the cursor device
//!
//! Upper row selects a device of the selected track, lower row selects a
//! parameter page. Page left/right move the page bank by eight, clamped at
//! both ends.

use super::{Mode, ModeId};
use crate::bank::Overflow;
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::input::{ButtonEvent, ButtonState};
use crate::params::{DeviceParameters, ParameterBinding};
use crate::render::{channel_strip_color, menu_color, value_bar, MenuItems};
use crate::surface::{Surface, CELLS_PER_BLOCK};
use crate::types::{ButtonId, Color, KNOB_COUNT};

const NO_DEVICE: &str = "Please select a device...";

pub struct DeviceMode {
    binding: ParameterBinding,
    pages: MenuItems,
    scratch: String,
}

impl DeviceMode {
    pub fn new() -> Self {
        Self {
            binding: ParameterBinding::new(),
            pages: MenuItems::new(),
            scratch: String::new(),
        }
    }

    pub fn binding(&self) -> &ParameterBinding {
        &self.binding
    }

    fn update_pages(&mut self, ctx: &RenderContext<'_>) {
        let selected = ctx.daw.selected_parameter_page();
        for (slot, item) in self.pages.iter_mut().enumerate() {
            match ctx.banks.parameter_pages.absolute(slot) {
                Some(page) => {
                    let name = ctx.daw.parameter_page_name(page).unwrap_or("");
                    item.set(name, page == selected);
                }
                None => item.clear(),
            }
        }
    }
}

impl Default for DeviceMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for DeviceMode {
    fn on_activate(&mut self, ctx: &mut Context<'_>) {
        self.binding.set_parameter_provider(Some(Box::new(DeviceParameters)), ctx.daw);
        if let Some(device) = ctx.daw.selected_device() {
            ctx.banks.devices.reveal(device);
        }
        let page = ctx.daw.selected_parameter_page();
        ctx.banks.parameter_pages.reveal(page);
    }

    fn on_deactivate(&mut self, ctx: &mut Context<'_>) {
        self.binding.set_parameter_provider(None, ctx.daw);
    }
}

impl Mode for DeviceMode {
    fn id(&self) -> ModeId {
        ModeId::Device
    }

    fn on_knob_value(&mut self, index: usize, delta: i32, ctx: &mut Context<'_>) {
        self.binding.on_knob_value(index, delta, ctx);
    }

    fn on_knob_touch(&mut self, index: usize, touched: bool, ctx: &mut Context<'_>) {
        self.binding.on_knob_touch(index, touched, ctx);
    }

    fn on_first_row(&mut self, index: usize, event: &ButtonState, ctx: &mut Context<'_>) {
        if event.event != ButtonEvent::Down {
            return;
        }
        if let Some(device) = ctx.banks.devices.absolute(index) {
            // Touches belong to the old device's parameters
            self.binding.release_all(ctx.daw);
            ctx.daw.select_device(device);
        }
    }

    fn on_second_row(&mut self, index: usize, event: &ButtonState, ctx: &mut Context<'_>) {
        if event.event != ButtonEvent::Down {
            return;
        }
        if let Some(page) = ctx.banks.parameter_pages.absolute(index) {
            self.binding.release_all(ctx.daw);
            ctx.daw.select_parameter_page(page);
        }
    }

    fn on_page(&mut self, forward: bool, ctx: &mut Context<'_>) {
        let pages = &mut ctx.banks.parameter_pages;
        let moved = if forward {
            pages.next_page(Overflow::Clamp)
        } else {
            pages.previous_page(Overflow::Clamp)
        };
        if moved {
            let first = ctx.banks.parameter_pages.scroll_position();
            self.binding.release_all(ctx.daw);
            ctx.daw.select_parameter_page(first);
        }
    }

    fn button_color(&self, button: ButtonId, ctx: &RenderContext<'_>) -> Color {
        match button {
            ButtonId::Row1(i) => match ctx.banks.devices.absolute(i as usize) {
                Some(device) => {
                    channel_strip_color(true, false, ctx.daw.selected_device() == Some(device))
                }
                None => Color::Off,
            },
            ButtonId::Row2(i) => match ctx.banks.parameter_pages.absolute(i as usize) {
                Some(page) => menu_color(true, ctx.daw.selected_parameter_page() == page),
                None => Color::Off,
            },
            ButtonId::PageLeft => {
                Color::intensity(Color::Off, Color::WhiteLo, ctx.banks.parameter_pages.can_scroll_page_backwards())
            }
            ButtonId::PageRight => {
                Color::intensity(Color::Off, Color::WhiteLo, ctx.banks.parameter_pages.can_scroll_page_forwards())
            }
            _ => Color::Off,
        }
    }

    fn render(&mut self, ctx: &RenderContext<'_>, surface: &mut dyn Surface) {
        if ctx.daw.selected_device().is_some() {
            for column in 0..KNOB_COUNT {
                match self.binding.state(column, ctx.daw, ctx.banks) {
                    Some(state) => {
                        surface.set_cell(0, column, &state.name);
                        value_bar(state.value, &mut self.scratch);
                        let value = if state.display.is_empty() { &self.scratch } else { &state.display };
                        surface.set_cell(1, column, value);
                    }
                    None => {
                        surface.set_cell(0, column, "");
                        surface.set_cell(1, column, "");
                    }
                }
            }
        } else {
            for row in 0..2 {
                for block in 0..KNOB_COUNT / CELLS_PER_BLOCK {
                    let text = if row == 0 && block == 0 { NO_DEVICE } else { "" };
                    surface.set_block(row, block, text);
                }
            }
        }

        self.update_pages(ctx);
        self.pages.write_row(surface, 2, &mut self.scratch);

        for column in 0..KNOB_COUNT {
            self.scratch.clear();
            if let Some(index) = ctx.banks.devices.absolute(column) {
                if let Some(device) = ctx.daw.device(index) {
                    if ctx.daw.selected_device() == Some(index) {
                        self.scratch.push('>');
                    }
                    self.scratch.push_str(&device.name);
                }
            }
            surface.set_cell(3, column, &self.scratch);
        }
    }
}
