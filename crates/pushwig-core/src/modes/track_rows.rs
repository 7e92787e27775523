//! Track select row, mode menu row and display layout shared by the
//! track-family modes (volume, pan, send, track)
//!
//! Upper row: one button per visible track.
//!
//! | Held         | Press on track                          |
//! |--------------|-----------------------------------------|
//! | Delete       | delete track                            |
//! | Duplicate    | duplicate track                         |
//! | Record       | toggle arm                              |
//! | Mute / lock  | toggle mute                             |
//! | Solo / lock  | toggle solo                             |
//! | StopClip     | stop the track's clips                  |
//! | (none)       | select; on the selected track enter the |
//! |              | device mode, or with Shift on a group   |
//! |              | toggle its expansion                    |
//!
//! Lower row: Volume, Pan, Track, Device, then four send slots. The last slot
//! turns into "Up" (leave the group) while inside a group, unless Shift is
//! held or its knob is touched.

use super::{ModeId, SEND_MODES};
use crate::bank::{Overflow, SEND_PAGE_SIZE};
use crate::context::{Context, RenderContext};
use crate::input::{ButtonEvent, ButtonState};
use crate::model::DawModel;
use crate::params::ParameterBinding;
use crate::render::{channel_strip_color, menu_color, value_bar, MenuItems};
use crate::surface::Surface;
use crate::types::{Color, Modifier, KNOB_COUNT};

/// Knob whose touch keeps the last send slot visible inside a group
const LAST_SEND_KNOB: usize = 7;

/// Whether the last send slot shows the send instead of "Up"
pub fn last_send_is_accessible(shift: bool, has_parent_group: bool, knob_touched: bool) -> bool {
    shift || !has_parent_group || knob_touched
}

/// What a lower-row slot does right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Mode(ModeId),
    ExitGroup,
    Empty,
}

fn menu_entry(index: usize, knob_touched: bool, ctx: &RenderContext<'_>) -> MenuEntry {
    match index {
        0 => MenuEntry::Mode(ModeId::Volume),
        1 => MenuEntry::Mode(ModeId::Pan),
        2 => MenuEntry::Mode(ModeId::Track),
        3 => MenuEntry::Mode(ModeId::Device),
        4..=7 => {
            let accessible =
                last_send_is_accessible(ctx.modifiers.shift, ctx.daw.has_parent_group(), knob_touched);
            if index == 7 && !accessible {
                return MenuEntry::ExitGroup;
            }
            match ctx.banks.send_index(index - 4) {
                Some(send) if send < SEND_MODES => MenuEntry::Mode(ModeId::Send(send as u8)),
                _ => MenuEntry::Empty,
            }
        }
        _ => MenuEntry::Empty,
    }
}

fn has_playing_clip(daw: &dyn DawModel, track: usize) -> bool {
    (0..daw.scene_count()).any(|scene| daw.clip(track, scene).is_some_and(|clip| clip.playing))
}

/// Row behaviour embedded in each track-family mode
#[derive(Debug, Default)]
pub struct TrackRows {
    menu: MenuItems,
    scratch: String,
}

impl TrackRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_first_row(&self, index: usize, event: &ButtonState, ctx: &mut Context<'_>) {
        if event.event != ButtonEvent::Down {
            return;
        }
        let Some(track) = ctx.banks.tracks.absolute(index) else {
            return;
        };
        if ctx.daw.track(track).is_none() {
            return;
        }

        let modifiers = ctx.modifiers;
        if modifiers.delete {
            log::info!("on_first_row: Delete track {}", track);
            ctx.daw.delete_track(track);
            ctx.consume(Modifier::Delete);
        } else if modifiers.duplicate {
            ctx.daw.duplicate_track(track);
            ctx.consume(Modifier::Duplicate);
        } else if modifiers.record {
            ctx.daw.toggle_arm(track);
            ctx.consume(Modifier::Record);
        } else if modifiers.mute_active() {
            ctx.daw.toggle_mute(track);
            ctx.consume(Modifier::Mute);
        } else if modifiers.solo_active() {
            ctx.daw.toggle_solo(track);
            ctx.consume(Modifier::Solo);
        } else if modifiers.stop_clip {
            ctx.daw.stop_track(track);
            ctx.consume(Modifier::StopClip);
        } else if ctx.daw.selected_track() == Some(track) {
            let is_group = ctx.daw.track(track).is_some_and(|t| t.is_group());
            if is_group && modifiers.shift {
                ctx.daw.toggle_group_expanded(track);
                ctx.consume(Modifier::Shift);
            } else {
                ctx.activate_mode(ModeId::Device);
            }
        } else {
            ctx.daw.select_track(track);
        }
    }

    pub fn first_row_color(&self, index: usize, ctx: &RenderContext<'_>) -> Color {
        let Some(track_index) = ctx.banks.tracks.absolute(index) else {
            return Color::Off;
        };
        let Some(track) = ctx.daw.track(track_index) else {
            return Color::Off;
        };

        let modifiers = ctx.modifiers;
        if modifiers.stop_clip {
            Color::intensity(Color::RedLo, Color::RedHi, has_playing_clip(ctx.daw, track_index))
        } else if modifiers.mute_active() {
            // Lit while audible
            Color::intensity(Color::YellowLo, Color::YellowHi, !track.muted)
        } else if modifiers.solo_active() {
            Color::intensity(Color::BlueLo, Color::BlueHi, track.soloed)
        } else {
            let selected = ctx.daw.selected_track() == Some(track_index);
            channel_strip_color(true, track.armed, selected)
        }
    }

    /// Lower row press
    ///
    /// `binding` is the embedding mode's knob state (the last slot's label
    /// depends on whether its knob is touched).
    pub fn on_second_row(
        &self,
        index: usize,
        event: &ButtonState,
        binding: &ParameterBinding,
        ctx: &mut Context<'_>,
    ) {
        if event.event != ButtonEvent::Down {
            return;
        }

        if ctx.modifiers.shift && (4..KNOB_COUNT).contains(&index) {
            ctx.banks.sends_toggled = !ctx.banks.sends_toggled;
            log::debug!("on_second_row: Sends toggled = {}", ctx.banks.sends_toggled);
            ctx.consume(Modifier::Shift);
            return;
        }

        let entry = menu_entry(index, binding.is_touched(LAST_SEND_KNOB), &ctx.view());
        match entry {
            MenuEntry::Mode(id) => ctx.activate_mode(id),
            MenuEntry::ExitGroup => ctx.daw.exit_group(),
            MenuEntry::Empty => {}
        }
    }

    pub fn second_row_color(
        &self,
        index: usize,
        binding: &ParameterBinding,
        ctx: &RenderContext<'_>,
    ) -> Color {
        match menu_entry(index, binding.is_touched(LAST_SEND_KNOB), ctx) {
            MenuEntry::Mode(id) => menu_color(true, ctx.active_mode == Some(id)),
            MenuEntry::ExitGroup => menu_color(true, false),
            MenuEntry::Empty => Color::Off,
        }
    }

    /// Page through the sends (wrapping)
    pub fn on_page(&self, forward: bool, ctx: &mut Context<'_>) {
        let moved = if forward {
            ctx.banks.sends.next_page(Overflow::Wrap)
        } else {
            ctx.banks.sends.previous_page(Overflow::Wrap)
        };
        if moved {
            log::debug!("on_page: Send bank at {}", ctx.banks.sends.scroll_position());
        }
    }

    pub fn page_color(&self, ctx: &RenderContext<'_>) -> Color {
        // Wrapping paging is possible whenever there is more than one page
        if ctx.banks.sends.item_count() > SEND_PAGE_SIZE {
            Color::WhiteLo
        } else {
            Color::Off
        }
    }

    /// Rebuild the lower-row menu from the current state
    pub fn update_menu(&mut self, binding: &ParameterBinding, ctx: &RenderContext<'_>) {
        let knob_touched = binding.is_touched(LAST_SEND_KNOB);
        for (index, item) in self.menu.iter_mut().enumerate() {
            match menu_entry(index, knob_touched, ctx) {
                MenuEntry::Mode(ModeId::Send(send)) => {
                    let label = ctx.daw.send_name(send as usize).unwrap_or("");
                    item.set(label, ctx.active_mode == Some(ModeId::Send(send)));
                }
                MenuEntry::Mode(id) => item.set(id.label(), ctx.active_mode == Some(id)),
                MenuEntry::ExitGroup => item.set("Up", false),
                MenuEntry::Empty => item.clear(),
            }
        }
    }

    pub fn menu(&self) -> &MenuItems {
        &self.menu
    }

    /// Parameter names (row 0), values (row 1), menu (row 2), tracks (row 3)
    pub fn render(
        &mut self,
        binding: &ParameterBinding,
        ctx: &RenderContext<'_>,
        surface: &mut dyn Surface,
    ) {
        self.render_parameters(binding, ctx, surface);
        self.render_menu_and_tracks(binding, ctx, surface);
    }

    pub fn render_parameters(
        &mut self,
        binding: &ParameterBinding,
        ctx: &RenderContext<'_>,
        surface: &mut dyn Surface,
    ) {
        for column in 0..KNOB_COUNT {
            match binding.state(column, ctx.daw, ctx.banks) {
                Some(state) => {
                    surface.set_cell(0, column, &state.name);
                    if state.display.is_empty() {
                        value_bar(state.value, &mut self.scratch);
                        surface.set_cell(1, column, &self.scratch);
                    } else {
                        surface.set_cell(1, column, &state.display);
                    }
                }
                None => {
                    surface.set_cell(0, column, "");
                    surface.set_cell(1, column, "");
                }
            }
        }
    }

    pub fn render_menu_and_tracks(
        &mut self,
        binding: &ParameterBinding,
        ctx: &RenderContext<'_>,
        surface: &mut dyn Surface,
    ) {
        self.update_menu(binding, ctx);
        self.menu.write_row(surface, 2, &mut self.scratch);

        for column in 0..KNOB_COUNT {
            self.scratch.clear();
            if let Some(index) = ctx.banks.tracks.absolute(column) {
                if let Some(track) = ctx.daw.track(index) {
                    if ctx.daw.selected_track() == Some(index) {
                        self.scratch.push('>');
                    }
                    self.scratch.push_str(&track.name);
                }
            }
            surface.set_cell(3, column, &self.scratch);
        }
    }
}
