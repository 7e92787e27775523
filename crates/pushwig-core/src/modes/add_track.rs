//! Add-track mode (transient)
//!
//! The lower row offers the track kinds. Picking one creates the track, and
//! if a favourite device is configured for that kind, schedules inserting it
//! once the host has had time to create and select the new track. The mode
//! then restores whatever was active before.

use super::{Mode, ModeId};
use crate::context::{Context, RenderContext};
use crate::dispatch::Lifecycle;
use crate::input::{ButtonEvent, ButtonState};
use crate::model::TrackKind;
use crate::render::{menu_color, MenuItems};
use crate::scheduler::{DeferredTask, TaskKey};
use crate::surface::{Surface, CELLS_PER_BLOCK};
use crate::types::{ButtonId, Color, KNOB_COUNT};

/// Track kinds on the lower row, left to right
const KINDS: [TrackKind; 3] = [TrackKind::Instrument, TrackKind::Audio, TrackKind::Effect];

/// Lower-row slot that leaves without adding
const CANCEL_SLOT: usize = 7;

fn kind_label(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Instrument => "Instrument",
        TrackKind::Audio => "Audio",
        TrackKind::Effect => "Effect",
        TrackKind::Group => "Group",
        TrackKind::Master => "Master",
    }
}

pub struct AddTrackMode {
    menu: MenuItems,
    scratch: String,
}

impl AddTrackMode {
    pub fn new() -> Self {
        let mut menu = MenuItems::new();
        for (item, kind) in menu.iter_mut().zip(KINDS.iter()) {
            item.set(kind_label(*kind), false);
        }
        if let Some(item) = menu.get_mut(CANCEL_SLOT) {
            item.set("Cancel", false);
        }
        Self {
            menu,
            scratch: String::new(),
        }
    }

    fn add(&self, kind: TrackKind, ctx: &mut Context<'_>) {
        log::info!("add: Adding {:?} track", kind);
        ctx.daw.add_track(kind);
        if ctx.settings.favorites.for_kind(kind).is_some() {
            let delay = ctx.settings.device_insert_delay();
            ctx.schedule(TaskKey::DeviceInsert, DeferredTask::InsertFavorite { kind }, delay);
        } else {
            // A pending insert from an earlier add would land on the wrong track
            ctx.scheduler.cancel(TaskKey::DeviceInsert);
        }
    }
}

impl Default for AddTrackMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for AddTrackMode {
    fn is_transient(&self) -> bool {
        true
    }
}

impl Mode for AddTrackMode {
    fn id(&self) -> ModeId {
        ModeId::AddTrack
    }

    fn on_second_row(&mut self, index: usize, event: &ButtonState, ctx: &mut Context<'_>) {
        if event.event != ButtonEvent::Down {
            return;
        }
        if let Some(kind) = KINDS.get(index) {
            self.add(*kind, ctx);
            ctx.restore_mode();
        } else if index == CANCEL_SLOT {
            ctx.restore_mode();
        }
    }

    fn button_color(&self, button: ButtonId, _ctx: &RenderContext<'_>) -> Color {
        match button {
            ButtonId::Row2(i) => {
                let present = self.menu.get(i as usize).is_some_and(|item| !item.is_empty());
                menu_color(present, false)
            }
            _ => Color::Off,
        }
    }

    fn render(&mut self, ctx: &RenderContext<'_>, surface: &mut dyn Surface) {
        for block in 0..KNOB_COUNT / CELLS_PER_BLOCK {
            surface.set_block(0, block, if block == 0 { "Add track:" } else { "" });
            surface.set_block(1, block, "");
        }
        self.menu.write_row(surface, 2, &mut self.scratch);

        // Favourite device under each kind
        for column in 0..KNOB_COUNT {
            let favorite = KINDS
                .get(column)
                .and_then(|kind| ctx.settings.favorites.for_kind(*kind))
                .unwrap_or("");
            surface.set_cell(3, column, favorite);
        }
    }
}
