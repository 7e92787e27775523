//! Engine entry point
//!
//! [`Controller`] owns the input classifier, the mode and view dispatchers,
//! the banks and the scheduler, and drives them from two calls:
//!
//! - [`Controller::handle`] for every raw control edge
//! - [`Controller::tick`] on a timer (every 10-20 ms is plenty): drains raw
//!   events queued from other threads, fires long presses, runs due deferred
//!   tasks and renders the full surface state
//!
//! Global buttons (mode and view selection, bank navigation, Mute/Solo
//! locks, octave) are handled here. Row buttons, knobs and page buttons go to
//! the active mode; pads go to the active view.

use crate::bank::Banks;
use crate::config::Settings;
use crate::context::{Context, RenderContext, Request};
use crate::render::record_color;
use crate::dispatch::Dispatcher;
use crate::input::{ButtonEvent, ButtonState, InputClassifier, InputEvent, RawEvent};
use crate::model::DawModel;
use crate::modes::{register_modes, Mode, ModeId};
use crate::scheduler::{DeferredTask, Scheduler, TaskKey};
use crate::surface::Surface;
use crate::types::{ButtonId, Color, Modifier, Modifiers, KNOB_COUNT, PAD_COUNT};
use crate::views::{register_views, View, ViewId};
use crate::SurfaceError;
use flume::{Receiver, Sender};
use std::time::Instant;

/// Upper bound on request rounds per event (a request may trigger hooks that request more)
const MAX_REQUEST_ROUNDS: usize = 8;

/// Buttons lit by the active mode or view
const MODE_BUTTONS: [ButtonId; 7] = [
    ButtonId::Volume,
    ButtonId::PanSend,
    ButtonId::Track,
    ButtonId::Device,
    ButtonId::AddTrack,
    ButtonId::Session,
    ButtonId::Note,
];

/// Modifiers lit while held
const HELD_BUTTONS: [(ButtonId, Modifier); 4] = [
    (ButtonId::Shift, Modifier::Shift),
    (ButtonId::Delete, Modifier::Delete),
    (ButtonId::Duplicate, Modifier::Duplicate),
    (ButtonId::StopClip, Modifier::StopClip),
];

/// Everything a callback context borrows, kept apart from the dispatchers
/// so both can be borrowed at once
struct State<D> {
    daw: D,
    banks: Banks,
    settings: Settings,
    scheduler: Scheduler,
    requests: Vec<Request>,
}

impl<D: DawModel> State<D> {
    fn context(
        &mut self,
        modifiers: Modifiers,
        now: Instant,
        active_mode: Option<ModeId>,
        active_view: Option<ViewId>,
    ) -> Context<'_> {
        let mut ctx = Context::new(
            &mut self.daw,
            &mut self.banks,
            &self.settings,
            &mut self.scheduler,
            &mut self.requests,
            modifiers,
            now,
        );
        ctx.active_mode = active_mode;
        ctx.active_view = active_view;
        ctx
    }

    fn render_context(
        &self,
        modifiers: Modifiers,
        active_mode: Option<ModeId>,
        active_view: Option<ViewId>,
    ) -> RenderContext<'_> {
        let mut ctx = RenderContext::new(&self.daw, &self.banks, &self.settings);
        ctx.modifiers = modifiers;
        ctx.active_mode = active_mode;
        ctx.active_view = active_view;
        ctx
    }

    fn sync_banks(&mut self) {
        self.banks.sync(&self.daw);
    }
}

/// Mode-switching surface engine over a DAW model and a surface
pub struct Controller<D: DawModel, S: Surface> {
    state: State<D>,
    surface: S,
    classifier: InputClassifier,
    modes: Dispatcher<ModeId, dyn Mode>,
    views: Dispatcher<ViewId, dyn View>,
    /// Raw events from other threads, drained on tick
    input_tx: Sender<RawEvent>,
    input_rx: Receiver<RawEvent>,
    /// Reused buffers
    events: Vec<InputEvent>,
    tasks: Vec<DeferredTask>,
}

impl<D: DawModel, S: Surface> Controller<D, S> {
    /// Build the engine with every built-in mode and view registered
    ///
    /// Fails if the configured default mode or view does not exist.
    pub fn new(daw: D, surface: S, settings: Settings) -> Result<Self, SurfaceError> {
        let mut modes: Dispatcher<ModeId, dyn Mode> = Dispatcher::new("mode");
        register_modes(&mut modes)?;
        modes.set_default_id(settings.default_mode)?;

        let mut views: Dispatcher<ViewId, dyn View> = Dispatcher::new("view");
        register_views(&mut views)?;
        views.set_default_id(settings.default_view)?;

        let (input_tx, input_rx) = flume::unbounded();
        let mut state = State {
            daw,
            banks: Banks::default(),
            settings,
            scheduler: Scheduler::new(),
            requests: Vec::new(),
        };
        state.sync_banks();

        Ok(Self {
            classifier: InputClassifier::new(state.settings.long_press()),
            state,
            surface,
            modes,
            views,
            input_tx,
            input_rx,
            events: Vec::new(),
            tasks: Vec::new(),
        })
    }

    /// Schedule activation of the default mode and view
    ///
    /// The host needs a moment after connecting before its model is
    /// populated, so this is deferred by `startup_delay_ms`.
    pub fn start(&mut self, now: Instant) {
        let due = now + self.state.settings.startup_delay();
        log::info!("start: Activating defaults in {:?}", self.state.settings.startup_delay());
        self.state
            .scheduler
            .schedule(TaskKey::Startup, DeferredTask::ActivateDefaults, due);
    }

    /// Sender for raw events produced on another thread (e.g. a MIDI callback)
    pub fn input_sender(&self) -> Sender<RawEvent> {
        self.input_tx.clone()
    }

    /// Classify and dispatch one raw event
    pub fn handle(&mut self, raw: RawEvent, now: Instant) -> Result<(), SurfaceError> {
        if let Some(event) = self.classifier.process(raw, now)? {
            self.dispatch(event, now)?;
        }
        Ok(())
    }

    /// Periodic work: queued input, long presses, deferred tasks, render
    pub fn tick(&mut self, now: Instant) -> Result<(), SurfaceError> {
        // A bad queued event is dropped; it must not stall polling or tasks
        while let Ok(raw) = self.input_rx.try_recv() {
            match self.classifier.process(raw, now) {
                Ok(Some(event)) => self.dispatch(event, now)?,
                Ok(None) => {}
                Err(e) => log::warn!("tick: Dropping {:?}: {}", raw, e),
            }
        }

        let mut events = std::mem::take(&mut self.events);
        self.classifier.poll(now, &mut events);
        for event in events.drain(..) {
            self.dispatch(event, now)?;
        }
        self.events = events;

        let mut tasks = std::mem::take(&mut self.tasks);
        self.state.scheduler.take_due(now, &mut tasks);
        for task in tasks.drain(..) {
            self.run_task(task, now)?;
        }
        self.tasks = tasks;

        self.render();
        Ok(())
    }

    /// Activate the default mode and view immediately
    pub fn activate_defaults(&mut self, now: Instant) -> Result<(), SurfaceError> {
        self.state.scheduler.cancel(TaskKey::Startup);
        self.run_task(DeferredTask::ActivateDefaults, now)
    }

    pub fn set_mode(&mut self, id: ModeId, now: Instant) -> Result<(), SurfaceError> {
        self.state.requests.push(Request::ActivateMode(id));
        self.apply_requests(now)
    }

    pub fn restore_mode(&mut self, now: Instant) -> Result<(), SurfaceError> {
        self.state.requests.push(Request::RestoreMode);
        self.apply_requests(now)
    }

    pub fn set_view(&mut self, id: ViewId, now: Instant) -> Result<(), SurfaceError> {
        self.state.requests.push(Request::ActivateView(id));
        self.apply_requests(now)
    }

    pub fn restore_view(&mut self, now: Instant) -> Result<(), SurfaceError> {
        self.state.requests.push(Request::RestoreView);
        self.apply_requests(now)
    }

    /// Write the complete surface state
    pub fn render(&mut self) {
        self.state.sync_banks();
        let modifiers = self.classifier.modifiers();
        let active_mode = self.modes.active_id();
        let active_view = self.views.active_id();
        let ctx = self.state.render_context(modifiers, active_mode, active_view);
        let surface = &mut self.surface;

        match self.modes.active_mut() {
            Some(mode) => {
                mode.render(&ctx, &mut *surface);
                for i in 0..KNOB_COUNT as u8 {
                    for button in [ButtonId::Row1(i), ButtonId::Row2(i)] {
                        surface.update_button(button, mode.button_color(button, &ctx));
                    }
                }
                for button in [ButtonId::PageLeft, ButtonId::PageRight] {
                    surface.update_button(button, mode.button_color(button, &ctx));
                }
            }
            None => {
                for i in 0..KNOB_COUNT as u8 {
                    surface.update_button(ButtonId::Row1(i), Color::Off);
                    surface.update_button(ButtonId::Row2(i), Color::Off);
                }
            }
        }

        for button in MODE_BUTTONS {
            let lit = match button {
                ButtonId::Volume => active_mode == Some(ModeId::Volume),
                ButtonId::PanSend => active_mode.is_some_and(|id| id.is_pan_or_send()),
                ButtonId::Track => active_mode == Some(ModeId::Track),
                ButtonId::Device => active_mode == Some(ModeId::Device),
                ButtonId::AddTrack => active_mode == Some(ModeId::AddTrack),
                ButtonId::Session => active_view == Some(ViewId::Session),
                ButtonId::Note => matches!(active_view, Some(ViewId::Play | ViewId::Color)),
                _ => false,
            };
            surface.update_button(button, Color::intensity(Color::WhiteLo, Color::WhiteHi, lit));
        }
        for (button, modifier) in HELD_BUTTONS {
            let held = modifiers.is_held(modifier);
            surface.update_button(button, Color::intensity(Color::WhiteLo, Color::WhiteHi, held));
        }
        let record = record_color(ctx.daw.transport(), modifiers.record);
        surface.update_button(ButtonId::Record, record);
        surface.update_button(
            ButtonId::Mute,
            Color::intensity(Color::YellowLo, Color::YellowHi, modifiers.mute_active()),
        );
        surface.update_button(
            ButtonId::Solo,
            Color::intensity(Color::BlueLo, Color::BlueHi, modifiers.solo_active()),
        );

        let banks = ctx.banks;
        let navigation = [
            (ButtonId::Left, banks.tracks.can_scroll_page_backwards()),
            (ButtonId::Right, banks.tracks.can_scroll_page_forwards()),
            (ButtonId::Up, banks.scenes.can_scroll_page_backwards()),
            (ButtonId::Down, banks.scenes.can_scroll_page_forwards()),
        ];
        for (button, possible) in navigation {
            surface.update_button(button, Color::intensity(Color::Off, Color::WhiteLo, possible));
        }

        let plays_notes = self
            .views
            .active_mut()
            .is_some_and(|view| view.as_note_input().is_some());
        for button in [ButtonId::OctaveUp, ButtonId::OctaveDown] {
            surface.update_button(button, Color::intensity(Color::Off, Color::WhiteLo, plays_notes));
        }

        match self.views.active() {
            Some(view) => {
                for index in 0..PAD_COUNT {
                    surface.update_pad(index, view.pad_color(index, &ctx));
                }
            }
            None => {
                for index in 0..PAD_COUNT {
                    surface.update_pad(index, Color::Off);
                }
            }
        }

        surface.flush();
    }

    fn dispatch(&mut self, event: InputEvent, now: Instant) -> Result<(), SurfaceError> {
        self.state.sync_banks();
        let active_mode = self.modes.active_id();
        let active_view = self.views.active_id();

        match event {
            InputEvent::Knob {
                index,
                delta,
                modifiers,
            } => {
                let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
                if let Some(mode) = self.modes.active_mut() {
                    mode.on_knob_value(index, delta, &mut ctx);
                }
            }
            InputEvent::KnobTouch {
                index,
                touched,
                modifiers,
            } => {
                let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
                if let Some(mode) = self.modes.active_mut() {
                    mode.on_knob_touch(index, touched, &mut ctx);
                }
            }
            InputEvent::Pad {
                index,
                velocity,
                modifiers,
            } => {
                let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
                if let Some(view) = self.views.active_mut() {
                    view.on_pad(index, velocity, &mut ctx);
                }
            }
            InputEvent::Button(state) => self.on_button(&state, now),
        }

        self.apply_requests(now)
    }

    fn on_button(&mut self, state: &ButtonState, now: Instant) {
        let active_mode = self.modes.active_id();
        let active_view = self.views.active_id();
        let modifiers = state.modifiers;

        // Row and page buttons see every event; the rest act on press
        match state.id {
            ButtonId::Row1(i) => {
                let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
                if let Some(mode) = self.modes.active_mut() {
                    mode.on_first_row(i as usize, state, &mut ctx);
                }
                return;
            }
            ButtonId::Row2(i) => {
                let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
                if let Some(mode) = self.modes.active_mut() {
                    mode.on_second_row(i as usize, state, &mut ctx);
                }
                return;
            }
            ButtonId::Mute => return self.on_lockable(Modifier::Mute, state),
            ButtonId::Solo => return self.on_lockable(Modifier::Solo, state),
            _ => {}
        }

        if state.event != ButtonEvent::Down {
            return;
        }

        let requests = &mut self.state.requests;
        match state.id {
            ButtonId::Volume => requests.push(Request::ActivateMode(ModeId::Volume)),
            ButtonId::PanSend => {
                // Pressing again from Pan moves on to the first visible send
                let first_send = self.state.banks.send_index(0);
                let target = match (active_mode, first_send) {
                    (Some(ModeId::Pan), Some(send)) => ModeId::Send(send as u8),
                    _ => ModeId::Pan,
                };
                if self.modes.contains(target) {
                    requests.push(Request::ActivateMode(target));
                }
            }
            ButtonId::Track => requests.push(Request::ActivateMode(ModeId::Track)),
            ButtonId::Device => requests.push(Request::ActivateMode(ModeId::Device)),
            ButtonId::AddTrack => requests.push(Request::ActivateMode(ModeId::AddTrack)),
            ButtonId::Session => requests.push(Request::ActivateView(ViewId::Session)),
            ButtonId::Note => {
                if modifiers.shift {
                    requests.push(Request::ActivateView(ViewId::Color));
                    requests.push(Request::Consume(Modifier::Shift));
                } else {
                    requests.push(Request::ActivateView(ViewId::Play));
                }
            }
            ButtonId::Left => self.scroll_tracks(false, modifiers.shift, now),
            ButtonId::Right => self.scroll_tracks(true, modifiers.shift, now),
            ButtonId::Up => self.scroll_scenes(false, modifiers.shift),
            ButtonId::Down => self.scroll_scenes(true, modifiers.shift),
            ButtonId::PageLeft | ButtonId::PageRight => {
                let forward = state.id == ButtonId::PageRight;
                let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
                if let Some(mode) = self.modes.active_mut() {
                    mode.on_page(forward, &mut ctx);
                }
            }
            ButtonId::OctaveUp | ButtonId::OctaveDown => {
                let up = state.id == ButtonId::OctaveUp;
                if let Some(input) = self.views.active_mut().and_then(|view| view.as_note_input()) {
                    let moved = if up { input.octave_up() } else { input.octave_down() };
                    log::debug!("on_button: Octave {} (moved: {})", input.octave(), moved);
                }
            }
            _ => {}
        }
    }

    /// Mute / Solo: long press latches, short press toggles the selected track
    fn on_lockable(&mut self, modifier: Modifier, state: &ButtonState) {
        let settings = &self.state.settings;
        let lock_enabled = match modifier {
            Modifier::Mute => settings.mute_lock_on_long_press,
            _ => settings.solo_lock_on_long_press,
        };
        let current = self.classifier.modifiers();
        let locked = match modifier {
            Modifier::Mute => current.mute_lock,
            _ => current.solo_lock,
        };

        match state.event {
            ButtonEvent::Long if lock_enabled && !state.consumed => {
                log::info!("on_lockable: {:?} lock {}", modifier, !locked);
                self.classifier.set_lock(modifier, !locked);
            }
            ButtonEvent::Up if state.is_short_press() => {
                if locked {
                    self.classifier.set_lock(modifier, false);
                } else if let Some(track) = self.state.daw.selected_track() {
                    match modifier {
                        Modifier::Mute => self.state.daw.toggle_mute(track),
                        _ => self.state.daw.toggle_solo(track),
                    }
                }
            }
            _ => {}
        }
    }

    /// Move the track window, then re-select at the same slot once it settles
    fn scroll_tracks(&mut self, forward: bool, by_page: bool, now: Instant) {
        let tracks = &mut self.state.banks.tracks;
        let slot = self
            .state
            .daw
            .selected_track()
            .and_then(|index| tracks.slot_of(index))
            .unwrap_or(0);

        let moved = match (forward, by_page) {
            (true, true) => tracks.select_next_page(),
            (true, false) => tracks.scroll_forwards(),
            (false, true) => tracks.select_previous_page(),
            (false, false) => tracks.scroll_backwards(),
        };
        if !moved {
            return;
        }

        if let Some(index) = tracks.absolute(slot).or_else(|| tracks.absolute(0)) {
            let due = now + self.state.settings.bank_settle();
            self.state
                .scheduler
                .schedule(TaskKey::BankSettle, DeferredTask::SelectTrack { index }, due);
        }
    }

    fn scroll_scenes(&mut self, forward: bool, by_page: bool) {
        let scenes = &mut self.state.banks.scenes;
        match (forward, by_page) {
            (true, true) => scenes.select_next_page(),
            (true, false) => scenes.scroll_forwards(),
            (false, true) => scenes.select_previous_page(),
            (false, false) => scenes.scroll_backwards(),
        };
    }

    fn run_task(&mut self, task: DeferredTask, now: Instant) -> Result<(), SurfaceError> {
        log::debug!("run_task: {:?}", task);
        match task {
            DeferredTask::ActivateDefaults => {
                self.state.sync_banks();
                let modifiers = self.classifier.modifiers();
                let active_view = self.views.active_id();
                let mut ctx = self.state.context(modifiers, now, self.modes.active_id(), active_view);
                self.modes.activate_default(&mut ctx)?;
                let mut ctx = self.state.context(modifiers, now, self.modes.active_id(), active_view);
                self.views.activate_default(&mut ctx)?;
            }
            DeferredTask::SelectTrack { index } => {
                if index < self.state.daw.track_count() {
                    self.state.daw.select_track(index);
                }
            }
            DeferredTask::InsertFavorite { kind } => {
                let State { daw, settings, .. } = &mut self.state;
                let Some(favorite) = settings.favorites.for_kind(kind) else {
                    return Ok(());
                };
                match daw.selected_track() {
                    Some(track) if daw.track(track).is_some_and(|t| t.kind == kind) => {
                        log::info!("run_task: Inserting {} into track {}", favorite, track);
                        daw.insert_device(track, favorite);
                    }
                    _ => log::warn!("run_task: No new {:?} track selected, skipping {}", kind, favorite),
                }
            }
        }
        self.apply_requests(now)
    }

    fn apply_requests(&mut self, now: Instant) -> Result<(), SurfaceError> {
        for _ in 0..MAX_REQUEST_ROUNDS {
            if self.state.requests.is_empty() {
                return Ok(());
            }
            let batch = std::mem::take(&mut self.state.requests);
            for request in batch {
                self.apply(request, now)?;
            }
        }
        log::warn!(
            "apply_requests: Dropping {} requests after {} rounds",
            self.state.requests.len(),
            MAX_REQUEST_ROUNDS
        );
        self.state.requests.clear();
        Ok(())
    }

    fn apply(&mut self, request: Request, now: Instant) -> Result<(), SurfaceError> {
        let modifiers = self.classifier.modifiers();
        let active_mode = self.modes.active_id();
        let active_view = self.views.active_id();
        let mut ctx = self.state.context(modifiers, now, active_mode, active_view);
        match request {
            Request::ActivateMode(id) => self.modes.set_active(id, &mut ctx),
            Request::RestoreMode => self.modes.restore(&mut ctx),
            Request::ActivateView(id) => self.views.set_active(id, &mut ctx),
            Request::RestoreView => self.views.restore(&mut ctx),
            Request::Consume(modifier) => {
                self.classifier.consume(modifier.button());
                Ok(())
            }
        }
    }

    // --- Accessors ---

    pub fn daw(&self) -> &D {
        &self.state.daw
    }

    pub fn daw_mut(&mut self) -> &mut D {
        &mut self.state.daw
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn banks(&self) -> &Banks {
        &self.state.banks
    }

    pub fn banks_mut(&mut self) -> &mut Banks {
        &mut self.state.banks
    }

    pub fn modifiers(&self) -> Modifiers {
        self.classifier.modifiers()
    }

    pub fn active_mode(&self) -> Option<ModeId> {
        self.modes.active_id()
    }

    pub fn previous_mode(&self) -> Option<ModeId> {
        self.modes.previous_id()
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.views.active_id()
    }

    pub fn mode(&self, id: ModeId) -> Result<&dyn Mode, SurfaceError> {
        Ok(self.modes.get(id)?)
    }

    pub fn view(&self, id: ViewId) -> Result<&dyn View, SurfaceError> {
        Ok(self.views.get(id)?)
    }

    /// Whether a deferred task is waiting for `key`
    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.state.scheduler.is_pending(key)
    }

    /// Read-only context over the current state, for colour queries
    pub fn render_context(&self) -> RenderContext<'_> {
        self.state.render_context(
            self.classifier.modifiers(),
            self.modes.active_id(),
            self.views.active_id(),
        )
    }
}
