//! End-to-end behaviour through the public engine API

use pushwig_core::views::PALETTE;
use pushwig_core::{
    ButtonId, Color, Controller, DawCall, DawModel, Frame, MemoryDaw, ModeId, ParameterId, RawEvent,
    Settings, SurfaceError, TaskKey, TrackKind, ViewId,
};
use std::time::{Duration, Instant};

type Engine = Controller<MemoryDaw, Frame>;

fn engine_with(daw: MemoryDaw, settings: Settings) -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = Controller::new(daw, Frame::new(), settings).unwrap();
    engine.activate_defaults(Instant::now()).unwrap();
    engine
}

fn engine(daw: MemoryDaw) -> Engine {
    engine_with(daw, Settings::default())
}

fn press(engine: &mut Engine, id: ButtonId, now: Instant) {
    engine
        .handle(RawEvent::Button { id, pressed: true }, now)
        .unwrap();
}

fn release(engine: &mut Engine, id: ButtonId, now: Instant) {
    engine
        .handle(RawEvent::Button { id, pressed: false }, now)
        .unwrap();
}

fn tap(engine: &mut Engine, id: ButtonId, now: Instant) {
    press(engine, id, now);
    release(engine, id, now);
}

fn touch(engine: &mut Engine, index: usize, touched: bool, now: Instant) {
    engine
        .handle(RawEvent::KnobTouch { index, touched }, now)
        .unwrap();
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_startup_activates_defaults_after_delay() {
    let mut engine = Controller::new(MemoryDaw::with_tracks(4, 2), Frame::new(), Settings::default()).unwrap();
    let t0 = Instant::now();
    engine.start(t0);

    engine.tick(t0).unwrap();
    assert_eq!(engine.active_mode(), None);
    assert!(engine.is_pending(TaskKey::Startup));

    engine.tick(t0 + ms(100)).unwrap();
    assert_eq!(engine.active_mode(), Some(ModeId::Track));
    assert_eq!(engine.active_view(), Some(ViewId::Play));
}

#[test]
fn test_unknown_default_mode_is_rejected() {
    let settings = Settings {
        default_mode: ModeId::Send(200),
        ..Default::default()
    };
    let result = Controller::new(MemoryDaw::new(), Frame::new(), settings);
    assert!(matches!(result, Err(SurfaceError::Registry(_))));
}

#[test]
fn test_button_color_is_pure() {
    let mut daw = MemoryDaw::with_tracks(8, 8);
    daw.selected_track = Some(2);
    daw.tracks[1].armed = true;
    let mut engine = engine(daw);
    let now = Instant::now();
    press(&mut engine, ButtonId::Mute, now);

    for id in [ModeId::Volume, ModeId::Pan, ModeId::Send(0), ModeId::Track, ModeId::Device, ModeId::AddTrack] {
        engine.set_mode(id, now).unwrap();
        let ctx = engine.render_context();
        let mode = engine.mode(id).unwrap();
        for i in 0..8u8 {
            for button in [ButtonId::Row1(i), ButtonId::Row2(i)] {
                assert_eq!(mode.button_color(button, &ctx), mode.button_color(button, &ctx));
            }
        }
    }
}

#[test]
fn test_track_row_colors_and_chord_override() {
    let mut daw = MemoryDaw::with_tracks(3, 0);
    daw.selected_track = Some(0);
    daw.tracks[1].armed = true;
    daw.tracks[2].muted = true;
    let mut engine = engine(daw);
    let now = Instant::now();

    engine.render();
    let frame = engine.surface();
    assert_eq!(frame.button(ButtonId::Row1(0)), Color::OrangeHi);
    assert_eq!(frame.button(ButtonId::Row1(1)), Color::RedLo);
    assert_eq!(frame.button(ButtonId::Row1(2)), Color::YellowLo);
    assert_eq!(frame.button(ButtonId::Row1(3)), Color::Off);

    // Mute held: rows show audible state instead
    press(&mut engine, ButtonId::Mute, now);
    engine.render();
    let frame = engine.surface();
    assert_eq!(frame.button(ButtonId::Row1(0)), Color::YellowHi);
    assert_eq!(frame.button(ButtonId::Row1(2)), Color::YellowLo);
    assert_eq!(frame.button(ButtonId::Mute), Color::YellowHi);
}

#[test]
fn test_restore_round_trip_and_nested_transient() {
    let mut engine = engine(MemoryDaw::with_tracks(4, 0));
    let now = Instant::now();

    engine.set_mode(ModeId::Volume, now).unwrap();
    tap(&mut engine, ButtonId::AddTrack, now);
    assert_eq!(engine.active_mode(), Some(ModeId::AddTrack));
    assert_eq!(engine.previous_mode(), Some(ModeId::Volume));

    engine.restore_mode(now).unwrap();
    assert_eq!(engine.active_mode(), Some(ModeId::Volume));

    // Transient view entered from a transient view keeps the first target
    engine.set_view(ViewId::Session, now).unwrap();
    engine.set_view(ViewId::Color, now).unwrap();
    engine.set_view(ViewId::Color, now).unwrap();
    engine.restore_view(now).unwrap();
    assert_eq!(engine.active_view(), Some(ViewId::Session));
}

#[test]
fn test_touch_is_not_double_armed() {
    let mut engine = engine(MemoryDaw::with_tracks(8, 0));
    let now = Instant::now();
    engine.set_mode(ModeId::Volume, now).unwrap();
    engine.daw_mut().clear_calls();

    touch(&mut engine, 3, true, now);
    touch(&mut engine, 3, true, now);
    touch(&mut engine, 3, false, now);

    let id = ParameterId::Volume { track: 3 };
    assert_eq!(
        engine.daw().calls,
        vec![DawCall::TouchParameter(id, true), DawCall::TouchParameter(id, false)]
    );
}

#[test]
fn test_delete_touch_resets_volume() {
    let mut engine = engine(MemoryDaw::with_tracks(8, 0));
    let now = Instant::now();
    engine.set_mode(ModeId::Volume, now).unwrap();
    engine
        .handle(RawEvent::Knob { index: 0, delta: 20 }, now)
        .unwrap();
    engine.daw_mut().clear_calls();

    press(&mut engine, ButtonId::Delete, now);
    touch(&mut engine, 0, true, now);

    let id = ParameterId::Volume { track: 0 };
    assert_eq!(engine.daw().calls, vec![DawCall::ResetParameter(id)]);
    assert!((engine.daw().tracks[0].volume.value - 0.79).abs() < 1e-9);

    touch(&mut engine, 0, false, now);
    release(&mut engine, ButtonId::Delete, now);
    assert!(!engine
        .daw()
        .calls
        .contains(&DawCall::TouchParameter(id, true)));
}

#[test]
fn test_selected_track_press_enters_device_mode() {
    let mut daw = MemoryDaw::with_tracks(8, 0);
    daw.selected_track = Some(2);
    let mut engine = engine(daw);
    let now = Instant::now();

    tap(&mut engine, ButtonId::Row1(2), now);
    assert_eq!(engine.active_mode(), Some(ModeId::Device));
    assert!(!engine
        .daw()
        .calls
        .contains(&DawCall::ToggleGroupExpanded(2)));
}

#[test]
fn test_shift_press_on_selected_group_toggles_expansion() {
    let mut daw = MemoryDaw::with_tracks(8, 0);
    daw.tracks[2].kind = TrackKind::Group;
    daw.selected_track = Some(2);
    let mut engine = engine(daw);
    let now = Instant::now();

    press(&mut engine, ButtonId::Shift, now);
    tap(&mut engine, ButtonId::Row1(2), now);
    release(&mut engine, ButtonId::Shift, now);

    assert_eq!(engine.active_mode(), Some(ModeId::Track));
    assert_eq!(engine.daw().calls, vec![DawCall::ToggleGroupExpanded(2)]);
    assert!(engine.daw().tracks[2].expanded);

    // Without Shift the group behaves like any selected track
    tap(&mut engine, ButtonId::Row1(2), now);
    assert_eq!(engine.active_mode(), Some(ModeId::Device));
}

#[test]
fn test_unselected_track_press_selects() {
    let mut engine = engine(MemoryDaw::with_tracks(8, 0));
    let now = Instant::now();
    tap(&mut engine, ButtonId::Row1(5), now);
    assert_eq!(engine.daw().selected_track, Some(5));
    assert_eq!(engine.active_mode(), Some(ModeId::Track));

    // Empty slot does nothing
    let mut engine = self::engine(MemoryDaw::with_tracks(3, 0));
    tap(&mut engine, ButtonId::Row1(6), now);
    assert!(engine.daw().calls.is_empty());
}

#[test]
fn test_send_paging_labels_and_up_affordance() {
    let mut daw = MemoryDaw::with_tracks(8, 8);
    daw.inside_group = true;
    let mut engine = engine(daw);
    let now = Instant::now();
    engine.set_mode(ModeId::Volume, now).unwrap();

    engine.render();
    let row = engine.surface().row(2);
    assert_eq!(&row[..4], &[">Volume", "Pan", "Track", "Device"]);
    assert_eq!(&row[4..7], &["FX 1", "FX 2", "FX 3"]);
    // Inside a group, nothing held: last slot leaves the group
    assert_eq!(row[7], "Up");

    tap(&mut engine, ButtonId::PageRight, now);
    engine.render();
    assert_eq!(&engine.surface().row(2)[4..7], &["FX 5", "FX 6", "FX 7"]);
    assert_eq!(engine.surface().cell(2, 7), "Up");

    // Shift makes the last send accessible
    press(&mut engine, ButtonId::Shift, now);
    engine.render();
    assert_eq!(engine.surface().cell(2, 7), "FX 8");
    release(&mut engine, ButtonId::Shift, now);

    // So does touching knob 7
    touch(&mut engine, 7, true, now);
    engine.render();
    assert_eq!(engine.surface().cell(2, 7), "FX 8");
    touch(&mut engine, 7, false, now);
    engine.render();
    assert_eq!(engine.surface().cell(2, 7), "Up");

    // Outside a group it is always the send
    engine.daw_mut().inside_group = false;
    engine.render();
    assert_eq!(engine.surface().cell(2, 7), "FX 8");

    // Send paging wraps
    tap(&mut engine, ButtonId::PageRight, now);
    engine.render();
    assert_eq!(engine.surface().cell(2, 4), "FX 1");
}

#[test]
fn test_up_affordance_exits_group() {
    let mut daw = MemoryDaw::with_tracks(8, 8);
    daw.inside_group = true;
    let mut engine = engine(daw);
    let now = Instant::now();

    tap(&mut engine, ButtonId::Row2(7), now);
    assert_eq!(engine.daw().calls, vec![DawCall::ExitGroup]);
    assert!(!engine.daw().inside_group);

    // Now the slot selects the fourth send
    tap(&mut engine, ButtonId::Row2(7), now);
    assert_eq!(engine.active_mode(), Some(ModeId::Send(3)));
}

#[test]
fn test_shift_toggles_send_half() {
    let mut daw = MemoryDaw::with_tracks(2, 8);
    daw.selected_track = Some(0);
    let mut engine = engine(daw);
    let now = Instant::now();

    press(&mut engine, ButtonId::Shift, now);
    tap(&mut engine, ButtonId::Row2(4), now);
    release(&mut engine, ButtonId::Shift, now);
    assert!(engine.banks().sends_toggled);
    assert_eq!(engine.active_mode(), Some(ModeId::Track));

    engine.render();
    assert_eq!(engine.surface().cell(2, 4), "FX 5");
    // Track mode knob 4 now drives the fifth send
    engine
        .handle(RawEvent::Knob { index: 4, delta: 1 }, now)
        .unwrap();
    assert!(matches!(
        engine.daw().calls.last(),
        Some(DawCall::ChangeParameter(ParameterId::Send { track: 0, send: 4 }, _))
    ));
}

#[test]
fn test_track_mode_placeholder() {
    let mut engine = engine(MemoryDaw::with_tracks(2, 0));
    engine.render();
    assert_eq!(engine.surface().cell(0, 0), "Please select a track...");
    assert_eq!(engine.surface().cell(3, 0), "Track 1");

    engine.daw_mut().selected_track = Some(1);
    engine.render();
    assert_eq!(engine.surface().cell(0, 0), "Volume");
    assert_eq!(engine.surface().cell(1, 0), "79%");
    assert_eq!(engine.surface().cell(3, 1), ">Track 2");
}

#[test]
fn test_bank_scroll_reselects_after_settle() {
    let mut daw = MemoryDaw::with_tracks(12, 0);
    daw.selected_track = Some(2);
    let mut engine = engine(daw);
    let t0 = Instant::now();

    tap(&mut engine, ButtonId::Right, t0);
    assert_eq!(engine.banks().tracks.scroll_position(), 1);
    engine.tick(t0 + ms(10)).unwrap();
    assert_eq!(engine.daw().selected_track, Some(2));

    // A second scroll inside the window supersedes the first; the selection
    // has not moved yet, so it is now one slot further left
    tap(&mut engine, ButtonId::Right, t0 + ms(20));
    engine.tick(t0 + ms(200)).unwrap();
    assert_eq!(engine.banks().tracks.scroll_position(), 2);
    assert_eq!(engine.daw().calls, vec![DawCall::SelectTrack(3)]);

    // Shift pages
    press(&mut engine, ButtonId::Shift, t0);
    tap(&mut engine, ButtonId::Left, t0);
    release(&mut engine, ButtonId::Shift, t0);
    assert_eq!(engine.banks().tracks.scroll_position(), 0);
}

#[test]
fn test_add_track_inserts_favorite_once() {
    let mut settings = Settings::default();
    settings.favorites.instrument = Some("Polysynth".to_string());
    let mut engine = engine_with(MemoryDaw::with_tracks(2, 0), settings);
    let t0 = Instant::now();

    tap(&mut engine, ButtonId::AddTrack, t0);
    tap(&mut engine, ButtonId::Row2(0), t0);
    assert_eq!(engine.active_mode(), Some(ModeId::Track));
    assert_eq!(engine.daw().track_count(), 3);

    // Second add inside the delay window: only the latest insert runs
    tap(&mut engine, ButtonId::AddTrack, t0 + ms(100));
    tap(&mut engine, ButtonId::Row2(0), t0 + ms(100));

    engine.tick(t0 + ms(350)).unwrap();
    assert!(engine.is_pending(TaskKey::DeviceInsert));
    engine.tick(t0 + ms(400)).unwrap();

    let inserts: Vec<_> = engine
        .daw()
        .calls
        .iter()
        .filter(|c| matches!(c, DawCall::InsertDevice { .. }))
        .collect();
    assert_eq!(
        inserts,
        vec![&DawCall::InsertDevice {
            track: 3,
            name: "Polysynth".to_string()
        }]
    );
}

#[test]
fn test_add_track_without_favorite() {
    let mut engine = engine(MemoryDaw::with_tracks(1, 0));
    let t0 = Instant::now();
    tap(&mut engine, ButtonId::AddTrack, t0);
    tap(&mut engine, ButtonId::Row2(1), t0);
    engine.tick(t0 + ms(1000)).unwrap();

    assert_eq!(engine.daw().track(1).map(|t| t.kind), Some(TrackKind::Audio));
    assert!(!engine
        .daw()
        .calls
        .iter()
        .any(|c| matches!(c, DawCall::InsertDevice { .. })));
}

#[test]
fn test_mute_lock_and_short_press() {
    let mut daw = MemoryDaw::with_tracks(4, 0);
    daw.selected_track = Some(0);
    let mut engine = engine(daw);
    let t0 = Instant::now();

    // Short press toggles the selected track
    tap(&mut engine, ButtonId::Mute, t0);
    assert_eq!(engine.daw().calls, vec![DawCall::ToggleMute(0)]);

    // Chorded press is consumed: no toggle of the selected track on release
    engine.daw_mut().clear_calls();
    press(&mut engine, ButtonId::Mute, t0);
    tap(&mut engine, ButtonId::Row1(2), t0);
    release(&mut engine, ButtonId::Mute, t0);
    assert_eq!(engine.daw().calls, vec![DawCall::ToggleMute(2)]);

    // Long press latches
    engine.daw_mut().clear_calls();
    press(&mut engine, ButtonId::Mute, t0);
    engine.tick(t0 + ms(450)).unwrap();
    release(&mut engine, ButtonId::Mute, t0 + ms(460));
    assert!(engine.modifiers().mute_lock);
    assert!(engine.daw().calls.is_empty());

    tap(&mut engine, ButtonId::Row1(1), t0 + ms(500));
    tap(&mut engine, ButtonId::Row1(3), t0 + ms(500));
    assert_eq!(engine.daw().calls, vec![DawCall::ToggleMute(1), DawCall::ToggleMute(3)]);

    // Short press releases the latch
    tap(&mut engine, ButtonId::Mute, t0 + ms(600));
    assert!(!engine.modifiers().mute_lock);
}

#[test]
fn test_track_row_chords() {
    let mut engine = engine(MemoryDaw::with_tracks(4, 0));
    let now = Instant::now();

    for (modifier, expected) in [
        (ButtonId::Record, DawCall::ToggleArm(1)),
        (ButtonId::Solo, DawCall::ToggleSolo(1)),
        (ButtonId::StopClip, DawCall::StopTrack(1)),
        (ButtonId::Duplicate, DawCall::DuplicateTrack(1)),
        (ButtonId::Delete, DawCall::DeleteTrack(1)),
    ] {
        engine.daw_mut().clear_calls();
        press(&mut engine, modifier, now);
        tap(&mut engine, ButtonId::Row1(1), now);
        release(&mut engine, modifier, now);
        assert_eq!(engine.daw().calls, vec![expected]);
    }
}

#[test]
fn test_device_mode_pages_clamp() {
    let daw = MemoryDaw::with_tracks(1, 0).with_device_pages("Filter", 10);
    let mut engine = engine(daw);
    let now = Instant::now();
    engine.set_mode(ModeId::Device, now).unwrap();

    engine.render();
    assert_eq!(engine.surface().cell(0, 0), "P1.1");
    assert_eq!(engine.surface().cell(2, 0), ">Page 1");
    assert_eq!(engine.surface().cell(3, 0), ">Filter");

    tap(&mut engine, ButtonId::PageRight, now);
    assert_eq!(engine.banks().parameter_pages.scroll_position(), 8);
    assert_eq!(engine.daw().selected_page, 8);

    // Clamped at the end
    tap(&mut engine, ButtonId::PageRight, now);
    assert_eq!(engine.banks().parameter_pages.scroll_position(), 8);

    tap(&mut engine, ButtonId::Row2(1), now);
    assert_eq!(engine.daw().selected_page, 9);
    engine.render();
    assert_eq!(engine.surface().cell(0, 0), "P10.1");
    assert_eq!(engine.surface().button(ButtonId::PageRight), Color::Off);
    assert_eq!(engine.surface().button(ButtonId::PageLeft), Color::WhiteLo);
}

#[test]
fn test_device_mode_without_device() {
    let mut engine = engine(MemoryDaw::with_tracks(1, 0));
    let now = Instant::now();
    engine.set_mode(ModeId::Device, now).unwrap();
    engine.render();
    assert_eq!(engine.surface().cell(0, 0), "Please select a device...");

    engine
        .handle(RawEvent::Knob { index: 0, delta: 5 }, now)
        .unwrap();
    assert!(engine.daw().calls.is_empty());
}

#[test]
fn test_session_view_pads() {
    let mut daw = MemoryDaw::with_tracks(2, 0);
    daw.clips.insert(
        (0, 0),
        pushwig_core::model::Clip {
            has_content: true,
            playing: true,
            ..Default::default()
        },
    );
    daw.clips.insert(
        (1, 0),
        pushwig_core::model::Clip {
            has_content: true,
            ..Default::default()
        },
    );
    let mut engine = engine(daw);
    let now = Instant::now();
    tap(&mut engine, ButtonId::Session, now);
    assert_eq!(engine.active_view(), Some(ViewId::Session));

    engine.render();
    // Top left is track 0 / scene 0
    assert_eq!(engine.surface().pad(56), Color::GreenHi);
    assert_eq!(engine.surface().pad(57), Color::Rgb([127, 127, 127]));
    assert_eq!(engine.surface().pad(58), Color::Off);

    let hit = |engine: &mut Engine, index| {
        engine
            .handle(RawEvent::Pad { index, velocity: 100 }, now)
            .unwrap();
        engine
            .handle(RawEvent::Pad { index, velocity: 0 }, now)
            .unwrap();
    };
    hit(&mut engine, 57);
    press(&mut engine, ButtonId::Delete, now);
    hit(&mut engine, 56);
    release(&mut engine, ButtonId::Delete, now);
    press(&mut engine, ButtonId::Shift, now);
    hit(&mut engine, 48);
    release(&mut engine, ButtonId::Shift, now);

    assert_eq!(
        engine.daw().calls,
        vec![DawCall::LaunchClip(1, 0), DawCall::DeleteClip(0, 0), DawCall::LaunchScene(1)]
    );
}

#[test]
fn test_play_view_octaves() {
    let mut engine = engine(MemoryDaw::with_tracks(1, 0));
    let now = Instant::now();

    tap(&mut engine, ButtonId::OctaveUp, now);
    engine
        .handle(RawEvent::Pad { index: 0, velocity: 90 }, now)
        .unwrap();
    tap(&mut engine, ButtonId::OctaveDown, now);
    engine
        .handle(RawEvent::Pad { index: 0, velocity: 0 }, now)
        .unwrap();

    // The release matches the note that was struck
    assert_eq!(
        engine.daw().calls,
        vec![DawCall::PlayNote(48, 90), DawCall::PlayNote(48, 0)]
    );
}

#[test]
fn test_color_view_recolors_and_restores() {
    let mut daw = MemoryDaw::with_tracks(2, 0);
    daw.selected_track = Some(1);
    let mut engine = engine(daw);
    let now = Instant::now();

    press(&mut engine, ButtonId::Shift, now);
    tap(&mut engine, ButtonId::Note, now);
    release(&mut engine, ButtonId::Shift, now);
    assert_eq!(engine.active_view(), Some(ViewId::Color));

    engine.render();
    assert_eq!(engine.surface().pad(3), Color::Rgb(PALETTE[3]));

    engine
        .handle(RawEvent::Pad { index: 3, velocity: 127 }, now)
        .unwrap();
    assert_eq!(engine.daw().tracks[1].color, PALETTE[3]);
    assert_eq!(engine.active_view(), Some(ViewId::Play));
}

#[test]
fn test_mode_buttons_lit() {
    let mut engine = engine(MemoryDaw::with_tracks(1, 1));
    let now = Instant::now();

    tap(&mut engine, ButtonId::PanSend, now);
    assert_eq!(engine.active_mode(), Some(ModeId::Pan));
    tap(&mut engine, ButtonId::PanSend, now);
    assert_eq!(engine.active_mode(), Some(ModeId::Send(0)));

    engine.render();
    let frame = engine.surface();
    assert_eq!(frame.button(ButtonId::PanSend), Color::WhiteHi);
    assert_eq!(frame.button(ButtonId::Volume), Color::WhiteLo);
    assert_eq!(frame.button(ButtonId::Note), Color::WhiteHi);
    assert_eq!(frame.button(ButtonId::Row2(4)), Color::WhiteHi);
}

#[test]
fn test_input_channel_and_range_errors() {
    let mut engine = engine(MemoryDaw::with_tracks(1, 0));
    let sender = engine.input_sender();
    std::thread::spawn(move || {
        sender
            .send(RawEvent::Button {
                id: ButtonId::Volume,
                pressed: true,
            })
            .unwrap();
    })
    .join()
    .unwrap();

    engine.tick(Instant::now()).unwrap();
    assert_eq!(engine.active_mode(), Some(ModeId::Volume));

    let err = engine
        .handle(RawEvent::Knob { index: 8, delta: 1 }, Instant::now())
        .unwrap_err();
    assert_eq!(err, SurfaceError::ControlIndexOutOfRange { index: 8, count: 8 });
}

fn touch_calls(engine: &Engine) -> Vec<DawCall> {
    engine
        .daw()
        .calls
        .iter()
        .filter(|call| matches!(call, DawCall::TouchParameter(..)))
        .cloned()
        .collect()
}

#[test]
fn test_touch_end_survives_bank_scroll() {
    let mut engine = engine(MemoryDaw::with_tracks(12, 2));
    let now = Instant::now();
    tap(&mut engine, ButtonId::Volume, now);

    touch(&mut engine, 0, true, now);
    tap(&mut engine, ButtonId::Right, now);
    assert_eq!(engine.banks().tracks.scroll_position(), 1);
    touch(&mut engine, 0, false, now);

    assert_eq!(
        touch_calls(&engine),
        vec![
            DawCall::TouchParameter(ParameterId::Volume { track: 0 }, true),
            DawCall::TouchParameter(ParameterId::Volume { track: 0 }, false),
        ]
    );
}

#[test]
fn test_touch_end_survives_track_selection() {
    let mut daw = MemoryDaw::with_tracks(4, 2);
    daw.selected_track = Some(1);
    let mut engine = engine(daw);
    let now = Instant::now();
    assert_eq!(engine.active_mode(), Some(ModeId::Track));

    touch(&mut engine, 0, true, now);
    tap(&mut engine, ButtonId::Row1(2), now);
    assert_eq!(engine.daw().selected_track, Some(2));
    touch(&mut engine, 0, false, now);

    assert_eq!(
        touch_calls(&engine),
        vec![
            DawCall::TouchParameter(ParameterId::Volume { track: 1 }, true),
            DawCall::TouchParameter(ParameterId::Volume { track: 1 }, false),
        ]
    );
}

#[test]
fn test_mode_switch_releases_held_touch() {
    let mut engine = engine(MemoryDaw::with_tracks(4, 2));
    let now = Instant::now();
    tap(&mut engine, ButtonId::Volume, now);

    touch(&mut engine, 3, true, now);
    tap(&mut engine, ButtonId::PanSend, now);
    assert_eq!(engine.active_mode(), Some(ModeId::Pan));

    let volume_touches: Vec<_> = touch_calls(&engine)
        .into_iter()
        .filter(|call| matches!(call, DawCall::TouchParameter(ParameterId::Volume { .. }, _)))
        .collect();
    assert_eq!(
        volume_touches,
        vec![
            DawCall::TouchParameter(ParameterId::Volume { track: 3 }, true),
            DawCall::TouchParameter(ParameterId::Volume { track: 3 }, false),
        ]
    );
}

#[test]
fn test_bad_queued_event_does_not_stall_tick() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine =
        Controller::new(MemoryDaw::with_tracks(4, 2), Frame::new(), Settings::default()).unwrap();
    let t0 = Instant::now();
    engine.start(t0);

    let sender = engine.input_sender();
    sender.send(RawEvent::Knob { index: 99, delta: 1 }).unwrap();
    engine.tick(t0 + ms(500)).unwrap();
    assert!(!engine.is_pending(TaskKey::Startup));
    assert_eq!(engine.active_mode(), Some(ModeId::Track));

    // Events queued behind a bad one are still handled
    sender.send(RawEvent::KnobTouch { index: 42, touched: true }).unwrap();
    sender
        .send(RawEvent::Button {
            id: ButtonId::Volume,
            pressed: true,
        })
        .unwrap();
    engine.tick(t0 + ms(600)).unwrap();
    assert_eq!(engine.active_mode(), Some(ModeId::Volume));
}

#[test]
fn test_record_button_shows_transport() {
    let mut engine = engine(MemoryDaw::with_tracks(2, 0));
    let now = Instant::now();

    engine.render();
    assert_eq!(engine.surface().button(ButtonId::Record), Color::WhiteLo);

    engine.daw_mut().transport.recording = true;
    engine.render();
    assert_eq!(engine.surface().button(ButtonId::Record), Color::RedHi);

    press(&mut engine, ButtonId::Record, now);
    engine.render();
    assert_eq!(engine.surface().button(ButtonId::Record), Color::WhiteHi);
}
