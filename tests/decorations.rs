use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use decobar::config::{no_checks, NinePatchSource, RuleKey};
use decobar::core::{DecorationId, MonitorId, WindowId};
use decobar::manager::{Dirty, HostEvent};
use decobar::platform::dummy::Request;
use decobar::platform::{DummyHost, Host, WindowState, WmCommand};
use decobar::render::SoftwareRenderer;
use decobar::types::{Color, Logical, Point, Rectangle, Size};
use decobar::{BarConfig, DecoError, DecorationRegistry};

const WIN: WindowId = WindowId::new(1);
const MON: MonitorId = MonitorId::new(0);

// the window body is at (100, 100), 400x200, with a 24px bar on top;
// buttons are 16px, right aligned, 4px apart, vertically centered
const BACKGROUND: (f64, f64) = (200., 88.);
const BODY: (f64, f64) = (200., 200.);

fn button_center(idx: usize) -> (f64, f64) {
    (492. - 20. * idx as f64, 88.)
}

fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) {
    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(rgba).unwrap();
}

/// A 7x7 skin stretching its middle, with no content padding.
fn write_skin(path: &Path) {
    let mut px = vec![0x80u8; 7 * 7 * 4];
    let mut set = |x: usize, y: usize, rgba: [u8; 4]| {
        let i = (y * 7 + x) * 4;
        px[i..i + 4].copy_from_slice(&rgba);
    };
    for i in 0..7 {
        for edge in [(i, 0), (0, i), (i, 6), (6, i)] {
            set(edge.0, edge.1, [0, 0, 0, 0]);
        }
    }
    for i in 2..=4 {
        set(i, 0, [0, 0, 0, 0xff]);
        set(0, i, [0, 0, 0, 0xff]);
    }
    for i in 1..=5 {
        set(i, 6, [0, 0, 0, 0xff]);
        set(6, i, [0, 0, 0, 0xff]);
    }
    write_png(path, 7, 7, &px);
}

struct Setup {
    host: DummyHost,
    registry: DecorationRegistry,
    id: DecorationId,
    _dir: TempDir,
}

fn config(dir: &Path, skin: bool) -> BarConfig {
    let mut builder = BarConfig::builder()
        .offset_top(24)
        .padding(0)
        .button_padding(4)
        .title_enabled(false)
        .appicon_enabled(false)
        .color_transition(Duration::ZERO)
        .double_click("dbl");
    if skin {
        builder = builder.ninepatch(NinePatchSource {
            active: Some(dir.join("skin.png")),
            ..NinePatchSource::default()
        });
    }
    builder.finish(no_checks).unwrap()
}

fn setup(skin: bool) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    write_skin(&dir.path().join("skin.png"));
    write_png(&dir.path().join("button.png"), 16, 16, &[0xff; 16 * 16 * 4]);

    let mut host = DummyHost::new();
    host.add_monitor(MON, DummyHost::simple_monitor("DP-1", 1.));
    host.add_window(WIN, WindowState {
        position: Point::new(100., 100.),
        size: Size::new(400., 200.),
        title: "Terminal".into(),
        monitor: Some(MON),
        ..WindowState::default()
    });
    host.focus(Some(WIN));

    let mut registry = DecorationRegistry::new(config(dir.path(), skin));
    let button = dir.path().join("button.png");
    for i in 0..3 {
        registry.declare_button(&format!("16, cmd-{i}, {0}, {0}", button.display()));
    }
    registry.init(&mut host);

    let id = registry.decoration_for(WIN).unwrap();
    let desired = registry.positioning(id).unwrap().desired;
    assert_eq!(desired.top, 24.);
    registry
        .assign_box(id, Rectangle::new(0., -24., 400., 224.))
        .unwrap();
    host.take_requests();

    Setup { host, registry, id, _dir: dir }
}

fn at(pos: (f64, f64)) -> Point<f64, Logical> {
    Point::new(pos.0, pos.1)
}

fn press(s: &mut Setup, pos: (f64, f64), time: Instant) -> bool {
    s.registry
        .handle_event(&mut s.host, &HostEvent::PointerButton { pressed: true, position: at(pos), time })
        .consumed
}

fn release(s: &mut Setup, pos: (f64, f64), time: Instant) -> bool {
    s.registry
        .handle_event(&mut s.host, &HostEvent::PointerButton { pressed: false, position: at(pos), time })
        .consumed
}

fn motion(s: &mut Setup, pos: (f64, f64)) {
    s.registry
        .handle_event(&mut s.host, &HostEvent::PointerMotion { position: at(pos) });
}

fn normalized(pos: (f64, f64)) -> Point<f64, Logical> {
    Point::new(pos.0 / 1920., pos.1 / 1080.)
}

fn commands(s: &Setup) -> Vec<WmCommand> {
    s.host.commands().into_iter().map(|(_, cmd)| cmd).collect()
}

#[test_log::test]
fn window_lifecycle_follows_host_events() {
    let mut s = setup(false);
    let other = WindowId::new(2);
    s.host.add_window(other, WindowState::default());

    s.registry.handle_event(&mut s.host, &HostEvent::WindowOpened(other));
    assert_eq!(s.registry.len(), 2);
    let other_id = s.registry.decoration_for(other).unwrap();

    s.host.remove_window(other);
    s.registry.handle_event(&mut s.host, &HostEvent::WindowClosed(other));
    assert_eq!(s.registry.len(), 1);
    assert!(matches!(
        s.registry.draw(&mut s.host, other_id, 1.),
        Err(DecoError::StaleReference(_))
    ));
}

#[test]
fn double_click_within_threshold_runs_command() {
    let mut s = setup(false);
    let t0 = s.host.now();

    assert!(press(&mut s, BACKGROUND, t0));
    release(&mut s, BACKGROUND, t0);
    assert!(press(&mut s, BACKGROUND, t0 + Duration::from_millis(399)));
    release(&mut s, BACKGROUND, t0 + Duration::from_millis(399));
    motion(&mut s, (210., 90.));

    assert_eq!(s.host.execs(), vec!["dbl".to_string()]);
    assert!(commands(&s).is_empty());
}

#[test]
fn slow_second_click_arms_a_drag() {
    let mut s = setup(false);
    let t0 = s.host.now();

    press(&mut s, BACKGROUND, t0);
    release(&mut s, BACKGROUND, t0);
    press(&mut s, BACKGROUND, t0 + Duration::from_millis(401));
    motion(&mut s, (210., 90.));

    assert!(s.host.execs().is_empty());
    assert_eq!(commands(&s), vec![WmCommand::InteractiveMove(true)]);
}

#[test]
fn pointer_drag_lifecycle() {
    let mut s = setup(false);
    let t0 = s.host.now();

    press(&mut s, BACKGROUND, t0);
    motion(&mut s, (210., 90.));
    motion(&mut s, (220., 95.));
    assert!(release(&mut s, (220., 95.), t0));

    assert_eq!(
        commands(&s),
        vec![WmCommand::InteractiveMove(true), WmCommand::InteractiveMove(false)]
    );
    assert!(s.host.execs().is_empty());
    assert!(!s.registry.get(s.id).unwrap().gestures().is_busy());
}

#[test]
fn presses_on_the_body_pass_through() {
    let mut s = setup(false);
    let t0 = s.host.now();

    assert!(!press(&mut s, BODY, t0));
    motion(&mut s, (210., 210.));
    assert!(!release(&mut s, BODY, t0));
    assert!(commands(&s).is_empty());
}

#[test]
fn button_click_runs_its_command() {
    let mut s = setup(false);
    let t0 = s.host.now();

    assert!(press(&mut s, button_center(2), t0));
    assert_eq!(s.registry.get(s.id).unwrap().gestures().pressed_button(), Some(2));
    assert!(s.registry.get(s.id).unwrap().dirty().contains(Dirty::BUTTONS));
    release(&mut s, button_center(2), t0);

    assert_eq!(s.host.execs(), vec!["cmd-2".to_string()]);
    assert_eq!(s.registry.get(s.id).unwrap().gestures().pressed_button(), None);
}

#[test]
fn button_release_elsewhere_does_nothing() {
    let mut s = setup(false);
    let t0 = s.host.now();

    press(&mut s, button_center(2), t0);
    release(&mut s, BODY, t0);

    assert!(s.host.execs().is_empty());
    assert_eq!(s.registry.get(s.id).unwrap().gestures().pressed_button(), None);
}

#[test]
fn touch_button_lifted_elsewhere_does_nothing() {
    let mut s = setup(false);
    let t0 = s.host.now();

    s.registry.handle_event(&mut s.host, &HostEvent::TouchDown {
        id: 0,
        position: normalized(button_center(0)),
        output: None,
        time: t0,
    });
    assert_eq!(s.registry.get(s.id).unwrap().gestures().pressed_button(), Some(0));

    s.registry.handle_event(&mut s.host, &HostEvent::TouchMotion {
        id: 0,
        position: normalized(BODY),
    });
    s.registry.handle_event(&mut s.host, &HostEvent::TouchUp { id: 0 });

    assert!(s.host.execs().is_empty());
    assert!(commands(&s).is_empty());
    assert_eq!(s.registry.get(s.id).unwrap().gestures().pressed_button(), None);
}

#[test]
fn touch_button_tap_runs_its_command() {
    let mut s = setup(false);
    let t0 = s.host.now();

    s.registry.handle_event(&mut s.host, &HostEvent::TouchDown {
        id: 3,
        position: normalized(button_center(1)),
        output: None,
        time: t0,
    });
    // only the finger that pressed can release the button
    s.registry.handle_event(&mut s.host, &HostEvent::TouchUp { id: 4 });
    assert!(s.host.execs().is_empty());

    s.registry.handle_event(&mut s.host, &HostEvent::TouchUp { id: 3 });
    assert_eq!(s.host.execs(), vec!["cmd-1".to_string()]);
}

#[test]
fn hover_marks_buttons_dirty() {
    let mut s = setup(false);
    let mut renderer = SoftwareRenderer::new(600, 400).unwrap();
    s.registry
        .render_pass(&mut s.host, &mut renderer, s.id, MON, 1.)
        .unwrap();
    assert!(s.registry.get(s.id).unwrap().dirty().is_empty());

    motion(&mut s, button_center(0));
    let deco = s.registry.get(s.id).unwrap();
    assert!(deco.dirty().contains(Dirty::BUTTONS));
    assert!(deco.gestures().is_hovered(0));
    assert!(s.host.damaged());
}

#[test]
fn touch_drag_floats_and_moves_the_window() {
    let mut s = setup(false);
    let t0 = s.host.now();

    let info = s.registry.handle_event(&mut s.host, &HostEvent::TouchDown {
        id: 0,
        position: normalized(BACKGROUND),
        output: None,
        time: t0,
    });
    assert!(info.consumed);

    // a second finger is ignored
    s.registry.handle_event(&mut s.host, &HostEvent::TouchMotion {
        id: 1,
        position: normalized((900., 500.)),
    });
    s.registry.handle_event(&mut s.host, &HostEvent::TouchMotion {
        id: 0,
        position: normalized((600., 300.)),
    });
    s.registry.handle_event(&mut s.host, &HostEvent::TouchUp { id: 0 });

    assert_eq!(
        commands(&s),
        vec![
            WmCommand::SetFloating,
            WmCommand::ResizeExact { width_pct: 50, height_pct: 50 },
            WmCommand::Pin,
            WmCommand::MoveExact(Point::new(400, 300)),
            WmCommand::SetTiled,
            WmCommand::Unpin,
        ]
    );
}

#[test]
fn reload_regenerates_every_texture() {
    let mut s = setup(true);
    let mut renderer = SoftwareRenderer::new(600, 400).unwrap();

    s.registry.render_pass(&mut s.host, &mut renderer, s.id, MON, 1.).unwrap();
    let first = s.registry.get(s.id).unwrap().texture_ids();
    assert!(first.background.is_some());
    assert!(first.buttons.is_some());

    s.registry.render_pass(&mut s.host, &mut renderer, s.id, MON, 1.).unwrap();
    assert_eq!(s.registry.get(s.id).unwrap().texture_ids(), first);
    let uploads = renderer.uploads();

    let config = s.registry.config().clone();
    s.registry.reload(&mut s.host, config);
    assert!(s.host.requests().contains(&Request::Reposition(WIN)));
    assert_eq!(s.registry.get(s.id).unwrap().dirty(), Dirty::all());

    s.registry.render_pass(&mut s.host, &mut renderer, s.id, MON, 1.).unwrap();
    let second = s.registry.get(s.id).unwrap().texture_ids();
    assert!(second.background.is_some_and(|id| Some(id) != first.background));
    assert!(second.buttons.is_some_and(|id| Some(id) != first.buttons));
    assert_eq!(renderer.uploads(), uploads + 2);
}

#[test]
fn bar_color_rule_recolors_flat_bar() {
    let mut s = setup(false);
    s.host.set_rule(WIN, RuleKey::BarColor, "rgb(ff0000)");
    s.registry.handle_event(&mut s.host, &HostEvent::WindowRulesUpdated(WIN));

    let mut renderer = SoftwareRenderer::new(600, 400).unwrap();
    s.registry.render_pass(&mut s.host, &mut renderer, s.id, MON, 1.).unwrap();

    let px = renderer.pixmap().pixel(150, 88).unwrap();
    assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (0xff, 0, 0, 0xff));
    assert_eq!(s.registry.get(s.id).unwrap().overrides().bar_color, Some(Color::from_hex(0xff0000ff)));
}

#[test]
fn no_bar_rule_hides_the_decoration() {
    let mut s = setup(false);
    s.host.set_rule(WIN, RuleKey::NoBar, "1");
    s.registry.handle_event(&mut s.host, &HostEvent::WindowRulesUpdated(WIN));

    assert!(s.host.requests().contains(&Request::Reposition(WIN)));
    assert!(s.registry.positioning(s.id).unwrap().desired.is_zero());

    s.host.take_requests();
    s.registry.draw(&mut s.host, s.id, 1.).unwrap();
    assert!(!s.host.requests().iter().any(|r| matches!(r, Request::QueueRender(..))));
}

#[test]
fn hidden_decorations_ignore_input() {
    let mut s = setup(false);
    s.host.set_rule(WIN, RuleKey::NoBar, "1");
    s.registry.handle_event(&mut s.host, &HostEvent::WindowRulesUpdated(WIN));
    s.registry
        .assign_box(s.id, Rectangle::new(0., 0., 400., 200.))
        .unwrap();
    s.host.take_requests();

    let t0 = s.host.now();
    assert!(!press(&mut s, (200., 105.), t0));
    motion(&mut s, (250., 150.));
    assert!(!release(&mut s, (250., 150.), t0));

    assert!(commands(&s).is_empty());
    assert!(!s.registry.get(s.id).unwrap().gestures().is_busy());
}

#[test]
fn disabled_decorations_ignore_input() {
    let mut s = setup(false);
    let config = BarConfig::builder()
        .enabled(false)
        .offset_top(24)
        .finish(no_checks)
        .unwrap();
    s.registry
        .handle_event(&mut s.host, &HostEvent::ConfigReloaded(Box::new(config)));

    let t0 = s.host.now();
    assert!(!press(&mut s, BACKGROUND, t0));
    assert!(s.registry.positioning(s.id).unwrap().desired.is_zero());

    s.host.take_requests();
    s.registry.draw(&mut s.host, s.id, 1.).unwrap();
    assert!(!s.host.requests().iter().any(|r| matches!(r, Request::QueueRender(..))));
}

#[test]
fn focus_changes_damage_every_bar() {
    let mut s = setup(false);
    s.host.focus(None);
    s.registry.handle_event(&mut s.host, &HostEvent::FocusChanged(None));
    assert!(s.host.damaged());
}
