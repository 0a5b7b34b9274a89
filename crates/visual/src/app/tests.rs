use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use glam::DVec2;

use super::*;

const RED: Rgba = [255, 0, 0, 255];
const GREEN: Rgba = [0, 255, 0, 255];

fn fast_config() -> VisualizerConfig {
    VisualizerConfig {
        title: "testing visualizer".to_string(),
        vsync_hz: 1000,
        ..VisualizerConfig::default()
    }
}

fn reference_config() -> VisualizerConfig {
    VisualizerConfig {
        world_width: 60000.0,
        world_height: 20000.0,
        window_width: 900,
        window_height: 600,
        initial_zoom_level: -1.0,
        initial_rotate_degrees: -360.0,
        ..fast_config()
    }
}

fn started(visualizer: &mut Visualizer, surface: &mut HeadlessSurface) {
    assert!(visualizer.step(surface).expect("first step"));
}

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().expect("log").clone()
}

fn record(log: &Log, line: impl Into<String>) {
    log.lock().expect("log").push(line.into());
}

struct Probe {
    name: &'static str,
    log: Log,
    rect: Option<(Rect, Rgba)>,
}

impl Actor for Probe {
    fn update(&mut self, _dt: f64) {
        record(&self.log, format!("{}:update", self.name));
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        record(&self.log, format!("{}:draw", self.name));
        if let Some((rect, color)) = self.rect {
            target.fill_rect(rect, color);
        }
    }
}

impl Hud for Probe {
    fn position_on_screen(&mut self, width: f64, height: f64) {
        record(&self.log, format!("{}:position {width}x{height}", self.name));
    }
}

struct RecordingDialog {
    log: Log,
}

impl Dialog for RecordingDialog {
    fn show(&self, title: &str, message: &str) {
        let thread = thread::current().name().unwrap_or("unnamed").to_string();
        record(&self.log, format!("dialog:{title}@{thread}\n{message}"));
    }
}

struct CountingJukebox {
    plays: Arc<AtomicUsize>,
    playing: bool,
    fail: bool,
}

impl Jukebox for CountingJukebox {
    fn initialize(&mut self) -> Result<(), JukeboxError> {
        if self.fail {
            return Err(JukeboxError::DeviceUnavailable("no device".to_string()));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), JukeboxError> {
        if self.fail {
            return Err(JukeboxError::Backend("stream stuck".to_string()));
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        self.playing = true;
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}

fn wait_for(log: &Log, predicate: impl Fn(&[String]) -> bool) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let current = entries(log);
        if predicate(&current) || Instant::now() >= deadline {
            return current;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn init_applies_configured_window_zoom_and_rotation() {
    let mut visualizer = Visualizer::new(reference_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(640, 480);
    started(&mut visualizer, &mut surface);

    let camera = visualizer.camera();
    let wrapped = camera.angle_degrees().rem_euclid(360.0);
    assert!(wrapped < 1e-6 || 360.0 - wrapped < 1e-6, "angle {wrapped}");
    assert_eq!(camera.zoom_level(), -1.0);
    assert_eq!(camera.position(), DVec2::new(30000.0, 10000.0));
    assert_eq!(camera.viewport(), Viewport::new(900.0, 600.0));
    assert_eq!(surface.size(), (900, 600));
    assert_eq!(surface.title(), "testing visualizer  (undefined)");

    // Loading frame, two warm-up frames, one loop frame.
    assert_eq!(surface.clears(), 4);
    assert_eq!(surface.presents(), 4);
}

#[test]
fn close_from_another_thread_ends_after_in_flight_frame_and_allows_rerun() {
    let closes = Rc::new(RefCell::new(0));
    let closes_hook = Rc::clone(&closes);
    let mut visualizer = Visualizer::new(reference_config(), Vec::new(), Vec::new())
        .with_callbacks(Callbacks::new().on_close(move || *closes_hook.borrow_mut() += 1));

    for run in 1..=2 {
        let handle = visualizer.handle();
        let closer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            handle.close();
        });
        let mut surface = HeadlessSurface::new(900, 600);
        visualizer.run_on(&mut surface).expect("run");
        closer.join().expect("closer");

        assert_eq!(surface.clears(), surface.presents());
        assert!(surface.presents() > 3);
        assert_eq!(*closes.borrow(), run);
        assert!(!visualizer.is_closed());
    }
}

#[test]
fn escape_release_closes_the_loop() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    surface.input_mut().press(Key::Escape);
    assert!(visualizer.step(&mut surface).expect("held"));
    surface.input_mut().release(Key::Escape);
    assert!(!visualizer.step(&mut surface).expect("released"));
    assert!(!visualizer.step(&mut surface).expect("closed"));
    visualizer.finish();
    assert!(!visualizer.is_closed());
}

#[test]
fn window_close_request_stops_the_loop() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    surface.push_event(SurfaceEvent::CloseRequested);
    assert!(!visualizer.step(&mut surface).expect("step"));
}

#[test]
fn tab_toggles_fullscreen_and_resize_reaches_camera_and_huds() {
    let log = new_log();
    let resized = Rc::new(RefCell::new(Vec::new()));
    let resized_hook = Rc::clone(&resized);
    let hud = share_hud(Probe {
        name: "hud",
        log: Arc::clone(&log),
        rect: None,
    });
    let mut visualizer = Visualizer::new(fast_config(), vec![hud], Vec::new()).with_callbacks(
        Callbacks::new().on_resized(move |width, height| {
            resized_hook.borrow_mut().push((width, height));
        }),
    );
    let mut surface = HeadlessSurface::new(900, 600).with_monitor_size(1280, 1024);
    started(&mut visualizer, &mut surface);
    assert_eq!(*resized.borrow(), vec![(900.0, 600.0)]);

    surface.input_mut().tap(Key::Tab);
    visualizer.step(&mut surface).expect("toggle");
    assert_eq!(surface.fullscreen(), FullscreenMode::Fullscreen);
    visualizer.step(&mut surface).expect("resize");
    assert_eq!(visualizer.camera().viewport(), Viewport::new(1280.0, 1024.0));
    assert!(entries(&log).contains(&"hud:position 1280x1024".to_string()));

    surface.input_mut().tap(Key::Tab);
    visualizer.step(&mut surface).expect("toggle back");
    visualizer.step(&mut surface).expect("resize back");
    assert_eq!(surface.fullscreen(), FullscreenMode::Windowed);
    assert_eq!(
        *resized.borrow(),
        vec![(900.0, 600.0), (1280.0, 1024.0), (900.0, 600.0)]
    );
}

#[test]
fn held_arrow_pans_camera_every_frame() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);
    let start = visualizer.camera().position();

    surface.input_mut().press(Key::Right);
    visualizer.step(&mut surface).expect("first");
    let first = visualizer.camera().position();
    visualizer.step(&mut surface).expect("second");
    let second = visualizer.camera().position();

    assert!(first.x > start.x);
    assert!(second.x > first.x);
    assert_eq!(second.y, start.y);
}

#[test]
fn scroll_zooms_and_enter_rotates() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    surface.input_mut().scroll(DVec2::new(0.0, 2.0));
    surface.input_mut().tap(Key::Enter);
    visualizer.step(&mut surface).expect("step");

    assert_eq!(visualizer.camera().zoom_level(), 2.0);
    assert!((visualizer.camera().angle_degrees() + 90.0).abs() < 1e-9);

    // Scroll was consumed by the previous snapshot.
    visualizer.step(&mut surface).expect("step");
    assert_eq!(visualizer.camera().zoom_level(), 2.0);
}

#[test]
fn click_bursts_at_unprojected_cursor() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);
    assert!(!visualizer.explosions().is_exploding());

    surface.input_mut().set_mouse_position(DVec2::new(450.0, 300.0));
    surface.input_mut().tap(Key::MouseLeft);
    visualizer.step(&mut surface).expect("click");
    assert_eq!(visualizer.explosions().burst_count(), 1);
}

#[test]
fn control_click_describes_click_on_a_named_thread() {
    let log = new_log();
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new())
        .with_dialog(Arc::new(RecordingDialog {
            log: Arc::clone(&log),
        }));
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    surface.input_mut().press(Key::LeftControl);
    surface.input_mut().set_mouse_position(DVec2::new(450.0, 300.0));
    surface.input_mut().tap(Key::MouseLeft);
    visualizer.step(&mut surface).expect("click");

    let shown = wait_for(&log, |lines| !lines.is_empty());
    assert_eq!(shown.len(), 1);
    let line = &shown[0];
    assert!(line.starts_with(&format!("dialog:{CLICK_DIALOG_TITLE}@click-dialog")));
    assert!(line.contains("mouse click coords in screen pos: 450 300"));
    assert!(line.contains("mouse click coords in game pos: 30000 10000"));
    assert_eq!(visualizer.explosions().burst_count(), 1);
}

#[test]
fn space_pauses_shows_dialog_then_resumes() {
    let log = new_log();
    let (paused_log, resumed_log) = (Arc::clone(&log), Arc::clone(&log));
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new())
        .with_dialog(Arc::new(RecordingDialog {
            log: Arc::clone(&log),
        }))
        .with_callbacks(
            Callbacks::new()
                .on_paused(move || record(&paused_log, "paused"))
                .on_resumed(move || record(&resumed_log, "resumed")),
        );
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    surface.input_mut().tap(Key::Space);
    visualizer.step(&mut surface).expect("pause");

    let lines = entries(&log);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "paused");
    assert!(lines[1].starts_with(&format!("dialog:{PAUSE_DIALOG_TITLE}@")));
    assert_eq!(lines[2], "resumed");
}

#[test]
fn control_m_starts_jukebox_only_when_silent() {
    let plays = Arc::new(AtomicUsize::new(0));
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new()).with_jukebox(
        Box::new(CountingJukebox {
            plays: Arc::clone(&plays),
            playing: false,
            fail: false,
        }),
    );
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    surface.input_mut().tap(Key::M);
    visualizer.step(&mut surface).expect("plain m");
    assert_eq!(plays.load(Ordering::SeqCst), 0);

    surface.input_mut().press(Key::LeftControl);
    surface.input_mut().tap(Key::M);
    visualizer.step(&mut surface).expect("ctrl m");
    surface.input_mut().tap(Key::M);
    visualizer.step(&mut surface).expect("ctrl m again");
    assert_eq!(plays.load(Ordering::SeqCst), 1);
}

#[test]
fn jukebox_failures_are_logged_and_ignored() {
    let log = new_log();
    let logging = Arc::clone(&log);
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new())
        .with_jukebox(Box::new(CountingJukebox {
            plays: Arc::new(AtomicUsize::new(0)),
            playing: false,
            fail: true,
        }))
        .with_callbacks(Callbacks::new().on_logging(move |line| record(&logging, line)));
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);
    visualizer.close();
    assert!(!visualizer.step(&mut surface).expect("closed"));
    visualizer.finish();

    let lines = entries(&log);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("jukebox_initialize_failed: audio device unavailable"));
    assert!(lines[1].starts_with("jukebox_finalize_failed: jukebox backend failed"));
}

#[test]
fn commands_from_other_threads_apply_on_next_frame() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    let handle = visualizer.handle();
    thread::spawn(move || {
        assert!(handle.send(Command::ZoomCamera(1.5)));
        assert!(handle.send(Command::MoveCamera(DVec2::new(5.0, -5.0))));
    })
    .join()
    .expect("sender");
    assert_eq!(visualizer.camera().zoom_level(), 0.0);

    visualizer.step(&mut surface).expect("step");
    assert_eq!(visualizer.camera().zoom_level(), 1.5);
    assert_eq!(
        visualizer.camera().position(),
        visualizer.pos_center_game() + DVec2::new(5.0, -5.0)
    );
}

#[test]
fn changed_title_is_applied_once_in_the_next_frame() {
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    visualizer.handle().set_title("renamed", "2");
    assert_eq!(surface.title(), "testing visualizer  (undefined)");
    visualizer.step(&mut surface).expect("step");
    assert_eq!(surface.title(), "renamed  (2)");
    assert_eq!(
        visualizer.title(),
        (
            "renamed  (2)".to_string(),
            "renamed".to_string(),
            "2".to_string()
        )
    );
}

#[test]
fn world_actors_follow_camera_and_huds_stay_on_screen() {
    let log = new_log();
    let center = fast_config().pos_center_game();
    let actor = share_actor(Probe {
        name: "actor",
        log: Arc::clone(&log),
        rect: Some((
            Rect::new(center - DVec2::splat(10.0), center + DVec2::splat(10.0)),
            RED,
        )),
    });
    let hud = share_hud(Probe {
        name: "hud",
        log: Arc::clone(&log),
        rect: Some((Rect::new(DVec2::ZERO, DVec2::splat(10.0)), GREEN)),
    });
    let mut visualizer = Visualizer::new(fast_config(), vec![hud], vec![actor]);
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    let frame = surface.frame();
    assert_eq!(frame.pixel_at_screen(DVec2::new(450.0, 300.0)), Some(RED));
    assert_eq!(frame.pixel_at_screen(DVec2::new(5.0, 5.0)), Some(GREEN));
    assert_eq!(frame.pixel_at_screen(DVec2::new(200.0, 200.0)), Some(CORAL));
}

#[test]
fn update_precedes_draw_and_huds_follow_actors() {
    let log = new_log();
    let (updated_log, drawn_log) = (Arc::clone(&log), Arc::clone(&log));
    let actor = share_actor(Probe {
        name: "actor",
        log: Arc::clone(&log),
        rect: None,
    });
    let hud = share_hud(Probe {
        name: "hud",
        log: Arc::clone(&log),
        rect: None,
    });
    let mut visualizer = Visualizer::new(fast_config(), vec![hud], vec![actor]).with_callbacks(
        Callbacks::new()
            .on_updated(move |_| record(&updated_log, "on_updated"))
            .on_drawn(move |_| record(&drawn_log, "on_drawn")),
    );
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);
    assert!(entries(&log).contains(&"hud:position 900x600".to_string()));

    log.lock().expect("log").clear();
    visualizer.step(&mut surface).expect("step");
    assert_eq!(
        entries(&log),
        vec![
            "actor:update",
            "hud:update",
            "on_updated",
            "actor:draw",
            "on_drawn",
            "hud:draw"
        ]
    );
}

#[test]
fn scene_mutation_through_visualizer_and_handle() {
    let log = new_log();
    let visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    assert!(visualizer.pop_actor().is_none());
    assert!(visualizer.pop_hud().is_none());

    let actor = share_actor(Probe {
        name: "actor",
        log: Arc::clone(&log),
        rect: None,
    });
    let handle = visualizer.handle();
    let pushed = Arc::clone(&actor);
    thread::spawn(move || handle.scene().push_actors([pushed]))
        .join()
        .expect("push");
    assert_eq!(visualizer.actor_count(), 1);
    assert!(visualizer.remove_actor(&actor));
    assert_eq!(visualizer.actor_count(), 0);
    assert_eq!(visualizer.hud_count(), 0);
}

#[test]
fn handling_events_callback_sees_the_frame_input() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_hook = Rc::clone(&seen);
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new()).with_callbacks(
        Callbacks::new().on_handling_events(move |dt, input| {
            assert!(dt >= 0.0);
            seen_hook.borrow_mut().push(input.just_released(Key::Enter));
        }),
    );
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);
    surface.input_mut().tap(Key::Enter);
    visualizer.step(&mut surface).expect("step");

    assert_eq!(*seen.borrow(), vec![false, true]);
}

#[test]
fn configured_window_size_is_logical_on_scaled_displays() {
    let mut visualizer = Visualizer::new(reference_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(1800, 1200).with_scale_factor(2.0);
    started(&mut visualizer, &mut surface);

    assert_eq!(surface.size(), (1800, 1200));
    assert_eq!(visualizer.camera().viewport(), Viewport::new(1800.0, 1200.0));
}

/// Pushes `late` from another thread during its first update.
struct LatePusher {
    handle: VisualizerHandle,
    late: Option<SharedActor>,
    pusher: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
    log: Log,
}

impl Actor for LatePusher {
    fn update(&mut self, _dt: f64) {
        record(&self.log, "pusher:update");
        let Some(late) = self.late.take() else {
            return;
        };
        let handle = self.handle.clone();
        let log = Arc::clone(&self.log);
        let spawned = thread::spawn(move || {
            handle.scene().push_actors([late]);
            record(&log, "pushed");
        });
        *self.pusher.lock().expect("pusher slot") = Some(spawned);
    }

    fn draw(&self, _target: &mut dyn RenderTarget) {
        record(&self.log, "pusher:draw");
    }
}

#[test]
fn scene_push_from_another_thread_waits_for_the_frame_pass() {
    let log = new_log();
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new());
    let mut surface = HeadlessSurface::new(900, 600);
    started(&mut visualizer, &mut surface);

    let pusher = Arc::new(Mutex::new(None));
    let late = share_actor(Probe {
        name: "late",
        log: Arc::clone(&log),
        rect: None,
    });
    visualizer.push_actors([share_actor(LatePusher {
        handle: visualizer.handle(),
        late: Some(late),
        pusher: Arc::clone(&pusher),
        log: Arc::clone(&log),
    })]);

    visualizer.step(&mut surface).expect("pushing frame");
    pusher
        .lock()
        .expect("pusher slot")
        .take()
        .expect("pusher spawned")
        .join()
        .expect("pusher thread");
    assert_eq!(
        entries(&log),
        vec!["pusher:update", "pusher:draw", "pushed"]
    );
    assert_eq!(visualizer.actor_count(), 2);

    log.lock().expect("log").clear();
    visualizer.step(&mut surface).expect("next frame");
    assert_eq!(
        entries(&log),
        vec!["pusher:update", "late:update", "pusher:draw", "late:draw"]
    );
}

/// Headless surface whose presents always fail.
struct BrokenSurface {
    inner: HeadlessSurface,
}

impl Surface for BrokenSurface {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn canvas(&mut self) -> &mut Canvas {
        self.inner.canvas()
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        Err(SurfaceError::Present(pixels::Error::AdapterNotFound))
    }

    fn set_title(&mut self, title: &str) {
        self.inner.set_title(title);
    }

    fn request_size(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.inner.request_size(width, height)
    }

    fn fullscreen(&self) -> FullscreenMode {
        self.inner.fullscreen()
    }

    fn set_fullscreen(&mut self, mode: FullscreenMode) {
        self.inner.set_fullscreen(mode);
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.inner.drain_events()
    }

    fn input(&mut self) -> InputSnapshot {
        self.inner.input()
    }
}

struct LifecycleJukebox {
    log: Log,
}

impl Jukebox for LifecycleJukebox {
    fn initialize(&mut self) -> Result<(), JukeboxError> {
        record(&self.log, "jukebox:initialize");
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), JukeboxError> {
        record(&self.log, "jukebox:finalize");
        Ok(())
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn play(&mut self) {}
}

#[test]
fn failed_init_still_finalizes_jukebox_and_runs_on_close() {
    let log = new_log();
    let closing = Arc::clone(&log);
    let mut visualizer = Visualizer::new(fast_config(), Vec::new(), Vec::new())
        .with_jukebox(Box::new(LifecycleJukebox {
            log: Arc::clone(&log),
        }))
        .with_callbacks(Callbacks::new().on_close(move || record(&closing, "on_close")));
    let mut surface = BrokenSurface {
        inner: HeadlessSurface::new(900, 600),
    };

    let error = visualizer.run_on(&mut surface).expect_err("present fails");
    assert!(matches!(
        error,
        VisualError::Surface(SurfaceError::Present(_))
    ));
    assert_eq!(
        entries(&log),
        vec!["jukebox:initialize", "jukebox:finalize", "on_close"]
    );

    // Nothing left to finish.
    visualizer.finish();
    assert_eq!(entries(&log).len(), 3);
}
