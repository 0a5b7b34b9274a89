use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::SystemTime;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::{DAffine2, DVec2};
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::error::{EventLoopError, OsError};

use super::actors::{Explosions, FpsReader, FpsWatch};
use super::camera::{Camera, Viewport};
use super::collaborators::{Dialog, Jukebox, JukeboxError, LogDialog, SilentJukebox};
use super::config::{Callbacks, VisualizerConfig};
use super::dispatch::{dispatch_input, Command, EdgeAction};
use super::lock::{lock_recovering, LockKind};
use super::rendering::{
    atlas_ascii, AnchorX, AnchorY, RenderTarget, ATLAS_ASCII_36, BROWN, WHITE,
};
use super::scene::{Actor, Hud, Scene, SharedActor, SharedHud};
use super::surface::{Surface, SurfaceError, SurfaceEvent};
use super::timing::{DtWatch, VsyncPacer};
use super::window;

pub const LOADING_TEXT: &str = "Loading...";
pub const PAUSE_DIALOG_TITLE: &str = "Pause";
pub const CLICK_DIALOG_TITLE: &str = "MouseButtonLeft";
const PAUSE_DIALOG_MESSAGE: &str = "Paused. Close this message to resume.";
const CLICK_DIALOG_THREAD: &str = "click-dialog";
const WARM_UP_FRAMES: usize = 2;
const EXPLOSION_PRECISION: usize = 4;

#[derive(Debug, Error)]
pub enum VisualError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create window: {0}")]
    CreateWindow(#[source] OsError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TitleState {
    title: String,
    version: String,
    dirty: bool,
}

impl TitleState {
    fn full_name(&self) -> String {
        full_title(&self.title, &self.version)
    }
}

pub(crate) fn full_title(title: &str, version: &str) -> String {
    format!("{title}  ({version})")
}

/// State reachable from other threads.
struct Shared {
    scene: Scene,
    closed: AtomicBool,
    title: Mutex<TitleState>,
    commands: Sender<Command>,
    fps: FpsReader,
}

impl Shared {
    fn enqueue(&self, command: Command) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command)) => {
                warn!(?command, "command_queue_full");
                false
            }
            Err(TrySendError::Disconnected(command)) => {
                debug!(?command, "command_queue_disconnected");
                false
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn title(&self) -> (String, String, String) {
        let state = lock_recovering(&self.title, LockKind::Shared);
        (state.full_name(), state.title.clone(), state.version.clone())
    }

    fn set_title(&self, title: &str, version: &str) {
        let mut state = lock_recovering(&self.title, LockKind::Shared);
        if state.title == title && state.version == version {
            return;
        }
        state.title = title.to_string();
        state.version = version.to_string();
        state.dirty = true;
    }

    fn take_dirty_title(&self) -> Option<String> {
        let mut state = lock_recovering(&self.title, LockKind::Shared);
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        Some(state.full_name())
    }
}

/// Cloneable, `Send` access to a running visualizer.
#[derive(Clone)]
pub struct VisualizerHandle {
    shared: Arc<Shared>,
}

impl VisualizerHandle {
    /// Stops the loop after the frame in flight.
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Queues a mutation for the next frame. `false` when the queue is full.
    pub fn send(&self, command: Command) -> bool {
        self.shared.enqueue(command)
    }

    pub fn scene(&self) -> &Scene {
        &self.shared.scene
    }

    pub fn title(&self) -> (String, String, String) {
        self.shared.title()
    }

    pub fn set_title(&self, title: &str, version: &str) {
        self.shared.set_title(title, version);
    }

    pub fn fps(&self) -> u32 {
        self.shared.fps.fps()
    }
}

/// Drives a scene of actors and HUDs through update, draw and present on a
/// fixed cadence.
pub struct Visualizer {
    config: VisualizerConfig,
    callbacks: Callbacks,
    shared: Arc<Shared>,
    command_rx: Receiver<Command>,
    camera: Camera,
    dt_watch: DtWatch,
    pacer: VsyncPacer,
    fps_watch: FpsWatch,
    explosions: Explosions,
    jukebox: Box<dyn Jukebox>,
    dialog: Arc<dyn Dialog>,
    initialized: bool,
    // Set once the jukebox is initialized, even if the rest of lazy init fails.
    run_started: bool,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig, huds: Vec<SharedHud>, actors: Vec<SharedActor>) -> Self {
        let (commands, command_rx) = bounded(config.command_queue_capacity.max(1));
        let window_size = DVec2::new(
            f64::from(config.window_width),
            f64::from(config.window_height),
        );
        let fps_watch = FpsWatch::simple(window_size, AnchorY::Top, AnchorX::Right);
        let shared = Arc::new(Shared {
            scene: Scene::new(huds, actors),
            closed: AtomicBool::new(false),
            title: Mutex::new(TitleState {
                title: config.title.clone(),
                version: config.version.clone(),
                dirty: false,
            }),
            commands,
            fps: fps_watch.reader(),
        });
        Self {
            camera: Camera::new(
                config.pos_center_game(),
                Viewport::new(window_size.x, window_size.y),
            ),
            explosions: Explosions::new(
                config.world_width,
                config.world_height,
                None,
                EXPLOSION_PRECISION,
            ),
            pacer: VsyncPacer::new(config.vsync_hz),
            dt_watch: DtWatch::new(),
            fps_watch,
            callbacks: Callbacks::default(),
            shared,
            command_rx,
            jukebox: Box::new(SilentJukebox),
            dialog: Arc::new(LogDialog),
            initialized: false,
            run_started: false,
            config,
        }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_jukebox(mut self, jukebox: Box<dyn Jukebox>) -> Self {
        self.jukebox = jukebox;
        self
    }

    pub fn with_dialog(mut self, dialog: Arc<dyn Dialog>) -> Self {
        self.dialog = dialog;
        self
    }

    pub fn handle(&self) -> VisualizerHandle {
        VisualizerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Opens a window and runs until closed. winit allows one event loop per
    /// process, so this can only be used once; use [`Visualizer::run_on`] to
    /// run repeatedly.
    pub fn run(&mut self) -> Result<(), VisualError> {
        window::run_windowed(self)
    }

    /// Runs on `surface` until closed. Can be called again afterwards.
    pub fn run_on<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), VisualError> {
        let result = loop {
            match self.step(surface) {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(error) => break Err(error),
            }
        };
        self.finish();
        result
    }

    /// Initializes on first use, then runs one iteration unless closed.
    /// Returns whether the loop should keep going.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, VisualError> {
        if !self.initialized {
            self.lazy_init(surface)?;
        }
        if self.is_closed() {
            return Ok(false);
        }
        self.iterate(surface)?;
        Ok(!self.is_closed())
    }

    /// Ends a run: finalizes the jukebox, runs on-close and clears the close
    /// flag so the visualizer can run again.
    pub fn finish(&mut self) {
        if !self.run_started {
            return;
        }
        if let Err(error) = self.jukebox.finalize() {
            self.log_degraded("jukebox_finalize_failed", &error);
        }
        if let Some(hook) = self.callbacks.on_close.as_mut() {
            hook();
        }
        self.shared.closed.store(false, Ordering::SeqCst);
        self.initialized = false;
        self.run_started = false;
        info!("shutdown");
    }

    fn lazy_init<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), VisualError> {
        let (width, height) = surface.size();
        self.camera = Camera::new(
            self.config.pos_center_game(),
            Viewport::new(f64::from(width), f64::from(height)),
        );
        surface.set_title(&self.shared.title().0);

        if let Err(error) = self.jukebox.initialize() {
            self.log_degraded("jukebox_initialize_failed", &error);
        }
        self.run_started = true;

        self.pacer = VsyncPacer::new(self.config.vsync_hz);
        self.fps_watch.start();
        self.dt_watch.start();

        render_loading(surface)?;
        for _ in 0..WARM_UP_FRAMES {
            let dt = self.dt_watch.dt();
            self.next_frame(surface, dt)?;
        }

        surface.request_size(self.config.window_width, self.config.window_height)?;
        let (width, height) = surface.size();
        self.resize(f64::from(width), f64::from(height));
        self.camera.zoom(self.config.initial_zoom_level);
        self.camera.rotate(self.config.initial_rotate_degrees);

        self.initialized = true;
        info!(
            width,
            height,
            zoom_level = self.camera.zoom_level(),
            angle_degrees = self.camera.angle_degrees(),
            vsync_hz = self.config.vsync_hz,
            "visualizer_initialized"
        );
        Ok(())
    }

    fn iterate<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), VisualError> {
        let dt = self.dt_watch.dt();
        self.handle_events(surface, dt)?;
        self.next_frame(surface, dt)
    }

    fn handle_events<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        dt: f64,
    ) -> Result<(), VisualError> {
        for event in surface.drain_events() {
            match event {
                SurfaceEvent::Resized { width, height } => {
                    self.resize(f64::from(width), f64::from(height));
                }
                SurfaceEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    self.close();
                }
            }
        }

        let input = surface.input();
        if let Some(hook) = self.callbacks.on_handling_events.as_mut() {
            hook(dt, &input);
        }

        let dispatched = dispatch_input(&input, dt, &self.camera);
        for edge in dispatched.edges {
            self.run_edge(surface, edge);
        }
        for command in dispatched.commands {
            self.shared.enqueue(command);
        }
        self.apply_commands();
        Ok(())
    }

    fn run_edge<S: Surface + ?Sized>(&mut self, surface: &mut S, edge: EdgeAction) {
        match edge {
            EdgeAction::Close => {
                info!(reason = "escape_key", "shutdown_requested");
                self.close();
            }
            EdgeAction::ToggleFullscreen => {
                let mode = surface.fullscreen().toggled();
                surface.set_fullscreen(mode);
                info!(?mode, "fullscreen_toggled");
            }
            EdgeAction::Pause => {
                self.pause();
                self.dialog.show(PAUSE_DIALOG_TITLE, PAUSE_DIALOG_MESSAGE);
                self.resume();
            }
            EdgeAction::StartJukebox => {
                if !self.jukebox.is_playing() {
                    self.jukebox.play();
                }
            }
            EdgeAction::DescribeClick { screen, world } => {
                self.describe_click(screen, world);
            }
        }
    }

    fn describe_click(&self, screen: DVec2, world: DVec2) {
        let position = self.camera.position();
        let started = self
            .dt_watch
            .time_started()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|since| since.as_secs_f64())
            .unwrap_or_default();
        let message = format!(
            "camera angle in degree: {}\n\n\
             camera coordinates: {} {}\n\n\
             game clock: {started:.3}s since epoch\n\n\
             mouse click coords in screen pos: {} {}\n\n\
             mouse click coords in game pos: {} {}",
            self.camera.angle_degrees(),
            position.x,
            position.y,
            screen.x,
            screen.y,
            world.x,
            world.y,
        );
        let dialog = Arc::clone(&self.dialog);
        let spawned = thread::Builder::new()
            .name(CLICK_DIALOG_THREAD.to_string())
            .spawn(move || dialog.show(CLICK_DIALOG_TITLE, &message));
        if let Err(error) = spawned {
            warn!(error = %error, "click_dialog_spawn_failed");
        }
    }

    fn apply_commands(&mut self) {
        // Only what is queued now; later sends wait for the next frame.
        let pending = self.command_rx.len();
        for command in self.command_rx.try_iter().take(pending) {
            match command {
                Command::MoveCamera(delta) => self.camera.move_by(delta),
                Command::RotateCamera(degrees) => self.camera.rotate(degrees),
                Command::ZoomCamera(levels) => self.camera.zoom(levels),
                Command::ExplodeAt { world, size } => {
                    if !self.explosions.explode_at(world, size) {
                        debug!(x = world.x, y = world.y, "explosion_outside_world");
                    }
                }
            }
        }
    }

    fn next_frame<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        dt: f64,
    ) -> Result<(), VisualError> {
        {
            let lists = self.shared.scene.lock();

            lists.update_actors(dt);
            self.explosions.update(dt);
            lists.update_huds(dt);
            self.fps_watch.update(dt);
            if let Some(hook) = self.callbacks.on_updated.as_mut() {
                hook(dt);
            }
            self.fps_watch.poll();

            surface.clear(self.config.background);
            let canvas: &mut dyn RenderTarget = surface.canvas();
            canvas.set_matrix(self.camera.transform());
            lists.draw_actors(canvas);
            self.explosions.draw(canvas);
            if let Some(hook) = self.callbacks.on_drawn.as_mut() {
                hook(&mut *canvas);
            }

            canvas.set_matrix(DAffine2::IDENTITY);
            lists.draw_huds(canvas);
            self.fps_watch.draw(canvas);
        }

        if let Some(title) = self.shared.take_dirty_title() {
            surface.set_title(&title);
            info!(title = %title, "title_applied");
        }

        surface.present()?;
        self.pacer.wait();
        Ok(())
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.camera.set_screen_bound(Viewport::new(width, height));
        self.shared.scene.lock().position_huds(width, height);
        self.fps_watch.position_on_screen(width, height);
        if let Some(hook) = self.callbacks.on_resized.as_mut() {
            hook(width, height);
        }
        info!(width, height, "surface_resized");
    }

    fn log_degraded(&mut self, context: &'static str, error: &JukeboxError) {
        let line = format!("{context}: {error}");
        if let Some(hook) = self.callbacks.on_logging.as_mut() {
            hook(&line);
        }
        warn!(error = %error, context, "collaborator_degraded");
    }

    pub fn push_actors(&self, actors: impl IntoIterator<Item = SharedActor>) {
        self.shared.scene.push_actors(actors);
    }

    pub fn pop_actor(&self) -> Option<SharedActor> {
        self.shared.scene.pop_actor()
    }

    pub fn remove_actor(&self, actor: &SharedActor) -> bool {
        self.shared.scene.remove_actor(actor)
    }

    pub fn push_huds(&self, huds: impl IntoIterator<Item = SharedHud>) {
        self.shared.scene.push_huds(huds);
    }

    pub fn pop_hud(&self) -> Option<SharedHud> {
        self.shared.scene.pop_hud()
    }

    pub fn remove_hud(&self, hud: &SharedHud) -> bool {
        self.shared.scene.remove_hud(hud)
    }

    pub fn actor_count(&self) -> usize {
        self.shared.scene.actor_count()
    }

    pub fn hud_count(&self) -> usize {
        self.shared.scene.hud_count()
    }

    pub fn pause(&mut self) {
        info!("paused");
        if let Some(hook) = self.callbacks.on_paused.as_mut() {
            hook();
        }
    }

    /// Re-polls the delta-time watch so the paused interval is not fed to
    /// the next update.
    pub fn resume(&mut self) {
        let paused_for = self.dt_watch.dt();
        info!(paused_secs = paused_for, "resumed");
        if let Some(hook) = self.callbacks.on_resumed.as_mut() {
            hook();
        }
    }

    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// `(full name, title, version)`; the full name is what the title bar shows.
    pub fn title(&self) -> (String, String, String) {
        self.shared.title()
    }

    /// Marks the title dirty when it changed; applied once in the next frame.
    pub fn set_title(&self, title: &str, version: &str) {
        self.shared.set_title(title, version);
    }

    pub fn send(&self, command: Command) -> bool {
        self.shared.enqueue(command)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn explosions(&self) -> &Explosions {
        &self.explosions
    }

    pub fn fps(&self) -> u32 {
        self.fps_watch.fps()
    }

    pub fn time_started(&self) -> SystemTime {
        self.dt_watch.time_started()
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn pos_center_game(&self) -> DVec2 {
        self.config.pos_center_game()
    }
}

fn render_loading<S: Surface + ?Sized>(surface: &mut S) -> Result<(), SurfaceError> {
    surface.clear(BROWN);
    let canvas = surface.canvas();
    canvas.set_matrix(DAffine2::IDENTITY);
    let (width, height) = canvas.size();
    let atlas = atlas_ascii(ATLAS_ASCII_36);
    let (text_width, text_height) = atlas.text_size(LOADING_TEXT);
    let top_left = DVec2::new(
        (f64::from(width) - f64::from(text_width)) * 0.5,
        (f64::from(height) + f64::from(text_height)) * 0.5,
    );
    canvas.draw_text(top_left, LOADING_TEXT, atlas, WHITE);
    surface.present()
}
