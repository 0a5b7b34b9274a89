//! Real-time 2D visualization runtime: a frame scheduler driving a camera,
//! world-space actors and screen-space HUDs through update, draw and present.

pub mod app;

pub use app::{
    anchor_rect, atlas_ascii, share_actor, share_hud, Actor, AnchorX, AnchorY, Atlas, Callbacks,
    Camera, Canvas, Command, Dialog, DtWatch, Explosions, FpsReader, FpsWatch, FullscreenMode,
    HeadlessSurface, Hud, InputCollector, InputSnapshot, Jukebox, JukeboxError, Key, LogDialog,
    Rect, RenderTarget, Rgba, Scene, SceneLists, SharedActor, SharedHud, SilentJukebox, Surface,
    SurfaceError, SurfaceEvent, Viewport, VisualError, Visualizer, VisualizerConfig,
    VisualizerHandle, VsyncPacer, WindowSurface, ATLAS_ASCII_18, ATLAS_ASCII_36, BLACK, BROWN,
    BURST_LIFETIME_SECS, CLICK_BURST_SIZE, CLICK_DIALOG_TITLE, CORAL, DEFAULT_BURST_COLORS,
    DEFAULT_COMMAND_QUEUE_CAPACITY, DEFAULT_VSYNC_HZ, ENTER_ROTATE_DEGREES, GLYPH_HEIGHT,
    GLYPH_WIDTH, LOADING_TEXT, PAN_SPEED, PAUSE_DIALOG_TITLE, WHITE, ZOOM_BASE,
    ZOOM_LEVEL_DEFAULT,
};
#[cfg(feature = "native-dialog")]
pub use app::NativeDialog;
