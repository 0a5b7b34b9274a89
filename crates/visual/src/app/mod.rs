mod actors;
mod camera;
mod collaborators;
mod config;
mod dispatch;
mod input;
mod lock;
mod loop_runner;
mod rendering;
mod scene;
mod surface;
mod timing;
mod window;

#[cfg(test)]
mod tests;

pub use actors::{Explosions, FpsReader, FpsWatch, BURST_LIFETIME_SECS, DEFAULT_BURST_COLORS};
pub use camera::{Camera, Viewport, ZOOM_BASE, ZOOM_LEVEL_DEFAULT};
#[cfg(feature = "native-dialog")]
pub use collaborators::NativeDialog;
pub use collaborators::{Dialog, Jukebox, JukeboxError, LogDialog, SilentJukebox};
pub use config::{Callbacks, VisualizerConfig, CORAL, DEFAULT_COMMAND_QUEUE_CAPACITY};
pub use dispatch::{Command, CLICK_BURST_SIZE, ENTER_ROTATE_DEGREES, PAN_SPEED};
pub use input::{InputCollector, InputSnapshot, Key};
pub use loop_runner::{
    VisualError, Visualizer, VisualizerHandle, CLICK_DIALOG_TITLE, LOADING_TEXT,
    PAUSE_DIALOG_TITLE,
};
pub use rendering::{
    anchor_rect, atlas_ascii, AnchorX, AnchorY, Atlas, Canvas, Rect, RenderTarget, Rgba,
    ATLAS_ASCII_18, ATLAS_ASCII_36, BLACK, BROWN, GLYPH_HEIGHT, GLYPH_WIDTH, WHITE,
};
pub use scene::{share_actor, share_hud, Actor, Hud, Scene, SceneLists, SharedActor, SharedHud};
pub use surface::{FullscreenMode, HeadlessSurface, Surface, SurfaceError, SurfaceEvent};
pub use timing::{DtWatch, VsyncPacer, DEFAULT_VSYNC_HZ};
pub use window::WindowSurface;
