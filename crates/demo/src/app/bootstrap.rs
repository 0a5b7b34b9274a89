use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
#[cfg(not(feature = "native-dialog"))]
use visual::LogDialog;
#[cfg(feature = "native-dialog")]
use visual::NativeDialog;
use visual::{
    share_actor, share_hud, Callbacks, Dialog, SharedActor, SharedHud, VisualizerConfig,
};

use super::scenery::{HelpHud, MarkerGrid, SceneryConfig, Spinner, WorldFrame};

const CONFIG_ENV_VAR: &str = "VISUAL_CONFIG";
const DEMO_TITLE: &str = "visual demo";

pub(crate) struct AppWiring {
    pub(crate) config: VisualizerConfig,
    pub(crate) callbacks: Callbacks,
    pub(crate) huds: Vec<SharedHud>,
    pub(crate) actors: Vec<SharedActor>,
    pub(crate) dialog: Arc<dyn Dialog>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DemoConfig {
    pub(crate) visual: VisualizerConfig,
    pub(crate) scenery: SceneryConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            visual: VisualizerConfig {
                title: DEMO_TITLE.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                window_centered: true,
                ..VisualizerConfig::default()
            },
            scenery: SceneryConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Visual Demo Startup ===");

    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    Ok(wire(config))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Defaults when `path` is `None`; otherwise the file must parse.
pub(crate) fn load_config(path: Option<&Path>) -> Result<DemoConfig, ConfigError> {
    let Some(path) = path else {
        info!("config_defaults");
        return Ok(DemoConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(path, &raw)?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}

fn parse_config(path: &Path, raw: &str) -> Result<DemoConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, DemoConfig>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}

pub(crate) fn wire(config: DemoConfig) -> AppWiring {
    let DemoConfig { visual, scenery } = config;
    let (width, height) = (visual.world_width, visual.world_height);

    let grid = MarkerGrid::new(width, height, scenery.grid_spacing, scenery.marker_size);
    info!(markers = grid.len(), "scenery_built");
    let actors = vec![
        share_actor(WorldFrame::new(width, height, scenery.frame_thickness)),
        share_actor(grid),
        share_actor(Spinner::new(
            visual.pos_center_game(),
            scenery.spinner_size,
            scenery.spinner_degrees_per_second,
        )),
    ];
    let huds = vec![share_hud(HelpHud::new())];

    AppWiring {
        config: visual,
        callbacks: demo_callbacks(),
        huds,
        actors,
        dialog: demo_dialog(),
    }
}

/// Pause blocks on an OS message box when built with `native-dialog`.
#[cfg(feature = "native-dialog")]
fn demo_dialog() -> Arc<dyn Dialog> {
    Arc::new(NativeDialog)
}

#[cfg(not(feature = "native-dialog"))]
fn demo_dialog() -> Arc<dyn Dialog> {
    Arc::new(LogDialog)
}

fn demo_callbacks() -> Callbacks {
    Callbacks::new()
        .on_paused(|| info!("demo_paused"))
        .on_resumed(|| info!("demo_resumed"))
        .on_resized(|width, height| debug!(width, height, "demo_resized"))
        .on_close(|| info!("demo_close_requested"))
        .on_logging(|line| info!(line, "visualizer_log"))
}
