use std::process::ExitCode;

use tracing::{error, info};
use visual::Visualizer;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let mut visualizer = build_visualizer(app);
    if let Err(err) = visualizer.run() {
        error!(error = %err, "visualizer_failed");
        return ExitCode::FAILURE;
    }

    info!("=== Visual Demo Shutdown ===");
    ExitCode::SUCCESS
}

fn build_visualizer(app: AppWiring) -> Visualizer {
    Visualizer::new(app.config, app.huds, app.actors)
        .with_callbacks(app.callbacks)
        .with_dialog(app.dialog)
}
