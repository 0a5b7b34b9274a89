use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum JukeboxError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("jukebox backend failed: {0}")]
    Backend(String),
}

/// Background audio. Failures are reported and otherwise ignored by the
/// visualizer.
pub trait Jukebox {
    fn initialize(&mut self) -> Result<(), JukeboxError>;

    fn finalize(&mut self) -> Result<(), JukeboxError>;

    fn is_playing(&self) -> bool;

    fn play(&mut self);
}

/// Jukebox without an audio device. Never plays.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentJukebox;

impl Jukebox for SilentJukebox {
    fn initialize(&mut self) -> Result<(), JukeboxError> {
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), JukeboxError> {
        Ok(())
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn play(&mut self) {
        info!("jukebox_play_ignored");
    }
}

/// Blocking message box.
pub trait Dialog: Send + Sync {
    fn show(&self, title: &str, message: &str);
}

/// Writes the message to the log and returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDialog;

impl Dialog for LogDialog {
    fn show(&self, title: &str, message: &str) {
        info!(title, message, "dialog_shown");
    }
}

#[cfg(feature = "native-dialog")]
pub use native::NativeDialog;

#[cfg(feature = "native-dialog")]
mod native {
    use rfd::{MessageButtons, MessageDialog, MessageLevel};

    use super::Dialog;

    /// OS message box through `rfd`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NativeDialog;

    impl Dialog for NativeDialog {
        fn show(&self, title: &str, message: &str) {
            let _ = MessageDialog::new()
                .set_level(MessageLevel::Info)
                .set_title(title)
                .set_description(message)
                .set_buttons(MessageButtons::Ok)
                .show();
        }
    }
}
