mod explosions;
mod fps_watch;

pub use explosions::{Explosions, BURST_LIFETIME_SECS, DEFAULT_BURST_COLORS};
pub use fps_watch::{FpsReader, FpsWatch};
