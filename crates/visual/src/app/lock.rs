use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

static SCENE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);
static FPS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);
static SHARED_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockKind {
    Scene,
    Fps,
    Shared,
}

impl LockKind {
    fn warned_flag(self) -> &'static AtomicBool {
        match self {
            LockKind::Scene => &SCENE_LOCK_POISON_WARNED,
            LockKind::Fps => &FPS_LOCK_POISON_WARNED,
            LockKind::Shared => &SHARED_LOCK_POISON_WARNED,
        }
    }

    fn name(self) -> &'static str {
        match self {
            LockKind::Scene => "scene",
            LockKind::Fps => "fps",
            LockKind::Shared => "shared",
        }
    }
}

/// Locks `mutex`, recovering the inner value if a previous holder panicked.
pub(crate) fn lock_recovering<T: ?Sized>(mutex: &Mutex<T>, kind: LockKind) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            if kind
                .warned_flag()
                .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                warn!(lock = kind.name(), "lock poisoned; recovered inner value");
            }
            poisoned.into_inner()
        }
    }
}
