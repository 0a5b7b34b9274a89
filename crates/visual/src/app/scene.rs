use std::sync::{Arc, Mutex, MutexGuard};

use super::lock::{lock_recovering, LockKind};
use super::rendering::RenderTarget;

/// An entity the visualizer updates and draws every frame.
pub trait Actor: Send {
    fn update(&mut self, dt: f64);

    fn draw(&self, target: &mut dyn RenderTarget);
}

/// An actor positioned in screen coordinates.
pub trait Hud: Actor {
    /// Called from the scheduler whenever the viewport size changes.
    fn position_on_screen(&mut self, width: f64, height: f64);
}

/// Actors are shared with the caller that built them; identity is the
/// allocation, not the position in the list.
pub type SharedActor = Arc<Mutex<dyn Actor>>;
pub type SharedHud = Arc<Mutex<dyn Hud>>;

pub fn share_actor<A: Actor + 'static>(actor: A) -> SharedActor {
    Arc::new(Mutex::new(actor))
}

pub fn share_hud<H: Hud + 'static>(hud: H) -> SharedHud {
    Arc::new(Mutex::new(hud))
}

/// The two ordered sequences of a scene. Update order and draw order are the
/// sequence order.
#[derive(Default)]
pub struct SceneLists {
    actors: Vec<SharedActor>,
    huds: Vec<SharedHud>,
}

impl SceneLists {
    pub fn actors(&self) -> &[SharedActor] {
        &self.actors
    }

    pub fn huds(&self) -> &[SharedHud] {
        &self.huds
    }

    pub(crate) fn update_actors(&self, dt: f64) {
        for actor in &self.actors {
            lock_recovering(actor, LockKind::Scene).update(dt);
        }
    }

    pub(crate) fn update_huds(&self, dt: f64) {
        for hud in &self.huds {
            lock_recovering(hud, LockKind::Scene).update(dt);
        }
    }

    pub(crate) fn draw_actors(&self, target: &mut dyn RenderTarget) {
        for actor in &self.actors {
            lock_recovering(actor, LockKind::Scene).draw(target);
        }
    }

    pub(crate) fn draw_huds(&self, target: &mut dyn RenderTarget) {
        for hud in &self.huds {
            lock_recovering(hud, LockKind::Scene).draw(target);
        }
    }

    pub(crate) fn position_huds(&self, width: f64, height: f64) {
        for hud in &self.huds {
            lock_recovering(hud, LockKind::Scene).position_on_screen(width, height);
        }
    }
}

/// World-space actors and screen-space HUDs behind a single mutex.
#[derive(Default)]
pub struct Scene {
    lists: Mutex<SceneLists>,
}

impl Scene {
    pub fn new(huds: Vec<SharedHud>, actors: Vec<SharedActor>) -> Self {
        Self {
            lists: Mutex::new(SceneLists { actors, huds }),
        }
    }

    /// Holds the scene lock for the lifetime of the guard.
    pub fn lock(&self) -> MutexGuard<'_, SceneLists> {
        lock_recovering(&self.lists, LockKind::Scene)
    }

    pub fn push_actors(&self, actors: impl IntoIterator<Item = SharedActor>) {
        self.lock().actors.extend(actors);
    }

    /// Removes the most recently pushed actor. `None` when there is none.
    pub fn pop_actor(&self) -> Option<SharedActor> {
        self.lock().actors.pop()
    }

    /// Removes the first entry sharing `actor`'s allocation, keeping the
    /// order of the rest. O(n).
    pub fn remove_actor(&self, actor: &SharedActor) -> bool {
        remove_by_identity(&mut self.lock().actors, actor)
    }

    pub fn push_huds(&self, huds: impl IntoIterator<Item = SharedHud>) {
        self.lock().huds.extend(huds);
    }

    pub fn pop_hud(&self) -> Option<SharedHud> {
        self.lock().huds.pop()
    }

    pub fn remove_hud(&self, hud: &SharedHud) -> bool {
        remove_by_identity(&mut self.lock().huds, hud)
    }

    pub fn actor_count(&self) -> usize {
        self.lock().actors.len()
    }

    pub fn hud_count(&self) -> usize {
        self.lock().huds.len()
    }
}

fn remove_by_identity<T: ?Sized>(entries: &mut Vec<Arc<T>>, target: &Arc<T>) -> bool {
    let target_ptr = Arc::as_ptr(target) as *const ();
    match entries
        .iter()
        .position(|entry| Arc::as_ptr(entry) as *const () == target_ptr)
    {
        Some(index) => {
            entries.remove(index);
            true
        }
        None => false,
    }
}
