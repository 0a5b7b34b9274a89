use glam::DVec2;

use super::camera::Camera;
use super::input::{InputSnapshot, Key};

/// Camera pan speed for held arrow keys, in world units per second.
pub const PAN_SPEED: f64 = 1000.0;
pub const ENTER_ROTATE_DEGREES: f64 = -90.0;
pub const CLICK_BURST_SIZE: DVec2 = DVec2::new(10.0, 10.0);

/// Deferred mutation applied by the scheduler once per frame, right after
/// input dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    MoveCamera(DVec2),
    RotateCamera(f64),
    ZoomCamera(f64),
    ExplodeAt { world: DVec2, size: DVec2 },
}

/// Discrete action executed synchronously on the scheduler thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EdgeAction {
    Close,
    ToggleFullscreen,
    Pause,
    StartJukebox,
    DescribeClick { screen: DVec2, world: DVec2 },
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Dispatched {
    pub(crate) edges: Vec<EdgeAction>,
    pub(crate) commands: Vec<Command>,
}

/// Translates one input snapshot into edge actions and queued commands.
pub(crate) fn dispatch_input(input: &InputSnapshot, dt: f64, camera: &Camera) -> Dispatched {
    let mut out = Dispatched::default();

    if input.just_released(Key::Escape) {
        out.edges.push(EdgeAction::Close);
    }
    if input.just_released(Key::Space) {
        out.edges.push(EdgeAction::Pause);
    }
    if input.just_released(Key::Tab) {
        out.edges.push(EdgeAction::ToggleFullscreen);
    }
    if input.just_released(Key::M) && input.ctrl_pressed() {
        out.edges.push(EdgeAction::StartJukebox);
    }

    if input.just_released(Key::MouseLeft) {
        let screen = input.mouse_position();
        let world = camera.unproject(screen);
        out.commands.push(Command::ExplodeAt {
            world,
            size: CLICK_BURST_SIZE,
        });
        if input.ctrl_pressed() {
            out.edges.push(EdgeAction::DescribeClick { screen, world });
        }
    }

    if input.just_released(Key::Enter) {
        out.commands.push(Command::RotateCamera(ENTER_ROTATE_DEGREES));
    }
    let step = PAN_SPEED * dt;
    for (key, direction) in [
        (Key::Right, DVec2::X),
        (Key::Left, DVec2::NEG_X),
        (Key::Up, DVec2::Y),
        (Key::Down, DVec2::NEG_Y),
    ] {
        if input.pressed(key) {
            out.commands
                .push(Command::MoveCamera(camera.screen_axis_to_world(direction * step)));
        }
    }
    let scroll = input.mouse_scroll().y;
    if scroll != 0.0 {
        out.commands.push(Command::ZoomCamera(scroll));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::camera::Viewport;
    use crate::app::input::InputCollector;

    fn camera() -> Camera {
        Camera::new(DVec2::new(500.0, 500.0), Viewport::new(800.0, 600.0))
    }

    fn approx(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn released_edges_map_to_synchronous_actions() {
        let mut input = InputCollector::new();
        input.tap(Key::Escape);
        input.tap(Key::Tab);
        input.tap(Key::Space);
        let out = dispatch_input(&input.snapshot(), 0.016, &camera());
        assert_eq!(
            out.edges,
            vec![EdgeAction::Close, EdgeAction::Pause, EdgeAction::ToggleFullscreen]
        );
        assert!(out.commands.is_empty());
    }

    #[test]
    fn jukebox_needs_control_held() {
        let mut input = InputCollector::new();
        input.tap(Key::M);
        assert!(dispatch_input(&input.snapshot(), 0.0, &camera()).edges.is_empty());

        input.press(Key::LeftControl);
        input.tap(Key::M);
        let out = dispatch_input(&input.snapshot(), 0.0, &camera());
        assert_eq!(out.edges, vec![EdgeAction::StartJukebox]);
    }

    #[test]
    fn held_arrow_moves_by_speed_times_dt() {
        let mut input = InputCollector::new();
        input.press(Key::Right);
        let out = dispatch_input(&input.snapshot(), 0.01, &camera());
        assert_eq!(out.commands.len(), 1);
        let Command::MoveCamera(delta) = out.commands[0] else {
            panic!("expected a camera move, got {:?}", out.commands[0]);
        };
        assert!(approx(delta, DVec2::new(10.0, 0.0)));

        // Still held next frame: moves again without a new press.
        let out = dispatch_input(&input.snapshot(), 0.02, &camera());
        assert_eq!(out.commands.len(), 1);
        assert!(matches!(
            out.commands[0],
            Command::MoveCamera(delta) if approx(delta, DVec2::new(20.0, 0.0))
        ));
    }

    #[test]
    fn arrow_motion_is_rotated_by_camera_angle() {
        let mut rotated = camera();
        rotated.rotate(90.0);
        let mut input = InputCollector::new();
        input.press(Key::Up);
        let out = dispatch_input(&input.snapshot(), 0.001, &rotated);
        let Command::MoveCamera(delta) = out.commands[0] else {
            panic!("expected a camera move");
        };
        assert!(approx(delta, DVec2::new(-1.0, 0.0)));
    }

    #[test]
    fn scroll_and_enter_queue_zoom_and_rotation() {
        let mut input = InputCollector::new();
        input.scroll(DVec2::new(0.0, -2.0));
        input.tap(Key::Enter);
        let out = dispatch_input(&input.snapshot(), 0.0, &camera());
        assert_eq!(
            out.commands,
            vec![Command::RotateCamera(-90.0), Command::ZoomCamera(-2.0)]
        );

        // Zero scroll queues nothing.
        assert!(dispatch_input(&input.snapshot(), 0.0, &camera()).commands.is_empty());
    }

    #[test]
    fn click_bursts_at_unprojected_cursor() {
        let mut input = InputCollector::new();
        input.set_mouse_position(DVec2::new(400.0, 300.0));
        input.tap(Key::MouseLeft);
        let out = dispatch_input(&input.snapshot(), 0.0, &camera());
        assert_eq!(
            out.commands,
            vec![Command::ExplodeAt {
                world: DVec2::new(500.0, 500.0),
                size: CLICK_BURST_SIZE,
            }]
        );
        assert!(out.edges.is_empty());
    }

    #[test]
    fn control_click_also_describes_the_click() {
        let mut input = InputCollector::new();
        input.press(Key::LeftControl);
        input.set_mouse_position(DVec2::new(410.0, 300.0));
        input.tap(Key::MouseLeft);
        let out = dispatch_input(&input.snapshot(), 0.0, &camera());
        assert_eq!(
            out.edges,
            vec![EdgeAction::DescribeClick {
                screen: DVec2::new(410.0, 300.0),
                world: DVec2::new(510.0, 500.0),
            }]
        );
        assert_eq!(out.commands.len(), 1);
    }
}
