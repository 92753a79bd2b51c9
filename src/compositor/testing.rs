//! Helpers shared by the unit tests of every module.

use super::Compositor;
use crate::config::CompositorConfig;
use crate::geometry::{Point, Rectangle};
use crate::input::{DeviceEvent, DeviceId, DeviceKind, InputEvent, KeyState, ModifierState, Modifiers};
use crate::output::{OutputEvent, OutputId};
use crate::protocol::{ClientId, RecordingClient, SurfaceId};
use crate::scene::{SceneGraph, SceneTree};
use crate::window::WindowId;

pub(crate) type TestCompositor = Compositor<SceneTree, RecordingClient>;

pub(crate) const KEYBOARD: DeviceId = DeviceId(1);

/// Compositor with one 1920x1080 output.
pub(crate) fn compositor() -> TestCompositor {
    compositor_with(CompositorConfig::default())
}

pub(crate) fn compositor_with(config: CompositorConfig) -> TestCompositor {
    let mut c = Compositor::new(config, SceneTree::new(), RecordingClient::new()).unwrap();
    c.dispatch(OutputEvent::NewOutput {
        output: OutputId(1),
        width: 1920,
        height: 1080,
    });
    c
}

/// Create, commit, place and map a toplevel. The client id equals the
/// surface id.
pub(crate) fn add_window(c: &mut TestCompositor, surface: u64, area: Rectangle) -> WindowId {
    let id = new_window(c, surface, area);
    c.on_map(id).unwrap();
    id
}

/// Same as [`add_window`] without mapping.
pub(crate) fn new_window(c: &mut TestCompositor, surface: u64, area: Rectangle) -> WindowId {
    let s = SurfaceId(surface);
    let id = c.on_new_toplevel(s, ClientId(surface as u32)).unwrap();
    c.on_commit(
        s,
        (area.width, area.height),
        Rectangle::new(0, 0, area.width, area.height),
    )
    .unwrap();
    let node = c.windows.get(id).unwrap().scene_node;
    c.scene.set_position(node, area.loc());
    id
}

/// Move the cursor to an absolute layout position through relative motion.
pub(crate) fn move_to(c: &mut TestCompositor, x: f64, y: f64) {
    let current = c.cursor.position();
    c.dispatch(InputEvent::PointerMotion {
        time_msec: 0,
        delta_x: x - current.x,
        delta_y: y - current.y,
    });
}

pub(crate) fn attach_keyboard(c: &mut TestCompositor) {
    c.dispatch(DeviceEvent::NewInput {
        device: KEYBOARD,
        kind: DeviceKind::Keyboard,
    });
}

pub(crate) fn hold_modifiers(c: &mut TestCompositor, depressed: Modifiers) {
    c.dispatch(InputEvent::KeyboardModifiers {
        device: KEYBOARD,
        modifiers: ModifierState {
            depressed,
            ..Default::default()
        },
    });
}

pub(crate) fn key(c: &mut TestCompositor, keycode: u32, state: KeyState, keysyms: &[&str]) -> super::LoopAction {
    c.dispatch(InputEvent::KeyboardKey {
        device: KEYBOARD,
        time_msec: 0,
        keycode,
        state,
        keysyms: keysyms.iter().map(|s| s.to_string()).collect(),
    })
}

pub(crate) fn press_at(c: &mut TestCompositor, x: f64, y: f64) {
    move_to(c, x, y);
    c.dispatch(InputEvent::PointerButton {
        time_msec: 0,
        button: 0x110,
        state: crate::input::ButtonState::Pressed,
    });
}

pub(crate) fn release(c: &mut TestCompositor) {
    c.dispatch(InputEvent::PointerButton {
        time_msec: 0,
        button: 0x110,
        state: crate::input::ButtonState::Released,
    });
}

pub(crate) fn position_of(c: &TestCompositor, id: WindowId) -> Point<i32> {
    c.window_position(id).unwrap()
}
