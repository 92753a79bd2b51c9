//! Unit tests for the compositor context and event dispatch

use super::testing::*;
use super::*;
use crate::geometry::{Point, Rectangle};
use crate::input::{DeviceId, DeviceKind};
use crate::output::OutputId;
use crate::protocol::{ClientId, RecordingClient, SurfaceId};
use crate::scene::SceneTree;

#[test]
fn test_new_compositor_is_idle() {
    let c = Compositor::new(CompositorConfig::default(), SceneTree::new(), RecordingClient::new()).unwrap();
    assert!(c.is_running());
    assert!(c.windows().is_empty());
    assert_eq!(c.focused_window(), None);
    assert_eq!(*c.grab(), Grab::Idle);
    assert!(c.outputs().is_empty());
    assert!(c.client().events().is_empty());
    assert_eq!(c.bindings().len(), 2);
}

#[test]
fn test_bad_binding_modifier_is_rejected() {
    let mut config = CompositorConfig::default();
    config.bindings.modifier = "Hyper".to_string();
    assert!(Compositor::new(config, SceneTree::new(), RecordingClient::new()).is_err());
}

#[test]
fn test_errors_do_not_stop_dispatch() {
    let mut c = compositor();
    let action = c.dispatch(ShellEvent::Map {
        surface: SurfaceId(99),
    });
    assert_eq!(action, LoopAction::Continue);
    assert!(c.is_running());

    c.dispatch(DeviceEvent::InputRemoved { device: DeviceId(4) });
    c.dispatch(ShellEvent::NewToplevel {
        surface: SurfaceId(1),
        client: ClientId(1),
    });
    assert_eq!(c.windows().len(), 1);
}

#[test]
fn test_event_script_parses_every_family() {
    let events: Vec<Event> = serde_json::from_str(
        r#"[
            {"type": "NewOutput", "output": 1, "width": 1280, "height": 720},
            {"type": "NewInput", "device": 2, "kind": "pointer"},
            {"type": "NewToplevel", "surface": 1, "client": 1},
            {"type": "Commit", "surface": 1, "buffer_size": [300, 200]},
            {"type": "RequestResize", "surface": 1, "edges": "BOTTOM | RIGHT"},
            {"type": "PointerMotion", "time_msec": 1, "delta_x": 10, "delta_y": 10.5},
            {"type": "PointerFrame"}
        ]"#,
    )
    .unwrap();

    assert_eq!(
        events[0],
        Event::Output(OutputEvent::NewOutput {
            output: OutputId(1),
            width: 1280,
            height: 720
        })
    );
    assert_eq!(
        events[1],
        Event::Device(DeviceEvent::NewInput {
            device: DeviceId(2),
            kind: DeviceKind::Pointer
        })
    );
    assert_eq!(
        events[3],
        Event::Shell(ShellEvent::Commit {
            surface: SurfaceId(1),
            buffer_size: (300, 200),
            geometry: Rectangle::default()
        })
    );
    assert!(matches!(
        events[4],
        Event::Shell(ShellEvent::RequestResize { edges, .. })
            if edges == crate::grab::ResizeEdges::BOTTOM | crate::grab::ResizeEdges::RIGHT
    ));
    assert!(matches!(events[5], Event::Input(InputEvent::PointerMotion { .. })));
    assert_eq!(events[6], Event::Input(InputEvent::PointerFrame));
}

#[test]
fn test_scripted_session() {
    let mut c = Compositor::new(CompositorConfig::default(), SceneTree::new(), RecordingClient::new()).unwrap();
    let script = [
        Event::from(OutputEvent::NewOutput {
            output: OutputId(1),
            width: 1920,
            height: 1080,
        }),
        Event::from(DeviceEvent::NewInput {
            device: DeviceId(1),
            kind: DeviceKind::Keyboard,
        }),
        Event::from(ShellEvent::NewToplevel {
            surface: SurfaceId(1),
            client: ClientId(1),
        }),
        Event::from(ShellEvent::Commit {
            surface: SurfaceId(1),
            buffer_size: (640, 480),
            geometry: Rectangle::new(0, 0, 640, 480),
        }),
        Event::from(ShellEvent::Map {
            surface: SurfaceId(1),
        }),
        Event::from(InputEvent::PointerMotion {
            time_msec: 1,
            delta_x: 100.0,
            delta_y: 100.0,
        }),
    ];
    for event in script {
        assert_eq!(c.dispatch(event), LoopAction::Continue);
    }

    let id = c.windows().by_surface(SurfaceId(1)).unwrap();
    assert_eq!(c.focused_window(), Some(id));
    assert_eq!(c.pointer().focus(), Some(SurfaceId(1)));
    assert_eq!(c.devices().keyboard_count(), 1);
}

#[test]
fn test_output_removal_pulls_cursor_back() {
    let mut c = compositor();
    c.dispatch(OutputEvent::NewOutput {
        output: OutputId(2),
        width: 800,
        height: 600,
    });
    move_to(&mut c, 2500.0, 100.0);
    assert_eq!(c.cursor().position(), Point::new(2500.0, 100.0));

    c.dispatch(OutputEvent::OutputRemoved { output: OutputId(2) });
    assert_eq!(c.cursor().position(), Point::new(1919.0, 100.0));
}
