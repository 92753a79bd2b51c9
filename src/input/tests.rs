//! Unit tests for input routing, bindings and device tracking

use super::*;
use crate::compositor::testing::*;
use crate::geometry::Rectangle;
use crate::protocol::ClientEvent;

fn forwarded_keys(c: &TestCompositor) -> Vec<(SurfaceId, u32, KeyState)> {
    c.client
        .events()
        .iter()
        .filter_map(|e| match e {
            ClientEvent::KeyboardKey {
                surface,
                keycode,
                state,
                ..
            } => Some((*surface, *keycode, *state)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_button_reaches_client_before_focus_change() {
    let mut c = compositor();
    let a = add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    add_window(&mut c, 2, Rectangle::new(200, 0, 100, 100));
    move_to(&mut c, 50.0, 50.0);
    c.client.take();

    c.dispatch(InputEvent::PointerButton {
        time_msec: 7,
        button: 0x110,
        state: ButtonState::Pressed,
    });

    let events = c.client.take();
    assert_eq!(
        events[0],
        ClientEvent::PointerButton {
            surface: SurfaceId(1),
            time_msec: 7,
            button: 0x110,
            state: ButtonState::Pressed
        }
    );
    assert!(events.contains(&ClientEvent::Activated {
        surface: SurfaceId(1),
        activated: true
    }));
    assert_eq!(c.focused_window(), Some(a));
    assert_eq!(c.windows().front(), Some(a));
}

#[test]
fn test_press_on_empty_desktop_keeps_focus() {
    let mut c = compositor();
    let a = add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    press_at(&mut c, 500.0, 500.0);
    assert_eq!(c.focused_window(), Some(a));
    assert_eq!(
        c.client
            .count(|e| matches!(e, ClientEvent::PointerButton { .. })),
        0
    );
}

#[test]
fn test_keys_go_to_focused_window() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    add_window(&mut c, 2, Rectangle::new(0, 0, 100, 100));

    key(&mut c, 30, KeyState::Pressed, &["a"]);
    key(&mut c, 30, KeyState::Released, &["a"]);
    assert_eq!(
        forwarded_keys(&c),
        vec![
            (SurfaceId(2), 30, KeyState::Pressed),
            (SurfaceId(2), 30, KeyState::Released)
        ]
    );
}

#[test]
fn test_cycle_binding_is_consumed() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    let a = add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    let b = add_window(&mut c, 2, Rectangle::new(0, 0, 100, 100));
    assert_eq!(c.focused_window(), Some(b));

    hold_modifiers(&mut c, Modifiers::ALT);
    let action = key(&mut c, 67, KeyState::Pressed, &["F1"]);

    assert_eq!(action, LoopAction::Continue);
    assert!(forwarded_keys(&c).is_empty());
    assert_eq!(c.focused_window(), Some(a));

    // the release is not a binding and goes to the new focus
    key(&mut c, 67, KeyState::Released, &["F1"]);
    assert_eq!(forwarded_keys(&c), vec![(SurfaceId(1), 67, KeyState::Released)]);
}

#[test]
fn test_terminate_binding_stops_the_loop() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    hold_modifiers(&mut c, Modifiers::ALT | Modifiers::MOD2);

    assert_eq!(key(&mut c, 9, KeyState::Pressed, &["Escape"]), LoopAction::Terminate);
    assert!(!c.is_running());
    assert_eq!(key(&mut c, 30, KeyState::Pressed, &["a"]), LoopAction::Terminate);
}

#[test]
fn test_binding_needs_modifier() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));

    assert_eq!(key(&mut c, 9, KeyState::Pressed, &["Escape"]), LoopAction::Continue);
    assert!(c.is_running());
    assert_eq!(forwarded_keys(&c), vec![(SurfaceId(1), 9, KeyState::Pressed)]);
}

#[test]
fn test_unbound_key_with_modifier_is_forwarded() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    hold_modifiers(&mut c, Modifiers::ALT);

    key(&mut c, 30, KeyState::Pressed, &["a"]);
    assert_eq!(forwarded_keys(&c), vec![(SurfaceId(1), 30, KeyState::Pressed)]);
}

#[test]
fn test_any_matching_keysym_consumes() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    add_window(&mut c, 2, Rectangle::new(0, 0, 100, 100));
    hold_modifiers(&mut c, Modifiers::ALT);

    key(&mut c, 67, KeyState::Pressed, &["XF86Switch_VT_1", "F1"]);
    assert!(forwarded_keys(&c).is_empty());
}

#[test]
fn test_modifiers_always_forwarded() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    c.client.take();

    hold_modifiers(&mut c, Modifiers::ALT);
    assert_eq!(
        c.client.events(),
        &[ClientEvent::KeyboardModifiers {
            surface: SurfaceId(1),
            modifiers: ModifierState {
                depressed: Modifiers::ALT,
                ..Default::default()
            }
        }]
    );
}

#[test]
fn test_key_from_unknown_device_is_dropped() {
    let mut c = compositor();
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    key(&mut c, 30, KeyState::Pressed, &["a"]);
    assert!(forwarded_keys(&c).is_empty());
}

#[test]
fn test_capabilities_follow_devices() {
    let mut c = compositor();
    c.dispatch(DeviceEvent::NewInput {
        device: DeviceId(5),
        kind: DeviceKind::Pointer,
    });
    assert_eq!(c.capabilities(), SeatCapabilities::POINTER);

    attach_keyboard(&mut c);
    assert_eq!(
        c.capabilities(),
        SeatCapabilities::POINTER | SeatCapabilities::KEYBOARD
    );

    c.dispatch(DeviceEvent::InputRemoved { device: KEYBOARD });
    assert_eq!(c.capabilities(), SeatCapabilities::POINTER);

    let advertised: Vec<_> = c
        .client
        .events()
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Capabilities { capabilities } => Some(*capabilities),
            _ => None,
        })
        .collect();
    assert_eq!(
        advertised,
        vec![
            SeatCapabilities::POINTER,
            SeatCapabilities::POINTER | SeatCapabilities::KEYBOARD,
            SeatCapabilities::POINTER,
        ]
    );
}

#[test]
fn test_touch_devices_are_ignored() {
    let mut c = compositor();
    c.dispatch(DeviceEvent::NewInput {
        device: DeviceId(3),
        kind: DeviceKind::Touch,
    });
    assert!(!c.devices().contains(DeviceId(3)));
    assert_eq!(
        c.client.count(|e| matches!(e, ClientEvent::Capabilities { .. })),
        0
    );
}

#[test]
fn test_duplicate_and_unknown_devices() {
    let mut devices = InputDevices::new();
    let repeat = RepeatInfo { rate: 25, delay: 600 };
    devices.add_keyboard(DeviceId(1), KeyboardState::new(repeat)).unwrap();
    assert_eq!(
        devices.add_pointer(DeviceId(1)),
        Err(CompositorError::DuplicateDevice(DeviceId(1)))
    );
    assert_eq!(
        devices.remove(DeviceId(2)),
        Err(CompositorError::UnknownDevice(DeviceId(2)))
    );
}

#[test]
fn test_active_keyboard_is_last_used() {
    let mut devices = InputDevices::new();
    let repeat = RepeatInfo { rate: 25, delay: 600 };
    devices.add_keyboard(DeviceId(1), KeyboardState::new(repeat)).unwrap();
    devices.add_keyboard(DeviceId(2), KeyboardState::new(repeat)).unwrap();
    assert_eq!(devices.active_keyboard_id(), Some(DeviceId(2)));

    devices.set_active_keyboard(DeviceId(1));
    assert_eq!(devices.active_keyboard_id(), Some(DeviceId(1)));

    assert_eq!(devices.remove(DeviceId(1)), Ok(DeviceKind::Keyboard));
    assert!(devices.active_keyboard().is_none());

    devices.set_active_keyboard(DeviceId(2));
    assert_eq!(devices.active_keyboard().map(|k| k.repeat_info()), Some(repeat));
}

#[test]
fn test_keyboard_repeat_comes_from_config() {
    let mut c = compositor();
    attach_keyboard(&mut c);
    let keyboard = c.devices().keyboard(KEYBOARD).unwrap();
    assert_eq!(keyboard.repeat_info(), RepeatInfo { rate: 25, delay: 600 });
}

#[test]
fn test_pressed_keys_tracking() {
    let mut keyboard = KeyboardState::new(RepeatInfo { rate: 25, delay: 600 });
    keyboard.update_key(40, KeyState::Pressed);
    keyboard.update_key(30, KeyState::Pressed);
    keyboard.update_key(30, KeyState::Pressed);
    assert_eq!(keyboard.pressed_keys(), &[30, 40]);
    keyboard.update_key(40, KeyState::Released);
    keyboard.update_key(99, KeyState::Released);
    assert_eq!(keyboard.pressed_keys(), &[30]);
}

#[test]
fn test_modifier_names() {
    assert_eq!(Modifiers::from_names("Alt"), Some(Modifiers::ALT));
    assert_eq!(
        Modifiers::from_names("Super+Shift"),
        Some(Modifiers::LOGO | Modifiers::SHIFT)
    );
    assert_eq!(Modifiers::from_names("ctrl + alt"), Some(Modifiers::CTRL | Modifiers::ALT));
    assert_eq!(Modifiers::from_names("Meta"), None);
}

#[test]
fn test_locked_modifier_arms_bindings() {
    let state = ModifierState {
        locked: Modifiers::ALT,
        ..Default::default()
    };
    let bindings = KeyBindings::from_config(&crate::config::BindingsConfig::default()).unwrap();
    assert!(bindings.is_armed(state.effective()));
    assert!(!bindings.is_armed(Modifiers::SHIFT));
    assert_eq!(bindings.lookup("F1"), Some(CompositorAction::CycleFocus));
    assert_eq!(bindings.lookup("F2"), None);
}

#[test]
fn test_set_cursor_only_from_pointer_focus_owner() {
    let mut c = compositor();
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    add_window(&mut c, 2, Rectangle::new(200, 0, 100, 100));
    move_to(&mut c, 50.0, 50.0);
    c.client.take();

    c.dispatch(InputEvent::RequestSetCursor {
        client: ClientId(2),
        surface: Some(SurfaceId(20)),
        hotspot: Point::new(1, 1),
    });
    assert!(c.client.events().is_empty());

    c.dispatch(InputEvent::RequestSetCursor {
        client: ClientId(1),
        surface: Some(SurfaceId(10)),
        hotspot: Point::new(3, 4),
    });
    assert_eq!(
        c.client.events(),
        &[ClientEvent::CursorImage {
            image: CursorImage::Surface {
                surface: Some(SurfaceId(10)),
                hotspot: Point::new(3, 4)
            }
        }]
    );
}

#[test]
fn test_selection_is_forwarded() {
    let mut c = compositor();
    c.dispatch(InputEvent::RequestSetSelection {
        source: Some(SelectionSource(9)),
        serial: 12,
    });
    assert_eq!(
        c.client.events(),
        &[ClientEvent::Selection {
            source: Some(SelectionSource(9)),
            serial: 12
        }]
    );
}

#[test]
fn test_axis_and_frame_follow_pointer_focus() {
    let mut c = compositor();
    add_window(&mut c, 1, Rectangle::new(0, 0, 100, 100));
    let axis = AxisEvent {
        orientation: AxisOrientation::Vertical,
        delta: 15.0,
        delta_discrete: 1,
        source: AxisSource::Wheel,
    };

    // no pointer focus yet: nothing to deliver to
    c.dispatch(InputEvent::PointerAxis { time_msec: 1, axis });
    c.dispatch(InputEvent::PointerFrame);
    assert_eq!(
        c.client.count(|e| matches!(
            e,
            ClientEvent::PointerAxis { .. } | ClientEvent::PointerFrame { .. }
        )),
        0
    );

    move_to(&mut c, 10.0, 10.0);
    c.client.take();
    c.dispatch(InputEvent::PointerAxis { time_msec: 2, axis });
    c.dispatch(InputEvent::PointerFrame);
    assert_eq!(
        c.client.take(),
        vec![
            ClientEvent::PointerAxis {
                surface: SurfaceId(1),
                time_msec: 2,
                axis
            },
            ClientEvent::PointerFrame {
                surface: SurfaceId(1)
            },
        ]
    );
}

#[test]
fn test_absolute_motion() {
    let mut c = compositor();
    add_window(&mut c, 1, Rectangle::new(900, 500, 200, 200));
    c.dispatch(InputEvent::PointerMotionAbsolute {
        time_msec: 3,
        x: 0.5,
        y: 0.5,
    });
    assert_eq!(c.cursor().position(), Point::new(960.0, 540.0));
    assert_eq!(c.pointer().focus(), Some(SurfaceId(1)));
}

#[test]
fn test_input_event_json() {
    let event: InputEvent = serde_json::from_str(
        r#"{"type": "KeyboardKey", "device": 1, "time_msec": 5, "keycode": 9,
            "state": "pressed", "keysyms": ["Escape"]}"#,
    )
    .unwrap();
    assert_eq!(
        event,
        InputEvent::KeyboardKey {
            device: DeviceId(1),
            time_msec: 5,
            keycode: 9,
            state: KeyState::Pressed,
            keysyms: vec!["Escape".to_string()],
        }
    );
}
