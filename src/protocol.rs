//! Client-facing side of the seat.
//!
//! The display-protocol layer is external: this module only names the
//! handles it hands us and the notifications we send back through it.
//! Every notification is addressed to an explicit surface so the core
//! never has to trust a focus pointer it does not own.

use crate::geometry::Point;
use crate::input::{AxisEvent, ButtonState, KeyState, ModifierState};
use bitflags::bitflags;
use log::trace;
use serde::{Deserialize, Serialize};

/// Opaque handle for a protocol surface (toplevel, popup or subsurface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

/// Opaque handle for a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u32);

/// Opaque handle for a clipboard data source offered by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSource(pub u64);

bitflags! {
    /// Device classes advertised on the seat.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SeatCapabilities: u32 {
        const POINTER = 1;
        const KEYBOARD = 2;
        const TOUCH = 4;
    }
}

/// What the cursor currently shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CursorImage {
    /// A named image from the compositor's cursor theme.
    Named(String),
    /// A client-provided surface, or `None` to hide the cursor.
    Surface {
        surface: Option<SurfaceId>,
        hotspot: Point<i32>,
    },
}

/// Notifications and requests the core sends toward clients.
#[cfg_attr(test, mockall::automock)]
pub trait ClientSink {
    fn pointer_enter(&mut self, surface: SurfaceId, local: Point<f64>);
    fn pointer_motion(&mut self, surface: SurfaceId, time_msec: u32, local: Point<f64>);
    fn pointer_clear_focus(&mut self);
    fn pointer_button(&mut self, surface: SurfaceId, time_msec: u32, button: u32, state: ButtonState);
    fn pointer_axis(&mut self, surface: SurfaceId, time_msec: u32, axis: AxisEvent);
    fn pointer_frame(&mut self, surface: SurfaceId);

    fn keyboard_enter(&mut self, surface: SurfaceId, pressed: &[u32], modifiers: ModifierState);
    fn keyboard_key(&mut self, surface: SurfaceId, time_msec: u32, keycode: u32, state: KeyState);
    fn keyboard_modifiers(&mut self, surface: SurfaceId, modifiers: ModifierState);

    fn set_activated(&mut self, surface: SurfaceId, activated: bool);
    /// Ask the client to resize. (0, 0) lets the client pick its own size.
    fn request_size(&mut self, surface: SurfaceId, width: i32, height: i32);
    /// Empty configure, used to acknowledge requests we do not implement.
    fn schedule_configure(&mut self, surface: SurfaceId);

    fn set_cursor_image(&mut self, image: CursorImage);
    fn set_selection(&mut self, source: Option<SelectionSource>, serial: u32);
    fn set_capabilities(&mut self, capabilities: SeatCapabilities);
}

/// One outbound notification, as captured by [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    PointerEnter { surface: SurfaceId, local: Point<f64> },
    PointerMotion { surface: SurfaceId, time_msec: u32, local: Point<f64> },
    PointerClearFocus,
    PointerButton { surface: SurfaceId, time_msec: u32, button: u32, state: ButtonState },
    PointerAxis { surface: SurfaceId, time_msec: u32, axis: AxisEvent },
    PointerFrame { surface: SurfaceId },
    KeyboardEnter { surface: SurfaceId, pressed: Vec<u32>, modifiers: ModifierState },
    KeyboardKey { surface: SurfaceId, time_msec: u32, keycode: u32, state: KeyState },
    KeyboardModifiers { surface: SurfaceId, modifiers: ModifierState },
    Activated { surface: SurfaceId, activated: bool },
    RequestSize { surface: SurfaceId, width: i32, height: i32 },
    ScheduleConfigure { surface: SurfaceId },
    CursorImage { image: CursorImage },
    Selection { source: Option<SelectionSource>, serial: u32 },
    Capabilities { capabilities: SeatCapabilities },
}

/// A `ClientSink` that keeps every notification in order.
///
/// The headless host prints this log; tests assert on it.
#[derive(Debug, Default)]
pub struct RecordingClient {
    events: Vec<ClientEvent>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ClientEvent] {
        &self.events
    }

    /// Drains the log, returning what was recorded since the last call.
    pub fn take(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, pred: impl Fn(&ClientEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn record(&mut self, event: ClientEvent) {
        trace!("📤 {:?}", event);
        self.events.push(event);
    }
}

impl ClientSink for RecordingClient {
    fn pointer_enter(&mut self, surface: SurfaceId, local: Point<f64>) {
        self.record(ClientEvent::PointerEnter { surface, local });
    }

    fn pointer_motion(&mut self, surface: SurfaceId, time_msec: u32, local: Point<f64>) {
        self.record(ClientEvent::PointerMotion {
            surface,
            time_msec,
            local,
        });
    }

    fn pointer_clear_focus(&mut self) {
        self.record(ClientEvent::PointerClearFocus);
    }

    fn pointer_button(&mut self, surface: SurfaceId, time_msec: u32, button: u32, state: ButtonState) {
        self.record(ClientEvent::PointerButton {
            surface,
            time_msec,
            button,
            state,
        });
    }

    fn pointer_axis(&mut self, surface: SurfaceId, time_msec: u32, axis: AxisEvent) {
        self.record(ClientEvent::PointerAxis {
            surface,
            time_msec,
            axis,
        });
    }

    fn pointer_frame(&mut self, surface: SurfaceId) {
        self.record(ClientEvent::PointerFrame { surface });
    }

    fn keyboard_enter(&mut self, surface: SurfaceId, pressed: &[u32], modifiers: ModifierState) {
        self.record(ClientEvent::KeyboardEnter {
            surface,
            pressed: pressed.to_vec(),
            modifiers,
        });
    }

    fn keyboard_key(&mut self, surface: SurfaceId, time_msec: u32, keycode: u32, state: KeyState) {
        self.record(ClientEvent::KeyboardKey {
            surface,
            time_msec,
            keycode,
            state,
        });
    }

    fn keyboard_modifiers(&mut self, surface: SurfaceId, modifiers: ModifierState) {
        self.record(ClientEvent::KeyboardModifiers { surface, modifiers });
    }

    fn set_activated(&mut self, surface: SurfaceId, activated: bool) {
        self.record(ClientEvent::Activated { surface, activated });
    }

    fn request_size(&mut self, surface: SurfaceId, width: i32, height: i32) {
        self.record(ClientEvent::RequestSize {
            surface,
            width,
            height,
        });
    }

    fn schedule_configure(&mut self, surface: SurfaceId) {
        self.record(ClientEvent::ScheduleConfigure { surface });
    }

    fn set_cursor_image(&mut self, image: CursorImage) {
        self.record(ClientEvent::CursorImage { image });
    }

    fn set_selection(&mut self, source: Option<SelectionSource>, serial: u32) {
        self.record(ClientEvent::Selection { source, serial });
    }

    fn set_capabilities(&mut self, capabilities: SeatCapabilities) {
        self.record(ClientEvent::Capabilities { capabilities });
    }
}
