//! Input routing
//!
//! Raw device events enter here. Pointer events drive the cursor and either
//! the grab state machine or passthrough delivery; keyboard events pass
//! global key bindings first and otherwise go to the focused window.

pub mod bindings;
pub mod keyboard;
pub mod pointer;

pub use bindings::{CompositorAction, KeyBindings};
pub use keyboard::{InputDevices, KeyboardState, ModifierState, Modifiers, RepeatInfo};
pub use pointer::PointerFocus;

use crate::compositor::{Compositor, LoopAction};
use crate::error::{CompositorError, Result};
use crate::geometry::Point;
use crate::protocol::{ClientId, ClientSink, CursorImage, SeatCapabilities, SelectionSource, SurfaceId};
use crate::scene::SceneGraph;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

/// Handle for an attached input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Keyboard,
    Pointer,
    Touch,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSource {
    #[default]
    Wheel,
    Finger,
    Continuous,
    WheelTilt,
}

/// One scroll step, forwarded to the client unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisEvent {
    pub orientation: AxisOrientation,
    pub delta: f64,
    #[serde(default)]
    pub delta_discrete: i32,
    #[serde(default)]
    pub source: AxisSource,
}

/// Device attach/detach notifications from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeviceEvent {
    NewInput { device: DeviceId, kind: DeviceKind },
    InputRemoved { device: DeviceId },
}

/// Raw input, plus the seat requests clients make about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEvent {
    PointerMotion {
        time_msec: u32,
        delta_x: f64,
        delta_y: f64,
    },
    /// Normalised (0..1) position over the whole output layout
    PointerMotionAbsolute { time_msec: u32, x: f64, y: f64 },
    PointerButton {
        time_msec: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis { time_msec: u32, axis: AxisEvent },
    PointerFrame,
    KeyboardKey {
        device: DeviceId,
        time_msec: u32,
        keycode: u32,
        state: KeyState,
        /// Keysym names the keymap produces for this key
        #[serde(default)]
        keysyms: Vec<String>,
    },
    KeyboardModifiers {
        device: DeviceId,
        modifiers: ModifierState,
    },
    RequestSetCursor {
        client: ClientId,
        #[serde(default)]
        surface: Option<SurfaceId>,
        #[serde(default)]
        hotspot: Point<i32>,
    },
    RequestSetSelection {
        #[serde(default)]
        source: Option<SelectionSource>,
        serial: u32,
    },
}

impl<S: SceneGraph, C: ClientSink> Compositor<S, C> {
    pub(crate) fn handle_input_event(&mut self, event: InputEvent) -> Result<LoopAction> {
        match event {
            InputEvent::PointerMotion {
                time_msec,
                delta_x,
                delta_y,
            } => {
                self.cursor.move_by(&self.outputs, delta_x, delta_y);
                self.on_pointer_motion(time_msec);
            }
            InputEvent::PointerMotionAbsolute { time_msec, x, y } => {
                if self.cursor.warp_absolute(&self.outputs, x, y) {
                    self.on_pointer_motion(time_msec);
                } else {
                    trace!("Absolute motion without outputs dropped");
                }
            }
            InputEvent::PointerButton {
                time_msec,
                button,
                state,
            } => self.on_pointer_button(time_msec, button, state)?,
            InputEvent::PointerAxis { time_msec, axis } => {
                if let Some(surface) = self.pointer.focus() {
                    self.client.pointer_axis(surface, time_msec, axis);
                }
            }
            InputEvent::PointerFrame => {
                if let Some(surface) = self.pointer.focus() {
                    self.client.pointer_frame(surface);
                }
            }
            InputEvent::KeyboardKey {
                device,
                time_msec,
                keycode,
                state,
                keysyms,
            } => return self.on_keyboard_key(device, time_msec, keycode, state, &keysyms),
            InputEvent::KeyboardModifiers { device, modifiers } => {
                self.on_keyboard_modifiers(device, modifiers)?
            }
            InputEvent::RequestSetCursor {
                client,
                surface,
                hotspot,
            } => self.on_request_set_cursor(client, surface, hotspot),
            InputEvent::RequestSetSelection { source, serial } => {
                self.client.set_selection(source, serial);
            }
        }
        Ok(LoopAction::Continue)
    }

    /// The client under the pointer sees the button before any focus
    /// change it causes.
    pub fn on_pointer_button(&mut self, time_msec: u32, button: u32, state: ButtonState) -> Result<()> {
        if let Some(surface) = self.pointer.focus() {
            self.client.pointer_button(surface, time_msec, button, state);
        }
        match state {
            ButtonState::Released => self.end_grab(),
            ButtonState::Pressed => {
                if let Some(hit) = self.hit_test(self.cursor.position()) {
                    self.focus(hit.window)?;
                }
            }
        }
        Ok(())
    }

    /// Key press or release from `device`.
    ///
    /// With the binding modifier held, a press whose keysyms match a
    /// binding is consumed. Everything else goes to the focused window.
    pub fn on_keyboard_key(
        &mut self,
        device: DeviceId,
        time_msec: u32,
        keycode: u32,
        state: KeyState,
        keysyms: &[String],
    ) -> Result<LoopAction> {
        let keyboard = self
            .devices
            .keyboard_mut(device)
            .ok_or(CompositorError::UnknownDevice(device))?;
        keyboard.update_key(keycode, state);
        let held = keyboard.modifiers().effective();

        if state == KeyState::Pressed && self.bindings.is_armed(held) {
            let mut handled = false;
            let mut outcome = LoopAction::Continue;
            for keysym in keysyms {
                if let Some(action) = self.bindings.lookup(keysym) {
                    handled = true;
                    if self.run_action(action) == LoopAction::Terminate {
                        outcome = LoopAction::Terminate;
                    }
                }
            }
            if handled {
                debug!("⌨️ Key {} consumed by binding", keycode);
                return Ok(outcome);
            }
        }

        self.devices.set_active_keyboard(device);
        if let Some(surface) = self.focused_surface() {
            self.client.keyboard_key(surface, time_msec, keycode, state);
        }
        Ok(LoopAction::Continue)
    }

    /// Modifier changes are never consumed.
    pub fn on_keyboard_modifiers(&mut self, device: DeviceId, modifiers: ModifierState) -> Result<()> {
        self.devices
            .keyboard_mut(device)
            .ok_or(CompositorError::UnknownDevice(device))?
            .set_modifiers(modifiers);
        self.devices.set_active_keyboard(device);
        if let Some(surface) = self.focused_surface() {
            self.client.keyboard_modifiers(surface, modifiers);
        }
        Ok(())
    }

    pub fn run_action(&mut self, action: CompositorAction) -> LoopAction {
        info!("🚀 Triggered action: {:?}", action);
        match action {
            CompositorAction::Terminate => {
                self.running = false;
                LoopAction::Terminate
            }
            CompositorAction::CycleFocus => {
                self.cycle_focus();
                LoopAction::Continue
            }
        }
    }

    /// Only the client owning the pointer-focused surface may change the
    /// cursor image.
    fn on_request_set_cursor(&mut self, client: ClientId, surface: Option<SurfaceId>, hotspot: Point<i32>) {
        let owner = self
            .pointer
            .focus()
            .and_then(|focus| self.windows.client_of(focus));
        if owner != Some(client) {
            debug!("Ignoring cursor image from {:?}: not pointer focus", client);
            return;
        }
        self.client
            .set_cursor_image(CursorImage::Surface { surface, hotspot });
        self.pointer.release_default_image();
    }

    pub(crate) fn handle_device_event(&mut self, event: DeviceEvent) -> Result<()> {
        match event {
            DeviceEvent::NewInput { device, kind } => match kind {
                DeviceKind::Keyboard => {
                    let repeat = RepeatInfo {
                        rate: self.config.input.keyboard_repeat_rate,
                        delay: self.config.input.keyboard_repeat_delay,
                    };
                    self.devices.add_keyboard(device, KeyboardState::new(repeat))?;
                    info!("⌨️ Keyboard {:?} attached", device);
                }
                DeviceKind::Pointer => {
                    self.devices.add_pointer(device)?;
                    info!("🐁 Pointer {:?} attached", device);
                }
                DeviceKind::Touch | DeviceKind::Other => {
                    debug!("Ignoring {:?} device {:?}", kind, device);
                    return Ok(());
                }
            },
            DeviceEvent::InputRemoved { device } => {
                let kind = self.devices.remove(device)?;
                info!("🔌 {:?} {:?} removed", kind, device);
            }
        }
        self.client.set_capabilities(self.capabilities());
        Ok(())
    }

    /// Pointer is always advertised; keyboard once one is attached.
    pub fn capabilities(&self) -> SeatCapabilities {
        let mut caps = SeatCapabilities::POINTER;
        if self.devices.keyboard_count() > 0 {
            caps |= SeatCapabilities::KEYBOARD;
        }
        caps
    }

    fn focused_surface(&self) -> Option<SurfaceId> {
        self.focus
            .focused()
            .and_then(|id| self.windows.get(id))
            .map(|w| w.surface)
    }
}

#[cfg(test)]
mod tests;
