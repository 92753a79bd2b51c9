//! Keyboard focus.
//!
//! At most one window holds keyboard focus. Focus moves only through
//! [`Compositor::focus`]; it is dropped implicitly when the focused window
//! unmaps.

use crate::compositor::Compositor;
use crate::error::{CompositorError, Result};
use crate::protocol::ClientSink;
use crate::scene::SceneGraph;
use crate::window::WindowId;
use log::{debug, info};

/// Which window has keyboard focus. Lookup only, never owning.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FocusState {
    focused: Option<WindowId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn is_focused(&self, id: WindowId) -> bool {
        self.focused == Some(id)
    }

    pub(crate) fn set(&mut self, id: WindowId) {
        self.focused = Some(id);
    }

    pub(crate) fn clear(&mut self) -> Option<WindowId> {
        self.focused.take()
    }
}

impl<S: SceneGraph, C: ClientSink> Compositor<S, C> {
    /// Give keyboard focus to a mapped window.
    ///
    /// Deactivates the previously focused window, raises `id`, activates it
    /// and sends it a keyboard enter with the active keyboard's state.
    /// Returns `Ok(false)` when nothing changed: the window already has
    /// focus, or it is not mapped.
    pub fn focus(&mut self, id: WindowId) -> Result<bool> {
        let window = self
            .windows
            .get(id)
            .ok_or(CompositorError::UnknownWindow(id))?;
        if !window.mapped {
            debug!("Ignoring focus request for unmapped window {:?}", id);
            return Ok(false);
        }
        if self.focus.is_focused(id) {
            return Ok(false);
        }
        let surface = window.surface;

        if let Some(prev) = self.focus.focused() {
            if let Some(prev_window) = self.windows.get_mut(prev) {
                prev_window.activated = false;
                self.client.set_activated(prev_window.surface, false);
            }
        }

        self.raise_to_front(id);

        if let Some(window) = self.windows.get_mut(id) {
            window.activated = true;
        }
        self.client.set_activated(surface, true);

        if let Some(keyboard) = self.devices.active_keyboard() {
            self.client
                .keyboard_enter(surface, keyboard.pressed_keys(), keyboard.modifiers());
        }

        self.focus.set(id);
        info!("🎯 Focused window {:?}", id);
        Ok(true)
    }

    /// Currently focused window.
    pub fn focused_window(&self) -> Option<WindowId> {
        self.focus.focused()
    }
}
