//! Core compositor context
//!
//! [`Compositor`] holds every piece of seat and window state and is the only
//! thing handlers mutate. The scene graph and the client-facing protocol
//! side are collaborators passed in at construction, so the whole core can
//! be driven from tests with [`SceneTree`](crate::scene::SceneTree) and
//! [`RecordingClient`](crate::protocol::RecordingClient).
//!
//! Everything enters through [`Compositor::dispatch`]: one event at a time,
//! each handled to completion before the next.

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::CompositorConfig;
use crate::focus::FocusState;
use crate::grab::Grab;
use crate::input::{DeviceEvent, InputDevices, InputEvent, KeyBindings, PointerFocus};
use crate::output::{Cursor, OutputEvent, OutputLayout};
use crate::protocol::ClientSink;
use crate::scene::SceneGraph;
use crate::window::{ShellEvent, WindowRegistry};

/// Anything the hosting event loop can feed the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Shell(ShellEvent),
    Input(InputEvent),
    Device(DeviceEvent),
    Output(OutputEvent),
}

impl From<ShellEvent> for Event {
    fn from(event: ShellEvent) -> Self {
        Event::Shell(event)
    }
}

impl From<InputEvent> for Event {
    fn from(event: InputEvent) -> Self {
        Event::Input(event)
    }
}

impl From<DeviceEvent> for Event {
    fn from(event: DeviceEvent) -> Self {
        Event::Device(event)
    }
}

impl From<OutputEvent> for Event {
    fn from(event: OutputEvent) -> Self {
        Event::Output(event)
    }
}

/// What the hosting loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    /// The terminate binding fired; stop and exit cleanly
    Terminate,
}

/// Main compositor struct that owns all window and seat state
pub struct Compositor<S: SceneGraph, C: ClientSink> {
    pub(crate) config: CompositorConfig,
    pub(crate) scene: S,
    pub(crate) client: C,

    pub(crate) windows: WindowRegistry,
    pub(crate) focus: FocusState,
    pub(crate) grab: Grab,

    pub(crate) cursor: Cursor,
    pub(crate) outputs: OutputLayout,
    pub(crate) devices: InputDevices,
    pub(crate) pointer: PointerFocus,
    pub(crate) bindings: KeyBindings,

    pub(crate) running: bool,
}

impl<S: SceneGraph, C: ClientSink> Compositor<S, C> {
    pub fn new(config: CompositorConfig, scene: S, client: C) -> Result<Self> {
        info!("🏗️ Initializing compositor core...");

        debug!("⌨️ Loading key bindings...");
        let bindings = KeyBindings::from_config(&config.bindings)?;

        Ok(Self {
            config,
            scene,
            client,
            windows: WindowRegistry::new(),
            focus: FocusState::new(),
            grab: Grab::Idle,
            cursor: Cursor::new(),
            outputs: OutputLayout::new(),
            devices: InputDevices::new(),
            pointer: PointerFocus::new(),
            bindings,
            running: true,
        })
    }

    /// Handle one event. Precondition violations reported by a handler are
    /// logged and dropped; they never stop the loop.
    pub fn dispatch(&mut self, event: impl Into<Event>) -> LoopAction {
        if !self.running {
            return LoopAction::Terminate;
        }
        let event = event.into();
        let result = match event {
            Event::Shell(e) => self.handle_shell_event(e).map(|_| LoopAction::Continue),
            Event::Input(e) => self.handle_input_event(e),
            Event::Device(e) => self.handle_device_event(e).map(|_| LoopAction::Continue),
            Event::Output(e) => {
                self.handle_output_event(e);
                Ok(LoopAction::Continue)
            }
        };
        match result {
            Ok(action) => {
                if action == LoopAction::Terminate {
                    info!("🛑 Terminate requested");
                }
                action
            }
            Err(e) => {
                warn!("⚠️ Dropped event: {}", e);
                LoopAction::Continue
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn outputs(&self) -> &OutputLayout {
        &self.outputs
    }

    pub fn devices(&self) -> &InputDevices {
        &self.devices
    }

    pub fn pointer(&self) -> &PointerFocus {
        &self.pointer
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;
