//! Global key bindings, checked before a key press reaches the client.

use crate::config::BindingsConfig;
use crate::input::keyboard::Modifiers;
use anyhow::{anyhow, Result};
use log::debug;
use std::collections::HashMap;

/// Compositor actions that can be triggered by a key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorAction {
    /// Stop the hosting event loop
    Terminate,
    /// Focus the window at the back of the z-order
    CycleFocus,
}

/// Keysym name -> action, active while `modifier` is held.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    modifier: Modifiers,
    bindings: HashMap<String, CompositorAction>,
}

impl KeyBindings {
    pub fn from_config(config: &BindingsConfig) -> Result<Self> {
        let modifier = Modifiers::from_names(&config.modifier)
            .ok_or_else(|| anyhow!("Unknown binding modifier: {}", config.modifier))?;

        let mut bindings = HashMap::new();
        bindings.insert(config.terminate.clone(), CompositorAction::Terminate);
        bindings.insert(config.cycle_focus.clone(), CompositorAction::CycleFocus);

        debug!("🔑 Loaded {} key bindings", bindings.len());
        Ok(Self { modifier, bindings })
    }

    pub fn modifier(&self) -> Modifiers {
        self.modifier
    }

    /// Whether bindings are live for this modifier state.
    pub fn is_armed(&self, held: Modifiers) -> bool {
        !self.modifier.is_empty() && held.contains(self.modifier)
    }

    pub fn lookup(&self, keysym: &str) -> Option<CompositorAction> {
        self.bindings.get(keysym).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
