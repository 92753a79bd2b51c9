//! Attached input devices and per-keyboard modifier state.

use crate::error::{CompositorError, Result};
use crate::input::{DeviceId, DeviceKind, KeyState};
use bitflags::bitflags;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

bitflags! {
    /// Modifier mask, bit layout as the keyboard collaborator reports it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const SHIFT = 1;
        const CAPS = 2;
        const CTRL = 4;
        const ALT = 8;
        const MOD2 = 16;
        const MOD3 = 32;
        const LOGO = 64;
        const MOD5 = 128;
    }
}

impl Modifiers {
    /// Parse "Alt", "Super+Shift", ... into a mask. `None` on an unknown name.
    pub fn from_names(names: &str) -> Option<Self> {
        let mut mask = Modifiers::empty();
        for name in names.split('+').map(str::trim).filter(|n| !n.is_empty()) {
            let flag = match name.to_ascii_lowercase().as_str() {
                "shift" => Modifiers::SHIFT,
                "caps" | "lock" => Modifiers::CAPS,
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "mod1" => Modifiers::ALT,
                "mod2" => Modifiers::MOD2,
                "mod3" => Modifiers::MOD3,
                "logo" | "super" | "mod4" => Modifiers::LOGO,
                "mod5" => Modifiers::MOD5,
                _ => return None,
            };
            mask |= flag;
        }
        Some(mask)
    }
}

/// Serialized modifier state of one keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierState {
    #[serde(default)]
    pub depressed: Modifiers,
    #[serde(default)]
    pub latched: Modifiers,
    #[serde(default)]
    pub locked: Modifiers,
    #[serde(default)]
    pub group: u32,
}

impl ModifierState {
    pub fn effective(&self) -> Modifiers {
        self.depressed | self.latched | self.locked
    }
}

/// Key repeat parameters handed to clients with the keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatInfo {
    pub rate: u32,
    pub delay: u32,
}

/// State kept per attached keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardState {
    modifiers: ModifierState,
    pressed: BTreeSet<u32>,
    /// Contiguous copy of `pressed`, handed to clients on keyboard enter
    pressed_cache: Vec<u32>,
    repeat: RepeatInfo,
}

impl KeyboardState {
    pub fn new(repeat: RepeatInfo) -> Self {
        Self {
            modifiers: ModifierState::default(),
            pressed: BTreeSet::new(),
            pressed_cache: Vec::new(),
            repeat,
        }
    }

    pub fn modifiers(&self) -> ModifierState {
        self.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: ModifierState) {
        self.modifiers = modifiers;
    }

    /// Keycodes currently held, ascending.
    pub fn pressed_keys(&self) -> &[u32] {
        &self.pressed_cache
    }

    pub fn repeat_info(&self) -> RepeatInfo {
        self.repeat
    }

    pub fn update_key(&mut self, keycode: u32, state: KeyState) {
        let changed = match state {
            KeyState::Pressed => self.pressed.insert(keycode),
            KeyState::Released => self.pressed.remove(&keycode),
        };
        if changed {
            self.pressed_cache = self.pressed.iter().copied().collect();
        }
    }
}

/// Devices attached to the seat.
///
/// The active keyboard is the one whose state accompanies keyboard enter
/// notifications: the most recently attached or used keyboard.
#[derive(Debug, Default)]
pub struct InputDevices {
    keyboards: HashMap<DeviceId, KeyboardState>,
    pointers: Vec<DeviceId>,
    active_keyboard: Option<DeviceId>,
}

impl InputDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, device: DeviceId) -> bool {
        self.keyboards.contains_key(&device) || self.pointers.contains(&device)
    }

    pub fn add_keyboard(&mut self, device: DeviceId, state: KeyboardState) -> Result<()> {
        if self.contains(device) {
            return Err(CompositorError::DuplicateDevice(device));
        }
        self.keyboards.insert(device, state);
        self.active_keyboard = Some(device);
        Ok(())
    }

    pub fn add_pointer(&mut self, device: DeviceId) -> Result<()> {
        if self.contains(device) {
            return Err(CompositorError::DuplicateDevice(device));
        }
        self.pointers.push(device);
        Ok(())
    }

    /// Detach a device. The seat loses its keyboard if this was it.
    pub fn remove(&mut self, device: DeviceId) -> Result<DeviceKind> {
        if self.keyboards.remove(&device).is_some() {
            if self.active_keyboard == Some(device) {
                debug!("Active keyboard {:?} removed", device);
                self.active_keyboard = None;
            }
            return Ok(DeviceKind::Keyboard);
        }
        let before = self.pointers.len();
        self.pointers.retain(|p| *p != device);
        if self.pointers.len() != before {
            return Ok(DeviceKind::Pointer);
        }
        Err(CompositorError::UnknownDevice(device))
    }

    pub fn keyboard(&self, device: DeviceId) -> Option<&KeyboardState> {
        self.keyboards.get(&device)
    }

    pub fn keyboard_mut(&mut self, device: DeviceId) -> Option<&mut KeyboardState> {
        self.keyboards.get_mut(&device)
    }

    pub fn set_active_keyboard(&mut self, device: DeviceId) {
        if self.keyboards.contains_key(&device) {
            self.active_keyboard = Some(device);
        }
    }

    pub fn active_keyboard_id(&self) -> Option<DeviceId> {
        self.active_keyboard
    }

    pub fn active_keyboard(&self) -> Option<&KeyboardState> {
        self.active_keyboard.and_then(|d| self.keyboards.get(&d))
    }

    pub fn keyboard_count(&self) -> usize {
        self.keyboards.len()
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }
}
