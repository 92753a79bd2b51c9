//! Configuration management for tinywm
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. Every section is optional and falls back to its
//! defaults.

use crate::input::Modifiers;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct containing all settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CompositorConfig {
    /// Keyboard handling
    #[serde(default)]
    pub input: InputConfig,

    /// Global key bindings
    #[serde(default)]
    pub bindings: BindingsConfig,

    /// Cursor theme settings
    #[serde(default)]
    pub cursor: CursorConfig,

    /// Keyboard focus policy
    #[serde(default)]
    pub focus: FocusConfig,

    /// General compositor settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Keyboard repeat rate (per second)
    pub keyboard_repeat_rate: u32,

    /// Keyboard repeat delay (milliseconds)
    pub keyboard_repeat_delay: u32,

    /// XKB layout name. Keymap compilation happens outside the core.
    pub xkb_layout: String,
}

/// Key bindings configuration
///
/// Bindings fire on a key press while `modifier` is held. Keys are keysym
/// names as the keymap reports them ("Escape", "F1", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BindingsConfig {
    /// Modifier(s) arming the bindings, e.g. "Alt" or "Super+Shift"
    pub modifier: String,

    /// Stop the compositor
    pub terminate: String,

    /// Focus the window at the back of the stack
    pub cycle_focus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CursorConfig {
    /// Cursor theme size (pixels)
    pub theme_size: u32,

    /// Image shown when the pointer is over no window
    pub default_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FocusConfig {
    /// Focus the new front window when the focused one unmaps
    pub refocus_on_unmap: bool,
}

/// General compositor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            keyboard_repeat_rate: 25,
            keyboard_repeat_delay: 600,
            xkb_layout: "us".to_string(),
        }
    }
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            modifier: "Alt".to_string(),
            terminate: "Escape".to_string(),
            cycle_focus: "F1".to_string(),
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            theme_size: 24,
            default_image: "default".to_string(),
        }
    }
}

impl CompositorConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_home(path.as_ref())?;

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: CompositorConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match Modifiers::from_names(&self.bindings.modifier) {
            Some(mask) if !mask.is_empty() => {}
            _ => anyhow::bail!("Invalid binding modifier: {:?}", self.bindings.modifier),
        }

        if self.bindings.terminate.trim().is_empty() || self.bindings.cycle_focus.trim().is_empty() {
            anyhow::bail!("Key bindings must name a keysym");
        }

        if self.bindings.terminate == self.bindings.cycle_focus {
            anyhow::bail!(
                "terminate and cycle_focus are both bound to {}",
                self.bindings.terminate
            );
        }

        if self.input.keyboard_repeat_rate == 0 {
            anyhow::bail!("Invalid keyboard_repeat_rate: must be at least 1");
        }

        if self.cursor.theme_size == 0 {
            anyhow::bail!("Invalid cursor theme_size: must be at least 1");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            Ok(Path::new(&home).join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}


#[cfg(test)]
mod property_tests;
