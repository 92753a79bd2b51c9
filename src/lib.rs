//! # tinywm
//!
//! Window and input coordination core for a small stacking Wayland
//! compositor: which window is where in the stack, which one has keyboard
//! focus, what the pointer is over, and how interactive move/resize grabs
//! follow the cursor.
//!
//! ## Architecture
//!
//! - `compositor`: the context object and its single `dispatch` entry point
//! - `window`: window registry, z-order, toplevel and popup lifecycle
//! - `hit_test`: layout point to window resolution
//! - `focus`: keyboard focus and activation
//! - `grab`: passthrough / move / resize cursor modes
//! - `input`: device events, key bindings, keyboard state
//! - `output`: output layout and cursor position
//! - `scene`: the scene graph collaborator and an in-memory implementation
//! - `protocol`: the client-facing collaborator and a recording implementation
//! - `config`: configuration parsing and management
//!
//! ## Usage
//!
//! ```rust
//! use tinywm::{Compositor, CompositorConfig, RecordingClient, SceneTree};
//! use tinywm::window::ShellEvent;
//! use tinywm::protocol::{ClientId, SurfaceId};
//!
//! let mut compositor =
//!     Compositor::new(CompositorConfig::default(), SceneTree::new(), RecordingClient::new())?;
//! compositor.dispatch(ShellEvent::NewToplevel { surface: SurfaceId(1), client: ClientId(1) });
//! compositor.dispatch(ShellEvent::Map { surface: SurfaceId(1) });
//! assert!(compositor.focused_window().is_some());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod grab;
pub mod input;
pub mod output;
pub mod protocol;
pub mod scene;
pub mod window;

// Re-export main types for easy access
pub use compositor::{Compositor, Event, LoopAction};
pub use config::CompositorConfig;
pub use error::CompositorError;
pub use geometry::{Point, Rectangle};
pub use grab::{CursorMode, Grab, ResizeEdges};
pub use hit_test::Hit;
pub use protocol::{ClientSink, RecordingClient};
pub use scene::{SceneGraph, SceneTree};
pub use window::{WindowId, WindowRegistry};

/// Version information for tinywm
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
