//! Interactive move/resize.
//!
//! The cursor is either passing motion through to whatever window is under
//! it, or driving a single grabbed window. A grab starts only from a client
//! request ([`Compositor::begin_grab`]) and ends on button release or when
//! the grabbed window unmaps ([`Compositor::end_grab`]).

use crate::compositor::Compositor;
use crate::error::{CompositorError, Result};
use crate::geometry::{Point, Rectangle};
use crate::protocol::{ClientSink, CursorImage};
use crate::scene::SceneGraph;
use crate::window::WindowId;
use bitflags::bitflags;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Window edges taking part in a resize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ResizeEdges: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

/// What pointer motion currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorMode {
    Passthrough,
    Move,
    Resize,
}

/// The single system-wide grab. The grabbed window exists only in the
/// non-idle variants, so an idle grab can never point at a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Grab {
    #[default]
    Idle,
    Moving {
        window: WindowId,
        /// Pointer minus window origin at grab start
        origin: Point<f64>,
    },
    Resizing {
        window: WindowId,
        /// Pointer minus the grabbed edge/corner at grab start
        origin: Point<f64>,
        edges: ResizeEdges,
        /// Window geometry box in layout coordinates at grab start
        anchor: Rectangle,
    },
}

impl Grab {
    pub fn mode(&self) -> CursorMode {
        match self {
            Grab::Idle => CursorMode::Passthrough,
            Grab::Moving { .. } => CursorMode::Move,
            Grab::Resizing { .. } => CursorMode::Resize,
        }
    }

    pub fn grabbed_window(&self) -> Option<WindowId> {
        match *self {
            Grab::Idle => None,
            Grab::Moving { window, .. } | Grab::Resizing { window, .. } => Some(window),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Grab::Idle)
    }

    pub fn origin(&self) -> Option<Point<f64>> {
        match *self {
            Grab::Idle => None,
            Grab::Moving { origin, .. } | Grab::Resizing { origin, .. } => Some(origin),
        }
    }
}

/// New box for a resize.
///
/// Starts from `anchor` and replaces only the grabbed edges with the
/// border position. Top wins over bottom and left over right when both are
/// set. A moved edge never reaches the opposite one: it stops one unit
/// short, so width and height stay at least 1.
pub fn resize_box(anchor: Rectangle, edges: ResizeEdges, border: Point<f64>) -> Rectangle {
    let mut left = anchor.x;
    let mut right = anchor.right();
    let mut top = anchor.y;
    let mut bottom = anchor.bottom();

    if edges.contains(ResizeEdges::TOP) {
        top = border.y as i32;
        if top >= bottom {
            top = bottom.saturating_sub(1);
        }
    } else if edges.contains(ResizeEdges::BOTTOM) {
        bottom = border.y as i32;
        if bottom <= top {
            bottom = top.saturating_add(1);
        }
    }

    if edges.contains(ResizeEdges::LEFT) {
        left = border.x as i32;
        if left >= right {
            left = right.saturating_sub(1);
        }
    } else if edges.contains(ResizeEdges::RIGHT) {
        right = border.x as i32;
        if right <= left {
            right = left.saturating_add(1);
        }
    }

    Rectangle::new(
        left,
        top,
        right.saturating_sub(left).max(1),
        bottom.saturating_sub(top).max(1),
    )
}

impl<S: SceneGraph, C: ClientSink> Compositor<S, C> {
    /// Start an interactive move or resize of `id`.
    ///
    /// Only the window under pointer focus may start a grab; requests from
    /// any other window race with focus changes and are dropped. Returns
    /// whether a grab started.
    pub fn begin_grab(&mut self, id: WindowId, mode: CursorMode, edges: ResizeEdges) -> Result<bool> {
        let window = self
            .windows
            .get(id)
            .ok_or(CompositorError::UnknownWindow(id))?;
        if !window.mapped || mode == CursorMode::Passthrough {
            return Ok(false);
        }
        if self.pointer.focus() != Some(window.surface) {
            debug!("Ignoring grab request from {:?}: no pointer focus", id);
            return Ok(false);
        }

        let cursor = self.cursor.position();
        let node_pos = self.scene.position(window.scene_node);
        let geometry = window.geometry;

        if let Some(previous) = self.grab.grabbed_window() {
            debug!("Replacing grab on {:?}", previous);
        }

        self.grab = match mode {
            CursorMode::Move => Grab::Moving {
                window: id,
                origin: cursor - node_pos.to_f64(),
            },
            CursorMode::Resize => {
                let anchor = geometry.translated(node_pos);
                let border = Point::new(
                    if edges.contains(ResizeEdges::RIGHT) { anchor.right() } else { anchor.x },
                    if edges.contains(ResizeEdges::BOTTOM) { anchor.bottom() } else { anchor.y },
                );
                Grab::Resizing {
                    window: id,
                    origin: cursor - border.to_f64(),
                    edges,
                    anchor,
                }
            }
            CursorMode::Passthrough => Grab::Idle,
        };
        info!("✋ Grab {:?} on window {:?}", mode, id);
        Ok(true)
    }

    /// Back to passthrough. Harmless when no grab is active.
    pub fn end_grab(&mut self) {
        if let Some(window) = self.grab.grabbed_window() {
            info!("👐 Released grab on window {:?}", window);
        }
        self.grab = Grab::Idle;
    }

    pub fn grab(&self) -> &Grab {
        &self.grab
    }

    /// The cursor moved; route it according to the current mode.
    pub fn on_pointer_motion(&mut self, time_msec: u32) {
        match self.grab {
            Grab::Idle => self.process_passthrough(time_msec),
            Grab::Moving { window, origin } => self.process_move(window, origin),
            Grab::Resizing {
                window,
                origin,
                edges,
                anchor,
            } => self.process_resize(window, origin, edges, anchor),
        }
    }

    fn process_passthrough(&mut self, time_msec: u32) {
        let cursor = self.cursor.position();
        match self.hit_test(cursor) {
            Some(hit) => {
                if self.pointer.focus() != Some(hit.surface) {
                    self.client.pointer_enter(hit.surface, hit.local);
                    self.pointer.set_focus(hit.surface);
                }
                self.client.pointer_motion(hit.surface, time_msec, hit.local);
                self.pointer.release_default_image();
            }
            None => {
                if self.pointer.take_default_image() {
                    let name = self.config.cursor.default_image.clone();
                    self.client.set_cursor_image(CursorImage::Named(name));
                }
                if self.pointer.clear_focus().is_some() {
                    self.client.pointer_clear_focus();
                }
            }
        }
    }

    fn process_move(&mut self, id: WindowId, origin: Point<f64>) {
        let Some(node) = self.windows.get(id).map(|w| w.scene_node) else {
            self.grab = Grab::Idle;
            return;
        };
        let position = (self.cursor.position() - origin).to_i32();
        trace!("Moving {:?} to {:?}", id, position);
        self.scene.set_position(node, position);
    }

    fn process_resize(&mut self, id: WindowId, origin: Point<f64>, edges: ResizeEdges, anchor: Rectangle) {
        let border = self.cursor.position() - origin;
        let new_box = resize_box(anchor, edges, border);

        let Some(window) = self.windows.get_mut(id) else {
            self.grab = Grab::Idle;
            return;
        };
        let geometry = window.geometry;
        // Size is a prediction until the client commits its new buffer.
        window.geometry.width = new_box.width;
        window.geometry.height = new_box.height;
        let node = window.scene_node;
        let surface = window.surface;

        self.scene.set_position(
            node,
            Point::new(
                new_box.x.saturating_sub(geometry.x),
                new_box.y.saturating_sub(geometry.y),
            ),
        );
        self.client.request_size(surface, new_box.width, new_box.height);
        trace!("Resizing {:?} to {:?}", id, new_box);
    }
}
