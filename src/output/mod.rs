//! Output layout and the cursor position model
//!
//! Outputs are placed left to right in the order they appear. The cursor
//! lives in layout coordinates and is kept inside the union of the outputs.

use crate::compositor::Compositor;
use crate::geometry::{Point, Rectangle};
use crate::protocol::ClientSink;
use crate::scene::SceneGraph;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(pub u32);

/// A monitor placed in layout space.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub id: OutputId,
    /// Position and current mode size in layout coordinates
    pub area: Rectangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    NewOutput {
        output: OutputId,
        width: i32,
        height: i32,
    },
    OutputRemoved {
        output: OutputId,
    },
}

#[derive(Debug, Default, Clone)]
pub struct OutputLayout {
    outputs: Vec<Output>,
}

impl OutputLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new output to the right of everything already laid out.
    /// Returns `None` if the id is taken or the size is empty.
    pub fn add_auto(&mut self, id: OutputId, width: i32, height: i32) -> Option<Rectangle> {
        if self.get(id).is_some() || width <= 0 || height <= 0 {
            return None;
        }
        let x = self
            .outputs
            .iter()
            .map(|o| o.area.right())
            .max()
            .unwrap_or(0);
        let area = Rectangle::new(x, 0, width, height);
        self.outputs.push(Output { id, area });
        Some(area)
    }

    /// Remaining outputs keep their positions.
    pub fn remove(&mut self, id: OutputId) -> Option<Output> {
        let index = self.outputs.iter().position(|o| o.id == id)?;
        Some(self.outputs.remove(index))
    }

    pub fn get(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn bounding_box(&self) -> Rectangle {
        self.outputs
            .iter()
            .fold(Rectangle::default(), |acc, o| acc.merge(&o.area))
    }

    /// Closest point to `point` lying on some output. `None` without outputs.
    pub fn closest_point(&self, point: Point<f64>) -> Option<Point<f64>> {
        self.outputs
            .iter()
            .map(|o| o.area.clamp(point))
            .min_by(|a, b| distance_sq(*a, point).total_cmp(&distance_sq(*b, point)))
    }
}

fn distance_sq(a: Point<f64>, b: Point<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Cursor position in layout coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Cursor {
    position: Point<f64>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Point<f64> {
        self.position
    }

    /// Relative motion, clamped onto the layout when there is one.
    pub fn move_by(&mut self, layout: &OutputLayout, dx: f64, dy: f64) {
        let target = self.position + Point::new(dx, dy);
        self.position = layout.closest_point(target).unwrap_or(target);
    }

    /// Absolute motion in normalised (0..1) coordinates over the layout
    /// bounding box. Returns whether the cursor moved.
    pub fn warp_absolute(&mut self, layout: &OutputLayout, nx: f64, ny: f64) -> bool {
        if layout.is_empty() {
            return false;
        }
        let bbox = layout.bounding_box();
        let target = Point::new(
            bbox.x as f64 + nx * bbox.width as f64,
            bbox.y as f64 + ny * bbox.height as f64,
        );
        match layout.closest_point(target) {
            Some(p) => {
                self.position = p;
                true
            }
            None => false,
        }
    }

    /// Pull the cursor back onto the layout after it changed.
    pub fn constrain(&mut self, layout: &OutputLayout) {
        if let Some(p) = layout.closest_point(self.position) {
            self.position = p;
        }
    }
}

impl<S: SceneGraph, C: ClientSink> Compositor<S, C> {
    pub(crate) fn handle_output_event(&mut self, event: OutputEvent) {
        match event {
            OutputEvent::NewOutput {
                output,
                width,
                height,
            } => match self.outputs.add_auto(output, width, height) {
                Some(area) => info!("🖥️ Output {:?} placed at {:?}", output, area),
                None => warn!("⚠️ Rejected output {:?} ({}x{})", output, width, height),
            },
            OutputEvent::OutputRemoved { output } => {
                if self.outputs.remove(output).is_some() {
                    info!("🖥️ Output {:?} removed", output);
                } else {
                    debug!("Unknown output {:?} removed", output);
                }
            }
        }
        self.cursor.constrain(&self.outputs);
    }
}
