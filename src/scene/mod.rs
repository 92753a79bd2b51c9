//! Scene graph seam.
//!
//! Rendering and buffer management live outside this crate; the core only
//! needs to create a subtree per surface, tag window roots with a
//! [`WindowId`] back-reference, move/raise/hide subtrees and ask "what is
//! under this point". [`SceneGraph`] is that contract.
//!
//! [`SceneTree`] is a small in-memory implementation of it, used by the
//! headless host, the test-suite and the benches. Nodes are stored in an
//! arena keyed by [`NodeId`]; children are kept bottom to top, so the last
//! child is drawn (and hit) first.

use crate::geometry::{Point, Rectangle};
use crate::protocol::SurfaceId;
use crate::window::WindowId;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle to a scene node. The scene owns node lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Operations the core consumes from the scene/rendering collaborator.
pub trait SceneGraph {
    /// Root tree every window subtree hangs off.
    fn root(&self) -> NodeId;

    /// Create the subtree showing `surface` (and later its subsurfaces)
    /// below `parent`. Returns the subtree root.
    fn create_surface_tree(&mut self, parent: NodeId, surface: SurfaceId) -> NodeId;

    /// Destroy `node` and everything below it.
    fn destroy_node(&mut self, node: NodeId);

    /// New buffer size for the surface's content node.
    fn commit_surface(&mut self, surface: SurfaceId, width: i32, height: i32);

    fn set_window_ref(&mut self, node: NodeId, window: Option<WindowId>);
    fn window_ref(&self, node: NodeId) -> Option<WindowId>;

    /// Frontmost drawable node under a layout point, with the point
    /// translated into that node's local space.
    fn node_at(&self, point: Point<f64>) -> Option<(NodeId, Point<f64>)>;

    /// Surface shown by a drawable node, `None` for trees and plain buffers.
    fn node_surface(&self, node: NodeId) -> Option<SurfaceId>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Position relative to the parent node.
    fn position(&self, node: NodeId) -> Point<i32>;
    fn set_position(&mut self, node: NodeId, position: Point<i32>);

    /// Move the node above its siblings.
    fn raise_to_top(&mut self, node: NodeId);

    /// Disabled nodes (and their subtrees) are neither drawn nor hit.
    fn set_enabled(&mut self, node: NodeId, enabled: bool);
}

/// Kind of a scene node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Tree,
    Buffer {
        surface: Option<SurfaceId>,
        width: i32,
        height: i32,
    },
}

#[derive(Debug, Clone)]
struct SceneNode {
    parent: Option<NodeId>,
    /// Bottom to top
    children: Vec<NodeId>,
    position: Point<i32>,
    enabled: bool,
    kind: NodeKind,
    window: Option<WindowId>,
}

impl SceneNode {
    fn new(parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            parent,
            children: Vec::new(),
            position: Point::default(),
            enabled: true,
            kind,
            window: None,
        }
    }
}

/// In-memory scene graph.
#[derive(Debug, Clone)]
pub struct SceneTree {
    nodes: HashMap<NodeId, SceneNode>,
    /// Surface -> buffer node showing it
    surfaces: HashMap<SurfaceId, NodeId>,
    root: NodeId,
    next_node_id: u64,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, SceneNode::new(None, NodeKind::Tree));
        Self {
            nodes,
            surfaces: HashMap::new(),
            root,
            next_node_id: 1,
        }
    }

    fn insert(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, SceneNode::new(Some(parent), kind));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Add an empty tree node on top of `parent`'s children.
    pub fn add_tree(&mut self, parent: NodeId) -> NodeId {
        self.insert(parent, NodeKind::Tree)
    }

    /// Add a drawable node. `surface: None` is a plain buffer such as a
    /// background or a decoration.
    pub fn add_buffer(
        &mut self,
        parent: NodeId,
        surface: Option<SurfaceId>,
        width: i32,
        height: i32,
    ) -> NodeId {
        let id = self.insert(
            parent,
            NodeKind::Buffer {
                surface,
                width,
                height,
            },
        );
        if let Some(surface) = surface {
            self.surfaces.insert(surface, id);
        }
        id
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&node).map(|n| &n.kind)
    }

    pub fn is_enabled(&self, node: NodeId) -> bool {
        self.nodes.get(&node).map(|n| n.enabled).unwrap_or(false)
    }

    /// Children bottom to top.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Buffer node currently showing `surface`.
    pub fn surface_node(&self, surface: SurfaceId) -> Option<NodeId> {
        self.surfaces.get(&surface).copied()
    }

    /// Position in layout coordinates (sum of ancestor offsets).
    pub fn absolute_position(&self, node: NodeId) -> Point<i32> {
        let mut pos = Point::default();
        let mut cur = Some(node);
        while let Some(id) = cur {
            match self.nodes.get(&id) {
                Some(n) => {
                    pos = pos.saturating_add(n.position);
                    cur = n.parent;
                }
                None => break,
            }
        }
        pos
    }

    fn node_at_in(
        &self,
        id: NodeId,
        parent_origin: Point<i32>,
        point: Point<f64>,
    ) -> Option<(NodeId, Point<f64>)> {
        let node = self.nodes.get(&id)?;
        if !node.enabled {
            return None;
        }
        let origin = parent_origin.saturating_add(node.position);
        match node.kind {
            NodeKind::Tree => node
                .children
                .iter()
                .rev()
                .find_map(|child| self.node_at_in(*child, origin, point)),
            NodeKind::Buffer { width, height, .. } => {
                let local = point - origin.to_f64();
                Rectangle::new(0, 0, width, height)
                    .contains(local)
                    .then_some((id, local))
            }
        }
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        for child in self.children(node) {
            self.collect_subtree(*child, out);
        }
    }
}

impl SceneGraph for SceneTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_surface_tree(&mut self, parent: NodeId, surface: SurfaceId) -> NodeId {
        // Surface tree -> subsurface tree -> content buffer, so the buffer
        // sits two levels below the node carrying the window back-reference.
        let tree = self.add_tree(parent);
        let subsurfaces = self.add_tree(tree);
        self.add_buffer(subsurfaces, Some(surface), 0, 0);
        trace!("🌳 surface {:?} -> scene tree {:?}", surface, tree);
        tree
    }

    fn destroy_node(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        let mut doomed = Vec::new();
        self.collect_subtree(node, &mut doomed);
        if let Some(parent) = self.nodes.get(&node).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != node);
            }
        }
        for id in &doomed {
            self.nodes.remove(id);
        }
        self.surfaces.retain(|_, n| !doomed.contains(n));
    }

    fn commit_surface(&mut self, surface: SurfaceId, width: i32, height: i32) {
        let Some(id) = self.surfaces.get(&surface) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(id) {
            if let NodeKind::Buffer {
                width: w,
                height: h,
                ..
            } = &mut node.kind
            {
                *w = width;
                *h = height;
            }
        }
    }

    fn set_window_ref(&mut self, node: NodeId, window: Option<WindowId>) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.window = window;
        }
    }

    fn window_ref(&self, node: NodeId) -> Option<WindowId> {
        self.nodes.get(&node).and_then(|n| n.window)
    }

    fn node_at(&self, point: Point<f64>) -> Option<(NodeId, Point<f64>)> {
        self.node_at_in(self.root, Point::default(), point)
    }

    fn node_surface(&self, node: NodeId) -> Option<SurfaceId> {
        match self.nodes.get(&node)?.kind {
            NodeKind::Buffer { surface, .. } => surface,
            NodeKind::Tree => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn position(&self, node: NodeId) -> Point<i32> {
        self.nodes
            .get(&node)
            .map(|n| n.position)
            .unwrap_or_default()
    }

    fn set_position(&mut self, node: NodeId, position: Point<i32>) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = position;
        }
    }

    fn raise_to_top(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
            p.children.push(node);
        }
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.enabled = enabled;
        }
    }
}
