//! Window registry and toplevel/popup lifecycle
//!
//! This module owns the set of live toplevels (an arena keyed by
//! [`WindowId`]) and their z-order. The z-order holds exactly the mapped
//! windows, front first: index 0 is the most recently raised window and
//! the tail is the one that has been at the back the longest.
//!
//! Windows never own their scene subtree; the scene root of each subtree
//! carries the window's id as a back-reference so a hit node can be walked
//! up to its window (see [`crate::hit_test`]).

use crate::compositor::Compositor;
use crate::error::{CompositorError, Result};
use crate::geometry::{Point, Rectangle};
use crate::grab::ResizeEdges;
use crate::protocol::{ClientId, ClientSink, SurfaceId};
use crate::scene::{NodeId, SceneGraph};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Stable handle for a window. Ids are never reused, so a stale handle
/// simply stops resolving once the window is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// One toplevel surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub id: WindowId,
    pub surface: SurfaceId,
    pub client: ClientId,
    /// Root of the window's scene subtree, owned by the scene
    pub scene_node: NodeId,
    /// Content box relative to the scene node origin
    pub geometry: Rectangle,
    /// Set once the client has committed at least once
    pub initialized: bool,
    pub mapped: bool,
    pub activated: bool,
}

/// A popup surface. Its scene subtree lives inside its parent's subtree and
/// carries no back-reference of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub surface: SurfaceId,
    pub parent: SurfaceId,
    pub client: ClientId,
    /// Toplevel the popup chain hangs off
    pub toplevel: WindowId,
    pub scene_node: NodeId,
    pub initialized: bool,
}

/// Toplevel lifecycle notifications from the shell protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShellEvent {
    NewToplevel {
        surface: SurfaceId,
        client: ClientId,
    },
    Map {
        surface: SurfaceId,
    },
    Unmap {
        surface: SurfaceId,
    },
    Commit {
        surface: SurfaceId,
        buffer_size: (i32, i32),
        #[serde(default)]
        geometry: Rectangle,
    },
    Destroy {
        surface: SurfaceId,
    },
    RequestMove {
        surface: SurfaceId,
    },
    RequestResize {
        surface: SurfaceId,
        edges: ResizeEdges,
    },
    RequestMaximize {
        surface: SurfaceId,
    },
    RequestFullscreen {
        surface: SurfaceId,
    },
    NewPopup {
        surface: SurfaceId,
        parent: SurfaceId,
        client: ClientId,
    },
    PopupDestroy {
        surface: SurfaceId,
    },
}

/// Arena of windows plus the front-to-back z-order of the mapped ones.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, Window>,
    popups: HashMap<SurfaceId, Popup>,
    /// Toplevel surface -> window
    surfaces: HashMap<SurfaceId, WindowId>,
    /// Mapped windows, front first
    order: VecDeque<WindowId>,
    next_window_id: u64,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            next_window_id: 1,
            ..Default::default()
        }
    }

    fn insert(&mut self, surface: SurfaceId, client: ClientId, scene_node: NodeId) -> WindowId {
        let id = WindowId(self.next_window_id.max(1));
        self.next_window_id = id.0 + 1;
        self.windows.insert(
            id,
            Window {
                id,
                surface,
                client,
                scene_node,
                geometry: Rectangle::default(),
                initialized: false,
                mapped: false,
                activated: false,
            },
        );
        self.surfaces.insert(surface, id);
        id
    }

    fn remove(&mut self, id: WindowId) -> Option<Window> {
        let window = self.windows.remove(&id)?;
        self.surfaces.remove(&window.surface);
        self.order.retain(|w| *w != id);
        self.popups.retain(|_, p| p.toplevel != id);
        Some(window)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// Window whose toplevel surface is `surface`.
    pub fn by_surface(&self, surface: SurfaceId) -> Option<WindowId> {
        self.surfaces.get(&surface).copied()
    }

    pub fn popup(&self, surface: SurfaceId) -> Option<&Popup> {
        self.popups.get(&surface)
    }

    pub fn knows_surface(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface) || self.popups.contains_key(&surface)
    }

    /// Toplevel owning `surface`, whether it is the toplevel itself or one
    /// of its popups.
    pub fn toplevel_of(&self, surface: SurfaceId) -> Option<WindowId> {
        self.by_surface(surface)
            .or_else(|| self.popups.get(&surface).map(|p| p.toplevel))
    }

    pub fn client_of(&self, surface: SurfaceId) -> Option<ClientId> {
        if let Some(id) = self.by_surface(surface) {
            return self.windows.get(&id).map(|w| w.client);
        }
        self.popups.get(&surface).map(|p| p.client)
    }

    /// Scene subtree showing `surface`; popups are parented to this.
    pub fn scene_tree_of(&self, surface: SurfaceId) -> Option<NodeId> {
        if let Some(id) = self.by_surface(surface) {
            return self.windows.get(&id).map(|w| w.scene_node);
        }
        self.popups.get(&surface).map(|p| p.scene_node)
    }

    pub fn is_mapped(&self, id: WindowId) -> bool {
        self.windows.get(&id).map(|w| w.mapped).unwrap_or(false)
    }

    /// Mapped windows, front first.
    pub fn order(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.order.iter().copied()
    }

    pub fn front(&self) -> Option<WindowId> {
        self.order.front().copied()
    }

    /// Least recently raised mapped window.
    pub fn back(&self) -> Option<WindowId> {
        self.order.back().copied()
    }

    pub fn mapped_count(&self) -> usize {
        self.order.len()
    }

    /// All registered windows, mapped or not.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn popup_count(&self) -> usize {
        self.popups.len()
    }

    fn push_front(&mut self, id: WindowId) {
        if !self.order.contains(&id) {
            self.order.push_front(id);
        }
    }

    fn remove_from_order(&mut self, id: WindowId) -> bool {
        let before = self.order.len();
        self.order.retain(|w| *w != id);
        self.order.len() != before
    }

    /// Move a mapped window to the front. No-op for unmapped windows.
    fn raise(&mut self, id: WindowId) -> bool {
        if self.remove_from_order(id) {
            self.order.push_front(id);
            true
        } else {
            false
        }
    }

    fn insert_popup(&mut self, popup: Popup) {
        self.popups.insert(popup.surface, popup);
    }

    /// Remove a popup and every popup nested below it.
    fn remove_popup(&mut self, surface: SurfaceId) -> Option<Popup> {
        let popup = self.popups.remove(&surface)?;
        let children: Vec<SurfaceId> = self
            .popups
            .values()
            .filter(|p| p.parent == surface)
            .map(|p| p.surface)
            .collect();
        for child in children {
            self.remove_popup(child);
        }
        Some(popup)
    }
}

impl<S: SceneGraph, C: ClientSink> Compositor<S, C> {
    /// A client created a toplevel. The window gets a hidden scene subtree
    /// tagged with its id; it joins the z-order only once mapped.
    pub fn on_new_toplevel(&mut self, surface: SurfaceId, client: ClientId) -> Result<WindowId> {
        if self.windows.knows_surface(surface) {
            return Err(CompositorError::DuplicateSurface(surface));
        }
        let root = self.scene.root();
        let node = self.scene.create_surface_tree(root, surface);
        self.scene.set_enabled(node, false);
        let id = self.windows.insert(surface, client, node);
        self.scene.set_window_ref(node, Some(id));
        debug!("🪟 New toplevel {:?} for surface {:?}", id, surface);
        Ok(id)
    }

    /// Surface became displayable: put it at the front and focus it.
    pub fn on_map(&mut self, id: WindowId) -> Result<()> {
        let window = self
            .windows
            .get_mut(id)
            .ok_or(CompositorError::UnknownWindow(id))?;
        if window.mapped {
            return Err(CompositorError::AlreadyMapped(id));
        }
        window.mapped = true;
        let node = window.scene_node;
        self.scene.set_enabled(node, true);
        self.windows.push_front(id);
        info!("🪟 Mapped window {:?}", id);
        self.focus(id)?;
        Ok(())
    }

    /// Surface should no longer be shown. Releases a grab held by the
    /// window and clears keyboard and pointer focus in the same step.
    /// Unmapping a window that is not mapped, or no longer exists, is a
    /// no-op.
    pub fn on_unmap(&mut self, id: WindowId) -> Result<()> {
        let Some(window) = self.windows.get_mut(id) else {
            debug!("Ignoring unmap of absent window {:?}", id);
            return Ok(());
        };
        if !window.mapped {
            return Ok(());
        }
        window.mapped = false;
        window.activated = false;
        let node = window.scene_node;

        if self.grab.grabbed_window() == Some(id) {
            self.end_grab();
        }
        self.windows.remove_from_order(id);
        self.scene.set_enabled(node, false);
        info!("🙈 Unmapped window {:?}", id);

        // The pointer may be over the window itself or one of its popups.
        if let Some(focus) = self.pointer.focus() {
            if self.windows.toplevel_of(focus) == Some(id) {
                self.pointer.clear_focus();
                self.client.pointer_clear_focus();
            }
        }

        if self.focus.focused() == Some(id) {
            self.focus.clear();
            if self.config.focus.refocus_on_unmap {
                if let Some(next) = self.windows.front() {
                    self.focus(next)?;
                }
            }
        }
        Ok(())
    }

    /// New surface state. The first commit is answered with a (0, 0) size
    /// request so the client picks its own size.
    pub fn on_commit(
        &mut self,
        surface: SurfaceId,
        buffer_size: (i32, i32),
        geometry: Rectangle,
    ) -> Result<()> {
        if let Some(id) = self.windows.by_surface(surface) {
            self.scene.commit_surface(surface, buffer_size.0, buffer_size.1);
            let Some(window) = self.windows.get_mut(id) else {
                return Err(CompositorError::UnknownWindow(id));
            };
            window.geometry = geometry;
            if !window.initialized {
                window.initialized = true;
                self.client.request_size(surface, 0, 0);
            }
            return Ok(());
        }

        let popup = self
            .windows
            .popups
            .get_mut(&surface)
            .ok_or(CompositorError::UnknownSurface(surface))?;
        self.scene.commit_surface(surface, buffer_size.0, buffer_size.1);
        if !popup.initialized {
            popup.initialized = true;
            self.client.schedule_configure(surface);
        }
        Ok(())
    }

    /// Release everything the registry holds for the window. The window
    /// must already be unmapped.
    pub fn on_destroy(&mut self, id: WindowId) -> Result<()> {
        let window = self
            .windows
            .get(id)
            .ok_or(CompositorError::UnknownWindow(id))?;
        if window.mapped {
            return Err(CompositorError::StillMapped(id));
        }
        let node = window.scene_node;

        if let Some(focus) = self.pointer.focus() {
            if self.windows.toplevel_of(focus) == Some(id) {
                self.pointer.clear_focus();
            }
        }
        self.windows.remove(id);
        self.scene.destroy_node(node);
        debug!("💥 Destroyed window {:?}", id);
        Ok(())
    }

    /// Move a window to the front of the z-order without touching focus.
    pub fn raise_to_front(&mut self, id: WindowId) -> bool {
        let Some(node) = self.windows.get(id).map(|w| w.scene_node) else {
            return false;
        };
        if !self.windows.raise(id) {
            return false;
        }
        self.scene.raise_to_top(node);
        true
    }

    /// Focus the window at the back of the z-order. Repeating this N times
    /// with N mapped windows comes back to the starting window.
    pub fn cycle_focus(&mut self) {
        if self.windows.mapped_count() < 2 {
            return;
        }
        if let Some(next) = self.windows.back() {
            debug!("🔁 Cycling focus to {:?}", next);
            if let Err(e) = self.focus(next) {
                warn!("⚠️ Focus cycle failed: {}", e);
            }
        }
    }

    /// Maximize/fullscreen are not implemented, but the client still needs
    /// a configure in reply once it has committed.
    pub fn on_request_state(&mut self, id: WindowId) -> Result<()> {
        let window = self
            .windows
            .get(id)
            .ok_or(CompositorError::UnknownWindow(id))?;
        if window.initialized {
            self.client.schedule_configure(window.surface);
        }
        Ok(())
    }

    /// A popup was created for `parent` (a toplevel or another popup).
    pub fn on_new_popup(
        &mut self,
        surface: SurfaceId,
        parent: SurfaceId,
        client: ClientId,
    ) -> Result<()> {
        if self.windows.knows_surface(surface) {
            return Err(CompositorError::DuplicateSurface(surface));
        }
        let parent_tree = self
            .windows
            .scene_tree_of(parent)
            .ok_or(CompositorError::UnknownSurface(parent))?;
        let toplevel = self
            .windows
            .toplevel_of(parent)
            .ok_or(CompositorError::UnknownSurface(parent))?;
        let scene_node = self.scene.create_surface_tree(parent_tree, surface);
        self.windows.insert_popup(Popup {
            surface,
            parent,
            client,
            toplevel,
            scene_node,
            initialized: false,
        });
        debug!("💬 New popup {:?} on {:?}", surface, parent);
        Ok(())
    }

    pub fn on_popup_destroy(&mut self, surface: SurfaceId) -> Result<()> {
        let popup = self
            .windows
            .remove_popup(surface)
            .ok_or(CompositorError::UnknownSurface(surface))?;
        if let Some(focus) = self.pointer.focus() {
            if !self.windows.knows_surface(focus) {
                self.pointer.clear_focus();
            }
        }
        self.scene.destroy_node(popup.scene_node);
        Ok(())
    }

    /// Resolve a toplevel surface to its window.
    pub(crate) fn window_for(&self, surface: SurfaceId) -> Result<WindowId> {
        self.windows
            .by_surface(surface)
            .ok_or(CompositorError::UnknownSurface(surface))
    }

    /// Position of the window's scene subtree in layout coordinates.
    pub fn window_position(&self, id: WindowId) -> Option<Point<i32>> {
        self.windows
            .get(id)
            .map(|w| self.scene.position(w.scene_node))
    }

    pub(crate) fn handle_shell_event(&mut self, event: ShellEvent) -> Result<()> {
        match event {
            ShellEvent::NewToplevel { surface, client } => {
                self.on_new_toplevel(surface, client)?;
            }
            ShellEvent::Map { surface } => {
                let id = self.window_for(surface)?;
                self.on_map(id)?;
            }
            ShellEvent::Unmap { surface } => {
                let id = self.window_for(surface)?;
                self.on_unmap(id)?;
            }
            ShellEvent::Commit {
                surface,
                buffer_size,
                geometry,
            } => self.on_commit(surface, buffer_size, geometry)?,
            ShellEvent::Destroy { surface } => {
                let id = self.window_for(surface)?;
                self.on_destroy(id)?;
            }
            ShellEvent::RequestMove { surface } => {
                let id = self.window_for(surface)?;
                self.begin_grab(id, crate::grab::CursorMode::Move, ResizeEdges::empty())?;
            }
            ShellEvent::RequestResize { surface, edges } => {
                let id = self.window_for(surface)?;
                self.begin_grab(id, crate::grab::CursorMode::Resize, edges)?;
            }
            ShellEvent::RequestMaximize { surface } | ShellEvent::RequestFullscreen { surface } => {
                let id = self.window_for(surface)?;
                self.on_request_state(id)?;
            }
            ShellEvent::NewPopup {
                surface,
                parent,
                client,
            } => self.on_new_popup(surface, parent, client)?,
            ShellEvent::PopupDestroy { surface } => self.on_popup_destroy(surface)?,
        }
        Ok(())
    }
}
