//! Seat-side pointer state: which surface has pointer focus and whether the
//! compositor's default cursor image is currently applied.

use crate::protocol::SurfaceId;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PointerFocus {
    focus: Option<SurfaceId>,
    default_image_applied: bool,
}

impl PointerFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    pub(crate) fn set_focus(&mut self, surface: SurfaceId) {
        self.focus = Some(surface);
    }

    pub(crate) fn clear_focus(&mut self) -> Option<SurfaceId> {
        self.focus.take()
    }

    pub fn default_image_applied(&self) -> bool {
        self.default_image_applied
    }

    /// Mark the default image as applied. Returns `true` if it was not
    /// already, i.e. the caller has to push it to the cursor.
    pub(crate) fn take_default_image(&mut self) -> bool {
        !std::mem::replace(&mut self.default_image_applied, true)
    }

    /// The pointer is over a client, which owns the cursor image now.
    pub(crate) fn release_default_image(&mut self) {
        self.default_image_applied = false;
    }
}
