//! Errors raised when a collaborator hands the core a handle or a lifecycle
//! transition that breaks a precondition.

use crate::input::DeviceId;
use crate::protocol::SurfaceId;
use crate::window::WindowId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("window {0:?} is not registered")]
    UnknownWindow(WindowId),

    #[error("surface {0:?} does not belong to a known window or popup")]
    UnknownSurface(SurfaceId),

    #[error("surface {0:?} already has a window or popup")]
    DuplicateSurface(SurfaceId),

    #[error("window {0:?} is already mapped")]
    AlreadyMapped(WindowId),

    #[error("window {0:?} must be unmapped before it is destroyed")]
    StillMapped(WindowId),

    #[error("input device {0:?} is already attached")]
    DuplicateDevice(DeviceId),

    #[error("input device {0:?} is not attached")]
    UnknownDevice(DeviceId),
}

pub type Result<T, E = CompositorError> = std::result::Result<T, E>;
