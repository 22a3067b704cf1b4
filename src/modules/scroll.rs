// Scroll surface capabilities.
//
// List components expose different imperative scroll APIs. A surface opts into
// at most one of them by overriding the matching `as_*` probe; callers go
// through `probe` which checks them in a fixed order.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::state::ScrollOffset;

pub trait OffsetJump: Send + Sync {
    fn jump_to_offset(&self, offset: ScrollOffset, animated: bool);
}

pub trait PointJump: Send + Sync {
    fn jump_to(&self, y: ScrollOffset, animated: bool);
}

pub trait IndexJump: Send + Sync {
    fn jump_to_index(&self, index: usize, animated: bool);
}

pub trait ScrollSurface: Send + Sync {
    fn as_offset_jump(&self) -> Option<&dyn OffsetJump> {
        None
    }

    fn as_point_jump(&self) -> Option<&dyn PointJump> {
        None
    }

    fn as_index_jump(&self) -> Option<&dyn IndexJump> {
        None
    }
}

/// The capability a surface was found to expose.
pub enum JumpCapability<'a> {
    Offset(&'a dyn OffsetJump),
    Point(&'a dyn PointJump),
    Index(&'a dyn IndexJump),
    Unsupported,
}

/// Offset, then point, then index.
pub fn probe(surface: &dyn ScrollSurface) -> JumpCapability<'_> {
    if let Some(j) = surface.as_offset_jump() {
        JumpCapability::Offset(j)
    } else if let Some(j) = surface.as_point_jump() {
        JumpCapability::Point(j)
    } else if let Some(j) = surface.as_index_jump() {
        JumpCapability::Index(j)
    } else {
        JumpCapability::Unsupported
    }
}

/// Mutable slot pointing at the currently mounted surface, if any.
///
/// Clones share the slot. Readers must treat an empty slot as "nothing to scroll".
#[derive(Clone, Default)]
pub struct ScrollRef {
    current: Arc<RwLock<Option<Arc<dyn ScrollSurface>>>>,
}

impl ScrollRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(surface: Arc<dyn ScrollSurface>) -> Self {
        let r = Self::new();
        r.attach(surface);
        r
    }

    pub fn attach(&self, surface: Arc<dyn ScrollSurface>) {
        *self.current.write() = Some(surface);
    }

    pub fn detach(&self) {
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<Arc<dyn ScrollSurface>> {
        self.current.read().clone()
    }

    /// Returns false when nothing was scrolled.
    pub fn scroll_to_top(&self, animated: bool) -> bool {
        let Some(surface) = self.current() else {
            return false;
        };
        match probe(surface.as_ref()) {
            JumpCapability::Offset(j) => j.jump_to_offset(0.0, animated),
            JumpCapability::Point(j) => j.jump_to(0.0, animated),
            JumpCapability::Index(j) => j.jump_to_index(0, animated),
            JumpCapability::Unsupported => return false,
        }
        true
    }

    /// Index-only surfaces cannot express a pixel offset and are skipped.
    pub fn scroll_to_offset(&self, offset: ScrollOffset, animated: bool) -> bool {
        let Some(surface) = self.current() else {
            return false;
        };
        match probe(surface.as_ref()) {
            JumpCapability::Offset(j) => j.jump_to_offset(offset, animated),
            JumpCapability::Point(j) => j.jump_to(offset, animated),
            JumpCapability::Index(_) | JumpCapability::Unsupported => return false,
        }
        true
    }
}
