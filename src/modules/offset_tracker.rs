// Scroll offset recorder. Written on every scroll frame, read on tab reselect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::state::ScrollOffset;

pub type OffsetAccessor = Arc<dyn Fn() -> ScrollOffset + Send + Sync>;
pub type ScrollCallback = Arc<dyn Fn(ScrollOffset) + Send + Sync>;

/// Single-slot cell holding the last observed offset, stored as `f64` bits.
#[derive(Debug, Default)]
struct OffsetCell(AtomicU64);

impl OffsetCell {
    fn store(&self, offset: ScrollOffset) {
        self.0.store(offset.to_bits(), Ordering::Relaxed);
    }

    fn load(&self) -> ScrollOffset {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Records the latest vertical offset of a list without touching any render state.
///
/// The closures handed out by [`accessor`](Self::accessor) and
/// [`scroll_callback`](Self::scroll_callback) are created once, so callers can cache them.
pub struct OffsetTracker {
    cell: Arc<OffsetCell>,
    accessor: OffsetAccessor,
    callback: ScrollCallback,
}

impl OffsetTracker {
    pub fn new() -> Self {
        let cell = Arc::new(OffsetCell::default());
        let read = cell.clone();
        let write = cell.clone();
        Self {
            cell,
            accessor: Arc::new(move || read.load()),
            callback: Arc::new(move |offset| write.store(offset)),
        }
    }

    pub fn on_scroll(&self, offset_y: ScrollOffset) {
        self.cell.store(offset_y);
    }

    pub fn offset(&self) -> ScrollOffset {
        self.cell.load()
    }

    pub fn accessor(&self) -> OffsetAccessor {
        self.accessor.clone()
    }

    pub fn scroll_callback(&self) -> ScrollCallback {
        self.callback.clone()
    }
}

impl Default for OffsetTracker {
    fn default() -> Self {
        Self::new()
    }
}
