// Tab navigation coordination library entry point
// Exposes all modules so hosts can wire screens to them and tests can use them independently.

// Core modules
pub mod error;
pub mod settings;
pub mod storage;
mod runtime;

// Shared state
pub mod state;

// Pure logic modules (no UI toolkit imports)
pub mod modules;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::StorageError;
pub use modules::navigation::{FocusFlag, NavigationEvents, NavigationHub, Subscription};
pub use modules::offset_tracker::OffsetTracker;
pub use modules::reselect::{refresh_action, ReselectCoordinator, ReselectOptions};
pub use modules::scroll::{ScrollRef, ScrollSurface};
pub use modules::tab_state::{ScrollPositionPreservation, TabStateOptions, TabStateStore};
pub use modules::tabs::TabBar;
pub use settings::{NearTopAction, ReselectConfig, Settings};
pub use state::{TabEvent, TabEventKind, TabStateBundle};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
