// Module exports for pure logic
pub mod haptics;
pub mod navigation;
pub mod offset_tracker;    // Scroll offset recorder
pub mod reselect;          // Tab reselect -> scroll to top / refresh
pub mod scroll;            // Scroll surface capabilities
pub mod tab_state;         // Per-tab state persistence
pub mod tabs;              // Tab bar press dispatch
