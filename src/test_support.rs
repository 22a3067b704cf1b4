// Test doubles shared by the unit tests.

use async_trait::async_trait;
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::StorageError;
use crate::modules::haptics::{Haptics, ImpactStyle};
use crate::modules::navigation::{NavigationEvents, NavigationHub, Subscription};
use crate::modules::reselect::{RefreshAction, RefreshFuture};
use crate::modules::scroll::{IndexJump, OffsetJump, PointJump, ScrollSurface};
use crate::state::{ScrollOffset, TabEvent, TabEventKind};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Jump {
    Offset { offset: ScrollOffset, animated: bool },
    Point { y: ScrollOffset, animated: bool },
    Index { index: usize, animated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Offset,
    Point,
    Index,
    Inert,
}

/// Scroll surface exposing exactly one capability and recording every jump.
pub struct RecordingSurface {
    shape: Shape,
    jumps: Mutex<Vec<Jump>>,
}

impl RecordingSurface {
    fn with_shape(shape: Shape) -> Arc<Self> {
        Arc::new(Self {
            shape,
            jumps: Mutex::new(Vec::new()),
        })
    }

    pub fn offset() -> Arc<Self> {
        Self::with_shape(Shape::Offset)
    }

    pub fn point() -> Arc<Self> {
        Self::with_shape(Shape::Point)
    }

    pub fn index() -> Arc<Self> {
        Self::with_shape(Shape::Index)
    }

    pub fn inert() -> Arc<Self> {
        Self::with_shape(Shape::Inert)
    }

    pub fn jumps(&self) -> Vec<Jump> {
        self.jumps.lock().clone()
    }

    pub fn clear(&self) {
        self.jumps.lock().clear();
    }
}

impl OffsetJump for RecordingSurface {
    fn jump_to_offset(&self, offset: ScrollOffset, animated: bool) {
        self.jumps.lock().push(Jump::Offset { offset, animated });
    }
}

impl PointJump for RecordingSurface {
    fn jump_to(&self, y: ScrollOffset, animated: bool) {
        self.jumps.lock().push(Jump::Point { y, animated });
    }
}

impl IndexJump for RecordingSurface {
    fn jump_to_index(&self, index: usize, animated: bool) {
        self.jumps.lock().push(Jump::Index { index, animated });
    }
}

impl ScrollSurface for RecordingSurface {
    fn as_offset_jump(&self) -> Option<&dyn OffsetJump> {
        (self.shape == Shape::Offset).then_some(self as &dyn OffsetJump)
    }

    fn as_point_jump(&self) -> Option<&dyn PointJump> {
        (self.shape == Shape::Point).then_some(self as &dyn PointJump)
    }

    fn as_index_jump(&self) -> Option<&dyn IndexJump> {
        (self.shape == Shape::Index).then_some(self as &dyn IndexJump)
    }
}

#[derive(Default)]
pub struct RecordingHaptics {
    impacts: Mutex<Vec<ImpactStyle>>,
}

impl RecordingHaptics {
    pub fn impacts(&self) -> Vec<ImpactStyle> {
        self.impacts.lock().clone()
    }
}

impl Haptics for RecordingHaptics {
    fn impact(&self, style: ImpactStyle) -> anyhow::Result<()> {
        self.impacts.lock().push(style);
        Ok(())
    }
}

/// Haptics engine that rejects every impact, like a device without one.
#[derive(Default)]
pub struct FailingHaptics {
    attempts: AtomicUsize,
}

impl FailingHaptics {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Haptics for FailingHaptics {
    fn impact(&self, style: ImpactStyle) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("haptics unavailable for {:?}", style)
    }
}

/// Counts how often a refresh action was started.
#[derive(Clone, Default)]
pub struct RefreshCounter {
    count: Arc<AtomicUsize>,
}

impl RefreshCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn action(&self) -> RefreshAction {
        let count = self.count.clone();
        Arc::new(move || -> RefreshFuture {
            count.fetch_add(1, Ordering::SeqCst);
            futures_util::future::ready(Ok(())).boxed()
        })
    }
}

pub fn failing_refresh() -> RefreshAction {
    Arc::new(|| -> RefreshFuture {
        futures_util::future::ready(Err(anyhow::anyhow!("network down"))).boxed()
    })
}

/// Records outgoing reselect notifications.
pub struct EventLog {
    events: Arc<Mutex<Vec<TabEvent>>>,
    _subscriptions: Vec<Subscription>,
}

impl EventLog {
    pub fn listen(hub: &NavigationHub) -> Self {
        Self::listen_to(
            hub,
            &[TabEventKind::TabReselect, TabEventKind::TabDoublePulse],
        )
    }

    pub fn listen_to(hub: &NavigationHub, kinds: &[TabEventKind]) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriptions = kinds
            .iter()
            .map(|kind| {
                let sink = events.clone();
                hub.add_listener(
                    *kind,
                    Arc::new(move |e: &TabEvent| sink.lock().push(e.clone())),
                )
            })
            .collect();
        Self {
            events,
            _subscriptions: subscriptions,
        }
    }

    pub fn all(&self) -> Vec<TabEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, kind: TabEventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }
}

/// Key-value store that records writes and can be told to fail.
#[derive(Default)]
pub struct RecordingStore {
    items: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    removes: Mutex<Vec<String>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_removes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.items.lock().insert(key.to_string(), value.to_string());
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().clone()
    }

    pub fn last_write(&self) -> Option<serde_json::Value> {
        self.writes
            .lock()
            .last()
            .and_then(|(_, v)| serde_json::from_str(v).ok())
    }

    pub fn removes(&self) -> Vec<String> {
        self.removes.lock().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.lock().contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Parse error".into()));
        }
        Ok(self.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Storage error".into()));
        }
        self.writes.lock().push((key.to_string(), value.clone()));
        self.items.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Remove error".into()));
        }
        self.removes.lock().push(key.to_string());
        self.items.lock().remove(key);
        Ok(())
    }
}
