// Per-tab UI state preservation.
//
// Each tab keeps an in-memory bundle (scroll offset, filters, form draft, custom
// flags) that is merged on every update and written to the key-value store under
// `tab_state_<name>`. Focus restores it, blur flushes it. Restoring a scroll
// offset jumps the list after a short settle delay; the jump produces scroll
// callbacks of its own, so scroll saves are suppressed until it has happened.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::StorageError;
use crate::modules::navigation::FocusFlag;
use crate::modules::scroll::ScrollRef;
use crate::runtime::try_spawn;
use crate::settings::TabStateDefaults;
use crate::state::{ScrollEvent, ScrollOffset, TabStateBundle};
use crate::storage::KeyValueStore;

pub const KEY_PREFIX: &str = "tab_state_";

pub fn storage_key(tab_name: &str) -> String {
    format!("{}{}", KEY_PREFIX, tab_name)
}

pub type RestoredCallback = Arc<dyn Fn(&TabStateBundle) + Send + Sync>;

#[derive(Clone)]
pub struct TabStateOptions {
    pub tab_name: String,
    pub scroll_ref: Option<ScrollRef>,
    pub preserve_scroll: bool,
    pub preserve_filters: bool,
    pub preserve_form_data: bool,
    /// Keys `update_custom_state` is allowed to persist.
    pub custom_state_keys: Vec<String>,
    pub restore_delay: Duration,
    pub on_state_restored: Option<RestoredCallback>,
}

impl TabStateOptions {
    pub fn new(tab_name: impl Into<String>) -> Self {
        Self::from_defaults(tab_name, &TabStateDefaults::default())
    }

    pub fn from_defaults(tab_name: impl Into<String>, defaults: &TabStateDefaults) -> Self {
        Self {
            tab_name: tab_name.into(),
            scroll_ref: None,
            preserve_scroll: defaults.preserve_scroll,
            preserve_filters: defaults.preserve_filters,
            preserve_form_data: defaults.preserve_form_data,
            custom_state_keys: Vec::new(),
            restore_delay: Duration::from_millis(defaults.restore_delay_ms),
            on_state_restored: None,
        }
    }

    pub fn with_scroll_ref(mut self, scroll_ref: ScrollRef) -> Self {
        self.scroll_ref = Some(scroll_ref);
        self
    }

    pub fn with_custom_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_state_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_state_restored(mut self, callback: RestoredCallback) -> Self {
        self.on_state_restored = Some(callback);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorationPhase {
    Idle,
    Restoring,
}

/// Idle -> Restoring when a scroll restore is scheduled, back to Idle once the
/// deferred jump was attempted. Overlapping restores are told apart by epoch so
/// only the latest one returns the guard to Idle.
#[derive(Debug)]
struct RestorationGuard {
    state: Mutex<(RestorationPhase, u64)>,
}

impl RestorationGuard {
    fn new() -> Self {
        Self {
            state: Mutex::new((RestorationPhase::Idle, 0)),
        }
    }

    fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.1 += 1;
        state.0 = RestorationPhase::Restoring;
        state.1
    }

    fn finish(&self, epoch: u64) {
        let mut state = self.state.lock();
        if state.1 == epoch {
            state.0 = RestorationPhase::Idle;
        }
    }

    fn phase(&self) -> RestorationPhase {
        self.state.lock().0
    }
}

struct Inner {
    key: String,
    opts: TabStateOptions,
    store: Arc<dyn KeyValueStore>,
    current: Mutex<TabStateBundle>,
    /// Bumped under `current` on every staged change.
    revision: AtomicU64,
    /// Latest revision handed to the store. Held across the store call, so
    /// writes for this tab reach the store one at a time and never go back.
    written: tokio::sync::Mutex<u64>,
    guard: RestorationGuard,
}

impl Inner {
    fn stage(&self, apply: impl FnOnce(&mut TabStateBundle)) -> (u64, TabStateBundle) {
        let mut current = self.current.lock();
        apply(&mut *current);
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        (revision, current.clone())
    }

    async fn persist(&self, revision: u64, snapshot: TabStateBundle) {
        let mut written = self.written.lock().await;
        if *written >= revision {
            log::trace!(
                "[TabState] '{}' revision {} superseded by {}",
                self.opts.tab_name,
                revision,
                *written
            );
            return;
        }
        *written = revision;

        if snapshot.is_empty() {
            log::trace!("[TabState] '{}' is empty, nothing to write", self.opts.tab_name);
            return;
        }

        if let Err(e) = self.write(&snapshot).await {
            log::error!(
                "[TabState] Failed to save tab state (tab={}): {}",
                self.opts.tab_name,
                e
            );
        }
    }

    async fn write(&self, bundle: &TabStateBundle) -> Result<(), StorageError> {
        let json = serde_json::to_string(bundle)?;
        self.store.set_item(&self.key, json).await
    }

    async fn read(&self) -> Result<Option<TabStateBundle>, StorageError> {
        match self.store.get_item(&self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn load(&self) -> Option<TabStateBundle> {
        match self.read().await {
            Ok(bundle) => bundle,
            Err(e) => {
                log::error!(
                    "[TabState] Failed to restore tab state (tab={}): {}",
                    self.opts.tab_name,
                    e
                );
                None
            }
        }
    }

    async fn remove(&self, revision: u64) {
        let mut written = self.written.lock().await;
        if *written > revision {
            // A change made after the clear already reached the store
            return;
        }
        *written = revision;

        if let Err(e) = self.store.remove_item(&self.key).await {
            log::error!(
                "[TabState] Failed to clear tab state (tab={}): {}",
                self.opts.tab_name,
                e
            );
        }
    }
}

/// Returns the guard to Idle when dropped, so an aborted or panicking jump
/// task cannot leave scroll saves suppressed.
struct RestoreTicket {
    inner: Arc<Inner>,
    epoch: u64,
}

impl Drop for RestoreTicket {
    fn drop(&mut self) {
        self.inner.guard.finish(self.epoch);
    }
}

/// Persists and restores one tab's [`TabStateBundle`]. Cheap to clone; clones
/// share the same bundle and guard.
#[derive(Clone)]
pub struct TabStateStore {
    inner: Arc<Inner>,
}

impl TabStateStore {
    pub fn new(options: TabStateOptions, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                key: storage_key(&options.tab_name),
                opts: options,
                store,
                current: Mutex::new(TabStateBundle::default()),
                revision: AtomicU64::new(0),
                written: tokio::sync::Mutex::new(0),
                guard: RestorationGuard::new(),
            }),
        }
    }

    pub fn tab_name(&self) -> &str {
        &self.inner.opts.tab_name
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn current(&self) -> TabStateBundle {
        self.inner.current.lock().clone()
    }

    pub fn restoration_phase(&self) -> RestorationPhase {
        self.inner.guard.phase()
    }

    pub fn is_restoring(&self) -> bool {
        self.restoration_phase() == RestorationPhase::Restoring
    }

    /// Merges `partial` into the in-memory bundle and writes the result.
    /// Storage failures are logged, never returned.
    pub async fn save_state(&self, partial: TabStateBundle) {
        let (revision, snapshot) = self.inner.stage(|current| current.merge(partial));
        self.inner.persist(revision, snapshot).await;
    }

    pub async fn restore_state(&self) -> Option<TabStateBundle> {
        let bundle = self.inner.load().await?;
        *self.inner.current.lock() = bundle.clone();

        let opts = &self.inner.opts;
        if opts.preserve_scroll {
            if let (Some(offset), Some(scroll_ref)) = (bundle.scroll_offset, opts.scroll_ref.clone())
            {
                self.schedule_scroll_restore(offset, scroll_ref);
            }
        }

        if let Some(callback) = &opts.on_state_restored {
            callback(&bundle);
        }

        log::debug!("[TabState] Restored '{}'", opts.tab_name);
        Some(bundle)
    }

    pub async fn clear_state(&self) {
        let (revision, _) = self
            .inner
            .stage(|current| *current = TabStateBundle::default());
        self.inner.remove(revision).await;
    }

    pub fn update_scroll_offset(&self, offset: ScrollOffset) -> Option<JoinHandle<()>> {
        if !self.inner.opts.preserve_scroll || self.is_restoring() {
            return None;
        }
        self.spawn_save(|current| current.scroll_offset = Some(offset))
    }

    pub fn update_filters(&self, filters: Map<String, Value>) -> Option<JoinHandle<()>> {
        if !self.inner.opts.preserve_filters {
            return None;
        }
        self.spawn_save(|current| current.filters = Some(filters))
    }

    pub fn update_form_data(&self, data: Map<String, Value>) -> Option<JoinHandle<()>> {
        if !self.inner.opts.preserve_form_data {
            return None;
        }
        self.spawn_save(|current| current.form_data = Some(data))
    }

    pub fn update_custom_state(&self, key: &str, value: Value) -> Option<JoinHandle<()>> {
        if !self.inner.opts.custom_state_keys.iter().any(|k| k == key) {
            log::trace!("[TabState] custom key '{}' not preserved", key);
            return None;
        }
        let key = key.to_string();
        self.spawn_save(move |current| {
            current
                .custom_state
                .get_or_insert_with(Map::new)
                .insert(key, value);
        })
    }

    /// Focus gained: restore in the background. `None` outside a tokio runtime.
    pub fn on_focus(&self) -> Option<JoinHandle<Option<TabStateBundle>>> {
        let this = self.clone();
        try_spawn("TabState", "focus restore", async move {
            this.restore_state().await
        })
    }

    /// Focus lost: flush the in-memory bundle unless it is empty.
    pub fn on_blur(&self) -> Option<JoinHandle<()>> {
        if self.inner.current.lock().is_empty() {
            return None;
        }
        let this = self.clone();
        try_spawn("TabState", "blur flush", async move {
            this.save_state(TabStateBundle::default()).await
        })
    }

    /// Follows `focus` until every handle to the flag is gone: restore when it
    /// turns (or starts) true, flush when it turns false.
    pub fn bind_focus(&self, focus: &FocusFlag) -> Option<JoinHandle<()>> {
        let mut rx = focus.subscribe();
        let this = self.clone();
        try_spawn("TabState", "focus binding", async move {
            let mut focused = *rx.borrow_and_update();
            if focused {
                this.restore_state().await;
            }
            while rx.changed().await.is_ok() {
                let now = *rx.borrow_and_update();
                if now == focused {
                    continue;
                }
                focused = now;
                if now {
                    this.restore_state().await;
                } else if !this.current().is_empty() {
                    this.save_state(TabStateBundle::default()).await;
                }
            }
        })
    }

    fn spawn_save(&self, apply: impl FnOnce(&mut TabStateBundle)) -> Option<JoinHandle<()>> {
        // Staged synchronously; `persist` drops any revision older than one
        // already written, so the store always ends on the latest merge
        let (revision, snapshot) = self.inner.stage(apply);
        let inner = self.inner.clone();
        try_spawn("TabState", "save", async move {
            inner.persist(revision, snapshot).await
        })
    }

    fn schedule_scroll_restore(&self, offset: ScrollOffset, scroll_ref: ScrollRef) {
        let ticket = RestoreTicket {
            inner: self.inner.clone(),
            epoch: self.inner.guard.begin(),
        };
        let delay = self.inner.opts.restore_delay;
        // If nothing can run the jump, the ticket is dropped with it and the
        // guard goes straight back to Idle
        let _ = try_spawn("TabState", "scroll restore", async move {
            tokio::time::sleep(delay).await;
            // A detached surface means the screen is gone; nothing to do
            if !scroll_ref.scroll_to_offset(offset, false) {
                log::trace!("[TabState] scroll restore to {} skipped", offset);
            }
            drop(ticket);
        });
    }
}

/// Scroll-only view of a [`TabStateStore`].
#[derive(Clone)]
pub struct ScrollPositionPreservation {
    store: TabStateStore,
}

impl ScrollPositionPreservation {
    pub fn new(
        tab_name: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        scroll_ref: Option<ScrollRef>,
    ) -> Self {
        let mut options = TabStateOptions::new(tab_name);
        options.preserve_scroll = true;
        options.preserve_filters = false;
        options.preserve_form_data = false;
        options.scroll_ref = scroll_ref;
        Self {
            store: TabStateStore::new(options, store),
        }
    }

    pub fn handle_scroll(&self, event: &ScrollEvent) -> Option<JoinHandle<()>> {
        self.store.update_scroll_offset(event.content_offset.y)
    }

    pub async fn restore_state(&self) -> Option<TabStateBundle> {
        self.store.restore_state().await
    }

    pub fn store(&self) -> &TabStateStore {
        &self.store
    }
}
