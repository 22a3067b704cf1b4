// Navigation event source: tab press signals in, reselect notifications out.
// Pure logic, no UI toolkit imports.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

use crate::state::{TabEvent, TabEventKind};

pub type Listener = Arc<dyn Fn(&TabEvent) + Send + Sync>;

pub trait NavigationEvents: Send + Sync {
    fn add_listener(&self, kind: TabEventKind, listener: Listener) -> Subscription;
    fn emit(&self, event: TabEvent);
}

/// Owned handle to a listener registration.
///
/// The unsubscribe action runs exactly once: on [`unsubscribe`](Self::unsubscribe)
/// or on drop, whichever comes first.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

struct ListenerEntry {
    id: u64,
    kind: TabEventKind,
    listener: Listener,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<ListenerEntry>>,
}

/// In-process event hub shared by a tab navigator and its screens.
#[derive(Clone, Default)]
pub struct NavigationHub {
    inner: Arc<HubInner>,
}

impl NavigationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self, kind: TabEventKind) -> usize {
        self.inner
            .listeners
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

impl NavigationEvents for NavigationHub {
    fn add_listener(&self, kind: TabEventKind, listener: Listener) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push(ListenerEntry { id, kind, listener });

        let hub: Weak<HubInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.listeners.lock().retain(|e| e.id != id);
            }
        })
    }

    fn emit(&self, event: TabEvent) {
        // Snapshot first: listeners may emit or unsubscribe while we dispatch
        let targets: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .filter(|e| e.kind == event.kind)
            .map(|e| e.listener.clone())
            .collect();

        log::trace!("[Navigation] {:?} -> {} listener(s)", event, targets.len());
        for listener in targets {
            listener(&event);
        }
    }
}

/// Reactive "this screen is the focused tab" flag.
#[derive(Clone)]
pub struct FocusFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl FocusFlag {
    pub fn new(focused: bool) -> Self {
        let (tx, _rx) = watch::channel(focused);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_focused(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set(&self, focused: bool) {
        self.tx.send_if_modified(|current| {
            if *current == focused {
                false
            } else {
                *current = focused;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for FocusFlag {
    fn default() -> Self {
        Self::new(false)
    }
}
