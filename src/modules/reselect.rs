// Tab reselect handling.
//
// Pressing the already focused tab either jumps the list back to the top or,
// when the list is already near the top, refreshes it. A double press does both.
// All triggers share one cooldown gate; triggers inside it are dropped.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use tokio::time::Instant;

use crate::modules::haptics::{self, Haptics, ImpactStyle, NoHaptics};
use crate::modules::navigation::{FocusFlag, NavigationEvents, Subscription};
use crate::modules::offset_tracker::OffsetAccessor;
use crate::modules::scroll::ScrollRef;
use crate::runtime::try_spawn;
use crate::settings::{NearTopAction, ReselectConfig};
use crate::state::{TabEvent, TabEventKind};

pub type RefreshFuture = BoxFuture<'static, anyhow::Result<()>>;
pub type RefreshAction = Arc<dyn Fn() -> RefreshFuture + Send + Sync>;

/// Wraps an async closure as a [`RefreshAction`].
pub fn refresh_action<F, Fut>(f: F) -> RefreshAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Inputs of one coordinator attachment. Changing any of them means re-attaching.
#[derive(Clone)]
pub struct ReselectOptions {
    /// Route key of the owning screen; only events targeting it are handled.
    pub route: String,
    pub focus: FocusFlag,
    pub list_ref: ScrollRef,
    pub on_refresh: RefreshAction,
    pub get_offset: Option<OffsetAccessor>,
    pub haptics: Arc<dyn Haptics>,
    pub config: ReselectConfig,
}

impl ReselectOptions {
    pub fn new(
        route: impl Into<String>,
        focus: FocusFlag,
        list_ref: ScrollRef,
        on_refresh: RefreshAction,
    ) -> Self {
        Self {
            route: route.into(),
            focus,
            list_ref,
            on_refresh,
            get_offset: None,
            haptics: Arc::new(NoHaptics),
            config: ReselectConfig::default(),
        }
    }

    pub fn with_offset(mut self, get_offset: OffsetAccessor) -> Self {
        self.get_offset = Some(get_offset);
        self
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn with_config(mut self, config: ReselectConfig) -> Self {
        self.config = config;
        self
    }
}

type LastTrigger = Arc<Mutex<Option<Instant>>>;

struct Reactor {
    opts: ReselectOptions,
    nav: Weak<dyn NavigationEvents>,
    last_trigger: LastTrigger,
}

impl Reactor {
    fn admit(&self, event: &TabEvent) -> bool {
        if event.target != self.opts.route {
            return false;
        }
        if !self.opts.focus.is_focused() {
            log::trace!("[Reselect] {:?} on unfocused '{}' ignored", event.kind, event.target);
            return false;
        }

        let now = Instant::now();
        let mut last = self.last_trigger.lock();
        if let Some(prev) = *last {
            if now.duration_since(prev) < self.opts.config.cooldown() {
                log::debug!("[Reselect] {:?} on '{}' dropped (cooldown)", event.kind, event.target);
                return false;
            }
        }
        *last = Some(now);
        true
    }

    fn on_press(&self, event: &TabEvent) {
        if !self.admit(event) {
            return;
        }

        let offset = self.opts.get_offset.as_ref().map_or(0.0, |get| get());
        if offset > self.opts.config.top_threshold {
            log::debug!("[Reselect] '{}' at {} -> scroll to top", event.target, offset);
            self.haptic(ImpactStyle::Light);
            self.opts.list_ref.scroll_to_top(true);
        } else if self.opts.config.near_top_action == NearTopAction::Refresh {
            log::debug!("[Reselect] '{}' at {} -> refresh", event.target, offset);
            self.haptic(ImpactStyle::Medium);
            spawn_refresh(&self.opts.on_refresh);
        }

        self.notify(TabEventKind::TabReselect, &event.target);
    }

    fn on_double_press(&self, event: &TabEvent) {
        if !self.admit(event) {
            return;
        }

        log::debug!("[Reselect] '{}' double press -> scroll to top + refresh", event.target);
        self.haptic(ImpactStyle::Heavy);
        self.opts.list_ref.scroll_to_top(true);
        spawn_refresh(&self.opts.on_refresh);

        self.notify(TabEventKind::TabDoublePulse, &event.target);
    }

    fn haptic(&self, style: ImpactStyle) {
        if self.opts.config.haptics {
            haptics::fire(self.opts.haptics.as_ref(), style);
        }
    }

    fn notify(&self, kind: TabEventKind, target: &str) {
        if let Some(nav) = self.nav.upgrade() {
            nav.emit(TabEvent::new(kind, target));
        }
    }
}

/// Fire-and-forget. Neither a panic while starting the action nor an error it
/// resolves to reaches the caller.
fn spawn_refresh(action: &RefreshAction) {
    let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| action())) {
        Ok(fut) => fut,
        Err(_) => {
            if cfg!(debug_assertions) {
                log::debug!("[Reselect] refresh action panicked");
            }
            return;
        }
    };

    let _ = try_spawn("Reselect", "refresh", async move {
        if let Err(e) = fut.await {
            if cfg!(debug_assertions) {
                log::debug!("[Reselect] refresh failed: {}", e);
            }
        }
    });
}

/// Keeps a screen's reselect handlers attached to a navigation event source.
///
/// Handlers are detached on [`detach`](Self::detach), on [`update`](Self::update)
/// before the new ones attach, and on drop. The cooldown survives `update`.
pub struct ReselectCoordinator {
    nav: Arc<dyn NavigationEvents>,
    last_trigger: LastTrigger,
    subscriptions: Vec<Subscription>,
}

impl ReselectCoordinator {
    pub fn attach(nav: Arc<dyn NavigationEvents>, options: ReselectOptions) -> Self {
        let mut coordinator = Self {
            nav,
            last_trigger: Arc::new(Mutex::new(None)),
            subscriptions: Vec::new(),
        };
        coordinator.subscribe(options);
        coordinator
    }

    pub fn update(&mut self, options: ReselectOptions) {
        self.detach();
        self.subscribe(options);
    }

    pub fn detach(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    fn subscribe(&mut self, options: ReselectOptions) {
        let reactor = Arc::new(Reactor {
            opts: options,
            nav: Arc::downgrade(&self.nav),
            last_trigger: self.last_trigger.clone(),
        });

        let on_press = reactor.clone();
        self.subscriptions.push(self.nav.add_listener(
            TabEventKind::TabPress,
            Arc::new(move |e: &TabEvent| on_press.on_press(e)),
        ));
        let on_double = reactor;
        self.subscriptions.push(self.nav.add_listener(
            TabEventKind::TabDoublePress,
            Arc::new(move |e: &TabEvent| on_double.on_double_press(e)),
        ));
    }
}
