// Tab bar press dispatch - pure logic, no UI toolkit imports.
//
// Every tap emits `tabPress` for its route. Tapping another tab moves focus;
// tapping the focused tab twice inside the double-tap window also emits
// `tabDoublePress`.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::modules::haptics::{self, Haptics, ImpactStyle, NoHaptics};
use crate::modules::navigation::{FocusFlag, NavigationEvents};
use crate::settings::TabBarConfig;
use crate::state::{TabEvent, TabEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Navigated,
    Reselected,
    DoubleReselected,
    Ignored,
}

struct TabRoute {
    name: String,
    focus: FocusFlag,
}

pub struct TabBar {
    nav: Arc<dyn NavigationEvents>,
    routes: Vec<TabRoute>,
    focused: usize,
    double_tap_window: Duration,
    last_tap: Option<(usize, Instant)>,
    haptics: Arc<dyn Haptics>,
}

impl TabBar {
    /// The first route starts focused. Returns `None` for an empty route list.
    pub fn new<I, S>(nav: Arc<dyn NavigationEvents>, routes: I, config: &TabBarConfig) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let routes: Vec<TabRoute> = routes
            .into_iter()
            .enumerate()
            .map(|(i, name)| TabRoute {
                name: name.into(),
                focus: FocusFlag::new(i == 0),
            })
            .collect();
        if routes.is_empty() {
            return None;
        }

        Some(Self {
            nav,
            routes,
            focused: 0,
            double_tap_window: Duration::from_millis(config.double_tap_window_ms),
            last_tap: None,
            haptics: Arc::new(NoHaptics),
        })
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn focused_route(&self) -> &str {
        &self.routes[self.focused].name
    }

    /// Focus flag handed to the screen mounted under `route`.
    pub fn focus_flag(&self, route: &str) -> Option<FocusFlag> {
        self.position(route).map(|i| self.routes[i].focus.clone())
    }

    pub fn press(&mut self, route: &str) -> PressOutcome {
        let Some(index) = self.position(route) else {
            log::warn!("[TabBar] Press on unknown route '{}'", route);
            return PressOutcome::Ignored;
        };

        haptics::fire(self.haptics.as_ref(), ImpactStyle::Light);
        self.nav.emit(TabEvent::new(TabEventKind::TabPress, route));

        if index != self.focused {
            self.navigate(index);
            return PressOutcome::Navigated;
        }

        let now = Instant::now();
        let is_double = matches!(
            self.last_tap,
            Some((i, at)) if i == index && now.duration_since(at) < self.double_tap_window
        );
        if is_double {
            self.last_tap = None;
            self.nav.emit(TabEvent::new(TabEventKind::TabDoublePress, route));
            PressOutcome::DoubleReselected
        } else {
            self.last_tap = Some((index, now));
            PressOutcome::Reselected
        }
    }

    fn navigate(&mut self, index: usize) {
        log::debug!(
            "[TabBar] '{}' -> '{}'",
            self.routes[self.focused].name,
            self.routes[index].name
        );
        self.routes[self.focused].focus.set(false);
        self.routes[index].focus.set(true);
        self.focused = index;
        self.last_tap = None;
    }

    fn position(&self, route: &str) -> Option<usize> {
        self.routes.iter().position(|r| r.name == route)
    }
}
