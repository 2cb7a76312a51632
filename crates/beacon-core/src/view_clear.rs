//! Clearing slices of the store when the user looks at them.
//!
//! A clear is an absolute assignment to zero, while every poll merges
//! relative to the current state. That makes a clear racing a delta safe in
//! both orders: a delta landing after the clear only carries data the
//! detector hasn't seen before, because its cursor already moved past
//! whatever the clear wiped.

use beacon_config::RouteRule;
use beacon_protocol::Category;
use tracing::{debug, info};

use crate::state::{Event, NotificationStore};

pub struct ViewClearGateway {
    store: NotificationStore,
    routes: Vec<RouteRule>,
}

impl ViewClearGateway {
    pub fn new(store: NotificationStore, routes: Vec<RouteRule>) -> Self {
        Self { store, routes }
    }

    pub fn mark_viewed(&self, category: Category, sub_item: Option<&str>) -> Vec<Event> {
        let events = self.store.mark_viewed(category, sub_item);
        info!(
            event = "core.view_clear.mark_viewed_completed",
            category = %category,
            sub_item = sub_item.unwrap_or(""),
            changed = !events.is_empty(),
        );
        events
    }

    pub fn mark_system_viewed(&self) -> Vec<Event> {
        let events = self.store.mark_system_viewed();
        info!(
            event = "core.view_clear.mark_system_viewed_completed",
            changed = !events.is_empty(),
        );
        events
    }

    /// The route a dashboard path falls under.
    ///
    /// Query and fragment are ignored. A route matches its own path and
    /// anything below it; the longest match wins.
    pub fn resolve(&self, path: &str) -> Option<&RouteRule> {
        let path = normalize(path);
        self.routes
            .iter()
            .filter(|route| {
                let prefix = normalize(&route.path);
                path == prefix
                    || prefix == "/"
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|route| normalize(&route.path).len())
    }

    /// Clear whatever `path` points at. Returns the matched route.
    pub fn navigate(&self, path: &str) -> Option<&RouteRule> {
        let Some(route) = self.resolve(path) else {
            debug!(event = "core.view_clear.navigate_skipped", path = path);
            return None;
        };
        self.mark_viewed(route.category, route.sub_item.as_deref());
        Some(route)
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
