//! Read-only projections of the store for each presentation surface.
//!
//! Every projection is built from one [`NotificationState`] snapshot, so the
//! numbers shown side by side always agree with each other.

use beacon_protocol::Category;
use serde::Serialize;

use crate::state::{Counter, NotificationState};

/// Badge text caps at this count.
pub const BADGE_CAP: u64 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub category: Category,
    pub count: u64,
    pub has_updates: bool,
}

/// `""` when clear, `"•"` for a flag without a count, else the count.
pub fn badge_label(count: u64, has_updates: bool) -> String {
    match (count, has_updates) {
        (0, false) => String::new(),
        (0, true) => "•".to_string(),
        (n, _) if n > BADGE_CAP => format!("{}+", BADGE_CAP),
        (n, _) => n.to_string(),
    }
}

impl Badge {
    pub fn label(&self) -> String {
        badge_label(self.count, self.has_updates)
    }
}

/// One badge per category, in category order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarBadges {
    pub badges: Vec<Badge>,
}

impl SidebarBadges {
    pub fn from_state(state: &NotificationState) -> Self {
        Self {
            badges: state
                .categories()
                .map(|(category, slice)| Badge {
                    category,
                    count: slice.total(),
                    has_updates: slice.has_updates(),
                })
                .collect(),
        }
    }

    pub fn get(&self, category: Category) -> Option<&Badge> {
        self.badges.iter().find(|b| b.category == category)
    }
}

/// The compact header icon on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderIcon {
    pub has_any: bool,
    pub total: u64,
    pub system_updates: bool,
}

impl HeaderIcon {
    pub fn from_state(state: &NotificationState) -> Self {
        Self {
            has_any: state.has_any(),
            total: state.grand_total(),
            system_updates: state.system().has_updates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelSubItem {
    pub name: String,
    pub count: u64,
    pub has_updates: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelCategory {
    pub category: Category,
    pub total: u64,
    pub has_updates: bool,
    pub own: Counter,
    pub sub_items: Vec<PanelSubItem>,
}

/// The full drillable tree: category, then sub-items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPanel {
    pub categories: Vec<PanelCategory>,
    pub system: Counter,
}

impl NotificationPanel {
    pub fn from_state(state: &NotificationState) -> Self {
        let categories = state
            .categories()
            .map(|(category, slice)| PanelCategory {
                category,
                total: slice.total(),
                has_updates: slice.has_updates(),
                own: slice.own(),
                sub_items: slice
                    .sub_items()
                    .map(|(name, counter)| PanelSubItem {
                        name: name.to_string(),
                        count: counter.count,
                        has_updates: counter.has_updates,
                    })
                    .collect(),
            })
            .collect();
        Self {
            categories,
            system: state.system(),
        }
    }

    /// Categories with something to show.
    pub fn active(&self) -> impl Iterator<Item = &PanelCategory> {
        self.categories
            .iter()
            .filter(|c| c.total > 0 || c.has_updates)
    }
}
