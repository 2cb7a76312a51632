use std::collections::BTreeMap;

use beacon_protocol::{Category, PollSource};
use serde::{Deserialize, Serialize};

/// A count plus a "has updates" flag. Used for sub-items, the category's own
/// increments, and the system-update slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub count: u64,
    pub has_updates: bool,
}

impl Counter {
    pub fn is_clear(&self) -> bool {
        self.count == 0 && !self.has_updates
    }

    /// Additive merge: counts add (saturating), flags OR.
    pub(crate) fn absorb(&mut self, count: u64, has_updates: bool) {
        self.count = self.count.saturating_add(count);
        self.has_updates |= has_updates;
    }
}

/// Notification state of one category.
///
/// `own` holds increments attributed to the category itself; `sub_items`
/// holds named subdivisions. Sub-item keys are never removed, only zeroed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryState {
    pub(crate) own: Counter,
    pub(crate) sub_items: BTreeMap<String, Counter>,
}

impl CategoryState {
    /// Own count plus every sub-item count.
    pub fn total(&self) -> u64 {
        self.sub_items
            .values()
            .fold(self.own.count, |acc, sub| acc.saturating_add(sub.count))
    }

    pub fn has_updates(&self) -> bool {
        self.own.has_updates || self.sub_items.values().any(|sub| sub.has_updates)
    }

    pub fn own(&self) -> Counter {
        self.own
    }

    pub fn sub_item(&self, name: &str) -> Option<Counter> {
        self.sub_items.get(name).copied()
    }

    pub fn sub_items(&self) -> impl Iterator<Item = (&str, Counter)> {
        self.sub_items.iter().map(|(name, c)| (name.as_str(), *c))
    }

    pub fn is_clear(&self) -> bool {
        self.own.is_clear() && self.sub_items.values().all(Counter::is_clear)
    }
}

static EMPTY_CATEGORY: CategoryState = CategoryState {
    own: Counter {
        count: 0,
        has_updates: false,
    },
    sub_items: BTreeMap::new(),
};

/// The whole notification tree: every category plus the system-update slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationState {
    pub(crate) categories: BTreeMap<Category, CategoryState>,
    pub(crate) system: Counter,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationState {
    /// Zero state with an entry for every category.
    pub fn new() -> Self {
        Self {
            categories: Category::ALL
                .into_iter()
                .map(|c| (c, CategoryState::default()))
                .collect(),
            system: Counter::default(),
        }
    }

    pub fn category(&self, category: Category) -> &CategoryState {
        self.categories.get(&category).unwrap_or(&EMPTY_CATEGORY)
    }

    pub fn categories(&self) -> impl Iterator<Item = (Category, &CategoryState)> {
        self.categories.iter().map(|(c, s)| (*c, s))
    }

    pub fn system(&self) -> Counter {
        self.system
    }

    /// The category's count, summed across sub-items.
    pub fn total(&self, category: Category) -> u64 {
        self.category(category).total()
    }

    /// Sum over all categories. The system slice is reported separately.
    pub fn grand_total(&self) -> u64 {
        self.categories
            .values()
            .fold(0u64, |acc, s| acc.saturating_add(s.total()))
    }

    /// True iff any category or the system slice is non-zero or flagged.
    pub fn has_any(&self) -> bool {
        !self.system.is_clear() || self.categories.values().any(|s| !s.is_clear())
    }

    pub(crate) fn category_mut(&mut self, category: Category) -> &mut CategoryState {
        self.categories.entry(category).or_default()
    }
}

/// A sub-item's contribution within a [`Delta`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItemDelta {
    pub count: u64,
    pub has_updates: bool,
}

impl SubItemDelta {
    pub fn is_noop(&self) -> bool {
        self.count == 0 && !self.has_updates
    }
}

/// What's new for one source since its last observation.
///
/// `count` and `has_updates` belong to the slice itself; `sub_items` are
/// merged per key. Always relative: applying a delta never lowers anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub source: PollSource,
    pub count: u64,
    pub has_updates: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_items: BTreeMap<String, SubItemDelta>,
    /// First observation of this source. Counts seed the store but no alert fires.
    #[serde(default)]
    pub baseline: bool,
}

impl Delta {
    pub fn empty(source: PollSource) -> Self {
        Self {
            source,
            count: 0,
            has_updates: false,
            sub_items: BTreeMap::new(),
            baseline: false,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.count == 0 && !self.has_updates && self.sub_items.values().all(SubItemDelta::is_noop)
    }

    /// Total count carried by this delta, own plus sub-items.
    pub fn total(&self) -> u64 {
        self.sub_items
            .values()
            .fold(self.count, |acc, sub| acc.saturating_add(sub.count))
    }

    /// Whether this delta reports genuinely new data worth an alert.
    pub fn raises_alert(&self) -> bool {
        !self.baseline
            && (self.has_updates || self.sub_items.values().any(|sub| sub.has_updates))
    }
}

/// Mutations accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge a delta additively. Never lowers a count.
    ApplyDelta(Delta),
    /// Zero a category, or only one of its sub-items.
    MarkViewed {
        category: Category,
        sub_item: Option<String>,
    },
    /// Zero the system-update slice.
    MarkSystemViewed,
}
