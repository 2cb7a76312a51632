use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An independently polled notification domain on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Returns,
    Reports,
    Warehouse,
    Logs,
    Users,
    Suppliers,
}

impl Category {
    /// Every category, in sidebar order.
    pub const ALL: [Category; 6] = [
        Category::Returns,
        Category::Reports,
        Category::Warehouse,
        Category::Logs,
        Category::Users,
        Category::Suppliers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Returns => "returns",
            Category::Reports => "reports",
            Category::Warehouse => "warehouse",
            Category::Logs => "logs",
            Category::Users => "users",
            Category::Suppliers => "suppliers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

/// Anything the scheduler polls: one of the categories, or the
/// cross-cutting system-update slice fed by the report freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PollSource {
    Category(Category),
    SystemUpdates,
}

impl PollSource {
    pub const SYSTEM_UPDATES_KEY: &'static str = "system";

    /// All sources, categories first.
    pub fn all() -> impl Iterator<Item = PollSource> {
        Category::ALL
            .into_iter()
            .map(PollSource::Category)
            .chain(std::iter::once(PollSource::SystemUpdates))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollSource::Category(category) => category.as_str(),
            PollSource::SystemUpdates => Self::SYSTEM_UPDATES_KEY,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            PollSource::Category(category) => Some(*category),
            PollSource::SystemUpdates => None,
        }
    }
}

impl From<Category> for PollSource {
    fn from(category: Category) -> Self {
        PollSource::Category(category)
    }
}

impl fmt::Display for PollSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::SYSTEM_UPDATES_KEY {
            return Ok(PollSource::SystemUpdates);
        }
        s.parse::<Category>().map(PollSource::Category)
    }
}

impl Serialize for PollSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PollSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Returned when a string names neither a category nor the system slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown notification source '{}' (expected one of: {}, {})",
            self.0,
            Category::ALL.map(|c| c.as_str()).join(", "),
            PollSource::SYSTEM_UPDATES_KEY
        )
    }
}

impl std::error::Error for UnknownSource {}
