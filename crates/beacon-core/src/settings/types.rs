use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use beacon_protocol::{Category, PollSource};
use serde::{Deserialize, Serialize};

use super::errors::SettingsError;

fn default_true() -> bool {
    true
}

/// Boolean notification preferences a user can toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub desktop_alerts: bool,
    #[serde(default)]
    pub alert_sound: bool,
    /// Per-category alert switch. Missing entries are enabled.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<Category, bool>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            desktop_alerts: true,
            alert_sound: false,
            categories: BTreeMap::new(),
        }
    }
}

impl Preferences {
    pub fn get(&self, field: PreferenceField) -> bool {
        match field {
            PreferenceField::DesktopAlerts => self.desktop_alerts,
            PreferenceField::AlertSound => self.alert_sound,
            PreferenceField::Category(category) => self.category_enabled(category),
        }
    }

    pub fn set(&mut self, field: PreferenceField, value: bool) {
        match field {
            PreferenceField::DesktopAlerts => self.desktop_alerts = value,
            PreferenceField::AlertSound => self.alert_sound = value,
            PreferenceField::Category(category) => {
                self.categories.insert(category, value);
            }
        }
    }

    /// Flip a field and return its new value.
    pub fn toggle(&mut self, field: PreferenceField) -> bool {
        let value = !self.get(field);
        self.set(field, value);
        value
    }

    pub fn category_enabled(&self, category: Category) -> bool {
        self.categories.get(&category).copied().unwrap_or(true)
    }

    /// Whether an OS alert for `source` is wanted. The system slice only
    /// follows the global switch.
    pub fn allows_alert(&self, source: PollSource) -> bool {
        self.desktop_alerts
            && source
                .category()
                .is_none_or(|category| self.category_enabled(category))
    }
}

/// Addresses one boolean in [`Preferences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceField {
    DesktopAlerts,
    AlertSound,
    Category(Category),
}

impl PreferenceField {
    /// Every addressable field, globals first.
    pub fn all() -> impl Iterator<Item = PreferenceField> {
        [PreferenceField::DesktopAlerts, PreferenceField::AlertSound]
            .into_iter()
            .chain(Category::ALL.into_iter().map(PreferenceField::Category))
    }
}

impl fmt::Display for PreferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceField::DesktopAlerts => f.write_str("desktop_alerts"),
            PreferenceField::AlertSound => f.write_str("alert_sound"),
            PreferenceField::Category(category) => write!(f, "category.{}", category),
        }
    }
}

impl FromStr for PreferenceField {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SettingsError::UnknownField {
            name: s.to_string(),
        };
        match s {
            "desktop_alerts" => Ok(PreferenceField::DesktopAlerts),
            "alert_sound" => Ok(PreferenceField::AlertSound),
            other => {
                let key = other.strip_prefix("category.").ok_or_else(unknown)?;
                let category = key.parse::<Category>().map_err(|_| unknown())?;
                Ok(PreferenceField::Category(category))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_alerts_everywhere() {
        let prefs = Preferences::default();
        for source in PollSource::all() {
            assert!(prefs.allows_alert(source));
        }
    }

    #[test]
    fn test_category_switch_only_mutes_that_category() {
        let mut prefs = Preferences::default();
        assert!(!prefs.toggle(PreferenceField::Category(Category::Logs)));
        assert!(!prefs.allows_alert(Category::Logs.into()));
        assert!(prefs.allows_alert(Category::Returns.into()));
        assert!(prefs.allows_alert(PollSource::SystemUpdates));

        prefs.set(PreferenceField::DesktopAlerts, false);
        assert!(!prefs.allows_alert(PollSource::SystemUpdates));
    }

    #[test]
    fn test_field_names_round_trip() {
        for name in ["desktop_alerts", "alert_sound", "category.warehouse"] {
            let field: PreferenceField = name.parse().unwrap();
            assert_eq!(field.to_string(), name);
        }
        assert!("category.nope".parse::<PreferenceField>().is_err());
        assert!("volume".parse::<PreferenceField>().is_err());
    }

    #[test]
    fn test_all_fields_parse_back() {
        let fields: Vec<_> = PreferenceField::all().collect();
        assert_eq!(fields.len(), 2 + Category::ALL.len());
        for field in fields {
            assert_eq!(field.to_string().parse::<PreferenceField>().unwrap(), field);
        }
    }

    #[test]
    fn test_toml_shape() {
        let mut prefs = Preferences::default();
        prefs.set(PreferenceField::Category(Category::Users), false);
        let text = toml::to_string(&prefs).unwrap();
        assert!(text.contains("users = false"));
        let parsed: Preferences = toml::from_str(&text).unwrap();
        assert_eq!(parsed, prefs);
    }
}
