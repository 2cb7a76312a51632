//! Configuration types.
//!
//! Every field is optional at the file level so that a project config can
//! override a single value from the user config. Accessor methods resolve
//! the built-in default when a field is unset.

use std::time::Duration;

use beacon_protocol::{Category, PollSource};
use serde::{Deserialize, Serialize};

use crate::defaults;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeaconConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub returns: ReturnsConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// Navigation table for the view-clear gateway. Empty means "use the
    /// built-in one route per category".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteRule>,
}

impl BeaconConfig {
    /// The configured routes, or one `/<category>` route per category.
    pub fn effective_routes(&self) -> Vec<RouteRule> {
        if !self.routes.is_empty() {
            return self.routes.clone();
        }
        Category::ALL
            .into_iter()
            .map(|category| RouteRule {
                path: format!("/{}", category),
                category,
                sub_item: None,
            })
            .collect()
    }

    /// A copy with every default filled in, for display.
    pub fn resolved(&self) -> BeaconConfig {
        let polling = &self.polling;
        let period = |source| Some(polling.period_secs(source));
        BeaconConfig {
            endpoint: EndpointConfig {
                url: Some(self.endpoint.url().to_string()),
                timeout_secs: Some(self.endpoint.timeout().as_secs()),
            },
            polling: PollingConfig {
                returns_secs: period(PollSource::Category(Category::Returns)),
                reports_secs: period(PollSource::Category(Category::Reports)),
                system_updates_secs: period(PollSource::SystemUpdates),
                warehouse_secs: period(PollSource::Category(Category::Warehouse)),
                logs_secs: period(PollSource::Category(Category::Logs)),
                users_secs: period(PollSource::Category(Category::Users)),
                suppliers_secs: period(PollSource::Category(Category::Suppliers)),
                rollover_secs: Some(polling.rollover_period().as_secs()),
            },
            returns: ReturnsConfig {
                limit: Some(self.returns.limit()),
                group_by_reason: Some(self.returns.group_by_reason()),
            },
            reports: ReportsConfig {
                window_hours: Some(self.reports.window_hours()),
                retry_attempts: Some(self.reports.retry_attempts()),
                retry_delay_ms: Some(self.reports.retry_delay().as_millis() as u64),
            },
            settings: SettingsConfig {
                debounce_ms: Some(self.settings.debounce().as_millis() as u64),
            },
            alerts: AlertsConfig {
                enabled: Some(self.alerts.enabled()),
            },
            routes: self.effective_routes(),
        }
    }
}

/// `[endpoint]`: Where the remote action endpoint lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(defaults::ENDPOINT_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(defaults::ENDPOINT_TIMEOUT_SECS))
    }
}

/// `[polling]`: One period per source plus the date-rollover check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_updates_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppliers_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollover_secs: Option<u64>,
}

impl PollingConfig {
    fn raw_secs(&self, source: PollSource) -> Option<u64> {
        match source {
            PollSource::Category(Category::Returns) => self.returns_secs,
            PollSource::Category(Category::Reports) => self.reports_secs,
            PollSource::Category(Category::Warehouse) => self.warehouse_secs,
            PollSource::Category(Category::Logs) => self.logs_secs,
            PollSource::Category(Category::Users) => self.users_secs,
            PollSource::Category(Category::Suppliers) => self.suppliers_secs,
            PollSource::SystemUpdates => self.system_updates_secs,
        }
    }

    /// Polling period in seconds for a source, default applied.
    pub fn period_secs(&self, source: PollSource) -> u64 {
        let default = match source {
            PollSource::Category(Category::Returns) => defaults::RETURNS_POLL_SECS,
            _ => defaults::VIEW_POLL_SECS,
        };
        self.raw_secs(source).unwrap_or(default)
    }

    pub fn period(&self, source: PollSource) -> Duration {
        Duration::from_secs(self.period_secs(source))
    }

    pub fn rollover_period(&self) -> Duration {
        Duration::from_secs(self.rollover_secs.unwrap_or(defaults::ROLLOVER_SECS))
    }

    pub(crate) fn merge(base: &Self, over: &Self) -> Self {
        Self {
            returns_secs: over.returns_secs.or(base.returns_secs),
            reports_secs: over.reports_secs.or(base.reports_secs),
            system_updates_secs: over.system_updates_secs.or(base.system_updates_secs),
            warehouse_secs: over.warehouse_secs.or(base.warehouse_secs),
            logs_secs: over.logs_secs.or(base.logs_secs),
            users_secs: over.users_secs.or(base.users_secs),
            suppliers_secs: over.suppliers_secs.or(base.suppliers_secs),
            rollover_secs: over.rollover_secs.or(base.rollover_secs),
        }
    }
}

/// `[returns]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnsConfig {
    /// Page-size cap passed to `get_pending_returns`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Count pending returns under a sub-item per `reason`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_reason: Option<bool>,
}

impl ReturnsConfig {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(defaults::RETURNS_LIMIT)
    }

    pub fn group_by_reason(&self) -> bool {
        self.group_by_reason
            .unwrap_or(defaults::RETURNS_GROUP_BY_REASON)
    }
}

/// `[reports]`: Report freshness window and retry budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
}

impl ReportsConfig {
    pub fn window_hours(&self) -> u32 {
        self.window_hours.unwrap_or(defaults::REPORTS_WINDOW_HOURS)
    }

    /// Total attempts per cycle, including the first one.
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
            .unwrap_or(defaults::REPORTS_RETRY_ATTEMPTS)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(
            self.retry_delay_ms
                .unwrap_or(defaults::REPORTS_RETRY_DELAY_MS),
        )
    }
}

/// `[settings]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl SettingsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(defaults::SETTINGS_DEBOUNCE_MS))
    }
}

/// `[alerts]`: OS-level notifications. Badge counts are unaffected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl AlertsConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(defaults::ALERTS_ENABLED)
    }
}

/// `[[routes]]`: Maps a dashboard path to the slice it clears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub path: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_item: Option<String>,
}
