//! Action names understood by the dashboard's remote action endpoint.

pub const GET_PENDING_RETURNS: &str = "get_pending_returns";
pub const CHECK_REPORTS_UPDATES: &str = "check_reports_updates";
pub const GET_WAREHOUSE_ALERTS: &str = "get_warehouse_alerts";
pub const CHECK_LOG_ACTIVITY: &str = "check_log_activity";
pub const COUNT_USERS: &str = "count_users";
pub const COUNT_SUPPLIERS: &str = "count_suppliers";
