mod messages;
mod types;

pub mod actions;

pub use messages::{
    ActionRequest, ActionResponse, PendingReturn, ReportTypeUpdate, ResourceCount, UpdateVerdict,
};
pub use types::{Category, PollSource, UnknownSource};
