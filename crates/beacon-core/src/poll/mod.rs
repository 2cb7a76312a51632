//! Poll scheduling: one timer per source, a slow day-rollover timer, and
//! scoped guards that release them.

mod gate;
mod rollover;
mod scheduler;

pub use gate::PollState;
pub use rollover::{DateRange, DateRangeTracker};
pub use scheduler::{PollOutcome, PollScheduler, PollerGuard, ViewScope};
