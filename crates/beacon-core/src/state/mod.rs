pub mod events;
pub mod reducer;
pub mod store;
pub mod types;

pub use events::Event;
pub use store::{NotificationStore, Subscription};
pub use types::{CategoryState, Command, Counter, Delta, NotificationState, SubItemDelta};
