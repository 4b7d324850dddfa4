//! Calendar provider backed by an in-process store.
//!
//! The store keeps calendars and events the way a platform content store
//! does and answers through an actor, so requests are applied one at a time
//! in arrival order. With a snapshot path configured it survives restarts.

mod actor;
mod handle;
pub mod models;
pub mod permissions;
pub mod recurrence;
mod snapshot;
pub mod values;

pub use handle::LocalStoreHandle;
pub use models::{StoreState, StoredCalendar, StoredEvent, DEFAULT_CALENDAR_ID, LOCAL_ACCOUNT_TYPE};
