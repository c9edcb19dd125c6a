//! Visibility and authorization policies.
//!
//! Both are pure functions over domain values: callers supply the records
//! and the current instant, nothing here touches a store.

mod authorization;
mod visibility;

pub use authorization::{Authored, Decision, authorize_modification, can_modify};
pub use visibility::{can_view, is_publicly_visible};
