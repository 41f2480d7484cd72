//! Snooze timers for the Frozen column.
//!
//! Moving an item into Frozen starts a timer; moving it out by hand cancels
//! it. When the deadline passes, [`SnoozeService`] returns the item to the
//! column it was frozen from.

mod model;
mod service;
mod timers;

pub use model::{SnoozeEntry, format_remaining};
pub use service::{SnoozeHandle, SnoozeService};
pub use timers::SnoozeTimers;
