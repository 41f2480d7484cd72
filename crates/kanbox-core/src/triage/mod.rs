//! Kanban triage rules.
//!
//! This module provides:
//! - **State machine**: validates column moves, snoozes into Frozen and
//!   returns from Frozen, producing board patches
//! - **Drag resolver**: maps a drop gesture to a source and destination
//!   column, pausing for a snooze choice when the destination is Frozen
//! - **Column validation**: rules for creating and editing custom columns
//!
//! Nothing here touches the cache or the network; the coordinator applies
//! the resulting plans.
//!
//! # Example
//!
//! ```ignore
//! use kanbox_core::triage::{DragEnd, DragResolution, resolve_drag};
//!
//! match resolve_drag(&board, &DragEnd::onto("m1", "c-frozen")) {
//!     DragResolution::NeedsFreezeDuration(pending) => {
//!         let drag = pending.complete(FreezeOptions::preset(FreezeDuration::OneHour), now)?;
//!         coordinator.move_column(&drag.item, &drag.to, drag.freeze).await?;
//!     }
//!     DragResolution::Ready(drag) => {
//!         coordinator.move_column(&drag.item, &drag.to, None).await?;
//!     }
//!     DragResolution::Unchanged | DragResolution::Discarded => {}
//! }
//! ```

mod column;
mod drag;
mod machine;

pub use column::{ValidationResult, edited_column, is_hex_color, placeholder_column, validate_column};
pub use drag::{DragEnd, DragResolution, PendingFreeze, ResolvedDrag, resolve_drag};
pub use machine::{
    TEMP_COLUMN_PREFIX, TransitionKind, TransitionPlan, TriageStateMachine, freeze_deadline,
};
