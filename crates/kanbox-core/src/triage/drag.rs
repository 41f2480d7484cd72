//! Turns a raw drag-and-drop gesture into a column move.

use chrono::{DateTime, Utc};
use kanbox_api::{ColumnId, EmailId, FreezeOptions, KanbanBoard};
use tracing::debug;

use super::machine::freeze_deadline;
use crate::error::ValidationError;

/// A finished drag gesture.
///
/// `active` is the dragged item's id. `over` is whatever the pointer was
/// released on: a column id, an item id, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    /// Dragged item.
    pub active: String,
    /// Drop target.
    pub over: Option<String>,
}

impl DragEnd {
    /// A drop onto a column or item.
    #[must_use]
    pub fn onto(active: impl Into<String>, over: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            over: Some(over.into()),
        }
    }

    /// A drop outside any target.
    #[must_use]
    pub fn cancelled(active: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            over: None,
        }
    }
}

/// A resolved move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDrag {
    /// Item being moved.
    pub item: EmailId,
    /// Source column.
    pub from: ColumnId,
    /// Destination column.
    pub to: ColumnId,
    /// Snooze choice when `to` is Frozen.
    pub freeze: Option<FreezeOptions>,
}

/// A drop onto Frozen waiting for the user's snooze choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFreeze {
    /// Item being frozen.
    pub item: EmailId,
    /// Source column.
    pub from: ColumnId,
    /// The Frozen column.
    pub to: ColumnId,
}

impl PendingFreeze {
    /// Completes the drop with a snooze choice.
    ///
    /// The pending drop stays usable after an error, so the caller can ask
    /// again.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a custom date is missing or not in the
    /// future.
    pub fn complete(
        &self,
        options: FreezeOptions,
        now: DateTime<Utc>,
    ) -> Result<ResolvedDrag, ValidationError> {
        freeze_deadline(&options, now)?;
        Ok(ResolvedDrag {
            item: self.item.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            freeze: Some(options),
        })
    }
}

/// Outcome of resolving a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragResolution {
    /// No usable target, or the item is no longer on the board.
    Discarded,
    /// Dropped back onto its own column.
    Unchanged,
    /// Ready to hand to the coordinator.
    Ready(ResolvedDrag),
    /// Destination is Frozen; a snooze choice is needed first.
    NeedsFreezeDuration(PendingFreeze),
}

/// Resolves a drag gesture against a board snapshot.
///
/// The destination is the column named by `over`, or else the column holding
/// the item named by `over`. The function is pure: the board is not touched.
#[must_use]
pub fn resolve_drag(board: &KanbanBoard, event: &DragEnd) -> DragResolution {
    let Some(over) = event.over.as_deref() else {
        return DragResolution::Discarded;
    };
    let item = EmailId::new(event.active.as_str());
    let Some(from) = board.column_of(&item).cloned() else {
        debug!("drag of {} discarded: not on the board", item);
        return DragResolution::Discarded;
    };

    let over_column = ColumnId::new(over);
    let to = if board.column(&over_column).is_some() || board.emails.contains_key(&over_column) {
        over_column
    } else if let Some(column) = board.column_of(&EmailId::new(over)) {
        column.clone()
    } else {
        debug!("drag of {} discarded: unknown target {}", item, over);
        return DragResolution::Discarded;
    };

    if from == to {
        return DragResolution::Unchanged;
    }
    if board.is_frozen_column(&to) {
        return DragResolution::NeedsFreezeDuration(PendingFreeze { item, from, to });
    }
    DragResolution::Ready(ResolvedDrag {
        item,
        from,
        to,
        freeze: None,
    })
}
