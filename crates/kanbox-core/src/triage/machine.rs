//! Column transition rules.

use chrono::{DateTime, Utc};
use kanbox_api::{ColumnId, EmailId, FreezeOptions, KanbanBoard, KanbanItem};

use crate::cache::{Patch, Placement};
use crate::error::{TriageError, TriageResult, ValidationError};

/// Id prefix of columns created optimistically and not yet confirmed.
pub const TEMP_COLUMN_PREFIX: &str = "temp-";

/// What a planned transition does besides moving the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    /// Plain column change (including a manual drag out of Frozen).
    Move,
    /// Snooze into Frozen.
    Freeze {
        /// Resolved deadline.
        until: DateTime<Utc>,
        /// The user's choice, sent to the backend as-is.
        options: FreezeOptions,
    },
    /// Return from Frozen to the recorded previous column.
    Thaw,
}

/// A validated column change, ready to be applied to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Item being moved.
    pub email: EmailId,
    /// Column it leaves.
    pub from: ColumnId,
    /// Column it enters.
    pub to: ColumnId,
    /// Transition flavor.
    pub kind: TransitionKind,
    /// The item as it will sit in `to`.
    pub item: KanbanItem,
    /// Insertion position in `to`.
    pub index: usize,
}

impl TransitionPlan {
    /// Board patches realizing the transition.
    #[must_use]
    pub fn patches(&self) -> Vec<Patch> {
        vec![Patch::PlaceItem {
            email: self.email.clone(),
            column: self.to.clone(),
            index: self.index,
            placement: Placement::of(&self.item),
        }]
    }
}

/// Resolves the deadline of a snooze choice and checks it lies in the future.
///
/// # Errors
///
/// Returns [`ValidationError::MissingCustomDate`] for a custom choice without
/// a date, and [`ValidationError::PastSnoozeDate`] if the deadline is not
/// strictly after `now`.
pub fn freeze_deadline(
    options: &FreezeOptions,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ValidationError> {
    let until = options
        .deadline(now)
        .ok_or(ValidationError::MissingCustomDate)?;
    if until <= now {
        return Err(ValidationError::PastSnoozeDate);
    }
    Ok(until)
}

/// Applies the column rules to a board snapshot.
///
/// Every item lives in exactly one column. Only items in the Frozen column
/// carry a snooze deadline and a previous column key, and they always carry
/// both.
#[derive(Debug, Clone, Copy)]
pub struct TriageStateMachine<'a> {
    board: &'a KanbanBoard,
}

impl<'a> TriageStateMachine<'a> {
    /// Wraps a board snapshot.
    #[must_use]
    pub const fn new(board: &'a KanbanBoard) -> Self {
        Self { board }
    }

    /// Plans moving an item to another column.
    ///
    /// Returns `Ok(None)` when the item is already in `to`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the item or column is unknown, the
    /// column is still being created, or a move into Frozen lacks a valid
    /// snooze choice.
    pub fn plan_move(
        &self,
        email: &EmailId,
        to: &ColumnId,
        freeze: Option<&FreezeOptions>,
        now: DateTime<Utc>,
    ) -> TriageResult<Option<TransitionPlan>> {
        let item = self
            .board
            .item(email)
            .ok_or(ValidationError::UnknownEmail)?;
        let from = self
            .board
            .column_of(email)
            .ok_or(ValidationError::UnknownEmail)?;
        let target = self
            .board
            .column(to)
            .ok_or(ValidationError::UnknownColumn)?;
        if target.id.as_str().starts_with(TEMP_COLUMN_PREFIX) {
            return Err(ValidationError::ColumnNotReady.into());
        }
        if from == to {
            return Ok(None);
        }

        let source_key = self
            .board
            .column(from)
            .map_or_else(|| item.kanban_status.clone(), |c| c.key.clone());

        let mut moved = item.clone();
        moved.kanban_column_id = to.clone();
        moved.kanban_status = target.key.clone();
        moved.status_changed_at = Some(now);

        let kind = if target.key.is_frozen() {
            let options = *freeze.ok_or(ValidationError::MissingFreezeDuration)?;
            let until = freeze_deadline(&options, now)?;
            moved.snoozed_until = Some(until);
            moved.previous_kanban_status = Some(source_key);
            TransitionKind::Freeze { until, options }
        } else {
            moved.snoozed_until = None;
            moved.previous_kanban_status = None;
            TransitionKind::Move
        };

        Ok(Some(TransitionPlan {
            email: email.clone(),
            from: from.clone(),
            to: to.clone(),
            kind,
            item: moved,
            index: usize::MAX,
        }))
    }

    /// Plans returning a frozen item to the column it was frozen from.
    ///
    /// Returns `Ok(None)` when the item is not in the Frozen column (already
    /// moved out, deleted, or never frozen).
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::ConsistencyGap`] when the item has no recorded
    /// previous column, or that column no longer exists.
    pub fn plan_thaw(
        &self,
        email: &EmailId,
        now: DateTime<Utc>,
    ) -> TriageResult<Option<TransitionPlan>> {
        let Some(frozen) = self.board.frozen_column() else {
            return Ok(None);
        };
        let Some(item) = self.board.items(&frozen.id).iter().find(|i| &i.id == email) else {
            return Ok(None);
        };

        let previous = item.previous_kanban_status.clone().ok_or_else(|| {
            TriageError::ConsistencyGap(format!("{email} has no column to return to"))
        })?;
        let target = self
            .board
            .column_by_key(&previous)
            .filter(|c| !c.key.is_frozen())
            .ok_or_else(|| {
                TriageError::ConsistencyGap(format!(
                    "column {previous} for {email} no longer exists"
                ))
            })?;

        let mut thawed = item.clone();
        thawed.kanban_column_id = target.id.clone();
        thawed.kanban_status = previous;
        thawed.status_changed_at = Some(now);
        thawed.snoozed_until = None;
        thawed.previous_kanban_status = None;

        Ok(Some(TransitionPlan {
            email: email.clone(),
            from: frozen.id.clone(),
            to: target.id.clone(),
            kind: TransitionKind::Thaw,
            item: thawed,
            index: 0,
        }))
    }
}
