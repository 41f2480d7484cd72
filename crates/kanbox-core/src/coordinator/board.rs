//! Board moves, snooze transitions and column management.

use kanbox_api::{ColumnDraft, ColumnId, ColumnKey, EmailId, FreezeOptions, MailApi};
use tracing::{debug, info};

use super::{Action, ActionKind, ActionOutcome, Coordinator, Notification, PendingAction, Request};
use crate::cache::{Patch, Placement};
use crate::error::{TriageError, TriageResult, ValidationError};
use crate::triage::{
    DragEnd, DragResolution, TEMP_COLUMN_PREFIX, TransitionKind, TransitionPlan,
    TriageStateMachine, edited_column, placeholder_column, resolve_drag, validate_column,
};

fn first_error(errors: Vec<ValidationError>) -> TriageError {
    errors
        .into_iter()
        .next()
        .unwrap_or(ValidationError::EmptyColumnName)
        .into()
}

impl<A: MailApi> Coordinator<A> {
    pub(super) fn prepare_move(
        &self,
        id: &EmailId,
        to: &ColumnId,
        freeze: Option<&FreezeOptions>,
    ) -> TriageResult<Option<PendingAction>> {
        let board = self.board().ok_or(ValidationError::NoBoard)?;
        let plan = TriageStateMachine::new(&board).plan_move(id, to, freeze, self.now())?;
        Ok(plan.map(|plan| self.apply_plan(plan)))
    }

    pub(super) fn prepare_thaw(&self, id: &EmailId) -> TriageResult<Option<PendingAction>> {
        let Some(board) = self.board() else {
            return Ok(None);
        };
        let plan = TriageStateMachine::new(&board).plan_thaw(id, self.now())?;
        Ok(plan.map(|plan| self.apply_plan(plan)))
    }

    fn apply_plan(&self, plan: TransitionPlan) -> PendingAction {
        let patches = plan.patches();
        let entries = self.inner.cache.entries();
        let tokens = self.patch_each(&entries, |_, entry| {
            if entry.as_board().is_some_and(|b| b.contains(&plan.email)) {
                patches.clone()
            } else {
                Vec::new()
            }
        });
        self.sync_timer(&plan.email);

        debug!("{} {} -> {}", plan.email, plan.from, plan.to);
        let id = plan.email;
        let (kind, request) = match plan.kind {
            TransitionKind::Move => (
                ActionKind::Move,
                Request::Move {
                    id: id.clone(),
                    column: plan.to,
                },
            ),
            TransitionKind::Freeze { options, .. } => (
                ActionKind::Freeze,
                Request::Freeze {
                    id: id.clone(),
                    options,
                },
            ),
            TransitionKind::Thaw => (ActionKind::Unfreeze, Request::Unfreeze { id: id.clone() }),
        };
        PendingAction::new(kind, Some(id), tokens, request)
    }

    pub(super) fn prepare_create_column(
        &self,
        draft: ColumnDraft,
    ) -> TriageResult<Option<PendingAction>> {
        validate_column(&draft, true).map_err(first_error)?;
        let board = self.board().ok_or(ValidationError::NoBoard)?;

        let order = u32::try_from(board.columns.len()).unwrap_or(u32::MAX);
        let column = placeholder_column(&draft, order, self.now());
        let placeholder = column.id.clone();
        let tokens = self.patch_boards(vec![Patch::InsertColumn {
            index: usize::MAX,
            column,
            items: Vec::new(),
        }]);

        Ok(Some(PendingAction::new(
            ActionKind::CreateColumn,
            None,
            tokens,
            Request::CreateColumn { placeholder, draft },
        )))
    }

    pub(super) fn prepare_update_column(
        &self,
        id: &ColumnId,
        draft: ColumnDraft,
    ) -> TriageResult<Option<PendingAction>> {
        validate_column(&draft, false).map_err(first_error)?;
        let board = self.board().ok_or(ValidationError::NoBoard)?;
        let column = board.column(id).ok_or(ValidationError::UnknownColumn)?;
        if id.as_str().starts_with(TEMP_COLUMN_PREFIX) {
            return Err(ValidationError::ColumnNotReady.into());
        }

        let edited = edited_column(column, &draft);
        if &edited == column {
            return Ok(None);
        }
        let tokens = self.patch_boards(vec![Patch::ReplaceColumn {
            id: id.clone(),
            column: edited,
        }]);

        Ok(Some(PendingAction::new(
            ActionKind::UpdateColumn,
            None,
            tokens,
            Request::UpdateColumn {
                id: id.clone(),
                draft,
            },
        )))
    }

    /// Items of the deleted column land at the end of Inbox.
    pub(super) fn prepare_delete_column(
        &self,
        id: &ColumnId,
    ) -> TriageResult<Option<PendingAction>> {
        let board = self.board().ok_or(ValidationError::NoBoard)?;
        let column = board.column(id).ok_or(ValidationError::UnknownColumn)?;
        if column.is_system_protected || matches!(column.key, ColumnKey::Inbox | ColumnKey::Frozen)
        {
            return Err(ValidationError::ProtectedColumn.into());
        }
        if id.as_str().starts_with(TEMP_COLUMN_PREFIX) {
            return Err(ValidationError::ColumnNotReady.into());
        }
        let inbox = board
            .column_by_key(&ColumnKey::Inbox)
            .ok_or(ValidationError::NoInboxColumn)?;

        let now = self.now();
        let mut patches: Vec<Patch> = board
            .items(id)
            .iter()
            .map(|item| Patch::PlaceItem {
                email: item.id.clone(),
                column: inbox.id.clone(),
                index: usize::MAX,
                placement: Placement {
                    status: ColumnKey::Inbox,
                    status_changed_at: Some(now),
                    snoozed_until: None,
                    previous_status: None,
                },
            })
            .collect();
        patches.push(Patch::RemoveColumn { column: id.clone() });
        let tokens = self.patch_boards(patches);

        Ok(Some(PendingAction::new(
            ActionKind::DeleteColumn,
            None,
            tokens,
            Request::DeleteColumn { id: id.clone() },
        )))
    }

    /// Flips an email's starred flag.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn toggle_star(&self, email: &EmailId) -> TriageResult<ActionOutcome> {
        self.run(Action::ToggleStar(email.clone())).await
    }

    /// Sets an email's read flag.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn set_read(&self, email: &EmailId, read: bool) -> TriageResult<ActionOutcome> {
        self.run(Action::SetRead {
            email: email.clone(),
            read,
        })
        .await
    }

    /// Flips an email's read flag.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn toggle_read(&self, email: &EmailId) -> TriageResult<ActionOutcome> {
        self.run(Action::ToggleRead(email.clone())).await
    }

    /// Deletes an email. Deleting an email that is already gone is a no-op.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn delete(&self, email: &EmailId) -> TriageResult<ActionOutcome> {
        self.run(Action::Delete(email.clone())).await
    }

    /// Moves a board item to another column.
    ///
    /// `freeze` is required when `to` is the Frozen column.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn move_column(
        &self,
        email: &EmailId,
        to: &ColumnId,
        freeze: Option<FreezeOptions>,
    ) -> TriageResult<ActionOutcome> {
        self.run(Action::MoveColumn {
            email: email.clone(),
            to: to.clone(),
            freeze,
        })
        .await
    }

    /// Returns a frozen item to the column it was frozen from, at the top.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::ConsistencyGap`] if that column was deleted;
    /// otherwise see [`Coordinator::run`].
    pub async fn move_out_of_frozen(&self, email: &EmailId) -> TriageResult<ActionOutcome> {
        self.run(Action::MoveOutOfFrozen(email.clone())).await
    }

    /// Thaws an item whose snooze ran out.
    ///
    /// A no-op if the item already left the Frozen column.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinator::move_out_of_frozen`].
    pub async fn expire_snooze(&self, email: &EmailId) -> TriageResult<ActionOutcome> {
        let outcome = self.move_out_of_frozen(email).await?;
        if outcome == ActionOutcome::Applied {
            info!("snooze of {} expired", email);
            self.notify(Notification::SnoozeExpired {
                email: email.clone(),
            });
        }
        Ok(outcome)
    }

    /// Applies a finished drag gesture.
    ///
    /// Drops onto Frozen use `freeze`; without one the drop is rejected and
    /// nothing moves.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing or past snooze choice;
    /// otherwise see [`Coordinator::run`].
    pub async fn drag_end(
        &self,
        event: &DragEnd,
        freeze: Option<FreezeOptions>,
    ) -> TriageResult<ActionOutcome> {
        let Some(board) = self.board() else {
            return Ok(ActionOutcome::NoOp);
        };
        let drag = match resolve_drag(&board, event) {
            DragResolution::Discarded | DragResolution::Unchanged => {
                return Ok(ActionOutcome::NoOp);
            }
            DragResolution::Ready(drag) => drag,
            DragResolution::NeedsFreezeDuration(pending) => {
                let completed = freeze
                    .ok_or(ValidationError::MissingFreezeDuration)
                    .and_then(|options| pending.complete(options, self.now()));
                match completed {
                    Ok(drag) => drag,
                    Err(invalid) => {
                        let error = TriageError::from(invalid);
                        self.report(ActionKind::Freeze, Some(&pending.item), &error);
                        return Err(error);
                    }
                }
            }
        };
        self.move_column(&drag.item, &drag.to, drag.freeze).await
    }

    /// Creates a custom column. A placeholder shows until the server answers.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn create_column(&self, draft: ColumnDraft) -> TriageResult<ActionOutcome> {
        self.run(Action::CreateColumn(draft)).await
    }

    /// Edits a custom column.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn update_column(
        &self,
        id: &ColumnId,
        draft: ColumnDraft,
    ) -> TriageResult<ActionOutcome> {
        self.run(Action::UpdateColumn {
            id: id.clone(),
            draft,
        })
        .await
    }

    /// Deletes a custom column, moving its items to Inbox.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn delete_column(&self, id: &ColumnId) -> TriageResult<ActionOutcome> {
        self.run(Action::DeleteColumn(id.clone())).await
    }
}
