//! Optimistic mutation coordinator.
//!
//! Every user action runs in two phases:
//!
//! 1. [`Coordinator::prepare`] validates the action against the cache,
//!    applies its patches to every affected view and returns a
//!    [`PendingAction`] holding the undo tokens. This step is synchronous,
//!    so actions are patched in the order they were issued.
//! 2. [`Coordinator::confirm`] sends the request. On success the server's
//!    authoritative values are written over the guess; on failure this
//!    action's patches are undone and a [`Notification`] is broadcast.
//!
//! [`Coordinator::run`] does both. Actions on different emails never wait
//! for each other; each one rolls back on its own. Actions on the same
//! email settle in issue order: a failed action never overwrites what a
//! later action on the same field did.

mod board;
mod flags;
mod ledger;
mod load;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use kanbox_api::{
    BoardQuery, ColumnDraft, ColumnId, EmailId, EmailSummary, FreezeOptions, FreezeResponse,
    KanbanBoard, KanbanColumn, MailApi, Mailbox, ModifyEmailRequest, MoveColumnResponse,
};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CachedEntry, EntityCache, Patch, UndoToken};
use crate::clock::{Clock, SystemClock};
use crate::error::{TriageError, TriageResult};
use crate::snooze::SnoozeTimers;
use ledger::{Field, Ledger, Revert, Rollback};

const NOTIFICATION_CAPACITY: usize = 64;

/// Kind of user action, for logs and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Star an email.
    Star,
    /// Remove a star.
    Unstar,
    /// Mark as read.
    MarkRead,
    /// Mark as unread.
    MarkUnread,
    /// Delete an email.
    Delete,
    /// Move between board columns.
    Move,
    /// Snooze into Frozen.
    Freeze,
    /// Return from Frozen.
    Unfreeze,
    /// Create a custom column.
    CreateColumn,
    /// Edit a custom column.
    UpdateColumn,
    /// Delete a custom column.
    DeleteColumn,
}

impl ActionKind {
    /// Human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Star => "Star",
            Self::Unstar => "Unstar",
            Self::MarkRead => "Mark read",
            Self::MarkUnread => "Mark unread",
            Self::Delete => "Delete",
            Self::Move => "Move",
            Self::Freeze => "Freeze",
            Self::Unfreeze => "Unfreeze",
            Self::CreateColumn => "Create column",
            Self::UpdateColumn => "Update column",
            Self::DeleteColumn => "Delete column",
        }
    }

    /// Part of the email the action changes; `None` for column actions.
    const fn field(self) -> Option<Field> {
        match self {
            Self::Star | Self::Unstar => Some(Field::Starred),
            Self::MarkRead | Self::MarkUnread => Some(Field::Read),
            Self::Delete => Some(Field::Presence),
            Self::Move | Self::Freeze | Self::Unfreeze => Some(Field::Placement),
            Self::CreateColumn | Self::UpdateColumn | Self::DeleteColumn => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Flip the starred flag.
    ToggleStar(EmailId),
    /// Set the read flag.
    SetRead {
        /// Target email.
        email: EmailId,
        /// New state.
        read: bool,
    },
    /// Flip the read flag.
    ToggleRead(EmailId),
    /// Delete an email.
    Delete(EmailId),
    /// Move a board item; `freeze` is required when `to` is Frozen.
    MoveColumn {
        /// Item to move.
        email: EmailId,
        /// Destination column.
        to: ColumnId,
        /// Snooze choice.
        freeze: Option<FreezeOptions>,
    },
    /// Return a frozen item to its previous column.
    MoveOutOfFrozen(EmailId),
    /// Create a custom column.
    CreateColumn(ColumnDraft),
    /// Edit a custom column.
    UpdateColumn {
        /// Column to edit.
        id: ColumnId,
        /// New fields.
        draft: ColumnDraft,
    },
    /// Delete a custom column, moving its items to Inbox.
    DeleteColumn(ColumnId),
}

impl Action {
    /// Kind reported when the action is rejected before it is prepared.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::ToggleStar(_) => ActionKind::Star,
            Self::SetRead { read: false, .. } => ActionKind::MarkUnread,
            Self::SetRead { read: true, .. } | Self::ToggleRead(_) => ActionKind::MarkRead,
            Self::Delete(_) => ActionKind::Delete,
            Self::MoveColumn { freeze: Some(_), .. } => ActionKind::Freeze,
            Self::MoveColumn { freeze: None, .. } => ActionKind::Move,
            Self::MoveOutOfFrozen(_) => ActionKind::Unfreeze,
            Self::CreateColumn(_) => ActionKind::CreateColumn,
            Self::UpdateColumn { .. } => ActionKind::UpdateColumn,
            Self::DeleteColumn(_) => ActionKind::DeleteColumn,
        }
    }

    /// Email the action targets.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailId> {
        match self {
            Self::ToggleStar(email)
            | Self::SetRead { email, .. }
            | Self::ToggleRead(email)
            | Self::Delete(email)
            | Self::MoveColumn { email, .. }
            | Self::MoveOutOfFrozen(email) => Some(email),
            Self::CreateColumn(_) | Self::UpdateColumn { .. } | Self::DeleteColumn(_) => None,
        }
    }
}

/// Whether an action changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Patched and confirmed by the server.
    Applied,
    /// Nothing to do; no patch was applied and no request was sent.
    NoOp,
}

/// User-facing event for a toast or status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// An action was rejected or rolled back.
    ActionFailed {
        /// Action that failed.
        action: ActionKind,
        /// Email it targeted.
        email: Option<EmailId>,
        /// Message to show.
        message: String,
    },
    /// A snooze ran out and the item went back to its column.
    SnoozeExpired {
        /// Thawed item.
        email: EmailId,
    },
}

/// The network half of an action.
#[derive(Debug, Clone)]
enum Request {
    Modify {
        id: EmailId,
        body: ModifyEmailRequest,
    },
    Move {
        id: EmailId,
        column: ColumnId,
    },
    Freeze {
        id: EmailId,
        options: FreezeOptions,
    },
    Unfreeze {
        id: EmailId,
    },
    CreateColumn {
        placeholder: ColumnId,
        draft: ColumnDraft,
    },
    UpdateColumn {
        id: ColumnId,
        draft: ColumnDraft,
    },
    DeleteColumn {
        id: ColumnId,
    },
}

/// What the server answered.
enum Reply {
    Email(Option<EmailSummary>),
    Moved(MoveColumnResponse),
    Frozen {
        id: EmailId,
        response: FreezeResponse,
    },
    Column {
        replaces: ColumnId,
        column: KanbanColumn,
    },
    Done,
}

/// An action whose patches are applied and whose request is not yet sent.
#[derive(Debug)]
#[must_use = "a pending action must be confirmed, or its patches stay unconfirmed"]
pub struct PendingAction {
    kind: ActionKind,
    email: Option<EmailId>,
    tokens: Vec<UndoToken>,
    request: Request,
    seq: Option<u64>,
    revert: Option<Revert>,
}

impl PendingAction {
    const fn new(
        kind: ActionKind,
        email: Option<EmailId>,
        tokens: Vec<UndoToken>,
        request: Request,
    ) -> Self {
        Self {
            kind,
            email,
            tokens,
            request,
            seq: None,
            revert: None,
        }
    }

    const fn reverting(mut self, revert: Revert) -> Self {
        self.revert = Some(revert);
        self
    }

    /// Kind of action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Email the action targets.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailId> {
        self.email.as_ref()
    }

    /// Keys the action patched.
    #[must_use]
    pub fn patched_keys(&self) -> Vec<&CacheKey> {
        self.tokens.iter().map(UndoToken::key).collect()
    }
}

/// Result of a fan-out over several emails.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Confirmed by the server.
    pub applied: Vec<EmailId>,
    /// Already in the requested state.
    pub unchanged: Vec<EmailId>,
    /// Rejected or rolled back, with the reason.
    pub failed: Vec<(EmailId, TriageError)>,
}

impl BatchOutcome {
    /// Returns true if no email failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

struct Shared<A> {
    api: A,
    cache: EntityCache,
    timers: SnoozeTimers,
    clock: Arc<dyn Clock>,
    board_query: Mutex<Option<BoardQuery>>,
    ledger: Mutex<Ledger>,
    notifications: broadcast::Sender<Notification>,
}

/// Applies user actions optimistically and reconciles them with the server.
pub struct Coordinator<A> {
    inner: Arc<Shared<A>>,
}

impl<A> Clone for Coordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for Coordinator<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("cache", &self.inner.cache)
            .field("timers", &self.inner.timers.len())
            .finish_non_exhaustive()
    }
}

impl<A: MailApi> Coordinator<A> {
    /// Creates a coordinator using the system clock.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    /// Creates a coordinator with an explicit clock.
    #[must_use]
    pub fn with_clock(api: A, clock: Arc<dyn Clock>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            inner: Arc::new(Shared {
                api,
                cache: EntityCache::new(),
                timers: SnoozeTimers::new(),
                clock,
                board_query: Mutex::new(None),
                ledger: Mutex::new(Ledger::default()),
                notifications,
            }),
        }
    }

    /// The shared cache.
    #[must_use]
    pub fn cache(&self) -> &EntityCache {
        &self.inner.cache
    }

    /// The snooze timer registry.
    #[must_use]
    pub fn timers(&self) -> &SnoozeTimers {
        &self.inner.timers
    }

    /// The backend client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Current time according to the coordinator's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Subscribes to failure and expiry notifications.
    #[must_use]
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifications.subscribe()
    }

    fn board_query(&self) -> MutexGuard<'_, Option<BoardQuery>> {
        self.inner
            .board_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache key of the board currently on screen.
    #[must_use]
    pub fn board_key(&self) -> Option<CacheKey> {
        self.board_query().clone().map(CacheKey::Board)
    }

    /// The board currently on screen.
    #[must_use]
    pub fn board(&self) -> Option<KanbanBoard> {
        let key = self.board_key()?;
        match self.inner.cache.get(&key)? {
            CachedEntry::Board(board) => Some(board),
            _ => None,
        }
    }

    /// The cached mailbox list.
    #[must_use]
    pub fn mailboxes(&self) -> Option<Vec<Mailbox>> {
        match self.inner.cache.get(&CacheKey::Mailboxes)? {
            CachedEntry::Mailboxes(mailboxes) => Some(mailboxes),
            _ => None,
        }
    }

    /// A cached mailbox by id.
    #[must_use]
    pub fn mailbox(&self, id: &str) -> Option<Mailbox> {
        self.mailboxes()?.into_iter().find(|m| m.id.as_str() == id)
    }

    /// Applies an action's patches and returns it ready to confirm.
    ///
    /// Returns `Ok(None)` when the action would change nothing.
    ///
    /// # Errors
    ///
    /// Returns a validation error or [`TriageError::ConsistencyGap`]; in
    /// both cases nothing was patched.
    pub fn prepare(&self, action: Action) -> TriageResult<Option<PendingAction>> {
        let mut ledger = self.ledger();
        let pending = match action {
            Action::ToggleStar(email) => self.prepare_toggle_star(&email),
            Action::SetRead { email, read } => self.prepare_set_read(&email, Some(read)),
            Action::ToggleRead(email) => self.prepare_set_read(&email, None),
            Action::Delete(email) => self.prepare_delete(&email),
            Action::MoveColumn { email, to, freeze } => {
                self.prepare_move(&email, &to, freeze.as_ref())
            }
            Action::MoveOutOfFrozen(email) => self.prepare_thaw(&email),
            Action::CreateColumn(draft) => self.prepare_create_column(draft),
            Action::UpdateColumn { id, draft } => self.prepare_update_column(&id, draft),
            Action::DeleteColumn(id) => self.prepare_delete_column(&id),
        }?;
        Ok(pending.map(|mut pending| {
            if let (Some(email), Some(field)) = (&pending.email, pending.kind.field()) {
                pending.seq = Some(ledger.issue(email, field));
            }
            pending
        }))
    }

    /// Sends a prepared action and settles it.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Transaction`] after rolling back when the
    /// server refuses or cannot be reached.
    pub async fn confirm(&self, pending: PendingAction) -> TriageResult<ActionOutcome> {
        let kind = pending.kind;
        let email = pending.email.clone();

        match self.send(&pending.request).await {
            Ok(reply) => {
                self.settle(&pending, reply);
                if let Some(id) = &email {
                    self.sync_timer(id);
                }
                info!("{} confirmed ({})", kind, describe(email.as_ref()));
                Ok(ActionOutcome::Applied)
            }
            Err(source) => {
                warn!(
                    "{} failed ({}), reverting: {}",
                    kind,
                    describe(email.as_ref()),
                    source
                );
                self.roll_back(pending);
                if let Some(id) = &email {
                    self.sync_timer(id);
                }
                let error = TriageError::Transaction {
                    action: kind,
                    source,
                };
                self.report(kind, email.as_ref(), &error);
                Err(error)
            }
        }
    }

    /// Prepares and confirms an action.
    ///
    /// # Errors
    ///
    /// Returns the validation, consistency or transaction error; every
    /// failure is also broadcast as a [`Notification`].
    pub async fn run(&self, action: Action) -> TriageResult<ActionOutcome> {
        let kind = action.kind();
        let email = action.email().cloned();
        match self.prepare(action) {
            Ok(Some(pending)) => self.confirm(pending).await,
            Ok(None) => {
                debug!("{} skipped, nothing to change ({})", kind, describe(email.as_ref()));
                Ok(ActionOutcome::NoOp)
            }
            Err(error) => {
                self.report(kind, email.as_ref(), &error);
                Err(error)
            }
        }
    }

    fn report(&self, action: ActionKind, email: Option<&EmailId>, error: &TriageError) {
        // No receivers is fine: nobody is showing toasts.
        let _ = self.inner.notifications.send(Notification::ActionFailed {
            action,
            email: email.cloned(),
            message: error.to_string(),
        });
    }

    fn notify(&self, notification: Notification) {
        let _ = self.inner.notifications.send(notification);
    }

    async fn send(&self, request: &Request) -> kanbox_api::Result<Reply> {
        let api = &self.inner.api;
        Ok(match request {
            Request::Modify { id, body } => Reply::Email(api.modify_email(id, body).await?),
            Request::Move { id, column } => Reply::Moved(api.move_to_column(id, column).await?),
            Request::Freeze { id, options } => Reply::Frozen {
                id: id.clone(),
                response: api.freeze(id, options).await?,
            },
            Request::Unfreeze { id } => {
                api.unfreeze(id).await?;
                Reply::Done
            }
            Request::CreateColumn { placeholder, draft } => Reply::Column {
                replaces: placeholder.clone(),
                column: api.create_column(draft).await?,
            },
            Request::UpdateColumn { id, draft } => Reply::Column {
                replaces: id.clone(),
                column: api.update_column(id, draft).await?,
            },
            Request::DeleteColumn { id } => {
                api.delete_column(id).await?;
                Reply::Done
            }
        })
    }

    /// Records a confirmed action and reconciles its reply.
    fn settle(&self, pending: &PendingAction, reply: Reply) {
        let mut ledger = self.ledger();
        let latest = match (&pending.email, pending.seq) {
            (Some(email), Some(seq)) => {
                let latest = ledger.is_latest(email, seq);
                ledger.confirm(email, seq);
                latest
            }
            _ => true,
        };
        self.reconcile(reply, pending.kind.field(), latest);
    }

    /// Takes a failed action back, unless a later action on the same field
    /// already replaced what it did.
    fn roll_back(&self, pending: PendingAction) {
        let PendingAction {
            kind,
            email,
            tokens,
            seq,
            revert,
            ..
        } = pending;
        let (Some(email), Some(seq), Some(field)) = (email, seq, kind.field()) else {
            for token in tokens.into_iter().rev() {
                self.inner.cache.undo(token);
            }
            return;
        };

        let mut ledger = self.ledger();
        let due = ledger.fail(Rollback {
            seq,
            email,
            field,
            tokens,
            revert,
        });
        if due.is_empty() {
            debug!("{} rollback deferred to a later action", kind);
        }
        for step in due {
            if step.exact {
                for token in step.rollback.tokens.into_iter().rev() {
                    self.inner.cache.undo(token);
                }
            } else {
                self.compensate(step.rollback);
            }
        }
    }

    /// Writes server values over the optimistic guess. These patches are
    /// final, so their undo tokens are dropped.
    ///
    /// Per-email values are only written by the latest action on the email,
    /// and only for the field it changed.
    fn reconcile(&self, reply: Reply, field: Option<Field>, latest: bool) {
        match reply {
            Reply::Email(Some(summary)) if latest => {
                let id = summary.id.clone();
                let patch = match field {
                    Some(Field::Read) => Patch::SetRead {
                        email: id.clone(),
                        read: summary.is_read,
                    },
                    Some(Field::Starred) => Patch::SetStarred {
                        email: id.clone(),
                        starred: summary.is_starred,
                    },
                    _ => return,
                };
                let entries = self.inner.cache.entries();
                self.patch_each(&entries, |key, entry| {
                    if key == &CacheKey::Mailboxes || !entry.shows(&id) {
                        return Vec::new();
                    }
                    vec![patch.clone()]
                });
            }
            Reply::Moved(response) => {
                let counts = [response.source_label, response.destination_label]
                    .into_iter()
                    .flatten()
                    .map(|label| Patch::SetCounts {
                        mailbox: label.id,
                        unread: label.unread_count,
                        total: label.total_count,
                    });
                let _ = self.inner.cache.patch(&CacheKey::Mailboxes, counts);
            }
            Reply::Frozen { id, response } if latest => {
                if let Some(until) = response.snoozed_until {
                    self.patch_boards(vec![Patch::SetSnoozedUntil {
                        email: id,
                        until: Some(until),
                    }]);
                }
            }
            Reply::Column { replaces, column } => {
                self.patch_boards(vec![Patch::ReplaceColumn {
                    id: replaces,
                    column,
                }]);
            }
            Reply::Email(_) | Reply::Frozen { .. } | Reply::Done => {}
        }
    }

    /// Applies per-entry patches over a snapshot of the cache.
    fn patch_each(
        &self,
        entries: &[(CacheKey, CachedEntry)],
        build: impl Fn(&CacheKey, &CachedEntry) -> Vec<Patch>,
    ) -> Vec<UndoToken> {
        entries
            .iter()
            .filter_map(|(key, entry)| {
                let patches = build(key, entry);
                if patches.is_empty() {
                    None
                } else {
                    self.inner.cache.patch(key, patches)
                }
            })
            .collect()
    }

    /// Applies the same patches to every cached board.
    fn patch_boards(&self, patches: Vec<Patch>) -> Vec<UndoToken> {
        let entries = self.inner.cache.entries();
        self.patch_each(&entries, |key, _| {
            if key.is_board() {
                patches.clone()
            } else {
                Vec::new()
            }
        })
    }

    /// Starts or stops an item's snooze timer to match the board on screen.
    fn sync_timer(&self, email: &EmailId) {
        match self.board() {
            Some(board) => self.inner.timers.sync_item(&board, email),
            None => {
                self.inner.timers.cancel(email);
            }
        }
    }
}

impl<A: MailApi + 'static> Coordinator<A> {
    /// Prepares one action per email in order, then confirms them
    /// concurrently. Each email succeeds or rolls back on its own.
    pub async fn run_batch(
        &self,
        emails: &[EmailId],
        make_action: impl Fn(EmailId) -> Action,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut confirmations = JoinSet::new();

        for email in emails {
            let action = make_action(email.clone());
            let kind = action.kind();
            match self.prepare(action) {
                Ok(Some(pending)) => {
                    let coordinator = self.clone();
                    let email = email.clone();
                    confirmations.spawn(async move {
                        let result = coordinator.confirm(pending).await;
                        (email, result)
                    });
                }
                Ok(None) => outcome.unchanged.push(email.clone()),
                Err(error) => {
                    self.report(kind, Some(email), &error);
                    outcome.failed.push((email.clone(), error));
                }
            }
        }

        while let Some(joined) = confirmations.join_next().await {
            match joined {
                Ok((email, Ok(_))) => outcome.applied.push(email),
                Ok((email, Err(error))) => outcome.failed.push((email, error)),
                Err(join_error) => warn!("batch confirmation aborted: {}", join_error),
            }
        }

        info!(
            "batch settled: {} applied, {} unchanged, {} failed",
            outcome.applied.len(),
            outcome.unchanged.len(),
            outcome.failed.len()
        );
        outcome
    }

    /// Marks several emails read or unread.
    pub async fn mark_read_many(&self, emails: &[EmailId], read: bool) -> BatchOutcome {
        self.run_batch(emails, |email| Action::SetRead { email, read })
            .await
    }

    /// Deletes several emails.
    pub async fn delete_many(&self, emails: &[EmailId]) -> BatchOutcome {
        self.run_batch(emails, Action::Delete).await
    }
}

fn describe(email: Option<&EmailId>) -> String {
    email.map_or_else(|| "board".to_string(), |id| format!("email {id}"))
}
