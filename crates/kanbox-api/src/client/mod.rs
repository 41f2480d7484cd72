//! The collaborator contract consumed by the triage engine.

mod http;

pub use http::HttpMailApi;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    BoardQuery, ColumnDraft, ColumnId, EmailDetail, EmailId, EmailListQuery, EmailPage,
    EmailSummary, FreezeRequest, FreezeResponse, KanbanBoard, KanbanColumn, Mailbox,
    ModifyEmailRequest, MoveColumnResponse,
};

/// Mail backend operations the triage engine depends on.
///
/// Timeouts and retries are the implementation's concern; every failure
/// surfaces as an [`Error`](crate::Error).
#[async_trait]
pub trait MailApi: Send + Sync {
    /// Lists every mailbox/label with its counters.
    async fn list_mailboxes(&self) -> Result<Vec<Mailbox>>;

    /// Fetches one page of a mailbox.
    async fn list_emails(&self, query: &EmailListQuery) -> Result<EmailPage>;

    /// Fetches a single email.
    async fn get_email(&self, id: &EmailId) -> Result<EmailDetail>;

    /// Changes read/starred/deleted flags; returns the updated projection
    /// when the server sends one.
    async fn modify_email(
        &self,
        id: &EmailId,
        request: &ModifyEmailRequest,
    ) -> Result<Option<EmailSummary>>;

    /// Fetches the kanban board.
    async fn get_board(&self, query: &BoardQuery) -> Result<KanbanBoard>;

    /// Moves an email to another column.
    async fn move_to_column(&self, id: &EmailId, column: &ColumnId) -> Result<MoveColumnResponse>;

    /// Snoozes an email into the Frozen column.
    async fn freeze(&self, id: &EmailId, request: &FreezeRequest) -> Result<FreezeResponse>;

    /// Returns a frozen email to its previous column.
    async fn unfreeze(&self, id: &EmailId) -> Result<()>;

    /// Creates a custom column.
    async fn create_column(&self, draft: &ColumnDraft) -> Result<KanbanColumn>;

    /// Updates a custom column.
    async fn update_column(&self, id: &ColumnId, draft: &ColumnDraft) -> Result<KanbanColumn>;

    /// Deletes a custom column.
    async fn delete_column(&self, id: &ColumnId) -> Result<()>;
}
