//! Wire model shared between the collaborator API and the triage engine.
//!
//! Every payload uses `camelCase` field names, matching the JSON the
//! mail backend produces.

mod email;
mod kanban;
mod mailbox;
mod request;

pub use email::{Attachment, EmailDetail, EmailPage, EmailSummary, Sender};
pub use kanban::{ColumnKey, KanbanBoard, KanbanColumn, KanbanItem};
pub use mailbox::{Mailbox, MailboxKind};
pub use request::{
    BoardQuery, ColumnDraft, DEFAULT_PAGE_LIMIT, EmailListQuery, FreezeDuration, FreezeOptions,
    FreezeRequest, FreezeResponse,
    ModifyEmailRequest, ModifyFlags, MoveColumnRequest, MoveColumnResponse, SortOption,
};

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Server-assigned email identifier.
    EmailId
);
string_id!(
    /// Mailbox/label identifier (Gmail label semantics).
    MailboxId
);
string_id!(
    /// Kanban column identifier.
    ColumnId
);

impl MailboxId {
    /// The inbox system label.
    pub const INBOX: &'static str = "INBOX";
    /// Virtual label holding starred emails.
    pub const STARRED: &'static str = "STARRED";
    /// Drafts system label.
    pub const DRAFT: &'static str = "DRAFT";
    /// Sent system label.
    pub const SENT: &'static str = "SENT";
    /// Trash system label.
    pub const TRASH: &'static str = "TRASH";

    /// The `STARRED` virtual label.
    #[must_use]
    pub fn starred() -> Self {
        Self::new(Self::STARRED)
    }

    /// Returns true if this is the `STARRED` virtual label.
    #[must_use]
    pub fn is_starred(&self) -> bool {
        self.0 == Self::STARRED
    }
}

/// Standard success envelope returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Payload.
    pub data: Option<T>,
}

/// Error envelope returned by the backend on failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Machine-readable error code.
    #[serde(default)]
    pub error_code: Option<String>,
    /// HTTP status code echoed by the server.
    #[serde(default)]
    pub status_code: Option<u16>,
}
