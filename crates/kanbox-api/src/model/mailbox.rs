//! Mailbox (label) model.

use serde::{Deserialize, Serialize};

use super::MailboxId;

/// Whether a label is provided by the mail system or created by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailboxKind {
    /// System-protected label (Inbox, Sent, Trash, ...).
    System,
    /// User-defined label.
    #[default]
    User,
}

/// A mailbox/label with its counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mailbox {
    /// Label identifier.
    pub id: MailboxId,
    /// Display name.
    pub name: String,
    /// System or user label.
    #[serde(rename = "type", default)]
    pub kind: MailboxKind,
    /// Number of unread emails.
    #[serde(default)]
    pub unread_count: u32,
    /// Total number of emails.
    #[serde(default)]
    pub total_count: u32,
    /// Label color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Mailbox {
    /// Creates a mailbox with zeroed counters.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: MailboxKind) -> Self {
        Self {
            id: MailboxId::new(id),
            name: name.into(),
            kind,
            unread_count: 0,
            total_count: 0,
            color: None,
        }
    }

    /// Sets both counters.
    #[must_use]
    pub const fn with_counts(mut self, unread: u32, total: u32) -> Self {
        self.unread_count = unread;
        self.total_count = total;
        self
    }

    /// Drafts, Sent and Trash show how many emails they hold rather than
    /// how many are unread.
    #[must_use]
    pub fn displays_total(&self) -> bool {
        matches!(
            self.id.as_str(),
            MailboxId::DRAFT | MailboxId::SENT | MailboxId::TRASH
        )
    }

    /// The counter shown next to the label in the folder list.
    #[must_use]
    pub fn display_count(&self) -> u32 {
        if self.displays_total() {
            self.total_count
        } else {
            self.unread_count
        }
    }

    /// Returns true if this label is system-protected.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self.kind, MailboxKind::System)
    }
}
