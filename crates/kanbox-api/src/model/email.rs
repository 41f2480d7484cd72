//! Email projections as they appear in list and detail views.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmailId, MailboxId};

/// Sender of an email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Display name (may be empty).
    #[serde(default)]
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Sender {
    /// Returns the display name, falling back to the address.
    #[must_use]
    pub fn display(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Summary of an email as shown in a paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    /// Unique identifier.
    pub id: EmailId,
    /// Message subject.
    #[serde(default)]
    pub subject: String,
    /// Sender.
    pub from: Sender,
    /// Compact preview of the body.
    #[serde(default)]
    pub preview: String,
    /// Message timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Whether the message is starred.
    pub is_starred: bool,
    /// Labels/mailboxes the email currently belongs to.
    #[serde(default, rename = "labelId")]
    pub label_ids: BTreeSet<MailboxId>,
}

impl EmailSummary {
    /// Returns true if the email carries the given label.
    #[must_use]
    pub fn has_label(&self, label: &MailboxId) -> bool {
        self.label_ids.contains(label)
    }
}

/// An email attachment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment identifier.
    pub id: String,
    /// Filename.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
}

/// Full email record as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDetail {
    /// Fields shared with the list projection.
    #[serde(flatten)]
    pub summary: EmailSummary,
    /// Recipients.
    #[serde(default)]
    pub to: Vec<Sender>,
    /// CC recipients.
    #[serde(default)]
    pub cc: Vec<Sender>,
    /// Raw body (HTML or text; rendering is a presentation concern).
    #[serde(default)]
    pub body: String,
    /// Attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// One page of a mailbox listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPage {
    /// Emails on this page.
    pub emails: Vec<EmailSummary>,
    /// Page number (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of emails matching the query.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl EmailPage {
    /// Finds an email on this page.
    #[must_use]
    pub fn find(&self, id: &EmailId) -> Option<&EmailSummary> {
        self.emails.iter().find(|e| &e.id == id)
    }

    /// Returns the position of an email on this page.
    #[must_use]
    pub fn position(&self, id: &EmailId) -> Option<usize> {
        self.emails.iter().position(|e| &e.id == id)
    }
}
