//! Kanban board model.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ColumnId, EmailId};

/// Stable key of a kanban column.
///
/// The five workflow keys are fixed; custom columns carry their own key,
/// derived from the backing label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnKey {
    /// Untriaged mail.
    Inbox,
    /// Mail to act on.
    Todo,
    /// Mail being worked on.
    Processing,
    /// Finished mail.
    Done,
    /// Snoozed mail with a deadline.
    Frozen,
    /// User-defined column backed by a label.
    Custom(String),
}

impl ColumnKey {
    /// Parse from the wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "INBOX" => Self::Inbox,
            "TODO" => Self::Todo,
            "PROCESSING" => Self::Processing,
            "DONE" => Self::Done,
            "FROZEN" => Self::Frozen,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Convert to the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "INBOX",
            Self::Todo => "TODO",
            Self::Processing => "PROCESSING",
            Self::Done => "DONE",
            Self::Frozen => "FROZEN",
            Self::Custom(key) => key,
        }
    }

    /// Returns true for the snooze column.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen)
    }
}

impl From<String> for ColumnKey {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ColumnKey> for String {
    fn from(key: ColumnKey) -> Self {
        key.as_str().to_string()
    }
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the triage board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    /// Column identifier.
    pub id: ColumnId,
    /// Stable key.
    pub key: ColumnKey,
    /// Display name.
    pub name: String,
    /// Icon (emoji or icon name).
    #[serde(default)]
    pub icon: String,
    /// Color as `#RRGGBB`.
    #[serde(default)]
    pub color: String,
    /// Position on the board.
    #[serde(default)]
    pub order: u32,
    /// System columns cannot be deleted.
    #[serde(default)]
    pub is_system_protected: bool,
    /// Number of items in the column.
    #[serde(default)]
    pub email_count: usize,
    /// Backing label name for custom columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmail_label_name: Option<String>,
}

impl KanbanColumn {
    /// Creates an empty column.
    #[must_use]
    pub fn new(id: impl Into<String>, key: ColumnKey, name: impl Into<String>) -> Self {
        Self {
            id: ColumnId::new(id),
            key,
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            order: 0,
            is_system_protected: false,
            email_count: 0,
            gmail_label_name: None,
        }
    }
}

/// An email as it sits on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanItem {
    /// Email identifier.
    pub id: EmailId,
    /// Subject.
    #[serde(default)]
    pub subject: String,
    /// Sender display string.
    #[serde(default)]
    pub from: String,
    /// Body preview.
    #[serde(default)]
    pub snippet: String,
    /// Message date.
    pub date: DateTime<Utc>,
    /// Whether the email has been read.
    #[serde(default)]
    pub is_read: bool,
    /// Whether the email has attachments.
    #[serde(default)]
    pub has_attachments: bool,
    /// Column currently holding the item.
    pub kanban_column_id: ColumnId,
    /// Key of the column currently holding the item.
    pub kanban_status: ColumnKey,
    /// When the item last changed column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<DateTime<Utc>>,
    /// Snooze deadline, present only while frozen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snoozed_until: Option<DateTime<Utc>>,
    /// Column key to return to when thawed, present only while frozen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_kanban_status: Option<ColumnKey>,
}

impl KanbanItem {
    /// Returns true if the item carries a snooze record.
    #[must_use]
    pub const fn is_snoozed(&self) -> bool {
        self.snoozed_until.is_some() && self.previous_kanban_status.is_some()
    }
}

/// Snapshot of the whole board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanBoard {
    /// Columns in display order.
    pub columns: Vec<KanbanColumn>,
    /// Items per column id, in display order.
    pub emails: BTreeMap<ColumnId, Vec<KanbanItem>>,
}

impl KanbanBoard {
    /// Looks up a column by id.
    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Looks up a column by key.
    #[must_use]
    pub fn column_by_key(&self, key: &ColumnKey) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| &c.key == key)
    }

    /// The snooze column, if the board has one.
    #[must_use]
    pub fn frozen_column(&self) -> Option<&KanbanColumn> {
        self.column_by_key(&ColumnKey::Frozen)
    }

    /// Returns true if the column exists and is the snooze column.
    #[must_use]
    pub fn is_frozen_column(&self, id: &ColumnId) -> bool {
        self.column(id).is_some_and(|c| c.key.is_frozen())
    }

    /// Items of a column (empty if unknown).
    #[must_use]
    pub fn items(&self, column: &ColumnId) -> &[KanbanItem] {
        self.emails.get(column).map_or(&[], Vec::as_slice)
    }

    /// Finds the column holding an item.
    #[must_use]
    pub fn column_of(&self, item: &EmailId) -> Option<&ColumnId> {
        self.emails
            .iter()
            .find(|(_, items)| items.iter().any(|i| &i.id == item))
            .map(|(column, _)| column)
    }

    /// Finds an item anywhere on the board.
    #[must_use]
    pub fn item(&self, id: &EmailId) -> Option<&KanbanItem> {
        self.emails.values().flatten().find(|i| &i.id == id)
    }

    /// Returns true if any column holds the item.
    #[must_use]
    pub fn contains(&self, id: &EmailId) -> bool {
        self.item(id).is_some()
    }

    /// Rewrites every column's `email_count` from its item list.
    pub fn recount(&mut self) {
        for column in &mut self.columns {
            column.email_count = self.emails.get(&column.id).map_or(0, Vec::len);
        }
    }

    /// Checks the board invariants: item lists partition the email ids
    /// without duplicates, counts match list lengths, and only Frozen items
    /// carry a snooze record.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        for (column_id, items) in &self.emails {
            let Some(column) = self.column(column_id) else {
                if items.is_empty() {
                    continue;
                }
                return false;
            };
            if column.email_count != items.len() {
                return false;
            }
            for item in items {
                if !seen.insert(&item.id) {
                    return false;
                }
                if item.is_snoozed() != column.key.is_frozen() {
                    return false;
                }
            }
        }
        self.columns
            .iter()
            .all(|c| self.emails.contains_key(&c.id) || c.email_count == 0)
    }
}
