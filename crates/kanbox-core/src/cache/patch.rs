//! Typed, invertible cache mutations.
//!
//! Every optimistic change is expressed as a [`Patch`]. Applying a patch
//! returns the patch that undoes exactly what was changed, computed from the
//! state at apply time. Counter patches are deltas rather than absolute
//! values, so undoing one action never clobbers another action's effect on
//! the same counter.

use chrono::{DateTime, Utc};
use kanbox_api::{
    ColumnId, ColumnKey, EmailId, EmailPage, EmailSummary, KanbanBoard, KanbanColumn, KanbanItem,
    Mailbox, MailboxId,
};

use super::key::{CachedEmail, CachedEntry};

/// The board-status fields of an item. Flags and content are not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Key of the column the item sits in.
    pub status: ColumnKey,
    /// When the status last changed.
    pub status_changed_at: Option<DateTime<Utc>>,
    /// Snooze deadline, set only in Frozen.
    pub snoozed_until: Option<DateTime<Utc>>,
    /// Column key to return to, set only in Frozen.
    pub previous_status: Option<ColumnKey>,
}

impl Placement {
    /// Reads the placement of an item.
    #[must_use]
    pub fn of(item: &KanbanItem) -> Self {
        Self {
            status: item.kanban_status.clone(),
            status_changed_at: item.status_changed_at,
            snoozed_until: item.snoozed_until,
            previous_status: item.previous_kanban_status.clone(),
        }
    }

    /// Writes this placement into an item and returns the one it replaced.
    fn swap_into(self, item: &mut KanbanItem) -> Self {
        let previous = Self::of(item);
        item.kanban_status = self.status;
        item.status_changed_at = self.status_changed_at;
        item.snoozed_until = self.snoozed_until;
        item.previous_kanban_status = self.previous_status;
        previous
    }
}

/// A single mutation of a cached entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Adds `delta` to a mailbox's unread counter, clamped at zero.
    AdjustUnread {
        /// Mailbox to adjust.
        mailbox: MailboxId,
        /// Signed change.
        delta: i64,
    },
    /// Adds `delta` to a mailbox's total counter, clamped at zero.
    AdjustTotal {
        /// Mailbox to adjust.
        mailbox: MailboxId,
        /// Signed change.
        delta: i64,
    },
    /// Overwrites a mailbox's counters with server values.
    SetCounts {
        /// Mailbox to overwrite.
        mailbox: MailboxId,
        /// New unread counter.
        unread: u32,
        /// New total counter.
        total: u32,
    },
    /// Sets an email's read flag wherever it is shown.
    SetRead {
        /// Email to change.
        email: EmailId,
        /// New state.
        read: bool,
    },
    /// Sets an email's starred flag wherever it is shown.
    SetStarred {
        /// Email to change.
        email: EmailId,
        /// New state.
        starred: bool,
    },
    /// Adds or removes a label on an email.
    SetLabel {
        /// Email to change.
        email: EmailId,
        /// Label to toggle.
        label: MailboxId,
        /// Whether the label should be present.
        present: bool,
    },
    /// Removes an email from a listing page.
    RemoveEmail {
        /// Email to remove.
        email: EmailId,
    },
    /// Inserts an email into a listing page.
    InsertEmail {
        /// Position, clamped to the page length.
        index: usize,
        /// Email to insert.
        summary: EmailSummary,
    },
    /// Marks a detail view as deleted.
    SetDeleted {
        /// Email to change.
        email: EmailId,
        /// New state.
        deleted: bool,
    },
    /// Removes an item from whichever board column holds it.
    RemoveItem {
        /// Item to remove.
        email: EmailId,
    },
    /// Inserts an item into a board column.
    InsertItem {
        /// Destination column.
        column: ColumnId,
        /// Position, clamped to the column length.
        index: usize,
        /// Item to insert.
        item: KanbanItem,
    },
    /// Moves an item to a column position and sets its placement, leaving
    /// its flags as they are.
    PlaceItem {
        /// Item to move.
        email: EmailId,
        /// Destination column.
        column: ColumnId,
        /// Position, clamped to the column length.
        index: usize,
        /// Status fields it takes on.
        placement: Placement,
    },
    /// Sets a board item's snooze deadline.
    SetSnoozedUntil {
        /// Item to change.
        email: EmailId,
        /// New deadline.
        until: Option<DateTime<Utc>>,
    },
    /// Inserts a column together with its items.
    InsertColumn {
        /// Position, clamped to the column count.
        index: usize,
        /// Column to insert.
        column: KanbanColumn,
        /// Items it holds.
        items: Vec<KanbanItem>,
    },
    /// Removes a column and its items.
    RemoveColumn {
        /// Column to remove.
        column: ColumnId,
    },
    /// Replaces a column's definition; a changed id carries its items along.
    ReplaceColumn {
        /// Column to replace.
        id: ColumnId,
        /// New definition.
        column: KanbanColumn,
    },
}

impl Patch {
    /// Applies the patch, returning its inverse.
    ///
    /// Returns `None` when the patch changed nothing (target absent, flag
    /// already set, counter already clamped).
    pub(crate) fn apply(self, entry: &mut CachedEntry) -> Option<Self> {
        match entry {
            CachedEntry::Mailboxes(mailboxes) => self.apply_mailboxes(mailboxes),
            CachedEntry::Emails(page) => self.apply_page(page),
            CachedEntry::Email(email) => self.apply_email(email),
            CachedEntry::Board(board) => self.apply_board(board),
        }
    }

    fn apply_mailboxes(self, mailboxes: &mut [Mailbox]) -> Option<Self> {
        match self {
            Self::AdjustUnread { mailbox, delta } => {
                let target = mailboxes.iter_mut().find(|m| m.id == mailbox)?;
                let applied = adjust(&mut target.unread_count, delta);
                (applied != 0).then_some(Self::AdjustUnread {
                    mailbox,
                    delta: -applied,
                })
            }
            Self::AdjustTotal { mailbox, delta } => {
                let target = mailboxes.iter_mut().find(|m| m.id == mailbox)?;
                let applied = adjust(&mut target.total_count, delta);
                (applied != 0).then_some(Self::AdjustTotal {
                    mailbox,
                    delta: -applied,
                })
            }
            Self::SetCounts {
                mailbox,
                unread,
                total,
            } => {
                let target = mailboxes.iter_mut().find(|m| m.id == mailbox)?;
                if target.unread_count == unread && target.total_count == total {
                    return None;
                }
                let previous = Self::SetCounts {
                    mailbox,
                    unread: target.unread_count,
                    total: target.total_count,
                };
                target.unread_count = unread;
                target.total_count = total;
                Some(previous)
            }
            _ => None,
        }
    }

    fn apply_page(self, page: &mut EmailPage) -> Option<Self> {
        match self {
            Self::RemoveEmail { email } => {
                let index = page.position(&email)?;
                let summary = page.emails.remove(index);
                page.total = page.total.saturating_sub(1);
                Some(Self::InsertEmail { index, summary })
            }
            Self::InsertEmail { index, summary } => {
                if page.find(&summary.id).is_some() {
                    return None;
                }
                let email = summary.id.clone();
                page.emails.insert(index.min(page.emails.len()), summary);
                page.total = page.total.saturating_add(1);
                Some(Self::RemoveEmail { email })
            }
            Self::SetRead { .. } | Self::SetStarred { .. } | Self::SetLabel { .. } => {
                let target = page
                    .emails
                    .iter_mut()
                    .find(|e| Some(&e.id) == self.email())?;
                self.apply_summary(target)
            }
            _ => None,
        }
    }

    fn apply_email(self, cached: &mut CachedEmail) -> Option<Self> {
        if self.email() != Some(&cached.detail.summary.id) {
            return None;
        }
        match self {
            Self::SetDeleted { email, deleted } => {
                if cached.deleted == deleted {
                    return None;
                }
                cached.deleted = deleted;
                Some(Self::SetDeleted {
                    email,
                    deleted: !deleted,
                })
            }
            other => other.apply_summary(&mut cached.detail.summary),
        }
    }

    fn apply_summary(self, summary: &mut EmailSummary) -> Option<Self> {
        match self {
            Self::SetRead { email, read } => {
                if summary.is_read == read {
                    return None;
                }
                summary.is_read = read;
                Some(Self::SetRead { email, read: !read })
            }
            Self::SetStarred { email, starred } => {
                if summary.is_starred == starred {
                    return None;
                }
                summary.is_starred = starred;
                Some(Self::SetStarred {
                    email,
                    starred: !starred,
                })
            }
            Self::SetLabel {
                email,
                label,
                present,
            } => {
                let changed = if present {
                    summary.label_ids.insert(label.clone())
                } else {
                    summary.label_ids.remove(&label)
                };
                changed.then_some(Self::SetLabel {
                    email,
                    label,
                    present: !present,
                })
            }
            _ => None,
        }
    }

    fn apply_board(self, board: &mut KanbanBoard) -> Option<Self> {
        let inverse = match self {
            Self::SetRead { email, read } => {
                let item = item_mut(board, &email)?;
                if item.is_read == read {
                    return None;
                }
                item.is_read = read;
                Some(Self::SetRead { email, read: !read })
            }
            Self::SetSnoozedUntil { email, until } => {
                let item = item_mut(board, &email)?;
                if item.snoozed_until == until {
                    return None;
                }
                let previous = std::mem::replace(&mut item.snoozed_until, until);
                Some(Self::SetSnoozedUntil {
                    email,
                    until: previous,
                })
            }
            Self::RemoveItem { email } => {
                let (column, index) = locate(board, &email)?;
                let item = board.emails.get_mut(&column)?.remove(index);
                Some(Self::InsertItem {
                    column,
                    index,
                    item,
                })
            }
            Self::InsertItem {
                column,
                index,
                item,
            } => {
                if board.contains(&item.id) || board.column(&column).is_none() {
                    return None;
                }
                let email = item.id.clone();
                let items = board.emails.entry(column).or_default();
                items.insert(index.min(items.len()), item);
                Some(Self::RemoveItem { email })
            }
            Self::PlaceItem {
                email,
                column,
                index,
                placement,
            } => {
                board.column(&column)?;
                let (from, at) = locate(board, &email)?;
                let mut item = board.emails.get_mut(&from)?.remove(at);
                let previous = placement.swap_into(&mut item);
                item.kanban_column_id = column.clone();
                let items = board.emails.entry(column).or_default();
                items.insert(index.min(items.len()), item);
                Some(Self::PlaceItem {
                    email,
                    column: from,
                    index: at,
                    placement: previous,
                })
            }
            Self::InsertColumn {
                index,
                column,
                items,
            } => {
                if board.column(&column.id).is_some() {
                    return None;
                }
                let id = column.id.clone();
                board.emails.insert(id.clone(), items);
                board
                    .columns
                    .insert(index.min(board.columns.len()), column);
                Some(Self::RemoveColumn { column: id })
            }
            Self::RemoveColumn { column } => {
                let index = board.columns.iter().position(|c| c.id == column)?;
                let removed = board.columns.remove(index);
                let items = board.emails.remove(&column).unwrap_or_default();
                Some(Self::InsertColumn {
                    index,
                    column: removed,
                    items,
                })
            }
            Self::ReplaceColumn { id, column } => {
                let index = board.columns.iter().position(|c| c.id == id)?;
                if column.id != id && board.column(&column.id).is_some() {
                    return None;
                }
                let new_id = column.id.clone();
                let previous = std::mem::replace(&mut board.columns[index], column);
                if new_id != id {
                    let mut items = board.emails.remove(&id).unwrap_or_default();
                    for item in &mut items {
                        item.kanban_column_id = new_id.clone();
                    }
                    board.emails.insert(new_id.clone(), items);
                }
                Some(Self::ReplaceColumn {
                    id: new_id,
                    column: previous,
                })
            }
            _ => None,
        };
        board.recount();
        inverse
    }

    /// The email this patch targets, if any.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailId> {
        match self {
            Self::SetRead { email, .. }
            | Self::SetStarred { email, .. }
            | Self::SetLabel { email, .. }
            | Self::RemoveEmail { email }
            | Self::SetDeleted { email, .. }
            | Self::RemoveItem { email }
            | Self::PlaceItem { email, .. }
            | Self::SetSnoozedUntil { email, .. } => Some(email),
            Self::InsertEmail { summary, .. } => Some(&summary.id),
            Self::InsertItem { item, .. } => Some(&item.id),
            _ => None,
        }
    }

    /// Returns true for mailbox counter patches.
    #[must_use]
    pub const fn is_counter(&self) -> bool {
        matches!(
            self,
            Self::AdjustUnread { .. } | Self::AdjustTotal { .. } | Self::SetCounts { .. }
        )
    }
}

/// Adds a signed delta to a counter, clamping at the `u32` range.
/// Returns the delta actually applied.
fn adjust(counter: &mut u32, delta: i64) -> i64 {
    let current = i64::from(*counter);
    let next = (current + delta).clamp(0, i64::from(u32::MAX));
    *counter = u32::try_from(next).unwrap_or(u32::MAX);
    next - current
}

fn locate(board: &KanbanBoard, email: &EmailId) -> Option<(ColumnId, usize)> {
    board.emails.iter().find_map(|(column, items)| {
        items
            .iter()
            .position(|i| &i.id == email)
            .map(|index| (column.clone(), index))
    })
}

fn item_mut<'a>(board: &'a mut KanbanBoard, email: &EmailId) -> Option<&'a mut KanbanItem> {
    board.emails.values_mut().flatten().find(|i| &i.id == email)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use kanbox_api::{ColumnKey, MailboxKind, Sender};

    use super::*;

    fn mailboxes() -> CachedEntry {
        CachedEntry::Mailboxes(vec![
            Mailbox::new("INBOX", "Inbox", MailboxKind::System).with_counts(2, 10),
        ])
    }

    fn summary(id: &str) -> EmailSummary {
        EmailSummary {
            id: EmailId::new(id),
            subject: format!("Subject {id}"),
            from: Sender {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            preview: String::new(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            is_read: false,
            is_starred: false,
            label_ids: [MailboxId::new("INBOX")].into_iter().collect(),
        }
    }

    fn page(ids: &[&str]) -> CachedEntry {
        CachedEntry::Emails(EmailPage {
            emails: ids.iter().map(|id| summary(id)).collect(),
            page: 1,
            limit: 20,
            total: u32::try_from(ids.len()).unwrap(),
            total_pages: 1,
        })
    }

    fn item(id: &str, column: &str, key: ColumnKey) -> KanbanItem {
        KanbanItem {
            id: EmailId::new(id),
            subject: String::new(),
            from: String::new(),
            snippet: String::new(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            is_read: false,
            has_attachments: false,
            kanban_column_id: ColumnId::new(column),
            kanban_status: key,
            status_changed_at: None,
            snoozed_until: None,
            previous_kanban_status: None,
        }
    }

    fn board() -> CachedEntry {
        let mut board = KanbanBoard {
            columns: vec![
                KanbanColumn::new("c-inbox", ColumnKey::Inbox, "Inbox"),
                KanbanColumn::new("c-todo", ColumnKey::Todo, "Todo"),
            ],
            ..KanbanBoard::default()
        };
        board.emails.insert(
            ColumnId::new("c-inbox"),
            vec![
                item("a", "c-inbox", ColumnKey::Inbox),
                item("b", "c-inbox", ColumnKey::Inbox),
            ],
        );
        board.emails.insert(ColumnId::new("c-todo"), Vec::new());
        board.recount();
        CachedEntry::Board(board)
    }

    fn counts(entry: &CachedEntry) -> (u32, u32) {
        let inbox = &entry.as_mailboxes().unwrap()[0];
        (inbox.unread_count, inbox.total_count)
    }

    #[test]
    fn test_adjust_clamps_and_inverts_applied_delta() {
        let mut entry = mailboxes();
        let inverse = Patch::AdjustUnread {
            mailbox: MailboxId::new("INBOX"),
            delta: -5,
        }
        .apply(&mut entry)
        .unwrap();
        assert_eq!(counts(&entry), (0, 10));
        assert_eq!(
            inverse,
            Patch::AdjustUnread {
                mailbox: MailboxId::new("INBOX"),
                delta: 2
            }
        );

        inverse.apply(&mut entry).unwrap();
        assert_eq!(counts(&entry), (2, 10));
    }

    #[test]
    fn test_adjust_at_zero_is_noop() {
        let mut entry = CachedEntry::Mailboxes(vec![Mailbox::new(
            "INBOX",
            "Inbox",
            MailboxKind::System,
        )]);
        let inverse = Patch::AdjustUnread {
            mailbox: MailboxId::new("INBOX"),
            delta: -1,
        }
        .apply(&mut entry);
        assert!(inverse.is_none());
    }

    #[test]
    fn test_unknown_mailbox_is_ignored() {
        let mut entry = mailboxes();
        let before = entry.clone();
        let inverse = Patch::AdjustTotal {
            mailbox: MailboxId::new("Work"),
            delta: 1,
        }
        .apply(&mut entry);
        assert!(inverse.is_none());
        assert_eq!(entry, before);
    }

    #[test]
    fn test_set_counts_restores_previous() {
        let mut entry = mailboxes();
        let inverse = Patch::SetCounts {
            mailbox: MailboxId::new("INBOX"),
            unread: 7,
            total: 12,
        }
        .apply(&mut entry)
        .unwrap();
        assert_eq!(counts(&entry), (7, 12));
        inverse.apply(&mut entry).unwrap();
        assert_eq!(counts(&entry), (2, 10));
    }

    #[test]
    fn test_remove_then_restore_keeps_position() {
        let mut entry = page(&["a", "b", "c"]);
        let original = entry.clone();

        let inverse = Patch::RemoveEmail {
            email: EmailId::new("b"),
        }
        .apply(&mut entry)
        .unwrap();
        let listed = entry.as_page().unwrap();
        assert_eq!(listed.emails.len(), 2);
        assert_eq!(listed.total, 2);

        inverse.apply(&mut entry).unwrap();
        assert_eq!(entry, original);
    }

    #[test]
    fn test_insert_existing_email_is_noop() {
        let mut entry = page(&["a"]);
        let inverse = Patch::InsertEmail {
            index: 0,
            summary: summary("a"),
        }
        .apply(&mut entry);
        assert!(inverse.is_none());
        assert_eq!(entry.as_page().unwrap().emails.len(), 1);
    }

    #[test]
    fn test_flag_patches_on_page() {
        let mut entry = page(&["a"]);
        let read = Patch::SetRead {
            email: EmailId::new("a"),
            read: true,
        };
        let inverse = read.clone().apply(&mut entry).unwrap();
        assert!(entry.as_page().unwrap().emails[0].is_read);
        assert!(read.apply(&mut entry).is_none());
        inverse.apply(&mut entry).unwrap();
        assert!(!entry.as_page().unwrap().emails[0].is_read);

        Patch::SetLabel {
            email: EmailId::new("a"),
            label: MailboxId::starred(),
            present: true,
        }
        .apply(&mut entry)
        .unwrap();
        assert!(entry.as_page().unwrap().emails[0].has_label(&MailboxId::starred()));
    }

    #[test]
    fn test_detail_tombstone() {
        let detail = kanbox_api::EmailDetail {
            summary: summary("a"),
            to: Vec::new(),
            cc: Vec::new(),
            body: String::new(),
            attachments: Vec::new(),
        };
        let mut entry = CachedEntry::Email(CachedEmail::new(detail));
        assert!(entry.shows(&EmailId::new("a")));

        let inverse = Patch::SetDeleted {
            email: EmailId::new("a"),
            deleted: true,
        }
        .apply(&mut entry)
        .unwrap();
        assert!(!entry.shows(&EmailId::new("a")));

        inverse.apply(&mut entry).unwrap();
        assert!(entry.shows(&EmailId::new("a")));

        let other = Patch::SetRead {
            email: EmailId::new("zzz"),
            read: true,
        }
        .apply(&mut entry);
        assert!(other.is_none());
    }

    #[test]
    fn test_board_move_and_restore() {
        let mut entry = board();
        let original = entry.clone();

        let remove = Patch::RemoveItem {
            email: EmailId::new("a"),
        }
        .apply(&mut entry)
        .unwrap();
        let mut moved = item("a", "c-todo", ColumnKey::Todo);
        moved.is_read = true;
        let insert = Patch::InsertItem {
            column: ColumnId::new("c-todo"),
            index: usize::MAX,
            item: moved,
        }
        .apply(&mut entry)
        .unwrap();

        let current = entry.as_board().unwrap();
        assert_eq!(current.column_of(&EmailId::new("a")), Some(&ColumnId::new("c-todo")));
        assert_eq!(current.columns[0].email_count, 1);
        assert_eq!(current.columns[1].email_count, 1);
        assert!(current.is_consistent());

        insert.apply(&mut entry).unwrap();
        remove.apply(&mut entry).unwrap();
        assert_eq!(entry, original);
    }

    #[test]
    fn test_place_item_keeps_flags() {
        let mut entry = board();
        let original = entry.clone();
        let todo = Placement {
            status: ColumnKey::Todo,
            status_changed_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap()),
            snoozed_until: None,
            previous_status: None,
        };

        let inverse = Patch::PlaceItem {
            email: EmailId::new("a"),
            column: ColumnId::new("c-todo"),
            index: usize::MAX,
            placement: todo,
        }
        .apply(&mut entry)
        .unwrap();
        let current = entry.as_board().unwrap();
        let moved = current.item(&EmailId::new("a")).unwrap();
        assert_eq!(moved.kanban_column_id, ColumnId::new("c-todo"));
        assert_eq!(moved.kanban_status, ColumnKey::Todo);
        assert!(current.is_consistent());

        // A flag changed while the item sat in Todo survives the move back.
        Patch::SetRead {
            email: EmailId::new("a"),
            read: true,
        }
        .apply(&mut entry)
        .unwrap();
        inverse.apply(&mut entry).unwrap();

        let restored = entry.as_board().unwrap();
        assert_eq!(restored.items(&ColumnId::new("c-inbox"))[0].id, EmailId::new("a"));
        assert!(restored.item(&EmailId::new("a")).unwrap().is_read);
        let mut expected = original;
        Patch::SetRead {
            email: EmailId::new("a"),
            read: true,
        }
        .apply(&mut expected)
        .unwrap();
        assert_eq!(entry, expected);
    }

    #[test]
    fn test_place_into_missing_column_is_dropped() {
        let mut entry = board();
        let before = entry.clone();
        let inverse = Patch::PlaceItem {
            email: EmailId::new("a"),
            column: ColumnId::new("gone"),
            index: 0,
            placement: Placement::of(&item("a", "gone", ColumnKey::Todo)),
        }
        .apply(&mut entry);
        assert!(inverse.is_none());
        assert_eq!(entry, before);
    }

    #[test]
    fn test_insert_into_missing_column_is_dropped() {
        let mut entry = board();
        let inverse = Patch::InsertItem {
            column: ColumnId::new("gone"),
            index: 0,
            item: item("z", "gone", ColumnKey::Todo),
        }
        .apply(&mut entry);
        assert!(inverse.is_none());
        assert!(!entry.as_board().unwrap().contains(&EmailId::new("z")));
    }

    #[test]
    fn test_remove_column_restores_items() {
        let mut entry = board();
        let original = entry.clone();
        let inverse = Patch::RemoveColumn {
            column: ColumnId::new("c-inbox"),
        }
        .apply(&mut entry)
        .unwrap();
        assert_eq!(entry.as_board().unwrap().columns.len(), 1);
        assert!(!entry.as_board().unwrap().contains(&EmailId::new("a")));

        inverse.apply(&mut entry).unwrap();
        assert_eq!(entry, original);
    }

    #[test]
    fn test_replace_column_id_carries_items() {
        let mut entry = board();
        let mut renamed = KanbanColumn::new("srv-1", ColumnKey::Inbox, "Inbox");
        renamed.color = "#fff".into();
        let inverse = Patch::ReplaceColumn {
            id: ColumnId::new("c-inbox"),
            column: renamed,
        }
        .apply(&mut entry)
        .unwrap();

        let current = entry.as_board().unwrap();
        assert!(current.column(&ColumnId::new("c-inbox")).is_none());
        assert_eq!(current.items(&ColumnId::new("srv-1")).len(), 2);
        assert_eq!(
            current.item(&EmailId::new("a")).unwrap().kanban_column_id,
            ColumnId::new("srv-1")
        );
        assert_eq!(current.columns[0].email_count, 2);

        inverse.apply(&mut entry).unwrap();
        assert_eq!(
            entry.as_board().unwrap().item(&EmailId::new("a")).unwrap().kanban_column_id,
            ColumnId::new("c-inbox")
        );
    }

    #[test]
    fn test_board_ignores_list_patches() {
        let mut entry = board();
        let before = entry.clone();
        assert!(
            Patch::SetStarred {
                email: EmailId::new("a"),
                starred: true
            }
            .apply(&mut entry)
            .is_none()
        );
        assert_eq!(entry, before);
    }
}
