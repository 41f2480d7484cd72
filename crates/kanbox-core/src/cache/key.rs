//! Cache keys and cached values.

use kanbox_api::{
    BoardQuery, EmailDetail, EmailId, EmailListQuery, EmailPage, EmailSummary, KanbanBoard,
    Mailbox, MailboxId,
};

/// Identifies one cached server projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The mailbox list with counters.
    Mailboxes,
    /// One page of a mailbox listing.
    Emails(EmailListQuery),
    /// A single email's detail view.
    Email(EmailId),
    /// The kanban board under a filter.
    Board(BoardQuery),
}

impl CacheKey {
    /// Returns true for board keys.
    #[must_use]
    pub const fn is_board(&self) -> bool {
        matches!(self, Self::Board(_))
    }

    /// Returns true for mailbox listing keys.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::Emails(_))
    }

    /// Mailbox a listing key belongs to.
    #[must_use]
    pub const fn mailbox(&self) -> Option<&MailboxId> {
        match self {
            Self::Emails(query) => Some(&query.mailbox_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mailboxes => f.write_str("mailboxes"),
            Self::Emails(query) => write!(f, "emails/{}/{}", query.mailbox_id, query.page),
            Self::Email(id) => write!(f, "email/{id}"),
            Self::Board(_) => f.write_str("board"),
        }
    }
}

/// A cached email detail, tombstoned on delete so an open detail view can
/// show the email as gone without losing its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEmail {
    /// The detail projection.
    pub detail: EmailDetail,
    /// Set once the email has been deleted.
    pub deleted: bool,
}

impl CachedEmail {
    /// Wraps a freshly fetched detail.
    #[must_use]
    pub const fn new(detail: EmailDetail) -> Self {
        Self {
            detail,
            deleted: false,
        }
    }

    /// The email's summary fields.
    #[must_use]
    pub const fn summary(&self) -> &EmailSummary {
        &self.detail.summary
    }
}

/// Value stored under a [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedEntry {
    /// Mailbox list.
    Mailboxes(Vec<Mailbox>),
    /// Listing page.
    Emails(EmailPage),
    /// Detail view.
    Email(CachedEmail),
    /// Kanban board.
    Board(KanbanBoard),
}

impl CachedEntry {
    /// The mailbox list, if this is one.
    #[must_use]
    pub fn as_mailboxes(&self) -> Option<&[Mailbox]> {
        match self {
            Self::Mailboxes(mailboxes) => Some(mailboxes),
            _ => None,
        }
    }

    /// The listing page, if this is one.
    #[must_use]
    pub const fn as_page(&self) -> Option<&EmailPage> {
        match self {
            Self::Emails(page) => Some(page),
            _ => None,
        }
    }

    /// The detail view, if this is one.
    #[must_use]
    pub const fn as_email(&self) -> Option<&CachedEmail> {
        match self {
            Self::Email(email) => Some(email),
            _ => None,
        }
    }

    /// The board, if this is one.
    #[must_use]
    pub const fn as_board(&self) -> Option<&KanbanBoard> {
        match self {
            Self::Board(board) => Some(board),
            _ => None,
        }
    }

    /// Returns true if this view currently shows the email.
    ///
    /// A tombstoned detail does not count.
    #[must_use]
    pub fn shows(&self, id: &EmailId) -> bool {
        match self {
            Self::Mailboxes(_) => false,
            Self::Emails(page) => page.find(id).is_some(),
            Self::Email(email) => !email.deleted && &email.summary().id == id,
            Self::Board(board) => board.contains(id),
        }
    }

    /// The email's summary, when this view carries one.
    #[must_use]
    pub fn summary(&self, id: &EmailId) -> Option<&EmailSummary> {
        match self {
            Self::Emails(page) => page.find(id),
            Self::Email(email) if !email.deleted && &email.summary().id == id => {
                Some(email.summary())
            }
            _ => None,
        }
    }
}
