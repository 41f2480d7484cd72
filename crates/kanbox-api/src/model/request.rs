//! Request and response payloads for the collaborator API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ColumnId, Mailbox, MailboxId};

/// Default page size for mailbox listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Query for one page of a mailbox listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailListQuery {
    /// Mailbox to list.
    pub mailbox_id: MailboxId,
    /// Page number (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Only unread emails.
    #[serde(default)]
    pub unread_only: bool,
    /// Only starred emails.
    #[serde(default)]
    pub starred_only: bool,
}

impl EmailListQuery {
    /// First page of a mailbox with the default page size.
    #[must_use]
    pub fn first_page(mailbox_id: impl Into<String>) -> Self {
        Self {
            mailbox_id: MailboxId::new(mailbox_id),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            unread_only: false,
            starred_only: false,
        }
    }

    /// Sets the page number.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Restricts the listing to unread emails.
    #[must_use]
    pub const fn unread_only(mut self) -> Self {
        self.unread_only = true;
        self
    }

    /// Restricts the listing to starred emails.
    #[must_use]
    pub const fn starred_only(mut self) -> Self {
        self.starred_only = true;
        self
    }

    /// Query string parameters.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if self.unread_only {
            params.push(("unreadOnly", "true".into()));
        }
        if self.starred_only {
            params.push(("starredOnly", "true".into()));
        }
        params
    }
}

/// Board sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Newest first.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Alphabetical by sender.
    Sender,
}

impl SortOption {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DateDesc => "date_desc",
            Self::DateAsc => "date_asc",
            Self::Sender => "sender",
        }
    }
}

/// Filter and sort parameters for the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardQuery {
    /// Include every Done item instead of only recent ones.
    #[serde(default = "default_true")]
    pub include_done_all: bool,
    /// Only unread items.
    #[serde(default)]
    pub unread_only: bool,
    /// Only items with attachments.
    #[serde(default)]
    pub has_attachments_only: bool,
    /// Only items from this sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    /// Sort order.
    #[serde(default)]
    pub sort_by: SortOption,
}

const fn default_true() -> bool {
    true
}

impl Default for BoardQuery {
    fn default() -> Self {
        Self {
            include_done_all: true,
            unread_only: false,
            has_attachments_only: false,
            from_email: None,
            sort_by: SortOption::DateDesc,
        }
    }
}

impl BoardQuery {
    /// Query string parameters.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("includeDoneAll", self.include_done_all.to_string()),
            ("unreadOnly", self.unread_only.to_string()),
            ("hasAttachmentsOnly", self.has_attachments_only.to_string()),
            ("sortBy", self.sort_by.as_str().to_string()),
        ];
        if let Some(from) = self.from_email.as_deref().filter(|f| !f.is_empty()) {
            params.push(("fromEmail", from.to_string()));
        }
        params
    }
}

/// Flag changes for a modify request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyFlags {
    /// New read state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    /// New starred state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    /// Delete the email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

/// Body of `POST /emails/{id}/modify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyEmailRequest {
    /// Labels the email belonged to when the action was issued.
    #[serde(rename = "mailBox")]
    pub label_id: Vec<MailboxId>,
    /// Flag changes.
    pub flags: ModifyFlags,
}

/// Body of `PATCH /{id}/kanban/column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveColumnRequest {
    /// Destination column.
    pub column_id: ColumnId,
}

/// Response of a column move: authoritative counters of the labels
/// backing the source and destination columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveColumnResponse {
    /// Label backing the source column.
    #[serde(default)]
    pub source_label: Option<Mailbox>,
    /// Label backing the destination column.
    #[serde(default)]
    pub destination_label: Option<Mailbox>,
}

/// Preset snooze durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreezeDuration {
    /// One hour.
    #[serde(rename = "1_HOUR")]
    OneHour,
    /// Three hours.
    #[serde(rename = "3_HOURS")]
    ThreeHours,
    /// One day.
    #[serde(rename = "1_DAY")]
    OneDay,
    /// Three days.
    #[serde(rename = "3_DAYS")]
    ThreeDays,
    /// One week.
    #[serde(rename = "1_WEEK")]
    OneWeek,
    /// Caller-supplied absolute date/time.
    #[serde(rename = "CUSTOM")]
    Custom,
}

impl FreezeDuration {
    /// Every preset, in menu order.
    pub const ALL: [Self; 6] = [
        Self::OneHour,
        Self::ThreeHours,
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
        Self::Custom,
    ];

    /// Fixed offset from now, `None` for [`FreezeDuration::Custom`].
    #[must_use]
    pub fn offset(&self) -> Option<Duration> {
        match self {
            Self::OneHour => Some(Duration::hours(1)),
            Self::ThreeHours => Some(Duration::hours(3)),
            Self::OneDay => Some(Duration::days(1)),
            Self::ThreeDays => Some(Duration::days(3)),
            Self::OneWeek => Some(Duration::weeks(1)),
            Self::Custom => None,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::OneHour => "1 hour",
            Self::ThreeHours => "3 hours",
            Self::OneDay => "1 day",
            Self::ThreeDays => "3 days",
            Self::OneWeek => "1 week",
            Self::Custom => "Pick a date",
        }
    }
}

/// User's snooze choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeOptions {
    /// Preset or custom.
    pub duration: FreezeDuration,
    /// Absolute deadline when `duration` is custom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_date_time: Option<DateTime<Utc>>,
}

impl FreezeOptions {
    /// A preset duration.
    #[must_use]
    pub const fn preset(duration: FreezeDuration) -> Self {
        Self {
            duration,
            custom_date_time: None,
        }
    }

    /// An absolute deadline.
    #[must_use]
    pub const fn until(deadline: DateTime<Utc>) -> Self {
        Self {
            duration: FreezeDuration::Custom,
            custom_date_time: Some(deadline),
        }
    }

    /// Resolves the deadline relative to `now`.
    ///
    /// Returns `None` for a custom duration without a date.
    #[must_use]
    pub fn deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.duration.offset() {
            Some(offset) => Some(now + offset),
            None => self.custom_date_time,
        }
    }
}

/// Body of `POST /{id}/freeze`.
pub type FreezeRequest = FreezeOptions;

/// Authoritative snooze record returned by `POST /{id}/freeze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeResponse {
    /// Deadline computed by the server.
    #[serde(default)]
    pub snoozed_until: Option<DateTime<Utc>>,
}

/// Fields of a custom column for create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDraft {
    /// Display name.
    pub name: String,
    /// Color as `#RGB` or `#RRGGBB`.
    pub color: String,
    /// Icon.
    pub icon: String,
    /// Backing label name.
    pub gmail_label_name: String,
}
