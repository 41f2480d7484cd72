//! Snooze data models.

use chrono::{DateTime, Duration, Utc};
use kanbox_api::{ColumnKey, EmailId, KanbanItem};

/// A frozen board item that returns to its previous column at a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnoozeEntry {
    /// Frozen item.
    pub email_id: EmailId,
    /// When the item should return.
    pub snooze_until: DateTime<Utc>,
    /// Column key it returns to.
    pub return_to: Option<ColumnKey>,
    /// Subject for display.
    pub subject: String,
}

impl SnoozeEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(email_id: EmailId, snooze_until: DateTime<Utc>) -> Self {
        Self {
            email_id,
            snooze_until,
            return_to: None,
            subject: String::new(),
        }
    }

    /// Builds an entry from a board item carrying a snooze deadline.
    #[must_use]
    pub fn from_item(item: &KanbanItem) -> Option<Self> {
        let snooze_until = item.snoozed_until?;
        Some(Self {
            email_id: item.id.clone(),
            snooze_until,
            return_to: item.previous_kanban_status.clone(),
            subject: item.subject.clone(),
        })
    }

    /// Returns true if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.snooze_until
    }

    /// Returns the remaining time until the deadline.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_expired(now) {
            None
        } else {
            Some(self.snooze_until - now)
        }
    }

    /// Countdown label such as `2d 3h 4m 5s`, or `expired`.
    #[must_use]
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        self.time_remaining(now)
            .map_or_else(|| "expired".to_string(), format_remaining)
    }
}

/// Formats a positive duration as `1d 2h 3m 4s`, omitting zero units.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds();
    if total <= 0 {
        return "expired".to_string();
    }

    let units = [
        (total / 86_400, 'd'),
        ((total % 86_400) / 3_600, 'h'),
        ((total % 3_600) / 60, 'm'),
        (total % 60, 's'),
    ];
    units
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}
