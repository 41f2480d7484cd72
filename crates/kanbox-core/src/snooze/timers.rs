//! In-memory registry of snooze deadlines.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use kanbox_api::{EmailId, KanbanBoard};
use tracing::debug;

use super::model::SnoozeEntry;

/// Deadlines of the frozen items currently on screen.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct SnoozeTimers {
    entries: Arc<Mutex<BTreeMap<EmailId, SnoozeEntry>>>,
}

impl SnoozeTimers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<EmailId, SnoozeEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts or reschedules a timer. Returns true if anything changed.
    pub fn track(&self, entry: SnoozeEntry) -> bool {
        let mut entries = self.entries();
        if entries.get(&entry.email_id) == Some(&entry) {
            return false;
        }
        debug!("snooze timer for {} until {}", entry.email_id, entry.snooze_until);
        entries.insert(entry.email_id.clone(), entry);
        true
    }

    /// Stops a timer. Returns true if one was running.
    pub fn cancel(&self, email: &EmailId) -> bool {
        let removed = self.entries().remove(email).is_some();
        if removed {
            debug!("snooze timer for {} cancelled", email);
        }
        removed
    }

    /// Returns true if a timer is running for the email.
    #[must_use]
    pub fn is_tracked(&self, email: &EmailId) -> bool {
        self.entries().contains_key(email)
    }

    /// The timer for an email.
    #[must_use]
    pub fn get(&self, email: &EmailId) -> Option<SnoozeEntry> {
        self.entries().get(email).cloned()
    }

    /// Number of running timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if no timer is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Running timers, soonest first.
    #[must_use]
    pub fn list(&self) -> Vec<SnoozeEntry> {
        let mut list: Vec<SnoozeEntry> = self.entries().values().cloned().collect();
        list.sort_by_key(|e| e.snooze_until);
        list
    }

    /// Remaining time for an email, `None` if untracked or expired.
    #[must_use]
    pub fn remaining(&self, email: &EmailId, now: DateTime<Utc>) -> Option<Duration> {
        self.entries().get(email)?.time_remaining(now)
    }

    /// Countdown label for an email, `None` if untracked.
    #[must_use]
    pub fn countdown(&self, email: &EmailId, now: DateTime<Utc>) -> Option<String> {
        self.entries().get(email).map(|e| e.countdown(now))
    }

    /// Removes and returns every expired timer, soonest first.
    ///
    /// Each expiry is handed out exactly once.
    pub fn take_expired(&self, now: DateTime<Utc>) -> Vec<SnoozeEntry> {
        let mut entries = self.entries();
        let expired: Vec<EmailId> = entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.email_id.clone())
            .collect();
        let mut taken: Vec<SnoozeEntry> = expired
            .iter()
            .filter_map(|id| entries.remove(id))
            .collect();
        taken.sort_by_key(|e| e.snooze_until);
        taken
    }

    /// Keeps only the timers the predicate accepts.
    pub fn retain(&self, keep: impl Fn(&EmailId) -> bool) {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|id, _| keep(id));
        if entries.len() != before {
            debug!("snooze timers pruned: {} -> {}", before, entries.len());
        }
    }

    /// Stops every timer.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Makes the registry mirror the Frozen column of a board.
    pub fn sync_with_board(&self, board: &KanbanBoard) {
        let frozen: Vec<SnoozeEntry> = board
            .frozen_column()
            .map(|column| {
                board
                    .items(&column.id)
                    .iter()
                    .filter_map(SnoozeEntry::from_item)
                    .collect()
            })
            .unwrap_or_default();

        let mut entries = self.entries();
        entries.clear();
        for entry in frozen {
            entries.insert(entry.email_id.clone(), entry);
        }
    }

    /// Starts, reschedules or stops the timer of one item to match a board.
    pub fn sync_item(&self, board: &KanbanBoard, email: &EmailId) {
        let frozen = board
            .frozen_column()
            .and_then(|column| board.items(&column.id).iter().find(|i| &i.id == email))
            .and_then(SnoozeEntry::from_item);
        match frozen {
            Some(entry) => {
                self.track(entry);
            }
            None => {
                self.cancel(email);
            }
        }
    }
}
