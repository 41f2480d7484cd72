//! Star, read and delete.
//!
//! Counter rules: every label an email carries (plus `STARRED` while it is
//! starred) counts it once in `total_count`, and once in `unread_count`
//! while it is unread.

use std::collections::BTreeSet;

use kanbox_api::{
    EmailId, EmailListQuery, EmailSummary, MailApi, MailboxId, ModifyEmailRequest, ModifyFlags,
};
use tracing::debug;

use super::ledger::{Revert, Rollback};
use super::{ActionKind, Coordinator, PendingAction, Request};
use crate::cache::{CacheKey, CachedEntry, Patch};
use crate::error::{TriageResult, ValidationError};

/// What the cache knows about an email before an action changes it.
#[derive(Debug, Clone)]
struct EmailSnapshot {
    summary: Option<EmailSummary>,
    is_read: bool,
    is_starred: bool,
    labels: BTreeSet<MailboxId>,
}

impl EmailSnapshot {
    /// Collects the email's flags and labels from every view showing it.
    fn capture(entries: &[(CacheKey, CachedEntry)], id: &EmailId) -> Option<Self> {
        let mut summary: Option<&EmailSummary> = None;
        let mut board_read = None;
        let mut labels = BTreeSet::new();

        for (_, entry) in entries {
            if let Some(found) = entry.summary(id) {
                labels.extend(found.label_ids.iter().cloned());
                summary.get_or_insert(found);
            } else if let Some(item) = entry.as_board().and_then(|b| b.item(id)) {
                board_read.get_or_insert(item.is_read);
            }
        }

        match (summary, board_read) {
            (Some(summary), _) => Some(Self {
                is_read: summary.is_read,
                is_starred: summary.is_starred,
                summary: Some(summary.clone()),
                labels,
            }),
            // Board items carry no starred flag or labels.
            (None, Some(is_read)) => Some(Self {
                summary: None,
                is_read,
                is_starred: false,
                labels,
            }),
            (None, None) => None,
        }
    }

    /// Labels whose counters include this email.
    fn counted_labels(&self) -> BTreeSet<MailboxId> {
        let mut labels = self.labels.clone();
        if self.is_starred {
            labels.insert(MailboxId::starred());
        }
        labels
    }

    /// Counter patches that take the email from its current flags back to
    /// `revert`.
    fn revert_counters(&self, revert: Revert) -> Vec<Patch> {
        match revert {
            Revert::Read(read) if read != self.is_read => read_counters(&self.counted_labels(), read),
            Revert::Starred(starred) if starred != self.is_starred => {
                star_counters(starred, self.is_read)
            }
            Revert::Read(_) | Revert::Starred(_) => Vec::new(),
        }
    }

    fn modify(&self, id: &EmailId, flags: ModifyFlags) -> Request {
        Request::Modify {
            id: id.clone(),
            body: ModifyEmailRequest {
                label_id: self.labels.iter().cloned().collect(),
                flags,
            },
        }
    }
}

/// Returns true if the listing shows starred emails only.
fn lists_starred(query: &EmailListQuery) -> bool {
    query.starred_only || query.mailbox_id.is_starred()
}

fn read_counters(labels: &BTreeSet<MailboxId>, read: bool) -> Vec<Patch> {
    let delta = if read { -1 } else { 1 };
    labels
        .iter()
        .map(|label| Patch::AdjustUnread {
            mailbox: label.clone(),
            delta,
        })
        .collect()
}

fn star_counters(starred: bool, is_read: bool) -> Vec<Patch> {
    let delta = if starred { 1 } else { -1 };
    let mut patches = vec![Patch::AdjustTotal {
        mailbox: MailboxId::starred(),
        delta,
    }];
    if !is_read {
        patches.push(Patch::AdjustUnread {
            mailbox: MailboxId::starred(),
            delta,
        });
    }
    patches
}

fn star_patches(id: &EmailId, starred: bool) -> Vec<Patch> {
    vec![
        Patch::SetStarred {
            email: id.clone(),
            starred,
        },
        Patch::SetLabel {
            email: id.clone(),
            label: MailboxId::starred(),
            present: starred,
        },
    ]
}

impl<A: MailApi> Coordinator<A> {
    /// Board items carry no starred flag, so only listed emails can be
    /// starred.
    pub(super) fn prepare_toggle_star(&self, id: &EmailId) -> TriageResult<Option<PendingAction>> {
        let entries = self.inner.cache.entries();
        let snapshot = EmailSnapshot::capture(&entries, id)
            .filter(|snapshot| snapshot.summary.is_some())
            .ok_or(ValidationError::UnknownEmail)?;

        let starred = !snapshot.is_starred;
        let listed = snapshot.summary.clone().map(|mut summary| {
            summary.is_starred = true;
            summary.label_ids.insert(MailboxId::starred());
            summary
        });

        let tokens = self.patch_each(&entries, |key, entry| match (key, entry) {
            (CacheKey::Mailboxes, _) => star_counters(starred, snapshot.is_read),
            (CacheKey::Emails(query), CachedEntry::Emails(page)) => {
                if page.find(id).is_some() {
                    if lists_starred(query) && !starred {
                        vec![Patch::RemoveEmail { email: id.clone() }]
                    } else {
                        star_patches(id, starred)
                    }
                } else if starred
                    && lists_starred(query)
                    && query.page == 1
                    && (!query.unread_only || !snapshot.is_read)
                {
                    listed
                        .clone()
                        .map(|summary| vec![Patch::InsertEmail { index: 0, summary }])
                        .unwrap_or_default()
                } else {
                    Vec::new()
                }
            }
            (CacheKey::Email(_), entry) if entry.shows(id) => star_patches(id, starred),
            _ => Vec::new(),
        });

        let kind = if starred {
            ActionKind::Star
        } else {
            ActionKind::Unstar
        };
        let request = snapshot.modify(
            id,
            ModifyFlags {
                starred: Some(starred),
                ..ModifyFlags::default()
            },
        );
        Ok(Some(
            PendingAction::new(kind, Some(id.clone()), tokens, request)
                .reverting(Revert::Starred(snapshot.is_starred)),
        ))
    }

    /// `read` of `None` toggles.
    pub(super) fn prepare_set_read(
        &self,
        id: &EmailId,
        read: Option<bool>,
    ) -> TriageResult<Option<PendingAction>> {
        let entries = self.inner.cache.entries();
        let snapshot = EmailSnapshot::capture(&entries, id).ok_or(ValidationError::UnknownEmail)?;

        let read = read.unwrap_or(!snapshot.is_read);
        if snapshot.is_read == read {
            return Ok(None);
        }
        let labels = snapshot.counted_labels();

        let tokens = self.patch_each(&entries, |key, entry| match (key, entry) {
            (CacheKey::Mailboxes, _) => read_counters(&labels, read),
            (CacheKey::Emails(query), _) if entry.shows(id) => {
                if read && query.unread_only {
                    vec![Patch::RemoveEmail { email: id.clone() }]
                } else {
                    vec![Patch::SetRead {
                        email: id.clone(),
                        read,
                    }]
                }
            }
            (CacheKey::Email(_) | CacheKey::Board(_), _) if entry.shows(id) => {
                vec![Patch::SetRead {
                    email: id.clone(),
                    read,
                }]
            }
            _ => Vec::new(),
        });

        let kind = if read {
            ActionKind::MarkRead
        } else {
            ActionKind::MarkUnread
        };
        let request = snapshot.modify(
            id,
            ModifyFlags {
                read: Some(read),
                ..ModifyFlags::default()
            },
        );
        Ok(Some(
            PendingAction::new(kind, Some(id.clone()), tokens, request)
                .reverting(Revert::Read(snapshot.is_read)),
        ))
    }

    /// Deleting an email no view shows any more is a no-op, so a repeated
    /// delete never touches counters twice.
    pub(super) fn prepare_delete(&self, id: &EmailId) -> TriageResult<Option<PendingAction>> {
        let entries = self.inner.cache.entries();
        let Some(snapshot) = EmailSnapshot::capture(&entries, id) else {
            return Ok(None);
        };
        let labels = snapshot.counted_labels();

        let tokens = self.patch_each(&entries, |key, entry| match (key, entry) {
            (CacheKey::Mailboxes, _) => labels
                .iter()
                .flat_map(|label| {
                    let total = Patch::AdjustTotal {
                        mailbox: label.clone(),
                        delta: -1,
                    };
                    let unread = (!snapshot.is_read).then(|| Patch::AdjustUnread {
                        mailbox: label.clone(),
                        delta: -1,
                    });
                    std::iter::once(total).chain(unread)
                })
                .collect(),
            (CacheKey::Emails(_), _) if entry.shows(id) => {
                vec![Patch::RemoveEmail { email: id.clone() }]
            }
            (CacheKey::Email(_), _) if entry.shows(id) => vec![Patch::SetDeleted {
                email: id.clone(),
                deleted: true,
            }],
            (CacheKey::Board(_), _) if entry.shows(id) => {
                vec![Patch::RemoveItem { email: id.clone() }]
            }
            _ => Vec::new(),
        });
        self.sync_timer(id);

        let request = snapshot.modify(
            id,
            ModifyFlags {
                delete: Some(true),
                ..ModifyFlags::default()
            },
        );
        Ok(Some(PendingAction::new(
            ActionKind::Delete,
            Some(id.clone()),
            tokens,
            request,
        )))
    }

    /// Reverts a failed action after other actions touched the email.
    ///
    /// View patches are replayed from the undo tokens; counters are
    /// recomputed from the email's current flags and labels, which may
    /// differ from the ones the action saw.
    pub(super) fn compensate(&self, rollback: Rollback) {
        let Some(revert) = rollback.revert else {
            for token in rollback.tokens.into_iter().rev() {
                self.inner.cache.undo(token);
            }
            return;
        };
        let entries = self.inner.cache.entries();
        let counters = EmailSnapshot::capture(&entries, &rollback.email)
            .map(|current| current.revert_counters(revert))
            .unwrap_or_default();
        debug!(
            "reverting {} from current state ({} counter patches)",
            rollback.email,
            counters.len()
        );

        for token in rollback.tokens.into_iter().rev() {
            self.inner.cache.undo_where(token, |patch| !patch.is_counter());
        }
        if !counters.is_empty() {
            let _ = self.inner.cache.patch(&CacheKey::Mailboxes, counters);
        }
    }
}
