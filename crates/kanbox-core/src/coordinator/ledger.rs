//! Issue order of in-flight email actions.
//!
//! Every email action takes a sequence number when it is prepared and
//! claims one field of the email. When an action fails, its rollback only
//! runs if no later action on an overlapping field is still around:
//!
//! - a later confirmed action owns the field, so the rollback is dropped;
//! - a later pending action inherits the rollback and runs it only if it
//!   fails too;
//! - otherwise the rollback runs now, undoing its patches verbatim when
//!   nothing touched the email since, or reverting the field from the
//!   current state when something did.

use std::collections::HashMap;

use kanbox_api::EmailId;

use crate::cache::UndoToken;

/// Part of an email an action changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Field {
    Read,
    Starred,
    Placement,
    /// The email itself; overlaps every field.
    Presence,
}

impl Field {
    fn overlaps(self, other: Self) -> bool {
        self == other || matches!((self, other), (Self::Presence, _) | (_, Self::Presence))
    }
}

/// Flag value an action found before it changed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Revert {
    Read(bool),
    Starred(bool),
}

/// Everything needed to take a failed action back.
#[derive(Debug)]
pub(super) struct Rollback {
    pub seq: u64,
    pub email: EmailId,
    pub field: Field,
    pub tokens: Vec<UndoToken>,
    pub revert: Option<Revert>,
}

/// A rollback the coordinator must run now.
#[derive(Debug)]
pub(super) struct Due {
    pub rollback: Rollback,
    /// Nothing touched the email since the action was prepared.
    pub exact: bool,
}

#[derive(Debug)]
struct Claim {
    seq: u64,
    field: Field,
    confirmed: bool,
    inherited: Vec<Rollback>,
}

#[derive(Debug, Default)]
struct Claims {
    claims: Vec<Claim>,
    /// Sequence number of the last change to the email.
    touched: u64,
}

impl Claims {
    /// Drops confirmed claims no pending rollback can be checked against.
    fn prune(&mut self) {
        let floor = self
            .claims
            .iter()
            .filter(|c| !c.confirmed)
            .flat_map(|c| std::iter::once(c.seq).chain(c.inherited.iter().map(|r| r.seq)))
            .min();
        match floor {
            Some(floor) => self.claims.retain(|c| !c.confirmed || c.seq > floor),
            None => self.claims.clear(),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct Ledger {
    next: u64,
    emails: HashMap<EmailId, Claims>,
}

impl Ledger {
    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    /// Records a prepared action and returns its sequence number.
    pub fn issue(&mut self, email: &EmailId, field: Field) -> u64 {
        let seq = self.bump();
        let entry = self.emails.entry(email.clone()).or_default();
        entry.claims.push(Claim {
            seq,
            field,
            confirmed: false,
            inherited: Vec::new(),
        });
        entry.touched = seq;
        seq
    }

    /// Returns true if no action on the email was issued after `seq`.
    pub fn is_latest(&self, email: &EmailId, seq: u64) -> bool {
        self.emails
            .get(email)
            .is_none_or(|entry| entry.claims.iter().all(|c| c.seq <= seq))
    }

    /// Marks an action confirmed; rollbacks it inherited are dropped.
    pub fn confirm(&mut self, email: &EmailId, seq: u64) {
        let Some(entry) = self.emails.get_mut(email) else {
            return;
        };
        if let Some(claim) = entry.claims.iter_mut().find(|c| c.seq == seq) {
            claim.confirmed = true;
            claim.inherited.clear();
        }
        entry.prune();
        if entry.claims.is_empty() {
            self.emails.remove(email);
        }
    }

    /// Settles a failed action and returns the rollbacks to run, latest
    /// first.
    pub fn fail(&mut self, failed: Rollback) -> Vec<Due> {
        let email = failed.email.clone();
        let Some(entry) = self.emails.get_mut(&email) else {
            return vec![Due {
                rollback: failed,
                exact: true,
            }];
        };

        let mut queue = entry
            .claims
            .iter()
            .position(|c| c.seq == failed.seq)
            .map(|pos| entry.claims.remove(pos).inherited)
            .unwrap_or_default();
        queue.push(failed);
        queue.sort_by(|a, b| b.seq.cmp(&a.seq));

        let mut due = Vec::new();
        for rollback in queue {
            let (seq, field) = (rollback.seq, rollback.field);
            let later = |c: &Claim| c.seq > seq && c.field.overlaps(field);
            if entry.claims.iter().any(|c| later(c) && c.confirmed) {
                continue;
            }
            if let Some(heir) = entry
                .claims
                .iter_mut()
                .filter(|c| later(c))
                .min_by_key(|c| c.seq)
            {
                heir.inherited.push(rollback);
                continue;
            }
            let exact = due.is_empty() && entry.touched == rollback.seq;
            due.push(Due { rollback, exact });
        }

        if !due.is_empty() {
            self.next += 1;
            entry.touched = self.next;
        }
        entry.prune();
        if entry.claims.is_empty() {
            self.emails.remove(&email);
        }
        due
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rollback(seq: u64, field: Field) -> Rollback {
        Rollback {
            seq,
            email: EmailId::new("m1"),
            field,
            tokens: Vec::new(),
            revert: None,
        }
    }

    fn seqs(due: &[Due]) -> Vec<(u64, bool)> {
        due.iter().map(|d| (d.rollback.seq, d.exact)).collect()
    }

    #[test]
    fn test_lone_failure_is_exact() {
        let mut ledger = Ledger::default();
        let m1 = EmailId::new("m1");
        let seq = ledger.issue(&m1, Field::Read);

        let due = ledger.fail(rollback(seq, Field::Read));

        assert_eq!(seqs(&due), vec![(seq, true)]);
        assert!(ledger.emails.is_empty());
    }

    #[test]
    fn test_later_confirmed_claim_owns_the_field() {
        let mut ledger = Ledger::default();
        let m1 = EmailId::new("m1");
        let first = ledger.issue(&m1, Field::Read);
        let second = ledger.issue(&m1, Field::Read);
        ledger.confirm(&m1, second);

        assert!(ledger.fail(rollback(first, Field::Read)).is_empty());
        assert!(ledger.emails.is_empty());
    }

    #[test]
    fn test_later_pending_claim_inherits() {
        let mut ledger = Ledger::default();
        let m1 = EmailId::new("m1");
        let first = ledger.issue(&m1, Field::Placement);
        let second = ledger.issue(&m1, Field::Placement);

        assert!(ledger.fail(rollback(first, Field::Placement)).is_empty());
        let due = ledger.fail(rollback(second, Field::Placement));

        assert_eq!(seqs(&due), vec![(second, true), (first, false)]);
    }

    #[test]
    fn test_inherited_rollback_dropped_on_confirm() {
        let mut ledger = Ledger::default();
        let m1 = EmailId::new("m1");
        let first = ledger.issue(&m1, Field::Starred);
        let second = ledger.issue(&m1, Field::Presence);

        assert!(ledger.fail(rollback(first, Field::Starred)).is_empty());
        ledger.confirm(&m1, second);

        assert!(ledger.emails.is_empty());
    }

    #[test]
    fn test_other_field_does_not_block_but_breaks_exactness() {
        let mut ledger = Ledger::default();
        let m1 = EmailId::new("m1");
        let read = ledger.issue(&m1, Field::Read);
        let star = ledger.issue(&m1, Field::Starred);
        ledger.confirm(&m1, star);
        assert!(!ledger.is_latest(&m1, read));

        let due = ledger.fail(rollback(read, Field::Read));

        assert_eq!(seqs(&due), vec![(read, false)]);
    }

    #[test]
    fn test_confirmed_claim_kept_while_earlier_one_pends() {
        let mut ledger = Ledger::default();
        let m1 = EmailId::new("m1");
        let first = ledger.issue(&m1, Field::Read);
        let second = ledger.issue(&m1, Field::Read);
        let third = ledger.issue(&m1, Field::Read);
        ledger.confirm(&m1, third);
        ledger.confirm(&m1, first);
        assert!(ledger.is_latest(&m1, third));

        assert!(ledger.fail(rollback(second, Field::Read)).is_empty());
    }
}
