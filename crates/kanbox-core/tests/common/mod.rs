//! Shared fixtures for the coordinator integration tests.
//!
//! `FakeApi` is an in-memory mail backend. Mutations succeed unless their
//! target id was marked with [`FakeApi::fail_on`]; every call is logged.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use kanbox_api::{
    BoardQuery, ColumnDraft, ColumnId, ColumnKey, EmailDetail, EmailId, EmailListQuery, EmailPage,
    EmailSummary, Error, FreezeRequest, FreezeResponse, KanbanBoard, KanbanColumn, KanbanItem,
    MailApi, Mailbox, MailboxId, MailboxKind, ModifyEmailRequest, MoveColumnResponse, Result,
    Sender,
};
use kanbox_core::{CacheKey, CachedEntry, Coordinator, EntityCache, ManualClock};

/// Fixed start time of every scenario.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn id(s: &str) -> EmailId {
    EmailId::new(s)
}

pub fn column(s: &str) -> ColumnId {
    ColumnId::new(s)
}

pub fn summary(id: &str, read: bool, starred: bool, labels: &[&str]) -> EmailSummary {
    EmailSummary {
        id: EmailId::new(id),
        subject: format!("Subject {id}"),
        from: Sender {
            name: "Alice".into(),
            email: "alice@example.com".into(),
        },
        preview: String::new(),
        timestamp: start(),
        is_read: read,
        is_starred: starred,
        label_ids: labels.iter().map(|l| MailboxId::new(*l)).collect::<BTreeSet<_>>(),
    }
}

pub fn item(id: &str, column: &str, key: ColumnKey, read: bool) -> KanbanItem {
    KanbanItem {
        id: EmailId::new(id),
        subject: format!("Subject {id}"),
        from: "alice@example.com".into(),
        snippet: String::new(),
        date: start(),
        is_read: read,
        has_attachments: false,
        kanban_column_id: ColumnId::new(column),
        kanban_status: key,
        status_changed_at: None,
        snoozed_until: None,
        previous_kanban_status: None,
    }
}

fn frozen_item(id: &str, previous: ColumnKey, until: DateTime<Utc>) -> KanbanItem {
    let mut item = item(id, "c-frozen", ColumnKey::Frozen, true);
    item.snoozed_until = Some(until);
    item.previous_kanban_status = Some(previous);
    item
}

/// INBOX 5 unread of 10, STARRED 1 of 3, WORK 2 of 4.
pub fn mailboxes() -> Vec<Mailbox> {
    vec![
        Mailbox::new("INBOX", "Inbox", MailboxKind::System).with_counts(5, 10),
        Mailbox::new("STARRED", "Starred", MailboxKind::System).with_counts(1, 3),
        Mailbox::new("WORK", "Work", MailboxKind::User).with_counts(2, 4),
    ]
}

/// m1 unread in INBOX and WORK, m2 read, m3 unread and starred.
pub fn inbox_page() -> EmailPage {
    EmailPage {
        emails: vec![
            summary("m1", false, false, &["INBOX", "WORK"]),
            summary("m2", true, false, &["INBOX"]),
            summary("m3", false, true, &["INBOX", "STARRED"]),
        ],
        page: 1,
        limit: 20,
        total: 3,
        total_pages: 1,
    }
}

pub fn inbox_query() -> EmailListQuery {
    EmailListQuery::first_page("INBOX")
}

/// Inbox: m1. Todo: m2. Clients: m4. Frozen: f1 (from Todo, 3h) and
/// f2 (from Clients, 5h).
pub fn board() -> KanbanBoard {
    let protected = |id: &str, key: ColumnKey, name: &str| KanbanColumn {
        is_system_protected: true,
        ..KanbanColumn::new(id, key, name)
    };
    let clients_key = ColumnKey::Custom("CLIENTS".into());
    let mut board = KanbanBoard {
        columns: vec![
            protected("c-inbox", ColumnKey::Inbox, "Inbox"),
            KanbanColumn::new("c-todo", ColumnKey::Todo, "Todo"),
            KanbanColumn::new("c-processing", ColumnKey::Processing, "Processing"),
            KanbanColumn::new("c-done", ColumnKey::Done, "Done"),
            protected("c-frozen", ColumnKey::Frozen, "Frozen"),
            KanbanColumn {
                gmail_label_name: Some("Clients".into()),
                ..KanbanColumn::new("c-clients", clients_key.clone(), "Clients")
            },
        ],
        emails: BTreeMap::new(),
    };
    let mut put = |column: &str, items: Vec<KanbanItem>| {
        board.emails.insert(ColumnId::new(column), items);
    };
    put("c-inbox", vec![item("m1", "c-inbox", ColumnKey::Inbox, false)]);
    put("c-todo", vec![item("m2", "c-todo", ColumnKey::Todo, true)]);
    put("c-processing", Vec::new());
    put("c-done", Vec::new());
    put(
        "c-clients",
        vec![item("m4", "c-clients", clients_key.clone(), false)],
    );
    put(
        "c-frozen",
        vec![
            frozen_item("f1", ColumnKey::Todo, start() + Duration::hours(3)),
            frozen_item("f2", clients_key, start() + Duration::hours(5)),
        ],
    );
    board.recount();
    board
}

#[derive(Default)]
struct FakeState {
    details: BTreeMap<EmailId, EmailDetail>,
    failing: HashSet<String>,
    calls: Vec<String>,
    created: u32,
}

/// In-memory backend.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every mutation targeting `target` (email or column id) fail.
    pub fn fail_on(&self, target: &str) {
        self.state.lock().unwrap().failing.insert(target.to_string());
    }

    /// Clears every injected failure.
    pub fn heal(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// Adds an email that `get_email` can return.
    pub fn add_detail(&self, summary: EmailSummary) {
        let detail = EmailDetail {
            summary,
            to: Vec::new(),
            cc: Vec::new(),
            body: "Hello".into(),
            attachments: Vec::new(),
        };
        self.state
            .lock()
            .unwrap()
            .details
            .insert(detail.summary.id.clone(), detail);
    }

    /// Every mutation call so far, e.g. `modify m1`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &str, target: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{call} {target}"));
        if state.failing.contains(target) {
            return Err(Error::status(500, format!("{call} {target} failed")));
        }
        Ok(())
    }
}

fn column_from(id: ColumnId, draft: &ColumnDraft) -> KanbanColumn {
    KanbanColumn {
        icon: draft.icon.clone(),
        color: draft.color.clone(),
        gmail_label_name: Some(draft.gmail_label_name.clone()),
        ..KanbanColumn::new(
            id.as_str(),
            ColumnKey::Custom(draft.name.to_uppercase()),
            draft.name.as_str(),
        )
    }
}

#[async_trait]
impl MailApi for FakeApi {
    async fn list_mailboxes(&self) -> Result<Vec<Mailbox>> {
        Ok(mailboxes())
    }

    async fn list_emails(&self, query: &EmailListQuery) -> Result<EmailPage> {
        if query.mailbox_id.as_str() == "INBOX" {
            Ok(inbox_page())
        } else {
            Ok(EmailPage {
                emails: Vec::new(),
                page: query.page,
                limit: query.limit,
                total: 0,
                total_pages: 0,
            })
        }
    }

    async fn get_email(&self, id: &EmailId) -> Result<EmailDetail> {
        self.state
            .lock()
            .unwrap()
            .details
            .get(id)
            .cloned()
            .ok_or_else(|| Error::status(404, "email not found"))
    }

    async fn modify_email(
        &self,
        id: &EmailId,
        request: &ModifyEmailRequest,
    ) -> Result<Option<EmailSummary>> {
        self.record("modify", id.as_str())?;
        let mut state = self.state.lock().unwrap();
        let Some(detail) = state.details.get_mut(id) else {
            return Ok(None);
        };
        if let Some(read) = request.flags.read {
            detail.summary.is_read = read;
        }
        if let Some(starred) = request.flags.starred {
            detail.summary.is_starred = starred;
        }
        Ok(Some(detail.summary.clone()))
    }

    async fn get_board(&self, _query: &BoardQuery) -> Result<KanbanBoard> {
        Ok(board())
    }

    async fn move_to_column(&self, id: &EmailId, column: &ColumnId) -> Result<MoveColumnResponse> {
        self.record("move", id.as_str())?;
        self.record("into", column.as_str())?;
        Ok(MoveColumnResponse::default())
    }

    async fn freeze(&self, id: &EmailId, _request: &FreezeRequest) -> Result<FreezeResponse> {
        self.record("freeze", id.as_str())?;
        Ok(FreezeResponse::default())
    }

    async fn unfreeze(&self, id: &EmailId) -> Result<()> {
        self.record("unfreeze", id.as_str())
    }

    async fn create_column(&self, draft: &ColumnDraft) -> Result<KanbanColumn> {
        self.record("create", &draft.name)?;
        let created = {
            let mut state = self.state.lock().unwrap();
            state.created += 1;
            state.created
        };
        Ok(column_from(ColumnId::new(format!("col-{created}")), draft))
    }

    async fn update_column(&self, id: &ColumnId, draft: &ColumnDraft) -> Result<KanbanColumn> {
        self.record("update", id.as_str())?;
        Ok(column_from(id.clone(), draft))
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        self.record("delete-column", id.as_str())
    }
}

/// A coordinator over a fresh [`FakeApi`] with mailboxes, the INBOX page
/// and the board loaded.
pub async fn setup() -> (Coordinator<FakeApi>, ManualClock) {
    let clock = ManualClock::new(start());
    let coordinator = Coordinator::with_clock(FakeApi::new(), Arc::new(clock.clone()));
    coordinator.load_mailboxes().await.unwrap();
    coordinator.load_emails(inbox_query()).await.unwrap();
    coordinator.load_board(BoardQuery::default()).await.unwrap();
    (coordinator, clock)
}

pub fn unread(coordinator: &Coordinator<FakeApi>, mailbox: &str) -> u32 {
    coordinator.mailbox(mailbox).unwrap().unread_count
}

pub fn total(coordinator: &Coordinator<FakeApi>, mailbox: &str) -> u32 {
    coordinator.mailbox(mailbox).unwrap().total_count
}

pub fn inbox(coordinator: &Coordinator<FakeApi>) -> EmailPage {
    coordinator
        .cache()
        .get(&CacheKey::Emails(inbox_query()))
        .unwrap()
        .as_page()
        .unwrap()
        .clone()
}

/// Ids of a board column, in order.
pub fn column_items(coordinator: &Coordinator<FakeApi>, id: &str) -> Vec<String> {
    coordinator
        .board()
        .unwrap()
        .items(&ColumnId::new(id))
        .iter()
        .map(|i| i.id.as_str().to_string())
        .collect()
}

/// Every cache entry, in a stable order.
pub fn snapshot(cache: &EntityCache) -> Vec<(String, CachedEntry)> {
    let mut entries: Vec<(String, CachedEntry)> = cache
        .entries()
        .into_iter()
        .map(|(key, entry)| (key.to_string(), entry))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
