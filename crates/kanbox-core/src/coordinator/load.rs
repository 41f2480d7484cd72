//! Fetching views into the cache and switching between them.

use kanbox_api::{
    BoardQuery, EmailDetail, EmailId, EmailListQuery, EmailPage, KanbanBoard, MailApi, Mailbox,
    MailboxId,
};
use tracing::{debug, info, warn};

use super::Coordinator;
use crate::cache::{CacheKey, CachedEmail, CachedEntry};
use crate::error::{TriageError, TriageResult};

impl<A: MailApi> Coordinator<A> {
    /// Fetches the mailbox list and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Fetch`] if the backend call fails; the cache
    /// keeps its previous value.
    pub async fn load_mailboxes(&self) -> TriageResult<Vec<Mailbox>> {
        let mailboxes = self.inner.api.list_mailboxes().await.map_err(|e| {
            warn!("Failed to load mailboxes: {}", e);
            TriageError::Fetch(e)
        })?;
        debug!("Loaded {} mailboxes", mailboxes.len());
        self.inner
            .cache
            .put(CacheKey::Mailboxes, CachedEntry::Mailboxes(mailboxes.clone()));
        Ok(mailboxes)
    }

    /// Fetches one page of a mailbox and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Fetch`] if the backend call fails.
    pub async fn load_emails(&self, query: EmailListQuery) -> TriageResult<EmailPage> {
        let page = self.inner.api.list_emails(&query).await.map_err(|e| {
            warn!("Failed to load {} page {}: {}", query.mailbox_id, query.page, e);
            TriageError::Fetch(e)
        })?;
        debug!(
            "Loaded {} emails from {} (page {}/{})",
            page.emails.len(),
            query.mailbox_id,
            page.page,
            page.total_pages
        );
        self.inner
            .cache
            .put(CacheKey::Emails(query), CachedEntry::Emails(page.clone()));
        Ok(page)
    }

    /// Fetches a single email and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Fetch`] if the backend call fails.
    pub async fn load_email(&self, id: &EmailId) -> TriageResult<EmailDetail> {
        let detail = self.inner.api.get_email(id).await.map_err(|e| {
            warn!("Failed to load email {}: {}", id, e);
            TriageError::Fetch(e)
        })?;
        self.inner.cache.put(
            CacheKey::Email(id.clone()),
            CachedEntry::Email(CachedEmail::new(detail.clone())),
        );
        Ok(detail)
    }

    /// Fetches the board, makes it the one on screen and restarts the
    /// snooze timers from its Frozen column.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Fetch`] if the backend call fails.
    pub async fn load_board(&self, query: BoardQuery) -> TriageResult<KanbanBoard> {
        let board = self.inner.api.get_board(&query).await.map_err(|e| {
            warn!("Failed to load board: {}", e);
            TriageError::Fetch(e)
        })?;
        info!(
            "Loaded board: {} columns, {} items",
            board.columns.len(),
            board.emails.values().map(Vec::len).sum::<usize>()
        );

        *self.board_query() = Some(query.clone());
        self.inner
            .cache
            .put(CacheKey::Board(query), CachedEntry::Board(board.clone()));
        self.inner.timers.sync_with_board(&board);
        Ok(board)
    }

    /// Leaves the current view for a mailbox listing: drops listings of
    /// other mailboxes, every open email and the board, and stops every
    /// snooze timer. Only the mailbox list survives.
    ///
    /// Returns the number of evicted entries.
    pub fn switch_folder(&self, mailbox: &MailboxId) -> usize {
        let evicted = self.inner.cache.invalidate_where(|key| {
            if key.is_list() {
                key.mailbox() != Some(mailbox)
            } else {
                key != &CacheKey::Mailboxes
            }
        });
        *self.board_query() = None;
        self.inner.timers.clear();
        debug!("Switched to {}, evicted {} entries", mailbox, evicted);
        evicted
    }

    /// Makes another board query current, dropping boards cached under
    /// other filters. Timers keep running only for items that board shows.
    pub fn switch_board(&self, query: BoardQuery) {
        let evicted = self.inner.cache.invalidate_where(|key| match key {
            CacheKey::Board(cached) => cached != &query,
            _ => false,
        });
        *self.board_query() = Some(query);

        match self.board() {
            Some(board) => self.inner.timers.sync_with_board(&board),
            None => self.inner.timers.clear(),
        }
        debug!("Switched board filters, evicted {} boards", evicted);
    }

    /// Leaves the board view: drops cached boards and stops every timer.
    pub fn close_board(&self) {
        self.inner.cache.invalidate_where(CacheKey::is_board);
        *self.board_query() = None;
        self.inner.timers.clear();
        debug!("Board closed");
    }
}
