//! Entity cache shared by every view.
//!
//! This module provides:
//! - **Keys and entries**: one slot per server projection (mailbox list,
//!   listing page, email detail, board)
//! - **Patches**: typed mutations that report their own inverse
//! - **Undo tokens**: revert one patch without touching later ones, and
//!   never resurrect a value that was refetched or invalidated meanwhile
//!
//! # Example
//!
//! ```ignore
//! use kanbox_core::cache::{CacheKey, EntityCache, Patch};
//!
//! let cache = EntityCache::new();
//! cache.put(CacheKey::Mailboxes, CachedEntry::Mailboxes(mailboxes));
//!
//! let token = cache.patch(&CacheKey::Mailboxes, [Patch::AdjustUnread {
//!     mailbox: MailboxId::new("INBOX"),
//!     delta: -1,
//! }]);
//!
//! // Server refused the change.
//! if let Some(token) = token {
//!     cache.undo(token);
//! }
//! ```

mod key;
mod patch;
mod store;

pub use key::{CacheKey, CachedEmail, CachedEntry};
pub use patch::{Patch, Placement};
pub use store::{EntityCache, Subscription, UndoToken};
