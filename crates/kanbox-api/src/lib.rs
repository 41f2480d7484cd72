//! # kanbox-api
//!
//! Contract between the kanbox triage engine and the mail backend.
//!
//! ## Features
//!
//! - **Wire model**: mailboxes, email projections, kanban board, snooze options
//! - **`MailApi` trait**: the narrow async surface the engine consumes
//! - **`HttpMailApi`**: REST implementation over `reqwest`
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use kanbox_api::{BoardQuery, HttpMailApi, MailApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpMailApi::new("http://localhost:3000/api/v1", Duration::from_secs(30))?
//!         .with_access_token("token");
//!
//!     let board = api.get_board(&BoardQuery::default()).await?;
//!     for column in &board.columns {
//!         println!("{}: {}", column.name, column.email_count);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod client;
mod error;
pub mod model;

pub use client::{HttpMailApi, MailApi};
pub use error::{Error, Result};
pub use model::{
    Attachment, BoardQuery, ColumnDraft, ColumnId, ColumnKey, EmailDetail, EmailId,
    EmailListQuery, EmailPage, EmailSummary, FreezeDuration, FreezeOptions, FreezeRequest,
    FreezeResponse, KanbanBoard, KanbanColumn, KanbanItem, Mailbox, MailboxId, MailboxKind,
    ModifyEmailRequest, ModifyFlags, MoveColumnResponse, Sender, SortOption,
};
