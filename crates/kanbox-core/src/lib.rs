//! # kanbox-core
//!
//! Client-side state engine for the kanbox email triage board.
//!
//! This crate provides:
//! - **Entity cache** - one slot per server projection, patched in place
//!   with typed, invertible patches
//! - **Optimistic coordinator** - applies actions immediately, confirms them
//!   with the backend and rolls back exactly its own patches on failure
//! - **Triage state machine** - kanban column moves, snoozing into Frozen
//!   and returning from it
//! - **Snooze timers** - deadlines of frozen items and a background service
//!   that thaws them
//! - **Drag resolver** - maps a finished drag gesture to a column move
//! - **Configuration** - persisted engine settings
//!
//! ## Quick Start
//!
//! ```ignore
//! use kanbox_core::{Coordinator, EngineConfig, SnoozeService};
//!
//! let config = EngineConfig::load(&EngineConfig::default_path()).await?;
//! let coordinator = Coordinator::new(config.http_api()?);
//!
//! coordinator.load_mailboxes().await?;
//! coordinator.load_board(config.board.clone()).await?;
//! let snooze = SnoozeService::new(coordinator.clone(), config.snooze_tick()).spawn();
//!
//! coordinator.toggle_star(&EmailId::new("m1")).await?;
//! snooze.stop().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod coordinator;
mod error;
pub mod snooze;
pub mod triage;

pub use cache::{CacheKey, CachedEmail, CachedEntry, EntityCache, Patch, Placement, Subscription, UndoToken};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use coordinator::{
    Action, ActionKind, ActionOutcome, BatchOutcome, Coordinator, Notification, PendingAction,
};
pub use error::{Error, Result, TriageError, TriageResult, ValidationError};
pub use snooze::{SnoozeEntry, SnoozeHandle, SnoozeService, SnoozeTimers, format_remaining};
pub use triage::{
    DragEnd, DragResolution, PendingFreeze, ResolvedDrag, TransitionKind, TransitionPlan,
    TriageStateMachine, resolve_drag,
};
