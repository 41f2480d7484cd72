//! Error types for the triage engine.

use thiserror::Error;

use crate::coordinator::ActionKind;

/// Errors from engine setup (configuration, persistence).
#[derive(Debug, Error)]
pub enum Error {
    /// Backend client error.
    #[error("API error: {0}")]
    Api(#[from] kanbox_api::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected before any state was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The email is not present in any cached view.
    UnknownEmail,
    /// The column does not exist on the board.
    UnknownColumn,
    /// The column is still being created.
    ColumnNotReady,
    /// No board has been loaded.
    NoBoard,
    /// Moving into Frozen needs a snooze duration.
    MissingFreezeDuration,
    /// A custom snooze needs a date.
    MissingCustomDate,
    /// The snooze deadline is not in the future.
    PastSnoozeDate,
    /// Column name is empty.
    EmptyColumnName,
    /// Column color is not `#RGB` or `#RRGGBB`.
    InvalidColumnColor,
    /// Column icon is empty.
    EmptyColumnIcon,
    /// Backing label name is empty.
    EmptyLabelName,
    /// System columns cannot be deleted.
    ProtectedColumn,
    /// The board has no Inbox column to receive orphaned items.
    NoInboxColumn,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::UnknownEmail => "Email is not loaded",
            Self::UnknownColumn => "Column does not exist",
            Self::ColumnNotReady => "Column is still being created",
            Self::NoBoard => "Board is not loaded",
            Self::MissingFreezeDuration => "Choose how long to freeze the email",
            Self::MissingCustomDate => "Pick a date to freeze until",
            Self::PastSnoozeDate => "Freeze date must be in the future",
            Self::EmptyColumnName => "Column name is required",
            Self::InvalidColumnColor => "Color must be a hex value like #4A90D9",
            Self::EmptyColumnIcon => "Column icon is required",
            Self::EmptyLabelName => "Label name is required",
            Self::ProtectedColumn => "System columns cannot be deleted",
            Self::NoInboxColumn => "Board has no Inbox column",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UnknownEmail => "email",
            Self::UnknownColumn | Self::ColumnNotReady | Self::ProtectedColumn => "column",
            Self::NoBoard | Self::NoInboxColumn => "board",
            Self::MissingFreezeDuration => "duration",
            Self::MissingCustomDate | Self::PastSnoozeDate => "custom_date_time",
            Self::EmptyColumnName => "name",
            Self::InvalidColumnColor => "color",
            Self::EmptyColumnIcon => "icon",
            Self::EmptyLabelName => "gmail_label_name",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a triage action.
#[derive(Debug, Error)]
pub enum TriageError {
    /// Rejected input; no patch was applied and no request was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend refused or never answered; the action was rolled back.
    #[error("{action} failed: {source}")]
    Transaction {
        /// Action that failed.
        action: ActionKind,
        /// Backend error.
        #[source]
        source: kanbox_api::Error,
    },

    /// The board references state that no longer exists.
    #[error("Board is inconsistent: {0}")]
    ConsistencyGap(String),

    /// A read-only load failed; nothing to roll back.
    #[error("Load failed: {0}")]
    Fetch(#[source] kanbox_api::Error),
}

impl TriageError {
    /// Returns true if the error was raised before any state changed.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for triage actions.
pub type TriageResult<T> = std::result::Result<T, TriageError>;
