//! Custom column validation.

use chrono::{DateTime, Utc};
use kanbox_api::{ColumnDraft, ColumnId, ColumnKey, KanbanColumn};

use super::machine::TEMP_COLUMN_PREFIX;
use crate::error::ValidationError;

/// Result of validating a column draft.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a column draft.
///
/// `require_label` is set on create; updates keep the existing label.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_column(draft: &ColumnDraft, require_label: bool) -> ValidationResult {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push(ValidationError::EmptyColumnName);
    }
    if !is_hex_color(&draft.color) {
        errors.push(ValidationError::InvalidColumnColor);
    }
    if draft.icon.trim().is_empty() {
        errors.push(ValidationError::EmptyColumnIcon);
    }
    if require_label && draft.gmail_label_name.trim().is_empty() {
        errors.push(ValidationError::EmptyLabelName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Returns true for `#RGB` and `#RRGGBB`.
#[must_use]
pub fn is_hex_color(color: &str) -> bool {
    color.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// Placeholder column shown while a create request is in flight.
#[must_use]
pub fn placeholder_column(draft: &ColumnDraft, order: u32, now: DateTime<Utc>) -> KanbanColumn {
    let name = draft.name.trim();
    KanbanColumn {
        id: ColumnId::new(format!("{TEMP_COLUMN_PREFIX}{}", now.timestamp_millis())),
        key: ColumnKey::Custom(name.to_uppercase()),
        name: name.to_string(),
        icon: draft.icon.clone(),
        color: draft.color.clone(),
        order,
        is_system_protected: false,
        email_count: 0,
        gmail_label_name: Some(draft.gmail_label_name.trim().to_string()),
    }
}

/// Applies a draft's display fields to an existing column.
#[must_use]
pub fn edited_column(column: &KanbanColumn, draft: &ColumnDraft) -> KanbanColumn {
    let label = draft.gmail_label_name.trim();
    KanbanColumn {
        name: draft.name.trim().to_string(),
        icon: draft.icon.clone(),
        color: draft.color.clone(),
        gmail_label_name: if label.is_empty() {
            column.gmail_label_name.clone()
        } else {
            Some(label.to_string())
        },
        ..column.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ColumnDraft {
        ColumnDraft {
            name: "Urgent".into(),
            color: "#FF0000".into(),
            icon: "🔥".into(),
            gmail_label_name: "urgent".into(),
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_column(&draft(), true).is_ok());
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#abc"));
        assert!(is_hex_color("#A1B2C3"));
        assert!(!is_hex_color("abc"));
        assert!(!is_hex_color("#abcd"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color(""));
    }

    #[test]
    fn test_collects_every_error() {
        let bad = ColumnDraft {
            name: "  ".into(),
            color: "red".into(),
            icon: String::new(),
            gmail_label_name: String::new(),
        };
        let errors = validate_column(&bad, true).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyColumnName,
                ValidationError::InvalidColumnColor,
                ValidationError::EmptyColumnIcon,
                ValidationError::EmptyLabelName,
            ]
        );

        let update_errors = validate_column(&bad, false).unwrap_err();
        assert!(!update_errors.contains(&ValidationError::EmptyLabelName));
    }

    #[test]
    fn test_placeholder_key_is_uppercased_name() {
        let now = Utc::now();
        let column = placeholder_column(&draft(), 6, now);
        assert_eq!(column.key, ColumnKey::Custom("URGENT".into()));
        assert!(column.id.as_str().starts_with(TEMP_COLUMN_PREFIX));
        assert_eq!(column.order, 6);
    }

    #[test]
    fn test_edit_keeps_identity() {
        let mut column = KanbanColumn::new("c9", ColumnKey::Custom("URGENT".into()), "Urgent");
        column.gmail_label_name = Some("urgent".into());
        column.email_count = 4;
        let edited = edited_column(
            &column,
            &ColumnDraft {
                name: "Hot".into(),
                gmail_label_name: String::new(),
                ..draft()
            },
        );
        assert_eq!(edited.id, column.id);
        assert_eq!(edited.key, column.key);
        assert_eq!(edited.name, "Hot");
        assert_eq!(edited.gmail_label_name.as_deref(), Some("urgent"));
        assert_eq!(edited.email_count, 4);
    }
}
