//! Row preview helpers for upload detail views.
//!
//! Mirrors what the review surface renders: column order from the first
//! row, a bounded number of rows, and a placeholder for blank cells.

use serde_json::{Map, Value};

/// Rows shown before the preview is elided.
pub const PREVIEW_ROW_LIMIT: usize = 20;

/// Placeholder rendered for blank cells.
pub const EMPTY_CELL: &str = "N/A";

/// Bounded, column-ordered view over normalized upload rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Total rows in the upload, including those beyond the preview limit.
    pub total_rows: usize,
}

impl RowPreview {
    /// Build a preview from normalized rows. Header order follows the first
    /// row; cells missing from later rows render as the placeholder.
    pub fn from_rows(rows: &[Map<String, Value>]) -> Self {
        let headers: Vec<String> = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();

        let preview_rows = rows
            .iter()
            .take(PREVIEW_ROW_LIMIT)
            .map(|row| headers.iter().map(|h| cell_text(row.get(h))).collect())
            .collect();

        Self {
            headers,
            rows: preview_rows,
            total_rows: rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }

    /// Whether rows beyond the preview limit were elided.
    pub fn truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }
}

/// Render a single cell value for display.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY_CELL.to_string(),
        Some(Value::String(s)) if s.is_empty() => EMPTY_CELL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
