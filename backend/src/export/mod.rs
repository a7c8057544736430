//! Spreadsheet export of a user's week.

mod xlsx;

pub use xlsx::{build_week_workbook, export_filename, export_rows, ExportRow, COLUMNS, SHEET_NAME, XLSX_CONTENT_TYPE};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to create spreadsheet: {0}")]
    Spreadsheet(String),
}
