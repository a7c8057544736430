//! Single-sheet xlsx workbook for one ISO week.
//!
//! ```text
//! Sheet: Arbeitsorte
//! | Name  | Jahr | Kalenderwoche | Datum      | Wochentag | Standort   |
//! |-------|------|---------------|------------|-----------|------------|
//! | alice | 2024 | 1             | 2024-01-01 | Montag    | Office     |
//! | alice | 2024 | 1             | 2024-01-02 | Dienstag  | Homeoffice |
//! ```

use rust_xlsxwriter::Workbook;
use worklocation_common::WeekDates;

use super::ExportError;
use crate::models::selection::WeekSelections;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Arbeitsorte";
pub const COLUMNS: [&str; 6] = ["Name", "Jahr", "Kalenderwoche", "Datum", "Wochentag", "Standort"];

const MAX_COLUMN_WIDTH: usize = 40;
const COLUMN_PADDING: usize = 2;

/// One spreadsheet row, i.e. one day of the week.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub name: String,
    pub year: i32,
    pub week: u32,
    pub date: String,
    pub weekday: &'static str,
    pub location: &'static str,
}

impl ExportRow {
    /// Cell texts in column order, used for width calculation.
    fn cell_texts(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.year.to_string(),
            self.week.to_string(),
            self.date.clone(),
            self.weekday.to_string(),
            self.location.to_string(),
        ]
    }
}

/// Build the seven rows of `week`, Monday first.
pub fn export_rows(name: &str, week: &WeekDates, selections: &WeekSelections) -> Vec<ExportRow> {
    week.named_days()
        .zip(selections)
        .map(|((date, weekday), selection)| ExportRow {
            name: name.to_string(),
            year: week.year,
            week: week.week,
            date: date.format("%Y-%m-%d").to_string(),
            weekday,
            location: selection.map(|l| l.as_str()).unwrap_or(""),
        })
        .collect()
}

/// Widest cell text per column plus padding, capped.
fn column_widths(rows: &[ExportRow]) -> [usize; 6] {
    let mut widths = COLUMNS.map(|header| header.chars().count());
    for row in rows {
        for (width, text) in widths.iter_mut().zip(row.cell_texts()) {
            *width = (*width).max(text.chars().count());
        }
    }
    widths.map(|w| (w + COLUMN_PADDING).min(MAX_COLUMN_WIDTH))
}

/// Render the week as an xlsx file.
pub fn build_week_workbook(
    name: &str,
    week: &WeekDates,
    selections: &WeekSelections,
) -> Result<Vec<u8>, ExportError> {
    let rows = export_rows(name, week, selections);
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(SHEET_NAME)
        .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;

    for (col, header) in COLUMNS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        sheet
            .write_string(r, 0, &row.name)
            .and_then(|s| s.write_number(r, 1, row.year))
            .and_then(|s| s.write_number(r, 2, row.week))
            .and_then(|s| s.write_string(r, 3, &row.date))
            .and_then(|s| s.write_string(r, 4, row.weekday))
            .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;

        // Empty locations stay blank cells
        if !row.location.is_empty() {
            sheet
                .write_string(r, 5, row.location)
                .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;
        }
    }

    for (col, width) in column_widths(&rows).iter().enumerate() {
        sheet
            .set_column_width(col as u16, *width as f64)
            .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Spreadsheet(e.to_string()))
}

/// Download name, e.g. `Arbeitsorte_alice_J2024_KW01.xlsx`.
///
/// Characters other than ASCII alphanumerics, `-` and `_` are replaced so the
/// name is safe inside a `Content-Disposition` header.
pub fn export_filename(name: &str, year: i32, week: u32) -> String {
    let name = name.trim();
    let safe_name: String = if name.is_empty() {
        "Unbekannt".to_string()
    } else {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    };
    format!("Arbeitsorte_{}_J{}_KW{:02}.xlsx", safe_name, year, week)
}
