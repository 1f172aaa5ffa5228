//! Export formatter.
//!
//! Flattens a resolved set into an [`ExportTable`] of rendered cells and writes it out as
//! RFC 4180 CSV.

use crate::kind::ClinicalRecord;
use crate::{RecordsError, RecordsResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Renders the table with a header row, `,` separators and `\r\n` line endings.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_line(&mut out, self.columns.iter().copied());
        for row in &self.rows {
            write_line(&mut out, row.iter().map(String::as_str));
        }
        out
    }
}

/// Build the export table for `rows`.
///
/// # Errors
///
/// Returns `NoRecords` when there is nothing to export.
pub fn export<'a, R, I>(rows: I) -> RecordsResult<ExportTable>
where
    R: ClinicalRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.export_row().iter().map(|cell| cell.render()).collect())
        .collect();

    if rows.is_empty() {
        return Err(RecordsError::NoRecords(R::KIND));
    }

    Ok(ExportTable {
        columns: R::EXPORT_COLUMNS.to_vec(),
        rows,
    })
}

fn write_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains([',', '"', '\r', '\n']);
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}
