//! Spreadsheet bytes → `RawTable` (header row + data rows).
//!
//! Cells become text. Numeric cells are flagged on the row so amount
//! parsing reads them without the configured locale separators.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use icprecon_recon::{InputSource, RawRow, RawTable, ReconError};

/// Excel keeps 15 significant digits; anything past that in a float cell is noise.
const EXCEL_MAX_SAFE_DIGITS: usize = 15;

/// Read the first worksheet of an xlsx/xlsm/xls/xlsb/ods workbook.
pub fn read(bytes: &[u8], source: InputSource) -> Result<RawTable, ReconError> {
    read_sheet(bytes, None, source)
}

/// Read a worksheet by name (case-insensitive), or the first one when `sheet` is `None`.
///
/// The first non-blank row is the header. Rows are padded or cut to the
/// header width, then skipped if nothing is left in them.
pub fn read_sheet(
    bytes: &[u8],
    sheet: Option<&str>,
    source: InputSource,
) -> Result<RawTable, ReconError> {
    let malformed = |message: String| ReconError::MalformedWorkbook { source, message };

    if bytes.is_empty() {
        return Err(malformed("file is empty".into()));
    }

    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| malformed(format!("cannot open workbook: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(wanted.trim()))
            .cloned()
            .ok_or_else(|| malformed(format!("no sheet named '{wanted}' (found {sheet_names:?})")))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| malformed("workbook contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| malformed(format!("cannot read sheet '{sheet_name}': {e}")))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (idx, row) in range.rows().enumerate() {
        let mut cells: Vec<String> = Vec::with_capacity(start_col as usize + row.len());
        cells.resize(start_col as usize, String::new());
        cells.extend(row.iter().map(cell_text));
        let mut numeric = vec![false; start_col as usize];
        numeric.extend(row.iter().map(is_number));

        if let Some(h) = &headers {
            cells.resize(h.len(), String::new());
            numeric.resize(h.len(), false);
        }
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        if headers.is_some() {
            rows.push(RawRow {
                row_number: start_row as usize + idx + 1,
                cells,
                numeric,
            });
        } else {
            let mut labels: Vec<String> = cells.into_iter().map(|c| c.trim().to_string()).collect();
            while labels.last().is_some_and(|l| l.is_empty()) {
                labels.pop();
            }
            headers = Some(labels);
        }
    }

    let headers = headers.ok_or_else(|| malformed(format!("sheet '{sheet_name}' has no header row")))?;

    log::debug!(
        "{source}: sheet '{sheet_name}', {} columns {headers:?}, {} data rows",
        headers.len(),
        rows.len()
    );

    Ok(RawTable { headers, rows })
}

/// Text form of a cell, as the normalizers expect it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => float_text(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        // Error cells keep a marker so they fail amount parsing visibly
        Data::Error(e) => format!("#{e:?}"),
        // Date cells become their serial number; the date parser understands serials
        Data::DateTime(dt) => float_text(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Cells whose text is float output (dates included, as serials).
fn is_number(cell: &Data) -> bool {
    matches!(cell, Data::Float(_) | Data::Int(_) | Data::DateTime(_))
}

fn float_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let rounded: f64 = format!("{:.*e}", EXCEL_MAX_SAFE_DIGITS - 1, n)
        .parse()
        .unwrap_or(n);
    format!("{rounded}")
}
