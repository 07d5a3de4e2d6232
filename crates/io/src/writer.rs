//! Reconciliation result → xlsx bytes.
//!
//! Output is byte-deterministic: the document creation time is pinned from
//! `OutputConfig::created` (default 1980-01-01 00:00:00), so the same result
//! always serializes to the same buffer.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use icprecon_recon::config::OutputConfig;
use icprecon_recon::{
    AccountBalance, LedgerEntry, ReconError, ReconResult, ReconciliationRow, RowValidationError,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

/// Rows per worksheet, header included.
pub const XLSX_MAX_ROWS: usize = 1_048_576;

/// Excel keeps 15 significant digits; longer amounts are written as text.
const EXCEL_MAX_SAFE_DIGITS: u32 = 15;

pub const RECONCILIATION_HEADERS: [&str; 6] = [
    "account_id",
    "account_name",
    "trial_balance_amount",
    "entries_total",
    "variance",
    "status",
];

const TRIAL_BALANCE_SHEET: &str = "Trial Balance";
const ENTRIES_SHEET: &str = "Entries";
const DIAGNOSTICS_SHEET: &str = "Diagnostics";

const AMOUNT_FORMAT: &str = "#,##0.00;(#,##0.00)";
const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Serialize a full engine result. Optional sheets follow `options`.
pub fn write(result: &ReconResult, options: &OutputConfig) -> Result<Vec<u8>, ReconError> {
    ensure_fits(&options.sheet_name, result.rows.len())?;
    if options.include_inputs {
        ensure_fits(TRIAL_BALANCE_SHEET, result.balances.len())?;
        ensure_fits(ENTRIES_SHEET, result.entries.len())?;
    }
    let diagnostics: Vec<&RowValidationError> = result.diagnostics().collect();
    if options.include_diagnostics {
        ensure_fits(DIAGNOSTICS_SHEET, diagnostics.len())?;
    }

    let bytes = build_workbook(options, |workbook, styles| {
        write_reconciliation_sheet(workbook, &options.sheet_name, &result.rows, styles)?;
        if options.include_inputs {
            write_balances_sheet(workbook, &result.balances, styles)?;
            write_entries_sheet(workbook, &result.entries, styles)?;
        }
        if options.include_diagnostics {
            write_diagnostics_sheet(workbook, &diagnostics, styles)?;
        }
        Ok(())
    })
    .map_err(|e| ReconError::WorkbookWrite(e.to_string()))?;

    log::debug!(
        "wrote {} reconciliation rows ({} bytes, inputs={}, diagnostics={})",
        result.rows.len(),
        bytes.len(),
        options.include_inputs,
        options.include_diagnostics
    );
    Ok(bytes)
}

/// Serialize reconciliation rows alone into a single-sheet workbook.
pub fn write_rows(rows: &[ReconciliationRow], options: &OutputConfig) -> Result<Vec<u8>, ReconError> {
    ensure_fits(&options.sheet_name, rows.len())?;
    build_workbook(options, |workbook, styles| {
        write_reconciliation_sheet(workbook, &options.sheet_name, rows, styles)
    })
    .map_err(|e| ReconError::WorkbookWrite(e.to_string()))
}

fn ensure_fits(sheet: &str, data_rows: usize) -> Result<(), ReconError> {
    if data_rows >= XLSX_MAX_ROWS {
        return Err(ReconError::WorkbookWrite(format!(
            "sheet '{sheet}' needs {} rows, xlsx allows {XLSX_MAX_ROWS}",
            data_rows + 1
        )));
    }
    Ok(())
}

struct Styles {
    header: Format,
    amount: Format,
    date: Format,
}

fn build_workbook(
    options: &OutputConfig,
    fill: impl FnOnce(&mut Workbook, &Styles) -> Result<(), XlsxError>,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let created = creation_time(options.created)?;
    let properties = DocProperties::new().set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let styles = Styles {
        header: Format::new().set_bold(),
        amount: Format::new().set_num_format(AMOUNT_FORMAT),
        date: Format::new().set_num_format(DATE_FORMAT),
    };
    fill(&mut workbook, &styles)?;

    workbook.save_to_buffer()
}

fn creation_time(created: Option<NaiveDateTime>) -> Result<ExcelDateTime, XlsxError> {
    match created {
        None => ExcelDateTime::from_ymd(1980, 1, 1),
        Some(dt) => ExcelDateTime::from_ymd(dt.year() as u16, dt.month() as u8, dt.day() as u8)?
            .and_hms(dt.hour() as u16, dt.minute() as u8, dt.second()),
    }
}

// ---------------------------------------------------------------------------
// Sheets
// ---------------------------------------------------------------------------

fn write_reconciliation_sheet(
    workbook: &mut Workbook,
    name: &str,
    rows: &[ReconciliationRow],
    styles: &Styles,
) -> Result<(), XlsxError> {
    let ws = workbook.add_worksheet().set_name(name)?;
    write_header(ws, &RECONCILIATION_HEADERS, styles)?;

    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, &r.account_id)?;
        ws.write_string(row, 1, &r.account_name)?;
        write_amount(ws, row, 2, r.trial_balance_amount, styles)?;
        write_amount(ws, row, 3, r.entries_total, styles)?;
        write_amount(ws, row, 4, r.variance, styles)?;
        ws.write_string(row, 5, r.status.to_string())?;
    }

    finish_table(ws, RECONCILIATION_HEADERS.len(), rows.len(), &[14.0, 36.0, 20.0, 16.0, 14.0, 20.0])
}

fn write_balances_sheet(
    workbook: &mut Workbook,
    balances: &[AccountBalance],
    styles: &Styles,
) -> Result<(), XlsxError> {
    const HEADERS: [&str; 4] = ["account_id", "account_name", "partner_code", "balance"];

    let ws = workbook.add_worksheet().set_name(TRIAL_BALANCE_SHEET)?;
    write_header(ws, &HEADERS, styles)?;
    for (i, b) in balances.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, &b.account_id)?;
        ws.write_string(row, 1, &b.account_name)?;
        ws.write_string(row, 2, &b.partner_code)?;
        write_amount(ws, row, 3, b.balance, styles)?;
    }
    finish_table(ws, HEADERS.len(), balances.len(), &[14.0, 36.0, 14.0, 18.0])
}

fn write_entries_sheet(
    workbook: &mut Workbook,
    entries: &[LedgerEntry],
    styles: &Styles,
) -> Result<(), XlsxError> {
    const HEADERS: [&str; 6] = ["entry_id", "date", "account_id", "partner_code", "amount", "description"];

    let ws = workbook.add_worksheet().set_name(ENTRIES_SHEET)?;
    write_header(ws, &HEADERS, styles)?;
    for (i, e) in entries.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, &e.entry_id)?;
        if let Some(date) = e.date {
            write_date(ws, row, 1, date, styles)?;
        }
        ws.write_string(row, 2, &e.account_id)?;
        ws.write_string(row, 3, &e.partner_code)?;
        write_amount(ws, row, 4, e.amount, styles)?;
        ws.write_string(row, 5, &e.description)?;
    }
    finish_table(ws, HEADERS.len(), entries.len(), &[14.0, 12.0, 14.0, 14.0, 16.0, 40.0])
}

fn write_diagnostics_sheet(
    workbook: &mut Workbook,
    diagnostics: &[&RowValidationError],
    styles: &Styles,
) -> Result<(), XlsxError> {
    const HEADERS: [&str; 6] = ["source", "row", "column", "issue", "value", "message"];

    let ws = workbook.add_worksheet().set_name(DIAGNOSTICS_SHEET)?;
    write_header(ws, &HEADERS, styles)?;
    for (i, d) in diagnostics.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, d.source.to_string())?;
        ws.write_number(row, 1, d.row_number as f64)?;
        ws.write_string(row, 2, &d.column)?;
        ws.write_string(row, 3, d.issue.to_string())?;
        ws.write_string(row, 4, &d.value)?;
        ws.write_string(row, 5, d.to_string())?;
    }
    finish_table(ws, HEADERS.len(), diagnostics.len(), &[14.0, 8.0, 20.0, 16.0, 20.0, 60.0])
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

fn write_header(ws: &mut Worksheet, headers: &[&str], styles: &Styles) -> Result<(), XlsxError> {
    for (col, label) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *label, &styles.header)?;
    }
    Ok(())
}

/// Frozen header row, autofilter over the data, fixed column widths.
fn finish_table(ws: &mut Worksheet, cols: usize, data_rows: usize, widths: &[f64]) -> Result<(), XlsxError> {
    ws.set_freeze_panes(1, 0)?;
    ws.autofilter(0, 0, data_rows as u32, cols as u16 - 1)?;
    for (col, width) in widths.iter().enumerate() {
        ws.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

fn write_amount(ws: &mut Worksheet, row: u32, col: u16, amount: Decimal, styles: &Styles) -> Result<(), XlsxError> {
    match amount_as_number(amount) {
        Some(n) => ws.write_number_with_format(row, col, n, &styles.amount)?,
        None => ws.write_string(row, col, amount.to_string())?,
    };
    Ok(())
}

fn write_date(ws: &mut Worksheet, row: u32, col: u16, date: NaiveDate, styles: &Styles) -> Result<(), XlsxError> {
    match ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8) {
        Ok(dt) => ws.write_datetime_with_format(row, col, &dt, &styles.date)?,
        // Outside Excel's calendar (before 1900): keep the ISO text
        Err(_) => ws.write_string(row, col, date.format("%Y-%m-%d").to_string())?,
    };
    Ok(())
}

/// `None` when the amount carries more significant digits than Excel keeps.
fn amount_as_number(amount: Decimal) -> Option<f64> {
    let mantissa = amount.normalize().mantissa().unsigned_abs();
    let digits = mantissa.checked_ilog10().map_or(1, |l| l + 1);
    if digits > EXCEL_MAX_SAFE_DIGITS {
        return None;
    }
    amount.to_f64()
}
