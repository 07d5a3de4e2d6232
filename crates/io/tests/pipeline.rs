use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use icprecon_io::{
    generate_reconciliation_file, generate_reconciliation_file_default, read, read_sheet,
    RECONCILIATION_HEADERS,
};
use icprecon_recon::{InputSource, ReconConfig, ReconError, ReconStatus};
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;

// -------------------------------------------------------------------------
// Fixtures
// -------------------------------------------------------------------------

/// One-sheet workbook. Cells that parse as numbers are written as numbers;
/// a leading `'` forces text, as in Excel.
fn xlsx(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    xlsx_named("Sheet1", headers, rows)
}

fn xlsx_named(sheet: &str, headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet().set_name(sheet).unwrap();
    for (c, h) in headers.iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (r, cells) in rows.iter().enumerate() {
        for (c, v) in cells.iter().enumerate() {
            let (row, col) = (r as u32 + 1, c as u16);
            if let Some(text) = v.strip_prefix('\'') {
                ws.write_string(row, col, text).unwrap();
                continue;
            }
            match v.parse::<f64>() {
                Ok(n) => ws.write_number(row, col, n).unwrap(),
                Err(_) => ws.write_string(row, col, *v).unwrap(),
            };
        }
    }
    wb.save_to_buffer().unwrap()
}

fn trial_balance() -> Vec<u8> {
    xlsx(
        &["Account", "Account Name", "ICP Code", "Balance"],
        &[
            &["4000", "IC Revenue", "SKPVAB", "1000"],
            &["2100", "IC Payable", "OTHER", "(300.00)"],
        ],
    )
}

fn entries(amounts: &[&str]) -> Vec<u8> {
    let rows: Vec<[&str; 4]> = amounts
        .iter()
        .enumerate()
        .map(|(i, a)| [["JE1", "JE2", "JE3", "JE4"][i % 4], "4000", "SKPVAB", *a])
        .collect();
    let rows: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
    xlsx(&["Document No", "Account", "Trading Partner", "Amount"], &rows)
}

fn sheet_names(bytes: &[u8]) -> Vec<String> {
    let wb: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
    wb.sheet_names().to_vec()
}

fn output_rows(bytes: &[u8]) -> Vec<Vec<String>> {
    let table = read(bytes, InputSource::TrialBalance).unwrap();
    assert_eq!(table.headers, RECONCILIATION_HEADERS);
    table.rows.into_iter().map(|r| r.cells).collect()
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn matched_account_written() {
    let out = generate_reconciliation_file_default(&trial_balance(), &entries(&["600.00", "400.00"]), "SKPVAB")
        .unwrap();

    assert_eq!(sheet_names(&out.bytes), vec!["Reconciliation"]);
    assert_eq!(
        output_rows(&out.bytes),
        vec![vec!["4000", "IC Revenue", "1000", "1000", "0", "MATCHED"]]
    );
    assert!(out.result.summary.is_clean());
}

#[test]
fn short_entries_flag_variance() {
    let out = generate_reconciliation_file_default(&trial_balance(), &entries(&["500", "400"]), "skpvab")
        .unwrap();

    assert_eq!(
        output_rows(&out.bytes),
        vec![vec!["4000", "IC Revenue", "1000", "900", "100", "VARIANCE"]]
    );
    assert_eq!(out.result.rows[0].status, ReconStatus::Variance);
}

#[test]
fn unknown_partner_produces_nothing() {
    let err = generate_reconciliation_file_default(&trial_balance(), &entries(&["600"]), "ZZZZ").unwrap_err();
    assert!(matches!(err, ReconError::NoMatchingPartner { ref icp_code } if icp_code == "ZZZZ"));
}

#[test]
fn unreadable_input_names_its_side() {
    let err = generate_reconciliation_file_default(b"not a workbook", &entries(&["600"]), "SKPVAB").unwrap_err();
    assert!(matches!(
        err,
        ReconError::MalformedWorkbook { source: InputSource::TrialBalance, .. }
    ));

    let err = generate_reconciliation_file_default(&trial_balance(), &[], "SKPVAB").unwrap_err();
    assert!(matches!(
        err,
        ReconError::MalformedWorkbook { source: InputSource::Entries, .. }
    ));
}

#[test]
fn missing_amount_column_is_fatal() {
    let e = xlsx(&["Account", "Trading Partner"], &[&["4000", "SKPVAB"]]);
    let err = generate_reconciliation_file_default(&trial_balance(), &e, "SKPVAB").unwrap_err();
    assert!(matches!(err, ReconError::MissingColumn { source: InputSource::Entries, .. }));
}

// -------------------------------------------------------------------------
// Determinism
// -------------------------------------------------------------------------

#[test]
fn identical_inputs_identical_bytes() {
    let tb = trial_balance();
    let e = entries(&["600", "400", "12.34"]);

    let a = generate_reconciliation_file_default(&tb, &e, "SKPVAB").unwrap();
    let b = generate_reconciliation_file_default(&tb, &e, "skpvab").unwrap();
    assert_eq!(a.bytes, b.bytes);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint().len(), 64);

    let mut config = ReconConfig::default();
    config.output.include_inputs = true;
    config.output.include_diagnostics = true;
    let c = generate_reconciliation_file(&tb, &e, "SKPVAB", &config).unwrap();
    let d = generate_reconciliation_file(&tb, &e, "SKPVAB", &config).unwrap();
    assert_eq!(c.bytes, d.bytes);
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn creation_time_changes_bytes_not_rows() {
    let tb = trial_balance();
    let e = entries(&["1000"]);
    let config = ReconConfig::from_toml("[output]\ncreated = \"2026-03-31T18:00:00\"\n").unwrap();

    let pinned = generate_reconciliation_file(&tb, &e, "SKPVAB", &config).unwrap();
    let default = generate_reconciliation_file_default(&tb, &e, "SKPVAB").unwrap();
    assert_ne!(pinned.bytes, default.bytes);
    assert_eq!(output_rows(&pinned.bytes), output_rows(&default.bytes));
}

// -------------------------------------------------------------------------
// Optional sheets and config
// -------------------------------------------------------------------------

#[test]
fn optional_sheets_follow_config() {
    let e = xlsx(
        &["Document No", "Posting Date", "Account", "Trading Partner", "Amount"],
        &[
            &["JE1", "2026-01-10", "4000", "SKPVAB", "1000"],
            &["JE2", "2026-01-11", "4000", "SKPVAB", "ten"],
            &["JE3", "yesterday", "4000", "SKPVAB", "5"],
        ],
    );
    let config = ReconConfig::from_toml(
        "[output]\ninclude_inputs = true\ninclude_diagnostics = true\n",
    )
    .unwrap();
    let out = generate_reconciliation_file(&trial_balance(), &e, "SKPVAB", &config).unwrap();

    assert_eq!(
        sheet_names(&out.bytes),
        vec!["Reconciliation", "Trial Balance", "Entries", "Diagnostics"]
    );

    let tb_sheet = read_sheet(&out.bytes, Some("Trial Balance"), InputSource::TrialBalance).unwrap();
    assert_eq!(tb_sheet.rows.len(), 1);
    assert_eq!(tb_sheet.rows[0].cells, vec!["4000", "IC Revenue", "SKPVAB", "1000"]);

    let entries_sheet = read_sheet(&out.bytes, Some("Entries"), InputSource::Entries).unwrap();
    assert_eq!(entries_sheet.rows.len(), 1);
    assert_eq!(entries_sheet.rows[0].get(0), "JE1");

    let diagnostics = read_sheet(&out.bytes, Some("Diagnostics"), InputSource::Entries).unwrap();
    let issues: Vec<(&str, &str)> = diagnostics
        .rows
        .iter()
        .map(|r| (r.get(1), r.get(3)))
        .collect();
    assert_eq!(issues, vec![("3", "invalid_amount"), ("4", "invalid_date")]);
}

#[test]
fn sheet_name_clash_is_write_error() {
    let mut config = ReconConfig::default();
    config.output.sheet_name = "Entries".into();
    config.output.include_inputs = true;
    let err = generate_reconciliation_file(&trial_balance(), &entries(&["1000"]), "SKPVAB", &config).unwrap_err();
    assert!(matches!(err, ReconError::WorkbookWrite(_)));
}

#[test]
fn configured_sheets_are_read() {
    let mut wb = Workbook::new();
    wb.add_worksheet().set_name("Notes").unwrap().write_string(0, 0, "prepared by finance").unwrap();
    let ws = wb.add_worksheet().set_name("TB").unwrap();
    for (c, h) in ["Account", "ICP Code", "Balance"].iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    ws.write_string(1, 0, "4000").unwrap();
    ws.write_string(1, 1, "SKPVAB").unwrap();
    ws.write_string(1, 2, "1,000.00").unwrap();
    let tb = wb.save_to_buffer().unwrap();
    let e = xlsx_named("Journal", &["Account", "Trading Partner", "Amount"], &[&["4000", "SKPVAB", "1000"]]);

    let config = ReconConfig::from_toml("[trial_balance]\nsheet = \"tb\"\n").unwrap();
    let out = generate_reconciliation_file(&tb, &e, "SKPVAB", &config).unwrap();
    assert_eq!(out.result.rows[0].status, ReconStatus::Matched);

    let err = generate_reconciliation_file_default(&tb, &e, "SKPVAB").unwrap_err();
    assert!(matches!(err, ReconError::MissingColumn { source: InputSource::TrialBalance, .. }));
}

#[test]
fn long_amounts_survive_as_text() {
    let tb = xlsx(
        &["Account", "ICP Code", "Balance"],
        &[&["4000", "SKPVAB", "'1234567890123.456"]],
    );
    let e = xlsx(
        &["Account", "Trading Partner", "Amount"],
        &[&["4000", "SKPVAB", "'1234567890123.456"]],
    );
    let out = generate_reconciliation_file_default(&tb, &e, "SKPVAB").unwrap();
    assert_eq!(out.result.rows[0].status, ReconStatus::Matched);
    let rows = output_rows(&out.bytes);
    assert_eq!(rows[0][2], "1234567890123.456");
    assert_eq!(rows[0][4], "0");
}

fn decimal_comma() -> ReconConfig {
    ReconConfig::from_toml("[amounts]\ndecimal_separator = \",\"\n").unwrap()
}

#[test]
fn decimal_comma_leaves_numeric_cells_alone() {
    let tb = xlsx(&["Account", "ICP Code", "Balance"], &[&["4000", "SKPVAB", "1000.5"]]);
    let e = xlsx(
        &["Account", "Trading Partner", "Amount"],
        &[&["4000", "SKPVAB", "600.25"], &["4000", "SKPVAB", "400.25"]],
    );
    let out = generate_reconciliation_file(&tb, &e, "SKPVAB", &decimal_comma()).unwrap();

    let row = &out.result.rows[0];
    assert_eq!(row.trial_balance_amount, Decimal::new(10005, 1));
    assert_eq!(row.entries_total, Decimal::new(100050, 2));
    assert_eq!(row.status, ReconStatus::Matched);
    assert_eq!(output_rows(&out.bytes)[0][2], "1000.5");
}

#[test]
fn decimal_comma_reads_text_cells() {
    let tb = xlsx(&["Account", "ICP Code", "Balance"], &[&["4000", "SKPVAB", "1.000,50"]]);
    let e = xlsx(
        &["Account", "Trading Partner", "Amount"],
        &[&["4000", "SKPVAB", "'600,25"], &["4000", "SKPVAB", "(99,75)"], &["4000", "SKPVAB", "500"]],
    );
    let out = generate_reconciliation_file(&tb, &e, "SKPVAB", &decimal_comma()).unwrap();

    let row = &out.result.rows[0];
    assert_eq!(row.trial_balance_amount, Decimal::new(100050, 2));
    assert_eq!(row.entries_total, Decimal::new(100050, 2));
    assert_eq!(row.status, ReconStatus::Matched);
    assert!(out.result.entries_diagnostics.is_empty());
}
