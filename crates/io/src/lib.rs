//! `icprecon-io`: workbook I/O around the reconciliation engine.
//!
//! Reads trial balance and entries workbooks with calamine, writes the
//! reconciliation workbook with rust_xlsxwriter.

pub mod generate;
pub mod reader;
pub mod writer;

pub use generate::{generate_reconciliation_file, generate_reconciliation_file_default, Generated};
pub use reader::{read, read_sheet};
pub use writer::{write, write_rows, RECONCILIATION_HEADERS, XLSX_MAX_ROWS};
