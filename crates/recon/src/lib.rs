//! `icprecon-recon`: intercompany reconciliation engine.
//!
//! Pure engine crate: receives sheets already read into rows, returns
//! reconciliation rows plus row diagnostics. No file or workbook I/O.

pub mod aggregate;
pub mod build;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod summary;

pub use config::ReconConfig;
pub use engine::run;
pub use error::{InputSource, ReconError, RowIssue, RowValidationError};
pub use model::{
    AccountBalance, LedgerEntry, Normalized, RawRow, RawTable, ReconResult, ReconStatus,
    ReconSummary, ReconciliationRow,
};
