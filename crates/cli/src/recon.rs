//! `icprecon generate` and `icprecon check-config`.

use std::path::{Path, PathBuf};

use clap::Args;
use icprecon_io::Generated;
use icprecon_recon::{InputSource, ReconConfig, ReconError, ReconResult};
use rust_decimal::Decimal;

use crate::exit_codes::{recon_exit_code, EXIT_USAGE, EXIT_VARIANCE};
use crate::CliError;

pub const DEFAULT_OUTPUT: &str = "Reconciliation_Mapped.xlsx";

/// Diagnostics listed on stderr before the rest are summarized as a count.
const MAX_LISTED_DIAGNOSTICS: usize = 10;

#[derive(Args)]
pub struct GenerateArgs {
    /// Trial balance workbook (.xlsx, .xlsm, .xls, .xlsb, .ods)
    #[arg(long, short = 't')]
    pub trial_balance: PathBuf,

    /// Intercompany entries workbook
    #[arg(long, short = 'e')]
    pub entries: PathBuf,

    /// Partner (ICP) code to reconcile, case-insensitive
    #[arg(long, env = "ICPRECON_ICP")]
    pub icp: String,

    /// Output workbook path
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// TOML config (column aliases, sheets, tolerance, output options)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Absolute variance still reported as MATCHED (overrides config)
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Add normalized "Trial Balance" and "Entries" sheets
    #[arg(long)]
    pub include_inputs: bool,

    /// Add a "Diagnostics" sheet listing skipped rows
    #[arg(long)]
    pub include_diagnostics: bool,

    /// Print the summary and diagnostics as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit 1 when any account does not reconcile
    #[arg(long)]
    pub fail_on_variance: bool,
}

fn recon_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::MissingColumn { source, .. } => Some(format!(
            "map the header under [{}.columns] in a --config file",
            config_section(*source)
        )),
        ReconError::NoMatchingPartner { .. } => {
            Some("check the ICP code against the partner column of both workbooks".to_string())
        }
        ReconError::MalformedWorkbook { source, .. } => Some(format!(
            "check that the {source} file is a spreadsheet and the [{}] sheet setting names an existing sheet",
            config_section(*source)
        )),
        _ => None,
    };
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint }
}

fn config_section(source: InputSource) -> &'static str {
    match source {
        InputSource::TrialBalance => "trial_balance",
        InputSource::Entries => "entries",
    }
}

fn read_bytes(path: &Path, what: &str) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read {what} {}: {e}", path.display()),
        hint: None,
    })
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    ReconConfig::from_toml(&text).map_err(recon_err)
}

pub fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    config.output.include_inputs |= args.include_inputs;
    config.output.include_diagnostics |= args.include_diagnostics;

    let tb_bytes = read_bytes(&args.trial_balance, "trial balance")?;
    let entries_bytes = read_bytes(&args.entries, "entries")?;

    let generated = icprecon_io::generate_reconciliation_file(&tb_bytes, &entries_bytes, &args.icp, &config)
        .map_err(recon_err)?;

    std::fs::write(&args.output, &generated.bytes).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot write {}: {e}", args.output.display()),
        hint: None,
    })?;

    print_summary(&generated, &args.output);

    if args.json {
        let json = summary_json(&generated, &args.output);
        let text = serde_json::to_string_pretty(&json).map_err(|e| CliError {
            code: EXIT_USAGE,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{text}");
    }

    let s = &generated.result.summary;
    if args.fail_on_variance && !s.is_clean() {
        return Err(CliError {
            code: EXIT_VARIANCE,
            message: format!("{} of {} accounts do not reconcile", s.breaks(), s.accounts),
            hint: None,
        });
    }
    Ok(())
}

/// Human summary to stderr.
fn print_summary(generated: &Generated, output: &Path) {
    let result = &generated.result;
    let s = &result.summary;

    eprintln!("wrote {} ({})", output.display(), &generated.fingerprint()[..16]);
    eprintln!(
        "{}: {} accounts, {} matched, {} variances, {} missing in TB, {} missing in entries",
        result.icp_code, s.accounts, s.matched, s.variances, s.missing_in_tb, s.missing_in_entries,
    );
    if s.has_net_variance() {
        eprintln!(
            "net variance {} (trial balance {} / entries {})",
            s.net_variance, s.trial_balance_total, s.entries_total
        );
    }

    print_diagnostics(result);
}

fn print_diagnostics(result: &ReconResult) {
    let tb = result.trial_balance_diagnostics.len();
    let en = result.entries_diagnostics.len();
    if tb + en == 0 {
        return;
    }
    eprintln!("skipped {tb} trial balance row(s), {en} entries row(s):");
    for d in result.diagnostics().take(MAX_LISTED_DIAGNOSTICS) {
        eprintln!("  {d}");
    }
    if tb + en > MAX_LISTED_DIAGNOSTICS {
        eprintln!("  ... and {} more", tb + en - MAX_LISTED_DIAGNOSTICS);
    }
}

fn summary_json(generated: &Generated, output: &Path) -> serde_json::Value {
    let result = &generated.result;
    let diagnostics: Vec<_> = result.diagnostics().collect();
    serde_json::json!({
        "icp_code": result.icp_code,
        "output": output.display().to_string(),
        "fingerprint": generated.fingerprint(),
        "summary": result.summary,
        "rows": result.rows,
        "diagnostics": diagnostics,
    })
}

pub fn cmd_check_config(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: tolerance {}, output sheet '{}', trial balance sheet {}, entries sheet {}",
        config.tolerance,
        config.output.sheet_name,
        sheet_label(config.trial_balance.sheet.as_deref()),
        sheet_label(config.entries.sheet.as_deref()),
    );
    Ok(())
}

fn sheet_label(sheet: Option<&str>) -> String {
    match sheet {
        Some(name) => format!("'{name}'"),
        None => "(first)".to_string(),
    }
}
