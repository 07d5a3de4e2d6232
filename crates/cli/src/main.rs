// icprecon - intercompany (ICP) reconciliation workbooks from the command line

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "icprecon")]
#[command(about = "Reconcile a partner's trial balance against its intercompany entries")]
#[command(version)]
struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the reconciliation workbook for one ICP code
    #[command(after_help = "\
Examples:
  icprecon generate -t TB.xlsx -e Entries.xlsx --icp SKPVAB
  icprecon generate -t TB.xlsx -e Entries.xlsx --icp skpvab -o out.xlsx --tolerance 0.01
  icprecon generate -t TB.xlsx -e Entries.xlsx --icp SKPVAB --config recon.toml --json
  icprecon generate -t TB.xlsx -e Entries.xlsx --icp SKPVAB --fail-on-variance")]
    Generate(recon::GenerateArgs),

    /// Parse and validate a config file without running
    #[command(after_help = "\
Examples:
  icprecon check-config recon.toml")]
    CheckConfig {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // try_init: a global subscriber may already be set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => recon::cmd_generate(args),
        Commands::CheckConfig { config } => recon::cmd_check_config(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
