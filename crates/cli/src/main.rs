mod commands;
mod summary;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// How declarations without an access modifier are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum AccessMode {
    /// Every declaration needs a modifier
    Strict,
    /// Missing modifiers mean private
    Restricted,
    /// Missing modifiers mean public
    Unrestricted,
    /// No access checks at all
    None,
}

impl From<AccessMode> for cdc_core::AccessCheckMode {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::Strict => cdc_core::AccessCheckMode::Strict,
            AccessMode::Restricted => cdc_core::AccessCheckMode::NotSpecifiedRestricted,
            AccessMode::Unrestricted => cdc_core::AccessCheckMode::NotSpecifiedUnrestricted,
            AccessMode::None => cdc_core::AccessCheckMode::None,
        }
    }
}

/// Checker for the bootstrap contract programs.
#[derive(Parser)]
#[command(
    name = "cdc-check",
    version,
    about = "Checker for the bootstrap contract programs"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the embedded CoreEvents program and summarize it
    CoreEvents,

    /// Check a source file under the CoreEvents environment
    Check {
        /// Path to the source file
        file: PathBuf,
        /// Location the program is checked at
        #[arg(long, default_value = "CoreEvents")]
        location: String,
        /// Access check mode
        #[arg(long, default_value = "strict", value_enum)]
        access_mode: AccessMode,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::CoreEvents => {
            commands::core_events::cmd_core_events(cli.output, cli.quiet);
        }
        Commands::Check {
            file,
            location,
            access_mode,
        } => {
            commands::check::cmd_check(&file, &location, access_mode, cli.output, cli.quiet);
        }
    }
}

/// Print an error in the selected format. Silent under `--quiet`.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

pub(crate) fn print_json(value: &impl serde::Serialize) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", json);
}
