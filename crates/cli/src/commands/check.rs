use std::path::Path;
use std::process;

use cdc_core::Location;
use cdc_core_events::{base_value_activation, check_source_with_mode, BootstrapError};

use crate::summary::ProgramSummary;
use crate::{print_json, report_error, AccessMode, OutputFormat};

pub(crate) fn cmd_check(
    file: &Path,
    location: &str,
    access_mode: AccessMode,
    output: OutputFormat,
    quiet: bool,
) {
    let source = match std::fs::read(file) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let location = Location::identifier(location);
    tracing::debug!(file = %file.display(), %location, ?access_mode, "checking file");

    match check_source_with_mode(
        &source,
        location,
        base_value_activation(),
        access_mode.into(),
    ) {
        Ok(checker) => {
            let summary = ProgramSummary::new(&checker, None);
            match output {
                OutputFormat::Json => print_json(&summary),
                OutputFormat::Text => {
                    if !quiet {
                        summary.print_text();
                    }
                }
            }
        }
        Err(e) => {
            match output {
                OutputFormat::Json => {
                    let err_json = serde_json::to_string_pretty(&e.to_json_value())
                        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", e));
                    eprintln!("{}", err_json);
                }
                OutputFormat::Text => {
                    if !quiet {
                        let stage = match e {
                            BootstrapError::Parse(_) => "parse error",
                            BootstrapError::Check(_) => "check error",
                        };
                        eprintln!("{}: {}", stage, e);
                    }
                }
            }
            process::exit(1);
        }
    }
}
