use cdc_core_events::{core_events_checker, core_events_code_hash};

use crate::summary::ProgramSummary;
use crate::{print_json, OutputFormat};

/// Runs the bootstrap check. A failure here aborts the process, as it
/// does anywhere else the embedded program is loaded.
pub(crate) fn cmd_core_events(output: OutputFormat, quiet: bool) {
    let checker = core_events_checker();
    let summary = ProgramSummary::new(&checker, Some(core_events_code_hash()));

    match output {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Text => {
            if !quiet {
                summary.print_text();
            }
        }
    }
}
