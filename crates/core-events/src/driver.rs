//! Parse and check a program under the bootstrap environment.

use crate::importer::ClosedImportResolver;
use crate::{base_value_activation, core_events_location, CORE_EVENTS};
use cdc_core::{
    parse_program, AccessCheckMode, Checker, CheckerError, Config, Location, ParseError,
    ParserConfig, VariableActivation,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Check(#[from] CheckerError),
}

impl BootstrapError {
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            BootstrapError::Parse(err) => err.to_json_value(),
            BootstrapError::Check(err) => err.to_json_value(),
        }
    }
}

/// Check `source` at `location` in strict mode with `activation` as its
/// base values and the closed import resolver.
pub fn check_source(
    source: &[u8],
    location: Location,
    activation: Arc<VariableActivation>,
) -> Result<Checker, BootstrapError> {
    check_source_with_mode(source, location, activation, AccessCheckMode::Strict)
}

pub fn check_source_with_mode(
    source: &[u8],
    location: Location,
    activation: Arc<VariableActivation>,
    mode: AccessCheckMode,
) -> Result<Checker, BootstrapError> {
    tracing::debug!(%location, bytes = source.len(), "parsing program");
    let program = parse_program(source, &location, &ParserConfig::default())?;
    tracing::debug!(
        %location,
        imports = program.imports.len(),
        declarations = program.declarations.len(),
        "parsed program"
    );

    let config = Config::default()
        .with_access_check_mode(mode)
        .with_base_value_activation_handler(move |_| Arc::clone(&activation))
        .with_import_handler(ClosedImportResolver::new());
    let mut checker = Checker::new(Arc::new(program), location, config)?;
    checker.check()?;
    Ok(checker)
}

/// The checked `CoreEvents` program.
///
/// # Panics
///
/// If the embedded source fails to parse or check. The program ships with
/// the binary; a failure here means the build itself is broken.
pub fn core_events_checker() -> Checker {
    match check_source(CORE_EVENTS, core_events_location(), base_value_activation()) {
        Ok(checker) => checker,
        Err(BootstrapError::Parse(err)) => {
            tracing::error!(%err, "embedded CoreEvents program does not parse");
            panic!("failed to parse CoreEvents: {}", err);
        }
        Err(BootstrapError::Check(err)) => {
            tracing::error!(%err, "embedded CoreEvents program does not check");
            panic!("failed to check CoreEvents: {}", err);
        }
    }
}
