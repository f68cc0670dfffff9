use cdc_core::{
    Checker, Elaboration, ElaborationImport, ImportError, ImportHandler, Location, Range,
};
use cdc_stdlib::{get_test_contract_type, test_contract_location};
use std::sync::Arc;

/// Returned for every location other than the `Test` contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("import not supported: `{location}`")]
pub struct UnsupportedImportError {
    pub location: Location,
}

/// Resolves imports of the `Test` contract and rejects everything else.
#[derive(Debug, Clone)]
pub struct ClosedImportResolver {
    test: Arc<Elaboration>,
}

impl ClosedImportResolver {
    /// Obtains the shared `Test` elaboration, checking the contract on
    /// first use.
    pub fn new() -> Self {
        ClosedImportResolver {
            test: Arc::clone(&get_test_contract_type().elaboration),
        }
    }
}

impl Default for ClosedImportResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportHandler for ClosedImportResolver {
    fn resolve_import(
        &self,
        checker: &Checker,
        location: &Location,
        range: Range,
    ) -> Result<ElaborationImport, ImportError> {
        if *location == test_contract_location() {
            tracing::trace!(importer = %checker.location(), %location, "resolved import");
            return Ok(ElaborationImport {
                elaboration: Arc::clone(&self.test),
            });
        }
        tracing::debug!(
            importer = %checker.location(),
            %location,
            line = range.start.line,
            "rejected import"
        );
        Err(Arc::new(UnsupportedImportError {
            location: location.clone(),
        }))
    }
}
