//! The seam through which the checker obtains imported programs.
//!
//! The checker never loads source on its own. Each `import` statement is
//! handed to an [`ImportHandler`], which answers with an already-checked
//! [`Elaboration`] or an error.

use crate::checker::Checker;
use crate::elaboration::Elaboration;
use crate::error::ImportError;
use crate::location::{Location, Range};
use std::sync::Arc;

/// A resolved import.
#[derive(Debug, Clone)]
pub struct ElaborationImport {
    pub elaboration: Arc<Elaboration>,
}

pub trait ImportHandler: Send + Sync {
    /// Resolve `location`, imported by the program `checker` is checking.
    /// `range` covers the import statement.
    fn resolve_import(
        &self,
        checker: &Checker,
        location: &Location,
        range: Range,
    ) -> Result<ElaborationImport, ImportError>;
}

impl<F> ImportHandler for F
where
    F: Fn(&Checker, &Location, Range) -> Result<ElaborationImport, ImportError> + Send + Sync,
{
    fn resolve_import(
        &self,
        checker: &Checker,
        location: &Location,
        range: Range,
    ) -> Result<ElaborationImport, ImportError> {
        self(checker, location, range)
    }
}

/// Reported for every import when no handler is configured.
#[derive(Debug, thiserror::Error)]
#[error("no import handler configured: cannot import `{location}`")]
pub struct MissingImportHandlerError {
    pub location: Location,
}
