use super::Checker;
use crate::access::Access;
use crate::ast::{ImportDeclaration, Program};
use crate::elaboration::Elaboration;
use crate::error::{ImportError, SemanticError};
use crate::import::MissingImportHandlerError;
use std::sync::Arc;

impl Checker {
    // -- Phase 1: imports ---------------------------------------

    pub(super) fn resolve_imports(&mut self, program: &Program) {
        for import in &program.imports {
            tracing::trace!(
                location = %self.location,
                import = %import.location,
                "resolving import"
            );
            let resolved = match &self.config.import_handler {
                Some(handler) => handler.resolve_import(self, &import.location, import.range),
                None => Err(Arc::new(MissingImportHandlerError {
                    location: import.location.clone(),
                }) as ImportError),
            };
            match resolved {
                Ok(resolved) => {
                    self.elaboration
                        .add_import(Arc::clone(&resolved.elaboration));
                    self.import_names(import, &resolved.elaboration);
                }
                Err(error) => {
                    tracing::trace!(import = %import.location, %error, "import failed");
                    self.report(SemanticError::Import {
                        location: import.location.clone(),
                        range: import.range,
                        error,
                    });
                }
            }
        }
    }

    fn import_names(&mut self, import: &ImportDeclaration, elaboration: &Elaboration) {
        let pos = import.range.start;

        // `import X`: everything public, silently skipping the rest.
        if import.identifiers.is_empty() {
            for value in elaboration.global_values() {
                if self.is_importable(value.access) {
                    self.declare_global(value.clone(), pos, false);
                }
            }
            for (name, r) in elaboration.global_types() {
                let access = elaboration
                    .composite(r)
                    .map_or(Access::Public, |c| c.access);
                if self.is_importable(access) {
                    self.declare_global_type(name, r.clone(), pos, false);
                }
            }
            return;
        }

        for identifier in &import.identifiers {
            let value = elaboration.global_value(&identifier.name);
            let ty = elaboration.global_type(&identifier.name);
            let (access, declaration_kind) = match (value, ty) {
                (Some(v), _) => (v.access, v.kind.name()),
                (None, Some(r)) => (
                    elaboration
                        .composite(r)
                        .map_or(Access::Public, |c| c.access),
                    "type",
                ),
                (None, None) => {
                    self.report(SemanticError::NotExported {
                        name: identifier.name.clone(),
                        location: elaboration.location().clone(),
                        pos: identifier.pos,
                    });
                    continue;
                }
            };
            if !self.is_importable(access) {
                self.report(SemanticError::InvalidAccess {
                    name: identifier.name.clone(),
                    declaration_kind,
                    access: self.config.access_check_mode.effective(access),
                    pos: identifier.pos,
                });
                continue;
            }
            if let Some(v) = value {
                self.declare_global(v.clone(), identifier.pos, false);
            }
            if let Some(r) = ty {
                self.declare_global_type(&identifier.name, r.clone(), identifier.pos, false);
            }
        }
    }
}
