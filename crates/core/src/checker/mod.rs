//! Semantic checking of a parsed program.
//!
//! Checking runs in phases over the whole program:
//!
//!   1. resolve imports through the configured [`ImportHandler`](crate::import::ImportHandler)
//!   2. declare composite types (shells and nested type members)
//!   3. resolve member types, initializers and enum cases
//!   4. declare top-level values
//!   5. check function and initializer bodies
//!
//! Errors are collected rather than returned early, so one run reports
//! every problem it can find.

mod declarations;
mod expressions;
mod imports;
mod statements;
mod types;

use crate::access::{Access, AccessCheckMode};
use crate::activation::{DeclarationKind, Variable, VariableActivation};
use crate::ast::{CompositeKind, Program};
use crate::config::Config;
use crate::elaboration::{CompositeType, Elaboration, Member, MemberKind};
use crate::error::{CheckerError, SemanticError};
use crate::location::{Location, Position};
use crate::types::{CompositeRef, Type};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug)]
struct FunctionContext {
    return_type: Type,
    /// Set while checking the initializer of this composite.
    initializer_of: Option<CompositeRef>,
    assigned_fields: HashSet<String>,
}

#[derive(Debug)]
pub struct Checker {
    program: Arc<Program>,
    location: Location,
    config: Config,
    base_activation: Arc<VariableActivation>,
    elaboration: Elaboration,
    /// Top-level values of the program plus imported ones.
    globals: HashMap<String, Variable>,
    global_types: HashMap<String, CompositeRef>,
    errors: Vec<SemanticError>,
    scopes: Vec<HashMap<String, Variable>>,
    /// Composite declarations enclosing the code being checked, outermost first.
    containers: Vec<CompositeRef>,
    functions: Vec<FunctionContext>,
    checked: bool,
}

impl Checker {
    /// Create a checker for `program` at `location`.
    ///
    /// Fails if the program imports its own location.
    pub fn new(
        program: Arc<Program>,
        location: Location,
        config: Config,
    ) -> Result<Checker, CheckerError> {
        let cyclic: Vec<SemanticError> = program
            .imports
            .iter()
            .filter(|import| import.location == location)
            .map(|import| SemanticError::CyclicImport {
                location: location.clone(),
                pos: import.range.start,
            })
            .collect();
        if !cyclic.is_empty() {
            return Err(CheckerError {
                location,
                errors: cyclic,
            });
        }

        let base_activation = config.base_value_activation(&location);
        Ok(Checker {
            program,
            elaboration: Elaboration::new(location.clone()),
            location,
            config,
            base_activation,
            globals: HashMap::new(),
            global_types: HashMap::new(),
            errors: Vec::new(),
            scopes: Vec::new(),
            containers: Vec::new(),
            functions: Vec::new(),
            checked: false,
        })
    }

    /// Run all phases. Checking happens once; later calls report the same
    /// outcome again.
    pub fn check(&mut self) -> Result<(), CheckerError> {
        if !self.checked {
            let program = Arc::clone(&self.program);
            tracing::debug!(location = %self.location, "checking program");

            self.resolve_imports(&program);
            self.declare_composites(&program);
            self.resolve_members(&program);
            self.declare_globals(&program);
            self.check_bodies(&program);
            self.checked = true;

            tracing::debug!(
                location = %self.location,
                errors = self.errors.len(),
                "checked program"
            );
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CheckerError {
                location: self.location.clone(),
                errors: self.errors.clone(),
            })
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn elaboration(&self) -> &Elaboration {
        &self.elaboration
    }

    pub fn into_elaboration(self) -> Elaboration {
        self.elaboration
    }

    pub fn access_check_mode(&self) -> AccessCheckMode {
        self.config.access_check_mode
    }

    pub fn base_activation(&self) -> &Arc<VariableActivation> {
        &self.base_activation
    }

    // -- Shared helpers -----------------------------------------

    fn report(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare_local(&mut self, variable: Variable, pos: Position) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&variable.identifier) {
            let name = variable.identifier;
            self.report(SemanticError::Redeclaration { name, pos });
            return;
        }
        scope.insert(variable.identifier.clone(), variable);
    }

    /// Add a global value. Values declared by this program are also
    /// recorded in the elaboration.
    fn declare_global(&mut self, variable: Variable, pos: Position, export: bool) {
        if self.globals.contains_key(&variable.identifier) {
            self.report(SemanticError::Redeclaration {
                name: variable.identifier,
                pos,
            });
            return;
        }
        if export {
            self.elaboration.declare_global_value(variable.clone());
        }
        self.globals.insert(variable.identifier.clone(), variable);
    }

    fn declare_global_type(&mut self, name: &str, r: CompositeRef, pos: Position, export: bool) {
        if self.global_types.contains_key(name) {
            self.report(SemanticError::Redeclaration {
                name: name.to_owned(),
                pos,
            });
            return;
        }
        if export {
            self.elaboration
                .declare_global_type(name.to_owned(), r.clone());
        }
        self.global_types.insert(name.to_owned(), r);
    }

    /// Scopes innermost first, then nested types of enclosing composites,
    /// then globals, then the base activation.
    fn find_value(&self, name: &str) -> Option<Variable> {
        if let Some(local) = self.scopes.iter().rev().find_map(|scope| scope.get(name)) {
            return Some(local.clone());
        }
        for container in self.containers.iter().rev() {
            let nested = self.composite(container).and_then(|c| c.member(name));
            if let Some(Member {
                kind: MemberKind::Type(kind),
                ty,
                access,
                pos,
                ..
            }) = nested
            {
                return Some(Variable {
                    identifier: name.to_owned(),
                    kind: DeclarationKind::Composite(*kind),
                    ty: ty.clone(),
                    access: *access,
                    pos: Some(*pos),
                });
            }
        }
        self.globals
            .get(name)
            .or_else(|| self.base_activation.find(name))
            .cloned()
    }

    fn composite(&self, r: &CompositeRef) -> Option<&CompositeType> {
        self.elaboration.composite(r)
    }

    fn composite_kind(&self, r: &CompositeRef) -> Option<CompositeKind> {
        self.composite(r).map(|c| c.kind)
    }

    fn lookup_member(&self, owner: &CompositeRef, name: &str) -> Option<Member> {
        self.composite(owner)
            .and_then(|c| c.member(name))
            .cloned()
    }

    fn require_access_modifier(
        &mut self,
        access: Access,
        name: &str,
        declaration_kind: &'static str,
        pos: Position,
    ) {
        if access == Access::NotSpecified && self.config.access_check_mode.requires_modifier() {
            self.report(SemanticError::MissingAccessModifier {
                name: name.to_owned(),
                declaration_kind,
                pos,
            });
        }
    }

    fn enclosing_contract(&self, r: &CompositeRef) -> Option<CompositeRef> {
        let mut current = r.clone();
        loop {
            let composite = self.composite(&current)?;
            if composite.kind == CompositeKind::Contract {
                return Some(current);
            }
            current = composite.container.clone()?;
        }
    }

    /// Whether code at the current point may use a member of `owner`
    /// declared with `access`.
    fn is_accessible(&self, owner: &CompositeRef, access: Access) -> bool {
        match self.config.access_check_mode.effective(access) {
            Access::Public => true,
            Access::Account => owner.location == self.location,
            Access::Contract => {
                let scope = self
                    .enclosing_contract(owner)
                    .unwrap_or_else(|| owner.clone());
                self.containers.contains(&scope)
            }
            Access::Private | Access::NotSpecified => self.containers.contains(owner),
        }
    }

    fn check_member_access(&mut self, owner: &CompositeRef, member: &Member, pos: Position) {
        if !self.is_accessible(owner, member.access) {
            self.report(SemanticError::InvalidAccess {
                name: member.identifier.clone(),
                declaration_kind: member.kind.name(),
                access: self.config.access_check_mode.effective(member.access),
                pos,
            });
        }
    }

    fn is_importable(&self, access: Access) -> bool {
        self.config.access_check_mode.effective(access) == Access::Public
    }
}

#[cfg(test)]
mod tests;
