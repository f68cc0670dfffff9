//! Semantic summary of one checked location.

use crate::access::{Access, AccessCheckMode};
use crate::activation::Variable;
use crate::ast::{CompositeKind, VariableKind};
use crate::location::{Location, Position};
use crate::types::{CompositeRef, FunctionType, Type};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field(VariableKind),
    Function,
    /// A nested composite type.
    Type(CompositeKind),
    EnumCase,
}

impl MemberKind {
    pub fn name(&self) -> &'static str {
        match self {
            MemberKind::Field(_) => "field",
            MemberKind::Function => "function",
            MemberKind::Type(kind) => kind.keyword(),
            MemberKind::EnumCase => "enum case",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub identifier: String,
    pub access: Access,
    pub kind: MemberKind,
    pub ty: Type,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeType {
    pub location: Location,
    pub qualified_identifier: String,
    pub identifier: String,
    pub kind: CompositeKind,
    pub access: Access,
    /// The composite this one is nested in.
    pub container: Option<CompositeRef>,
    pub members: Vec<Member>,
    /// Constructor signature. Enums take `rawValue` and return an optional.
    pub initializer: Option<FunctionType>,
    pub enum_raw_type: Option<Type>,
    pub pos: Position,
}

impl CompositeType {
    pub fn reference(&self) -> CompositeRef {
        CompositeRef::new(self.location.clone(), self.qualified_identifier.clone())
    }

    pub fn type_id(&self) -> String {
        self.location.type_id(&self.qualified_identifier)
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.identifier == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| matches!(m.kind, MemberKind::Field(_)))
    }

    pub fn enum_cases(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::EnumCase)
    }
}

#[derive(Debug, Clone)]
pub struct Elaboration {
    location: Location,
    composites: BTreeMap<String, CompositeType>,
    global_values: Vec<Variable>,
    global_types: Vec<(String, CompositeRef)>,
    imports: BTreeMap<Location, Arc<Elaboration>>,
}

impl Elaboration {
    pub fn new(location: Location) -> Self {
        Elaboration {
            location,
            composites: BTreeMap::new(),
            global_values: Vec::new(),
            global_types: Vec::new(),
            imports: BTreeMap::new(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Composite types declared at this location, keyed by type id.
    pub fn composites(&self) -> impl Iterator<Item = &CompositeType> {
        self.composites.values()
    }

    /// Find a composite declared here or in any imported elaboration.
    pub fn composite(&self, r: &CompositeRef) -> Option<&CompositeType> {
        if r.location == self.location {
            return self.composites.get(&r.type_id());
        }
        self.imports.values().find_map(|e| e.composite(r))
    }

    /// Find a composite declared at this location by qualified identifier.
    pub fn composite_by_name(&self, qualified_identifier: &str) -> Option<&CompositeType> {
        self.composites
            .get(&self.location.type_id(qualified_identifier))
    }

    /// Top-level values declared by this location, in declaration order.
    /// Imported values are not included.
    pub fn global_values(&self) -> &[Variable] {
        &self.global_values
    }

    pub fn global_value(&self, name: &str) -> Option<&Variable> {
        self.global_values.iter().find(|v| v.identifier == name)
    }

    /// Top-level types declared by this location.
    pub fn global_types(&self) -> &[(String, CompositeRef)] {
        &self.global_types
    }

    pub fn global_type(&self, name: &str) -> Option<&CompositeRef> {
        self.global_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn imports(&self) -> &BTreeMap<Location, Arc<Elaboration>> {
        &self.imports
    }

    pub fn import(&self, location: &Location) -> Option<&Arc<Elaboration>> {
        self.imports.get(location)
    }

    /// Names an importer can bring into scope under `mode`.
    pub fn exported_names(&self, mode: AccessCheckMode) -> Vec<&str> {
        self.global_values
            .iter()
            .filter(|v| mode.effective(v.access) == Access::Public)
            .map(|v| v.identifier.as_str())
            .collect()
    }

    /// Qualified identifiers of every composite reachable from outside under
    /// `mode`: public itself and nested only in public composites.
    pub fn exported_type_names(&self, mode: AccessCheckMode) -> Vec<String> {
        self.composites
            .values()
            .filter(|c| self.is_exported(c, mode))
            .map(|c| c.qualified_identifier.clone())
            .collect()
    }

    fn is_exported(&self, composite: &CompositeType, mode: AccessCheckMode) -> bool {
        if mode.effective(composite.access) != Access::Public {
            return false;
        }
        match &composite.container {
            Some(container) => self
                .composite(container)
                .is_some_and(|c| self.is_exported(c, mode)),
            None => true,
        }
    }

    // -- Mutation while checking ----------------------------------

    pub(crate) fn insert_composite(&mut self, composite: CompositeType) {
        self.composites.insert(composite.type_id(), composite);
    }

    pub(crate) fn composite_mut(&mut self, r: &CompositeRef) -> Option<&mut CompositeType> {
        self.composites.get_mut(&r.type_id())
    }

    pub(crate) fn declare_global_value(&mut self, variable: Variable) {
        self.global_values.push(variable);
    }

    pub(crate) fn declare_global_type(&mut self, name: String, r: CompositeRef) {
        self.global_types.push((name, r));
    }

    pub(crate) fn add_import(&mut self, elaboration: Arc<Elaboration>) {
        self.imports
            .insert(elaboration.location().clone(), elaboration);
    }
}
