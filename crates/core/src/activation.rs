//! Value bindings visible to a program before any of its own declarations.

use crate::access::Access;
use crate::ast::CompositeKind;
use crate::location::Position;
use crate::types::{FixedKind, FunctionParameter, FunctionType, IntegerKind, Type};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Constant,
    Variable,
    Parameter,
    Function,
    Composite(CompositeKind),
}

impl DeclarationKind {
    pub fn name(&self) -> &'static str {
        match self {
            DeclarationKind::Constant => "constant",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::Function => "function",
            DeclarationKind::Composite(kind) => kind.keyword(),
        }
    }

    pub fn is_assignable(&self) -> bool {
        matches!(self, DeclarationKind::Variable)
    }
}

/// A named value binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub identifier: String,
    pub kind: DeclarationKind,
    pub ty: Type,
    pub access: Access,
    /// Declaration site; `None` for built-ins.
    pub pos: Option<Position>,
}

impl Variable {
    /// A public built-in function.
    pub fn builtin_function(identifier: impl Into<String>, ty: FunctionType) -> Self {
        Variable {
            identifier: identifier.into(),
            kind: DeclarationKind::Function,
            ty: Type::Function(Box::new(ty)),
            access: Access::Public,
            pos: None,
        }
    }
}

/// An append-only set of bindings layered over an optional shared parent.
///
/// Declaring into an activation never touches its parent, so one parent can
/// back any number of children.
#[derive(Debug, Default)]
pub struct VariableActivation {
    parent: Option<Arc<VariableActivation>>,
    entries: Vec<Variable>,
    index: HashMap<String, usize>,
}

impl VariableActivation {
    pub fn new(parent: Option<Arc<VariableActivation>>) -> Self {
        VariableActivation {
            parent,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn parent(&self) -> Option<&Arc<VariableActivation>> {
        self.parent.as_ref()
    }

    /// Add a binding. Returns `false` and keeps the existing binding if the
    /// name is already declared in this activation (not its parents).
    pub fn declare(&mut self, variable: Variable) -> bool {
        if self.index.contains_key(&variable.identifier) {
            return false;
        }
        self.index
            .insert(variable.identifier.clone(), self.entries.len());
        self.entries.push(variable);
        true
    }

    /// Look up a name here, then in the parent chain.
    pub fn find(&self, name: &str) -> Option<&Variable> {
        match self.index.get(name) {
            Some(&i) => Some(&self.entries[i]),
            None => self.parent.as_ref().and_then(|p| p.find(name)),
        }
    }

    /// Bindings declared in this activation, in declaration order.
    pub fn local_entries(&self) -> &[Variable] {
        &self.entries
    }

    /// Every visible name, parents first.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self
            .parent
            .as_ref()
            .map(|p| p.names())
            .unwrap_or_default();
        for v in &self.entries {
            if !names.contains(&v.identifier.as_str()) {
                names.push(&v.identifier);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The shared default activation: numeric conversion functions such as
/// `UInt8(_ value: Number): UInt8`.
pub fn base_value_activation() -> Arc<VariableActivation> {
    static BASE: OnceLock<Arc<VariableActivation>> = OnceLock::new();
    BASE.get_or_init(|| {
        let mut activation = VariableActivation::new(None);
        let targets = IntegerKind::ALL
            .iter()
            .map(|k| Type::Integer(*k))
            .chain([Type::Fixed(FixedKind::Fix64), Type::Fixed(FixedKind::UFix64)]);
        for target in targets {
            let conversion = FunctionType::new(
                vec![FunctionParameter {
                    label: None,
                    identifier: "value".to_owned(),
                    ty: Type::Number,
                }],
                target.clone(),
            );
            activation.declare(Variable::builtin_function(target.to_string(), conversion));
        }
        Arc::new(activation)
    })
    .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str) -> Variable {
        Variable {
            identifier: name.to_owned(),
            kind: DeclarationKind::Constant,
            ty: Type::Bool,
            access: Access::Public,
            pos: None,
        }
    }

    #[test]
    fn child_lookup_falls_back_to_parent() {
        let parent = Arc::new({
            let mut a = VariableActivation::new(None);
            a.declare(constant("outer"));
            a
        });
        let mut child = VariableActivation::new(Some(parent.clone()));
        assert!(child.declare(constant("inner")));

        assert!(child.find("outer").is_some());
        assert!(child.find("inner").is_some());
        assert!(parent.find("inner").is_none());
        assert_eq!(child.names(), vec!["outer", "inner"]);
    }

    #[test]
    fn redeclaring_in_same_activation_is_refused() {
        let mut a = VariableActivation::new(None);
        assert!(a.declare(constant("x")));
        assert!(!a.declare(constant("x")));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn base_activation_is_shared_and_holds_conversions() {
        let first = base_value_activation();
        let second = base_value_activation();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.find("UInt8").is_some());
        assert!(first.find("UFix64").is_some());
        assert!(first.find("assert").is_none());
        assert!(first.find("panic").is_none());
    }
}
