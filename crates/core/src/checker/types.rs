use super::Checker;
use crate::ast::{CompositeKind, Identifier, TypeAnnotation, TypeAnnotationKind};
use crate::elaboration::MemberKind;
use crate::error::SemanticError;
use crate::types::{CompositeRef, Type};

impl Checker {
    // -- Type annotations ---------------------------------------

    pub(super) fn resolve_type(&mut self, annotation: &TypeAnnotation) -> Type {
        match &annotation.kind {
            TypeAnnotationKind::Optional(inner) => Type::optional(self.resolve_type(inner)),
            TypeAnnotationKind::Array(element) => Type::array(self.resolve_type(element)),
            TypeAnnotationKind::Dictionary { key, value } => {
                let key_ty = self.resolve_type(key);
                if !self.is_valid_dictionary_key(&key_ty) {
                    self.report(SemanticError::InvalidDictionaryKeyType {
                        ty: key_ty.clone(),
                        pos: key.pos,
                    });
                }
                let value_ty = self.resolve_type(value);
                Type::Dictionary(Box::new(key_ty), Box::new(value_ty))
            }
            TypeAnnotationKind::Nominal { identifier, nested } => {
                self.resolve_nominal(identifier, nested)
            }
        }
    }

    fn resolve_nominal(&mut self, identifier: &Identifier, nested: &[Identifier]) -> Type {
        if nested.is_empty() {
            if let Some(builtin) = Type::builtin(&identifier.name) {
                return builtin;
            }
        }
        let Some(mut current) = self.find_type(&identifier.name) else {
            self.report(SemanticError::NotDeclared {
                kind: "type",
                name: identifier.name.clone(),
                pos: identifier.pos,
            });
            return Type::Invalid;
        };
        for part in nested {
            match self.lookup_member(&current, &part.name) {
                Some(member) if matches!(member.kind, MemberKind::Type(_)) => {
                    self.check_member_access(&current, &member, part.pos);
                    current = current.nested(&part.name);
                }
                _ => {
                    self.report(SemanticError::NotDeclared {
                        kind: "type",
                        name: format!("{}.{}", current.qualified_identifier, part.name),
                        pos: part.pos,
                    });
                    return Type::Invalid;
                }
            }
        }
        Type::Composite(current)
    }

    /// Nested types of enclosing composites shadow top-level types.
    fn find_type(&self, name: &str) -> Option<CompositeRef> {
        for container in self.containers.iter().rev() {
            let is_nested_type = self
                .composite(container)
                .and_then(|c| c.member(name))
                .is_some_and(|m| matches!(m.kind, MemberKind::Type(_)));
            if is_nested_type {
                return Some(container.nested(name));
            }
        }
        self.global_types.get(name).cloned()
    }

    // -- Type properties that need composite kinds ---------------

    fn is_enum(&self, r: &CompositeRef) -> bool {
        self.composite_kind(r) == Some(CompositeKind::Enum)
    }

    pub(super) fn is_valid_dictionary_key(&self, ty: &Type) -> bool {
        match ty {
            Type::Invalid
            | Type::Bool
            | Type::String
            | Type::Address
            | Type::Number
            | Type::MetaType
            | Type::Integer(_)
            | Type::Fixed(_) => true,
            Type::Composite(r) => self.is_enum(r),
            _ => false,
        }
    }

    /// Event fields must be storable plain data.
    pub(super) fn is_valid_event_parameter_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Invalid
            | Type::Bool
            | Type::String
            | Type::Address
            | Type::Number
            | Type::AnyStruct
            | Type::MetaType
            | Type::Integer(_)
            | Type::Fixed(_) => true,
            Type::Optional(inner) | Type::Array(inner) => self.is_valid_event_parameter_type(inner),
            Type::Dictionary(key, value) => {
                self.is_valid_event_parameter_type(key) && self.is_valid_event_parameter_type(value)
            }
            Type::Composite(r) => matches!(
                self.composite_kind(r),
                Some(CompositeKind::Struct | CompositeKind::Enum) | None
            ),
            Type::Never | Type::Void | Type::Constructor(_) | Type::Function(_) => false,
        }
    }

    pub(super) fn is_equatable(&self, ty: &Type) -> bool {
        match ty {
            Type::Invalid
            | Type::Never
            | Type::Bool
            | Type::String
            | Type::Address
            | Type::Number
            | Type::MetaType
            | Type::Integer(_)
            | Type::Fixed(_) => true,
            Type::Optional(inner) | Type::Array(inner) => self.is_equatable(inner),
            Type::Dictionary(key, value) => self.is_equatable(key) && self.is_equatable(value),
            Type::Composite(r) => self.is_enum(r),
            _ => false,
        }
    }
}
