use crate::access::Access;
use crate::location::{Location, Position, Range};
use crate::types::Type;
use std::fmt;
use std::sync::Arc;

/// Error returned by an [`ImportHandler`](crate::import::ImportHandler).
pub type ImportError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A lexing or parsing error: the first malformed construct in a source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error in {location} at {pos}: {message}")]
pub struct ParseError {
    pub location: Location,
    pub pos: Position,
    pub message: String,
}

impl ParseError {
    pub fn new(location: &Location, pos: Position, message: impl Into<String>) -> Self {
        ParseError {
            location: location.clone(),
            pos,
            message: message.into(),
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":     "parse",
            "location": self.location.to_string(),
            "line":     self.pos.line,
            "column":   self.pos.column,
            "message":  self.message,
        })
    }
}

/// A violation found while checking a program.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SemanticError {
    #[error("cannot find {kind} in this scope: `{name}`")]
    NotDeclared {
        kind: &'static str,
        name: String,
        pos: Position,
    },

    #[error("cannot redeclare `{name}`: it is already declared")]
    Redeclaration { name: String, pos: Position },

    #[error("mismatched types: expected `{expected}`, got `{actual}`")]
    TypeMismatch {
        expected: Type,
        actual: Type,
        pos: Position,
    },

    #[error("cannot access `{name}`: {declaration_kind} has {access} access")]
    InvalidAccess {
        name: String,
        declaration_kind: &'static str,
        access: Access,
        pos: Position,
    },

    #[error("missing access modifier for {declaration_kind} `{name}`")]
    MissingAccessModifier {
        name: String,
        declaration_kind: &'static str,
        pos: Position,
    },

    #[error("invalid access modifier for {declaration_kind} `{name}`: {access}")]
    InvalidAccessModifier {
        name: String,
        declaration_kind: &'static str,
        access: Access,
        pos: Position,
    },

    #[error("cannot find declaration `{name}` in `{location}`")]
    NotExported {
        name: String,
        location: Location,
        pos: Position,
    },

    #[error("import of `{location}` failed: {error}")]
    Import {
        location: Location,
        range: Range,
        #[source]
        error: ImportError,
    },

    #[error("program at `{location}` cannot import itself")]
    CyclicImport { location: Location, pos: Position },

    #[error("incorrect number of arguments: expected {expected}, got {actual}")]
    ArgumentCount {
        expected: String,
        actual: usize,
        pos: Position,
    },

    #[error("incorrect argument label: expected {expected}, got {actual}")]
    IncorrectArgumentLabel {
        expected: String,
        actual: String,
        pos: Position,
    },

    #[error("cannot call value of type `{ty}`")]
    NotCallable { ty: Type, pos: Position },

    #[error("value of type `{ty}` has no member `{name}`")]
    NotDeclaredMember { ty: Type, name: String, pos: Position },

    #[error("cannot assign to constant `{name}`")]
    AssignmentToConstant { name: String, pos: Position },

    #[error("cannot assign to field `{name}`: fields are only assignable inside their declaring type")]
    InvalidAssignmentAccess { name: String, pos: Position },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget { pos: Position },

    #[error("missing return statement")]
    MissingReturn { pos: Position },

    #[error("missing return value: expected `{expected}`")]
    MissingReturnValue { expected: Type, pos: Position },

    #[error("invalid return value: function does not return a value")]
    InvalidReturnValue { pos: Position },

    #[error("invalid emit: expected an event invocation")]
    InvalidEmit { pos: Position },

    #[error("event `{name}` can only be constructed in an emit statement")]
    InvalidEventUsage { name: String, pos: Position },

    #[error("invalid type for event parameter `{name}`: `{ty}`")]
    InvalidEventParameterType { name: String, ty: Type, pos: Position },

    #[error("cannot apply binary operation `{op}` to types `{left}` and `{right}`")]
    InvalidBinaryOperands {
        op: &'static str,
        left: Type,
        right: Type,
        pos: Position,
    },

    #[error("cannot apply unary operation `{op}` to type `{ty}`")]
    InvalidUnaryOperand {
        op: &'static str,
        ty: Type,
        pos: Position,
    },

    #[error("cannot index into value of type `{ty}`")]
    NotIndexable { ty: Type, pos: Position },

    #[error("expected an optional value, got `{ty}`")]
    NonOptional { ty: Type, pos: Position },

    #[error("integer literal {}{value} is out of range for `{ty}`", sign(.negative))]
    IntegerLiteralOutOfRange {
        value: u128,
        negative: bool,
        ty: Type,
        pos: Position,
    },

    #[error("{kind} declarations are not allowed {context}")]
    InvalidDeclaration {
        kind: &'static str,
        context: &'static str,
        pos: Position,
    },

    #[error("invalid raw type for enum `{name}`: `{ty}`")]
    InvalidEnumRawType { name: String, ty: Type, pos: Position },

    #[error("invalid dictionary key type: `{ty}`")]
    InvalidDictionaryKeyType { ty: Type, pos: Position },

    #[error("missing initializer for `{name}`")]
    MissingInitializer { name: String, pos: Position },

    #[error("field `{field}` of `{composite}` is not initialized")]
    FieldUninitialized {
        composite: String,
        field: String,
        pos: Position,
    },
}

fn sign(negative: &bool) -> &'static str {
    if *negative {
        "-"
    } else {
        ""
    }
}

impl SemanticError {
    pub fn pos(&self) -> Position {
        match self {
            SemanticError::Import { range, .. } => range.start,
            SemanticError::NotDeclared { pos, .. }
            | SemanticError::Redeclaration { pos, .. }
            | SemanticError::TypeMismatch { pos, .. }
            | SemanticError::InvalidAccess { pos, .. }
            | SemanticError::MissingAccessModifier { pos, .. }
            | SemanticError::InvalidAccessModifier { pos, .. }
            | SemanticError::NotExported { pos, .. }
            | SemanticError::CyclicImport { pos, .. }
            | SemanticError::ArgumentCount { pos, .. }
            | SemanticError::IncorrectArgumentLabel { pos, .. }
            | SemanticError::NotCallable { pos, .. }
            | SemanticError::NotDeclaredMember { pos, .. }
            | SemanticError::AssignmentToConstant { pos, .. }
            | SemanticError::InvalidAssignmentAccess { pos, .. }
            | SemanticError::InvalidAssignmentTarget { pos }
            | SemanticError::MissingReturn { pos }
            | SemanticError::MissingReturnValue { pos, .. }
            | SemanticError::InvalidReturnValue { pos }
            | SemanticError::InvalidEmit { pos }
            | SemanticError::InvalidEventUsage { pos, .. }
            | SemanticError::InvalidEventParameterType { pos, .. }
            | SemanticError::InvalidBinaryOperands { pos, .. }
            | SemanticError::InvalidUnaryOperand { pos, .. }
            | SemanticError::NotIndexable { pos, .. }
            | SemanticError::NonOptional { pos, .. }
            | SemanticError::IntegerLiteralOutOfRange { pos, .. }
            | SemanticError::InvalidDeclaration { pos, .. }
            | SemanticError::InvalidEnumRawType { pos, .. }
            | SemanticError::InvalidDictionaryKeyType { pos, .. }
            | SemanticError::MissingInitializer { pos, .. }
            | SemanticError::FieldUninitialized { pos, .. } => *pos,
        }
    }
}

/// All semantic errors found while checking one location.
///
/// Only the first error is rendered by `Display`; the rest stay available
/// through [`CheckerError::errors`].
#[derive(Debug, Clone)]
pub struct CheckerError {
    pub location: Location,
    pub errors: Vec<SemanticError>,
}

impl CheckerError {
    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn first(&self) -> Option<&SemanticError> {
        self.errors.first()
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        let first = self.first();
        serde_json::json!({
            "kind":     "check",
            "location": self.location.to_string(),
            "line":     first.map(|e| e.pos().line),
            "column":   first.map(|e| e.pos().column),
            "message":  first.map(|e| e.to_string()),
            "count":    self.errors.len(),
        })
    }
}

impl fmt::Display for CheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) => {
                write!(
                    f,
                    "checking of {} failed at {}: {}",
                    self.location,
                    first.pos(),
                    first
                )?;
                if self.errors.len() > 1 {
                    write!(f, " (and {} more)", self.errors.len() - 1)?;
                }
                Ok(())
            }
            None => write!(f, "checking of {} failed", self.location),
        }
    }
}

impl std::error::Error for CheckerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
