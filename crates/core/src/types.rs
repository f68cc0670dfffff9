//! Semantic types.
//!
//! Composite types are referred to by [`CompositeRef`] (location plus
//! qualified identifier); their members live in the
//! [`Elaboration`](crate::elaboration::Elaboration) of the declaring location.

use crate::location::Location;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
}

impl IntegerKind {
    pub const ALL: [IntegerKind; 12] = [
        IntegerKind::Int,
        IntegerKind::Int8,
        IntegerKind::Int16,
        IntegerKind::Int32,
        IntegerKind::Int64,
        IntegerKind::Int128,
        IntegerKind::UInt,
        IntegerKind::UInt8,
        IntegerKind::UInt16,
        IntegerKind::UInt32,
        IntegerKind::UInt64,
        IntegerKind::UInt128,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IntegerKind::Int => "Int",
            IntegerKind::Int8 => "Int8",
            IntegerKind::Int16 => "Int16",
            IntegerKind::Int32 => "Int32",
            IntegerKind::Int64 => "Int64",
            IntegerKind::Int128 => "Int128",
            IntegerKind::UInt => "UInt",
            IntegerKind::UInt8 => "UInt8",
            IntegerKind::UInt16 => "UInt16",
            IntegerKind::UInt32 => "UInt32",
            IntegerKind::UInt64 => "UInt64",
            IntegerKind::UInt128 => "UInt128",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        IntegerKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntegerKind::Int
                | IntegerKind::Int8
                | IntegerKind::Int16
                | IntegerKind::Int32
                | IntegerKind::Int64
                | IntegerKind::Int128
        )
    }

    fn bits(&self) -> Option<u32> {
        match self {
            IntegerKind::Int | IntegerKind::UInt => None,
            IntegerKind::Int8 | IntegerKind::UInt8 => Some(8),
            IntegerKind::Int16 | IntegerKind::UInt16 => Some(16),
            IntegerKind::Int32 | IntegerKind::UInt32 => Some(32),
            IntegerKind::Int64 | IntegerKind::UInt64 => Some(64),
            IntegerKind::Int128 | IntegerKind::UInt128 => Some(128),
        }
    }

    /// Whether a literal of the given magnitude and sign fits this kind.
    pub fn admits(&self, magnitude: u128, negative: bool) -> bool {
        if negative && magnitude > 0 && !self.is_signed() {
            return false;
        }
        let Some(bits) = self.bits() else {
            return true;
        };
        let limit: u128 = if self.is_signed() {
            let half = 1u128 << (bits - 1);
            if negative {
                half
            } else {
                half - 1
            }
        } else if bits == 128 {
            u128::MAX
        } else {
            (1u128 << bits) - 1
        };
        magnitude <= limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedKind {
    Fix64,
    UFix64,
}

impl FixedKind {
    pub fn name(&self) -> &'static str {
        match self {
            FixedKind::Fix64 => "Fix64",
            FixedKind::UFix64 => "UFix64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Fix64" => Some(FixedKind::Fix64),
            "UFix64" => Some(FixedKind::UFix64),
            _ => None,
        }
    }
}

/// A reference to a composite type declared somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeRef {
    pub location: Location,
    pub qualified_identifier: String,
}

impl CompositeRef {
    pub fn new(location: Location, qualified_identifier: impl Into<String>) -> Self {
        CompositeRef {
            location,
            qualified_identifier: qualified_identifier.into(),
        }
    }

    pub fn type_id(&self) -> String {
        self.location.type_id(&self.qualified_identifier)
    }

    pub fn nested(&self, identifier: &str) -> CompositeRef {
        CompositeRef::new(
            self.location.clone(),
            format!("{}.{}", self.qualified_identifier, identifier),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    pub label: Option<String>,
    pub identifier: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Type,
    /// Minimum number of arguments; `None` means all parameters are required.
    pub required_argument_count: Option<usize>,
}

impl FunctionType {
    pub fn new(parameters: Vec<FunctionParameter>, return_type: Type) -> Self {
        FunctionType {
            parameters,
            return_type,
            required_argument_count: None,
        }
    }

    pub fn min_arguments(&self) -> usize {
        self.required_argument_count
            .unwrap_or(self.parameters.len())
            .min(self.parameters.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Placeholder after an error has been reported; compatible with everything.
    Invalid,
    Never,
    Void,
    Bool,
    String,
    Address,
    /// Supertype of all numeric types.
    Number,
    AnyStruct,
    /// The type of run-time type values, written `Type`.
    MetaType,
    Integer(IntegerKind),
    Fixed(FixedKind),
    Optional(Box<Type>),
    Array(Box<Type>),
    Dictionary(Box<Type>, Box<Type>),
    /// An instance of a composite.
    Composite(CompositeRef),
    /// The composite type itself used as a value: callable as a constructor,
    /// and carrying enum cases as members.
    Constructor(CompositeRef),
    Function(Box<FunctionType>),
}

impl Type {
    /// Built-in type for a name, if there is one.
    pub fn builtin(name: &str) -> Option<Type> {
        let ty = match name {
            "Never" => Type::Never,
            "Void" => Type::Void,
            "Bool" => Type::Bool,
            "String" => Type::String,
            "Address" => Type::Address,
            "Number" => Type::Number,
            "AnyStruct" => Type::AnyStruct,
            "Type" => Type::MetaType,
            other => {
                if let Some(kind) = IntegerKind::from_name(other) {
                    Type::Integer(kind)
                } else if let Some(kind) = FixedKind::from_name(other) {
                    Type::Fixed(kind)
                } else {
                    return None;
                }
            }
        };
        Some(ty)
    }

    pub fn optional(inner: Type) -> Type {
        Type::Optional(Box::new(inner))
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn function(parameters: Vec<FunctionParameter>, return_type: Type) -> Type {
        Type::Function(Box::new(FunctionType::new(parameters, return_type)))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer(_) | Type::Fixed(_) | Type::Number)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer(_))
    }

    /// Strip any number of optional layers.
    pub fn unwrap_optionals(&self) -> &Type {
        match self {
            Type::Optional(inner) => inner.unwrap_optionals(),
            other => other,
        }
    }

    /// Whether `self` can be used where `other` is expected.
    pub fn is_subtype(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Type::Invalid, _) | (_, Type::Invalid) => true,
            (Type::Never, _) => true,
            (Type::Void, _) => false,
            (_, Type::AnyStruct) => !matches!(self, Type::Constructor(_)),
            (Type::Integer(_) | Type::Fixed(_), Type::Number) => true,
            (Type::Optional(a), Type::Optional(b)) => a.is_subtype(b),
            (_, Type::Optional(b)) => self.is_subtype(b),
            (Type::Array(a), Type::Array(b)) => a.is_subtype(b),
            (Type::Dictionary(k1, v1), Type::Dictionary(k2, v2)) => {
                k1.is_subtype(k2) && v1.is_subtype(v2)
            }
            _ => false,
        }
    }

    /// The smallest type both `self` and `other` are subtypes of.
    pub fn join(&self, other: &Type) -> Type {
        if self.is_subtype(other) {
            other.clone()
        } else if other.is_subtype(self) {
            self.clone()
        } else {
            match (self, other) {
                (Type::Optional(a), b) | (b, Type::Optional(a)) => Type::optional(a.join(b)),
                _ => Type::AnyStruct,
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Invalid => write!(f, "<<invalid>>"),
            Type::Never => write!(f, "Never"),
            Type::Void => write!(f, "Void"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Address => write!(f, "Address"),
            Type::Number => write!(f, "Number"),
            Type::AnyStruct => write!(f, "AnyStruct"),
            Type::MetaType => write!(f, "Type"),
            Type::Integer(kind) => write!(f, "{}", kind.name()),
            Type::Fixed(kind) => write!(f, "{}", kind.name()),
            Type::Optional(inner) => write!(f, "{}?", inner),
            Type::Array(element) => write!(f, "[{}]", element),
            Type::Dictionary(key, value) => write!(f, "{{{}: {}}}", key, value),
            Type::Composite(r) => write!(f, "{}", r.qualified_identifier),
            Type::Constructor(r) => write!(f, "{}.Type", r.qualified_identifier),
            Type::Function(ft) => {
                write!(f, "fun(")?;
                for (i, p) in ft.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p.ty)?;
                }
                write!(f, "): {}", ft.return_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IntegerKind::UInt8, 255, false, true)]
    #[case(IntegerKind::UInt8, 256, false, false)]
    #[case(IntegerKind::Int8, 127, false, true)]
    #[case(IntegerKind::Int8, 128, false, false)]
    #[case(IntegerKind::Int8, 128, true, true)]
    #[case(IntegerKind::Int8, 129, true, false)]
    #[case(IntegerKind::UInt64, 1, true, false)]
    #[case(IntegerKind::UInt128, u128::MAX, false, true)]
    #[case(IntegerKind::Int, u128::MAX, true, true)]
    fn integer_literal_ranges(
        #[case] kind: IntegerKind,
        #[case] magnitude: u128,
        #[case] negative: bool,
        #[case] fits: bool,
    ) {
        assert_eq!(kind.admits(magnitude, negative), fits);
    }

    #[test]
    fn optional_and_collection_subtyping() {
        let int = Type::Integer(IntegerKind::Int);
        assert!(int.is_subtype(&Type::optional(int.clone())));
        assert!(Type::optional(Type::Never).is_subtype(&Type::optional(Type::String)));
        assert!(Type::array(Type::Never).is_subtype(&Type::array(int.clone())));
        assert!(int.is_subtype(&Type::Number));
        assert!(int.is_subtype(&Type::AnyStruct));
        assert!(!Type::Void.is_subtype(&Type::AnyStruct));
        assert!(!Type::optional(int.clone()).is_subtype(&int));
        assert!(!Type::Integer(IntegerKind::UInt8).is_subtype(&int));
    }

    #[test]
    fn join_of_unrelated_types_is_any_struct() {
        let joined = Type::String.join(&Type::Bool);
        assert_eq!(joined, Type::AnyStruct);
        assert_eq!(
            Type::optional(Type::Never).join(&Type::String),
            Type::optional(Type::String)
        );
    }

    #[test]
    fn display_forms() {
        let r = CompositeRef::new(Location::identifier("Test"), "Test.ResultStatus");
        assert_eq!(Type::optional(Type::Composite(r.clone())).to_string(), "Test.ResultStatus?");
        assert_eq!(
            Type::Dictionary(Box::new(Type::String), Box::new(Type::array(Type::Address)))
                .to_string(),
            "{String: [Address]}"
        );
        assert_eq!(r.type_id(), "I.Test.Test.ResultStatus");
    }
}
