//! Syntax tree produced by the parser.
//!
//! Every node carries the position of its first token. Nothing here is
//! resolved or checked; that is the checker's job.

use crate::access::Access;
use crate::location::{Location, Position, Range};

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub pos: Position,
}

// ──────────────────────────────────────────────
// Program
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub imports: Vec<ImportDeclaration>,
    pub declarations: Vec<Declaration>,
}

impl Program {
    pub fn composites(&self) -> impl Iterator<Item = &CompositeDeclaration> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Composite(c) => Some(c),
            _ => None,
        })
    }
}

/// `import Name` or `import A, B from <location>`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    /// Explicitly imported names; empty means everything.
    pub identifiers: Vec<Identifier>,
    pub location: Location,
    pub range: Range,
}

// ──────────────────────────────────────────────
// Declarations
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Composite(CompositeDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Contract,
    Struct,
    Resource,
    Event,
    Enum,
}

impl CompositeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            CompositeKind::Contract => "contract",
            CompositeKind::Struct => "struct",
            CompositeKind::Resource => "resource",
            CompositeKind::Event => "event",
            CompositeKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDeclaration {
    pub access: Access,
    pub kind: CompositeKind,
    pub identifier: Identifier,
    /// Enum raw type (`enum E: UInt8`)
    pub raw_type: Option<TypeAnnotation>,
    /// Event parameters (`event E(a: Int)`)
    pub parameters: Vec<Parameter>,
    pub members: Members,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Members {
    pub fields: Vec<FieldDeclaration>,
    pub functions: Vec<FunctionDeclaration>,
    pub initializers: Vec<FunctionDeclaration>,
    pub composites: Vec<CompositeDeclaration>,
    pub enum_cases: Vec<EnumCaseDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub access: Access,
    pub kind: VariableKind,
    pub identifier: Identifier,
    pub type_annotation: TypeAnnotation,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumCaseDeclaration {
    pub access: Access,
    pub identifier: Identifier,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub access: Access,
    pub identifier: Identifier,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Explicit argument label; `_` means the argument is unlabeled.
    pub label: Option<String>,
    pub identifier: Identifier,
    pub type_annotation: TypeAnnotation,
}

impl Parameter {
    /// The label callers must write, if any.
    pub fn effective_label(&self) -> Option<&str> {
        match self.label.as_deref() {
            Some("_") => None,
            Some(label) => Some(label),
            None => Some(&self.identifier.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub access: Access,
    pub kind: VariableKind,
    pub identifier: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
    pub value: Expression,
    pub pos: Position,
}

// ──────────────────────────────────────────────
// Types
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotationKind {
    /// `Name` or `Outer.Inner`
    Nominal {
        identifier: Identifier,
        nested: Vec<Identifier>,
    },
    Optional(Box<TypeAnnotation>),
    Array(Box<TypeAnnotation>),
    Dictionary {
        key: Box<TypeAnnotation>,
        value: Box<TypeAnnotation>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeAnnotationKind,
    pub pos: Position,
}

// ──────────────────────────────────────────────
// Statements
// ──────────────────────────────────────────────

pub type Block = Vec<Statement>;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Variable(VariableDeclaration),
    Assignment {
        target: Expression,
        value: Expression,
        pos: Position,
    },
    Return {
        value: Option<Expression>,
        pos: Position,
    },
    If {
        test: IfTest,
        then: Block,
        otherwise: Option<Block>,
        pos: Position,
    },
    While {
        test: Expression,
        body: Block,
        pos: Position,
    },
    Emit {
        invocation: Expression,
        pos: Position,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IfTest {
    Expression(Expression),
    /// `if let name = optional`
    Binding {
        kind: VariableKind,
        identifier: Identifier,
        value: Expression,
    },
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    NilCoalescing,
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::NilCoalescing => "??",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: Expression,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Bool(bool),
    Nil,
    Integer { value: u128, radix: u32 },
    Fixed(String),
    String(String),
    Identifier(String),
    Array(Vec<Expression>),
    Dictionary(Vec<(Expression, Expression)>),
    Member {
        target: Box<Expression>,
        name: Identifier,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    Invocation {
        callee: Box<Expression>,
        arguments: Vec<Argument>,
    },
    Force(Box<Expression>),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub pos: Position,
}
