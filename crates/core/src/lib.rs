#![allow(clippy::result_large_err)]
//! cdc-core: parser and semantic checker for the contract declaration
//! language.
//!
//! Source goes through two stages:
//!
//! - [`parse_program()`] turns bytes into a [`Program`]
//! - [`Checker`] checks a program at a [`Location`] and produces an
//!   [`Elaboration`], pulling imports through an [`ImportHandler`]
//!
//! The values visible to a program before its own declarations come from a
//! [`VariableActivation`]; [`base_value_activation()`] is the shared
//! default.

pub mod access;
pub mod activation;
pub mod ast;
pub mod checker;
pub mod config;
pub mod elaboration;
pub mod error;
pub mod import;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod types;

// ── Convenience re-exports ───────────────────────────────────────────

pub use access::{Access, AccessCheckMode};
pub use activation::{base_value_activation, DeclarationKind, Variable, VariableActivation};
pub use ast::{CompositeKind, Program};
pub use checker::Checker;
pub use config::Config;
pub use elaboration::{CompositeType, Elaboration, Member, MemberKind};
pub use error::{CheckerError, ImportError, ParseError, SemanticError};
pub use import::{ElaborationImport, ImportHandler, MissingImportHandlerError};
pub use location::{Address, Location, Position, Range};
pub use parser::{parse_program, ParserConfig};
pub use types::{CompositeRef, FixedKind, FunctionParameter, FunctionType, IntegerKind, Type};
