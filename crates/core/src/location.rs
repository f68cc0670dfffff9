//! Source locations and positions.
//!
//! A [`Location`] names a program or module for the checker. It is the key
//! under which elaborations are found and the prefix of every type id
//! declared in that program.

use serde::Serialize;
use std::fmt;

/// An 8-byte account address, written as `0x` followed by hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Address(pub [u8; 8]);

impl Address {
    /// Build an address from an integer literal. Returns `None` when the
    /// value does not fit in eight bytes.
    pub fn from_u128(value: u128) -> Option<Self> {
        let value = u64::try_from(value).ok()?;
        Some(Address(value.to_be_bytes()))
    }

    pub fn hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Location {
    /// A well-known symbolic name, e.g. a built-in contract.
    Identifier(String),
    /// A path given as a string literal in an import.
    String(String),
    /// An account address.
    Address(Address),
}

impl Location {
    pub fn identifier(name: impl Into<String>) -> Self {
        Location::Identifier(name.into())
    }

    fn prefix(&self) -> &'static str {
        match self {
            Location::Identifier(_) => "I",
            Location::String(_) => "S",
            Location::Address(_) => "A",
        }
    }

    fn key(&self) -> String {
        match self {
            Location::Identifier(id) => id.clone(),
            Location::String(path) => path.clone(),
            Location::Address(address) => address.hex(),
        }
    }

    /// Globally unique id of a type declared at this location.
    pub fn type_id(&self, qualified_identifier: &str) -> String {
        format!("{}.{}.{}", self.prefix(), self.key(), qualified_identifier)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Identifier(id) => write!(f, "{}", id),
            Location::String(path) => write!(f, "\"{}\"", path),
            Location::Address(address) => write!(f, "{}", address),
        }
    }
}

/// A point in source text. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }
}
