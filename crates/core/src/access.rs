//! Declaration access levels and the policy for enforcing them.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// No modifier was written.
    NotSpecified,
    /// `priv` / `access(self)`
    Private,
    /// `access(contract)`
    Contract,
    /// `access(account)`
    Account,
    /// `pub` / `access(all)`
    Public,
}

impl Access {
    /// The source keyword for this access level.
    pub fn keyword(&self) -> &'static str {
        match self {
            Access::NotSpecified => "",
            Access::Private => "access(self)",
            Access::Contract => "access(contract)",
            Access::Account => "access(account)",
            Access::Public => "access(all)",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Access::NotSpecified => "unspecified",
            Access::Private => "private",
            Access::Contract => "contract",
            Access::Account => "account",
            Access::Public => "public",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessCheckMode {
    /// Access modifiers are required and always enforced.
    #[default]
    Strict,
    /// Access modifiers are optional; a missing one means private.
    NotSpecifiedRestricted,
    /// Access modifiers are optional; a missing one means public.
    NotSpecifiedUnrestricted,
    /// Nothing is enforced.
    None,
}

impl AccessCheckMode {
    /// Whether a declaration without a modifier is an error.
    pub fn requires_modifier(self) -> bool {
        matches!(self, AccessCheckMode::Strict)
    }

    /// The access a declaration effectively has under this mode.
    pub fn effective(self, declared: Access) -> Access {
        match (self, declared) {
            (AccessCheckMode::None, _) => Access::Public,
            (AccessCheckMode::NotSpecifiedUnrestricted, Access::NotSpecified) => Access::Public,
            (_, Access::NotSpecified) => Access::Private,
            (_, other) => other,
        }
    }
}
