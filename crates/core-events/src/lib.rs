//! cdc-core-events: the bootstrap check of the embedded `CoreEvents`
//! program.
//!
//! `CoreEvents` declares the events the protocol emits on its own behalf.
//! It is checked in strict access mode against a closed environment: the
//! only importable program is the `Test` support contract, and the only
//! values beyond the defaults are `assert` and `panic`.

pub mod activation;
pub mod driver;
pub mod importer;

pub use activation::base_value_activation;
pub use driver::{check_source, check_source_with_mode, core_events_checker, BootstrapError};
pub use importer::{ClosedImportResolver, UnsupportedImportError};

use cdc_core::Location;
use sha2::{Digest, Sha256};

pub const CORE_EVENTS_IDENTIFIER: &str = "CoreEvents";

/// Source of the `CoreEvents` program.
pub const CORE_EVENTS: &[u8] = include_bytes!("core_events.cdc");

pub fn core_events_location() -> Location {
    Location::identifier(CORE_EVENTS_IDENTIFIER)
}

/// Hex SHA-256 of the embedded source.
pub fn core_events_code_hash() -> String {
    format!("{:x}", Sha256::digest(CORE_EVENTS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_hash_is_hex_sha256() {
        let hash = core_events_code_hash();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, core_events_code_hash());
    }

    #[test]
    fn location_is_the_identifier() {
        assert_eq!(core_events_location(), Location::identifier("CoreEvents"));
        assert_eq!(core_events_location().to_string(), "CoreEvents");
    }
}
