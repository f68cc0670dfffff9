use cdc_core::VariableActivation;
use cdc_stdlib::{assert_function, panic_function};
use std::sync::Arc;

/// A child of the shared default activation declaring `assert` and `panic`.
///
/// Built fresh on each call; the shared default is never modified.
pub fn base_value_activation() -> Arc<VariableActivation> {
    let mut activation = VariableActivation::new(Some(cdc_core::base_value_activation()));
    activation.declare(assert_function());
    activation.declare(panic_function());
    Arc::new(activation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdc_core::Type;

    #[test]
    fn declares_exactly_assert_and_panic() {
        let activation = base_value_activation();
        let names: Vec<&str> = activation
            .local_entries()
            .iter()
            .map(|v| v.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["assert", "panic"]);
    }

    #[test]
    fn shared_default_is_untouched() {
        let _ = base_value_activation();
        let shared = cdc_core::base_value_activation();
        assert!(shared.find("assert").is_none());
        assert!(shared.find("panic").is_none());
    }

    #[test]
    fn defaults_remain_visible() {
        let activation = base_value_activation();
        let uint8 = activation.find("UInt8").unwrap();
        assert!(matches!(uint8.ty, Type::Function(_)));
    }
}
