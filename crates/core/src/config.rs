use crate::access::AccessCheckMode;
use crate::activation::{base_value_activation, VariableActivation};
use crate::import::ImportHandler;
use crate::location::Location;
use std::fmt;
use std::sync::Arc;

pub type BaseValueActivationHandler =
    Box<dyn Fn(&Location) -> Arc<VariableActivation> + Send + Sync>;

/// Checker configuration. Built fresh for every checker.
#[derive(Default)]
pub struct Config {
    pub access_check_mode: AccessCheckMode,
    /// Supplies the values visible before the program's own declarations.
    /// Without one, the shared default activation is used.
    pub base_value_activation_handler: Option<BaseValueActivationHandler>,
    /// Without one, every import fails.
    pub import_handler: Option<Box<dyn ImportHandler>>,
}

impl Config {
    pub fn with_access_check_mode(mut self, mode: AccessCheckMode) -> Self {
        self.access_check_mode = mode;
        self
    }

    pub fn with_base_value_activation_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Location) -> Arc<VariableActivation> + Send + Sync + 'static,
    {
        self.base_value_activation_handler = Some(Box::new(handler));
        self
    }

    pub fn with_import_handler(mut self, handler: impl ImportHandler + 'static) -> Self {
        self.import_handler = Some(Box::new(handler));
        self
    }

    pub(crate) fn base_value_activation(&self, location: &Location) -> Arc<VariableActivation> {
        match &self.base_value_activation_handler {
            Some(handler) => handler(location),
            None => base_value_activation(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_check_mode", &self.access_check_mode)
            .field(
                "base_value_activation_handler",
                &self.base_value_activation_handler.is_some(),
            )
            .field("import_handler", &self.import_handler.is_some())
            .finish()
    }
}
