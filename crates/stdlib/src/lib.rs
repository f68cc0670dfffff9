//! cdc-stdlib: standard library values and the `Test` support contract.
//!
//! The `Test` contract ships as embedded source. It is checked at most once
//! per process; every importer shares the resulting elaboration.

use cdc_core::{
    base_value_activation, parse_program, AccessCheckMode, CheckerError, Checker, Config,
    Elaboration, FunctionParameter, FunctionType, Location, ParseError, ParserConfig, Type,
    Variable, VariableActivation,
};
use std::sync::{Arc, OnceLock};

pub const TEST_CONTRACT_IDENTIFIER: &str = "Test";

/// Source of the `Test` contract.
pub const TEST_CONTRACT: &[u8] = include_bytes!("contracts/test.cdc");

#[derive(Debug, thiserror::Error)]
pub enum StdlibError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Check(#[from] CheckerError),
}

/// `assert(_ condition: Bool, message: String)`; the message may be omitted.
pub fn assert_function() -> Variable {
    let mut ty = FunctionType::new(
        vec![
            FunctionParameter {
                label: None,
                identifier: "condition".to_owned(),
                ty: Type::Bool,
            },
            FunctionParameter {
                label: Some("message".to_owned()),
                identifier: "message".to_owned(),
                ty: Type::String,
            },
        ],
        Type::Void,
    );
    ty.required_argument_count = Some(1);
    Variable::builtin_function("assert", ty)
}

/// `panic(_ message: String): Never`
pub fn panic_function() -> Variable {
    let ty = FunctionType::new(
        vec![FunctionParameter {
            label: None,
            identifier: "message".to_owned(),
            ty: Type::String,
        }],
        Type::Never,
    );
    Variable::builtin_function("panic", ty)
}

pub fn test_contract_location() -> Location {
    Location::identifier(TEST_CONTRACT_IDENTIFIER)
}

/// Parse and check the embedded `Test` contract in strict mode, with
/// `assert` and `panic` over the default activation and no imports.
pub fn check_test_contract() -> Result<Checker, StdlibError> {
    let location = test_contract_location();
    let program = parse_program(TEST_CONTRACT, &location, &ParserConfig::default())?;

    let mut activation = VariableActivation::new(Some(base_value_activation()));
    activation.declare(assert_function());
    activation.declare(panic_function());
    let activation = Arc::new(activation);

    let config = Config::default()
        .with_access_check_mode(AccessCheckMode::Strict)
        .with_base_value_activation_handler(move |_| Arc::clone(&activation));
    let mut checker = Checker::new(Arc::new(program), location, config)?;
    checker.check()?;
    tracing::debug!(location = %checker.location(), "checked Test contract");
    Ok(checker)
}

/// The checked `Test` contract.
#[derive(Debug)]
pub struct TestContractType {
    pub elaboration: Arc<Elaboration>,
}

impl TestContractType {
    pub fn location(&self) -> &Location {
        self.elaboration.location()
    }
}

/// The process-wide checked `Test` contract.
///
/// # Panics
///
/// If the embedded contract does not check. It is fixed at build time, so
/// this is a packaging defect rather than a recoverable error.
pub fn get_test_contract_type() -> &'static TestContractType {
    static TEST_CONTRACT_TYPE: OnceLock<TestContractType> = OnceLock::new();
    TEST_CONTRACT_TYPE.get_or_init(|| match check_test_contract() {
        Ok(checker) => TestContractType {
            elaboration: Arc::new(checker.into_elaboration()),
        },
        Err(err) => {
            tracing::error!(%err, "embedded Test contract is invalid");
            panic!("embedded Test contract is invalid: {}", err);
        }
    })
}
