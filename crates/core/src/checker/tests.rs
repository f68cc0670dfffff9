use super::Checker;
use crate::access::AccessCheckMode;
use crate::activation::{base_value_activation, DeclarationKind, Variable, VariableActivation};
use crate::config::Config;
use crate::elaboration::MemberKind;
use crate::error::{CheckerError, ImportError, SemanticError};
use crate::import::{ElaborationImport, MissingImportHandlerError};
use crate::location::{Location, Range};
use crate::parser::{parse_program, ParserConfig};
use crate::types::{CompositeRef, FunctionParameter, FunctionType, IntegerKind, Type};
use std::sync::Arc;

fn check_at(src: &str, name: &str, config: Config) -> Result<Checker, CheckerError> {
    let location = Location::identifier(name);
    let program = parse_program(src.as_bytes(), &location, &ParserConfig::default())
        .expect("test source should parse");
    let mut checker = Checker::new(Arc::new(program), location, config)?;
    checker.check()?;
    Ok(checker)
}

fn check(src: &str) -> Result<Checker, CheckerError> {
    check_at(src, "Main", Config::default())
}

fn errors(src: &str) -> Vec<SemanticError> {
    check(src).unwrap_err().errors
}

fn with_panic() -> Config {
    Config::default().with_base_value_activation_handler(|_| {
        let mut activation = VariableActivation::new(Some(base_value_activation()));
        activation.declare(Variable::builtin_function(
            "panic",
            FunctionType::new(
                vec![FunctionParameter {
                    label: None,
                    identifier: "message".to_owned(),
                    ty: Type::String,
                }],
                Type::Never,
            ),
        ));
        Arc::new(activation)
    })
}

const COUNTER: &str = r#"
pub contract Counter {
    pub var count: UInt64
    priv let step: UInt64

    pub event Incremented(by: UInt64, total: UInt64)

    pub enum Mode: UInt8 {
        pub case up
        pub case down
    }

    pub struct Snapshot {
        pub let value: UInt64
        pub let mode: Mode

        init(value: UInt64, mode: Mode) {
            self.value = value
            self.mode = mode
        }
    }

    init() {
        self.count = 0
        self.step = 1
    }

    pub fun increment(): Snapshot {
        self.count = self.count + self.step
        emit Incremented(by: self.step, total: self.count)
        return Snapshot(value: self.count, mode: Mode.up)
    }

    pub fun lookup(_ values: {String: UInt64}, key: String): UInt64 {
        if let found = values[key] {
            return found
        }
        return values[key] ?? 0
    }
}
"#;

#[test]
fn well_formed_contract_checks_cleanly() {
    let checker = check(COUNTER).unwrap();
    let elaboration = checker.elaboration();

    let snapshot = elaboration.composite_by_name("Counter.Snapshot").unwrap();
    assert_eq!(snapshot.type_id(), "I.Main.Counter.Snapshot");
    let mode = snapshot.member("mode").unwrap();
    assert_eq!(
        mode.ty,
        Type::Composite(CompositeRef::new(Location::identifier("Main"), "Counter.Mode"))
    );

    let event = elaboration
        .composite_by_name("Counter.Incremented")
        .unwrap();
    assert_eq!(event.fields().count(), 2);

    let counter = elaboration.global_value("Counter").unwrap();
    assert_eq!(
        counter.kind,
        DeclarationKind::Composite(crate::ast::CompositeKind::Contract)
    );
}

#[test]
fn checking_twice_reports_the_same_outcome() {
    let location = Location::identifier("Main");
    let program = parse_program(b"fun f() {}", &location, &ParserConfig::default()).unwrap();
    let mut checker = Checker::new(Arc::new(program), location, Config::default()).unwrap();
    let first = checker.check().unwrap_err().errors.len();
    let second = checker.check().unwrap_err().errors.len();
    assert_eq!(first, second);
}

#[test]
fn strict_mode_requires_access_modifiers() {
    let src = r#"
contract C {
    let x: Int
    init() { self.x = 1 }
}
"#;
    let errs = errors(src);
    let missing: Vec<&str> = errs
        .iter()
        .filter_map(|e| match e {
            SemanticError::MissingAccessModifier { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["C", "x"]);

    let relaxed = Config::default().with_access_check_mode(AccessCheckMode::NotSpecifiedUnrestricted);
    assert!(check_at(src, "Main", relaxed).is_ok());
}

#[test]
fn private_member_is_not_accessible_outside_its_composite() {
    let src = r#"
pub contract Vault {
    priv var secret: String

    init() { self.secret = "s" }

    pub fun reveal(): String { return self.secret }
}

pub fun steal(): String {
    return Vault.secret
}
"#;
    let errs = errors(src);
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(matches!(
        &errs[0],
        SemanticError::InvalidAccess { name, .. } if name == "secret"
    ));
}

#[test]
fn access_mode_none_disables_enforcement() {
    let src = r#"
pub contract Vault {
    priv var secret: String
    init() { self.secret = "s" }
}
pub fun steal(): String { return Vault.secret }
"#;
    let config = Config::default().with_access_check_mode(AccessCheckMode::None);
    assert!(check_at(src, "Main", config).is_ok());
}

#[test]
fn events_only_in_emit_and_only_in_contracts() {
    let errs = errors(
        r#"
pub contract C {
    pub event E(x: Int)
    pub fun f() {
        let e = E(x: 1)
    }
    pub fun g() {
        emit self.f()
    }
}
pub event TopLevel()
"#,
    );
    assert!(errs.iter().any(|e| matches!(e, SemanticError::InvalidEventUsage { name, .. } if name == "C.E")));
    assert!(errs.iter().any(|e| matches!(e, SemanticError::InvalidEmit { .. })));
    assert!(errs.iter().any(|e| matches!(
        e,
        SemanticError::InvalidDeclaration { kind: "event", context: "at the top level", .. }
    )));
}

#[test]
fn event_parameters_must_be_plain_data() {
    let errs = errors(
        r#"
pub contract C {
    pub resource R {}
    pub event Moved(r: R)
}
"#,
    );
    assert!(matches!(
        &errs[..],
        [SemanticError::InvalidEventParameterType { name, .. }] if name == "r"
    ));
}

#[test]
fn integer_literals_are_range_checked() {
    let errs = errors(
        r#"
pub let small: UInt8 = 256
pub let low: Int8 = -128
pub let lower: Int8 = -129
pub let unsigned: UInt64 = -1
pub let owner: Address = 0x01
"#,
    );
    let out_of_range: Vec<(bool, u128)> = errs
        .iter()
        .filter_map(|e| match e {
            SemanticError::IntegerLiteralOutOfRange {
                value, negative, ..
            } => Some((*negative, *value)),
            _ => None,
        })
        .collect();
    assert_eq!(out_of_range, vec![(false, 256), (true, 129), (true, 1)]);
}

#[test]
fn negative_literal_out_of_range_keeps_its_sign() {
    let errs = errors("pub fun f(): UInt8 {\n    return -1\n}\n");
    let [err] = &errs[..] else {
        panic!("expected one error, got {:?}", errs);
    };
    assert_eq!(
        err.to_string(),
        "integer literal -1 is out of range for `UInt8`"
    );
}

#[test]
fn functions_must_return_on_every_path() {
    let errs = errors(
        r#"
pub fun f(): Int {
    if true {
        return 1
    }
}
"#,
    );
    assert!(matches!(&errs[..], [SemanticError::MissingReturn { .. }]));

    let src = r#"
pub fun g(flag: Bool): Int {
    if flag {
        return 1
    } else {
        panic("no")
    }
}
"#;
    assert!(check_at(src, "Main", with_panic()).is_ok());
}

#[test]
fn without_panic_binding_panic_is_not_declared() {
    let errs = errors("pub fun g() { panic(\"no\") }");
    assert!(matches!(
        &errs[..],
        [SemanticError::NotDeclared { kind: "value", name, .. }] if name == "panic"
    ));
}

#[test]
fn field_assignment_rules() {
    let errs = errors(
        r#"
pub contract C {
    pub let fixed: Int
    pub var counter: Int

    init() {
        self.fixed = 1
        self.counter = 0
    }

    pub fun bump() {
        self.counter = self.counter + 1
        self.fixed = 2
    }
}

pub fun outside() {
    C.counter = 3
}
"#,
    );
    assert_eq!(errs.len(), 2, "{:?}", errs);
    assert!(matches!(&errs[0], SemanticError::AssignmentToConstant { name, .. } if name == "fixed"));
    assert!(matches!(&errs[1], SemanticError::InvalidAssignmentAccess { name, .. } if name == "counter"));
}

#[test]
fn initializers_must_set_every_field() {
    let errs = errors(
        r#"
pub struct S {
    pub let a: Int
    pub let b: Int
    init() { self.a = 1 }
}
pub struct T {
    pub let c: Int
}
"#,
    );
    assert!(errs.iter().any(|e| matches!(e, SemanticError::FieldUninitialized { field, .. } if field == "b")));
    assert!(errs.iter().any(|e| matches!(e, SemanticError::MissingInitializer { name, .. } if name == "T")));
}

#[test]
fn argument_labels_and_counts() {
    let errs = errors(
        r#"
pub fun add(_ a: Int, to b: Int): Int { return a + b }
pub let ok: Int = add(1, to: 2)
pub let unlabelled: Int = add(1, 2)
pub let short: Int = add(1)
"#,
    );
    assert_eq!(errs.len(), 2, "{:?}", errs);
    assert!(matches!(
        &errs[0],
        SemanticError::IncorrectArgumentLabel { expected, actual, .. }
            if expected == "`to`" && actual == "no label"
    ));
    assert!(matches!(&errs[1], SemanticError::ArgumentCount { actual: 1, .. }));
}

#[test]
fn type_mismatches_and_operators() {
    let errs = errors(
        r#"
pub let s: String = 1
pub let b: Bool = 1 < 2
pub let mixed: Bool = "a" < "b"
pub let sum: UInt8 = 1 + 2
pub let maybe: Int? = nil
pub let forced: Int = maybe!
pub let bad: Int = 3!
"#,
    );
    assert!(matches!(&errs[0], SemanticError::TypeMismatch { expected: Type::String, .. }));
    assert!(matches!(&errs[1], SemanticError::InvalidBinaryOperands { op: "<", .. }));
    assert!(matches!(&errs[2], SemanticError::NonOptional { .. }));
    assert_eq!(errs.len(), 3, "{:?}", errs);
}

#[test]
fn nested_types_resolve_with_access_checks() {
    let src = r#"
pub contract Lib {
    pub struct Open {}
    priv struct Hidden {}
    pub fun make(): Hidden { return Hidden() }
}
pub fun open(): Lib.Open { return Lib.Open() }
pub fun hidden(): Lib.Hidden? { return nil }
"#;
    let errs = errors(src);
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(matches!(&errs[0], SemanticError::InvalidAccess { name, declaration_kind: "struct", .. } if name == "Hidden"));
}

#[test]
fn enum_cases_must_be_public_and_raw_type_integer() {
    let errs = errors(
        r#"
pub enum E: String {
    priv case a
}
"#,
    );
    assert!(errs.iter().any(|e| matches!(e, SemanticError::InvalidEnumRawType { .. })));
    assert!(errs.iter().any(|e| matches!(e, SemanticError::InvalidAccessModifier { declaration_kind: "enum case", .. })));
}

const LIB: &str = r#"
pub contract Lib {
    pub struct Item {
        pub let n: Int
        init(n: Int) { self.n = n }
    }

    access(account) fun internal(): Int { return 1 }

    pub fun make(): Item { return Item(n: 1) }
}

pub fun helper(): Int { return 2 }

priv fun hidden(): Int { return 3 }
"#;

fn lib_config() -> Config {
    let lib = Arc::new(
        check_at(LIB, "Lib", Config::default())
            .unwrap()
            .into_elaboration(),
    );
    Config::default().with_import_handler(
        move |_: &Checker, location: &Location, _: Range| -> Result<ElaborationImport, ImportError> {
            if *location == Location::identifier("Lib") {
                Ok(ElaborationImport {
                    elaboration: Arc::clone(&lib),
                })
            } else {
                Err(Arc::new(std::io::Error::other("unknown location")))
            }
        },
    )
}

#[test]
fn import_everything_skips_non_public_declarations() {
    let ok = check_at(
        r#"
import Lib
pub fun use(): Int { return Lib.make().n + helper() }
"#,
        "Main",
        lib_config(),
    )
    .unwrap();
    assert!(ok.elaboration().import(&Location::identifier("Lib")).is_some());
    let item = ok
        .elaboration()
        .composite(&CompositeRef::new(Location::identifier("Lib"), "Lib.Item"))
        .unwrap();
    assert_eq!(item.member("n").unwrap().kind, MemberKind::Field(crate::ast::VariableKind::Let));

    let errs = check_at(
        "import Lib\npub fun use(): Int { return hidden() + Lib.internal() }",
        "Main",
        lib_config(),
    )
    .unwrap_err()
    .errors;
    assert!(matches!(&errs[0], SemanticError::NotDeclared { name, .. } if name == "hidden"));
    assert!(matches!(&errs[1], SemanticError::InvalidAccess { name, access: crate::access::Access::Account, .. } if name == "internal"));
}

#[test]
fn named_imports_are_validated() {
    let errs = check_at(
        "import helper, hidden, missing from Lib",
        "Main",
        lib_config(),
    )
    .unwrap_err()
    .errors;
    assert_eq!(errs.len(), 2, "{:?}", errs);
    assert!(matches!(&errs[0], SemanticError::InvalidAccess { name, .. } if name == "hidden"));
    assert!(matches!(&errs[1], SemanticError::NotExported { name, .. } if name == "missing"));
}

#[test]
fn failed_imports_carry_the_handler_error() {
    let errs = check_at("import Other\n", "Main", lib_config())
        .unwrap_err()
        .errors;
    match &errs[..] {
        [SemanticError::Import { location, error, range }] => {
            assert_eq!(location, &Location::identifier("Other"));
            assert_eq!(range.start.line, 1);
            assert_eq!(error.to_string(), "unknown location");
        }
        other => panic!("unexpected errors: {:?}", other),
    }

    let errs = errors("import Other\n");
    let [SemanticError::Import { error, .. }] = &errs[..] else {
        panic!("unexpected errors: {:?}", errs);
    };
    assert!(error.downcast_ref::<MissingImportHandlerError>().is_some());
}

#[test]
fn importing_own_location_is_rejected_up_front() {
    let location = Location::identifier("Main");
    let program = parse_program(b"import Main", &location, &ParserConfig::default()).unwrap();
    let err = Checker::new(Arc::new(program), location, Config::default()).unwrap_err();
    assert!(matches!(&err.errors[..], [SemanticError::CyclicImport { .. }]));
}

#[test]
fn error_display_shows_first_error_and_count() {
    let err = check("pub let a: String = 1\npub let b: Bool = 2").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("checking of Main failed at 1:21: mismatched types"), "{}", message);
    assert!(message.ends_with("(and 1 more)"), "{}", message);
}

#[test]
fn uint8_conversion_comes_from_the_default_activation() {
    let checker = check("pub let x: UInt8 = UInt8(300)").unwrap();
    let x = checker.elaboration().global_value("x").unwrap();
    assert_eq!(x.ty, Type::Integer(IntegerKind::UInt8));
}
