use super::{Checker, FunctionContext};
use crate::access::Access;
use crate::activation::{DeclarationKind, Variable};
use crate::ast::*;
use crate::elaboration::{CompositeType, Member, MemberKind};
use crate::error::SemanticError;
use crate::types::{CompositeRef, FunctionParameter, FunctionType, Type};
use std::collections::HashSet;

/// Where a nested declaration appears, for error messages.
fn nesting_context(container: Option<CompositeKind>) -> &'static str {
    match container {
        None => "at the top level",
        Some(CompositeKind::Contract) => "inside a contract",
        Some(CompositeKind::Struct) => "inside a struct",
        Some(CompositeKind::Resource) => "inside a resource",
        Some(CompositeKind::Event) => "inside an event",
        Some(CompositeKind::Enum) => "inside an enum",
    }
}

fn is_valid_nesting(kind: CompositeKind, container: Option<CompositeKind>) -> bool {
    match container {
        None => kind != CompositeKind::Event,
        Some(CompositeKind::Contract) => kind != CompositeKind::Contract,
        Some(_) => false,
    }
}

fn value_type(r: CompositeRef, kind: CompositeKind) -> Type {
    match kind {
        CompositeKind::Contract => Type::Composite(r),
        _ => Type::Constructor(r),
    }
}

impl Checker {
    fn composite_ref(&self, declaration: &CompositeDeclaration, container: Option<&CompositeRef>) -> CompositeRef {
        match container {
            Some(c) => c.nested(&declaration.identifier.name),
            None => CompositeRef::new(self.location.clone(), declaration.identifier.name.clone()),
        }
    }

    // -- Phase 2: composite shells ------------------------------

    pub(super) fn declare_composites(&mut self, program: &Program) {
        for declaration in program.composites() {
            self.declare_composite_type(declaration, None);
        }
    }

    fn declare_composite_type(
        &mut self,
        declaration: &CompositeDeclaration,
        container: Option<(&CompositeRef, CompositeKind)>,
    ) {
        let name = &declaration.identifier.name;
        let container_kind = container.map(|(_, kind)| kind);
        if !is_valid_nesting(declaration.kind, container_kind) {
            self.report(SemanticError::InvalidDeclaration {
                kind: declaration.kind.keyword(),
                context: nesting_context(container_kind),
                pos: declaration.pos,
            });
        }

        let r = self.composite_ref(declaration, container.map(|(r, _)| r));
        if self.composite(&r).is_some() {
            self.report(SemanticError::Redeclaration {
                name: name.clone(),
                pos: declaration.identifier.pos,
            });
            return;
        }
        self.require_access_modifier(
            declaration.access,
            name,
            declaration.kind.keyword(),
            declaration.identifier.pos,
        );

        // Nested types are members from the start so sibling declarations
        // can refer to them while their own members are resolved.
        let mut members: Vec<Member> = Vec::new();
        for nested in &declaration.members.composites {
            if members.iter().any(|m| m.identifier == nested.identifier.name) {
                continue;
            }
            members.push(Member {
                identifier: nested.identifier.name.clone(),
                access: nested.access,
                kind: MemberKind::Type(nested.kind),
                ty: value_type(r.nested(&nested.identifier.name), nested.kind),
                pos: nested.identifier.pos,
            });
        }

        self.elaboration.insert_composite(CompositeType {
            location: self.location.clone(),
            qualified_identifier: r.qualified_identifier.clone(),
            identifier: name.clone(),
            kind: declaration.kind,
            access: declaration.access,
            container: container.map(|(c, _)| c.clone()),
            members,
            initializer: None,
            enum_raw_type: None,
            pos: declaration.pos,
        });
        if container.is_none() {
            self.declare_global_type(name, r.clone(), declaration.identifier.pos, true);
        }

        for nested in &declaration.members.composites {
            self.declare_composite_type(nested, Some((&r, declaration.kind)));
        }
    }

    // -- Phase 3: members ---------------------------------------

    pub(super) fn resolve_members(&mut self, program: &Program) {
        for declaration in program.composites() {
            self.resolve_composite_members(declaration, None);
        }
    }

    fn resolve_composite_members(
        &mut self,
        declaration: &CompositeDeclaration,
        container: Option<&CompositeRef>,
    ) {
        let r = self.composite_ref(declaration, container);
        self.containers.push(r.clone());

        let mut members = self
            .composite(&r)
            .map(|c| c.members.clone())
            .unwrap_or_default();
        let mut enum_raw_type = None;

        let initializer = match declaration.kind {
            CompositeKind::Event => self.resolve_event_members(declaration, &r, &mut members),
            CompositeKind::Enum => {
                let (raw, initializer) = self.resolve_enum_members(declaration, &r, &mut members);
                enum_raw_type = Some(raw);
                initializer
            }
            _ => self.resolve_composite_body(declaration, &r, &mut members),
        };

        if let Some(composite) = self.elaboration.composite_mut(&r) {
            composite.members = members;
            composite.initializer = Some(initializer);
            composite.enum_raw_type = enum_raw_type;
        }

        for nested in &declaration.members.composites {
            self.resolve_composite_members(nested, Some(&r));
        }
        self.containers.pop();
    }

    fn add_member(&mut self, members: &mut Vec<Member>, member: Member) {
        if members.iter().any(|m| m.identifier == member.identifier) {
            self.report(SemanticError::Redeclaration {
                name: member.identifier,
                pos: member.pos,
            });
            return;
        }
        members.push(member);
    }

    /// Event parameters become public constant fields.
    fn resolve_event_members(
        &mut self,
        declaration: &CompositeDeclaration,
        r: &CompositeRef,
        members: &mut Vec<Member>,
    ) -> FunctionType {
        let parameters = self.resolve_parameters(&declaration.parameters);
        for (resolved, parameter) in parameters.iter().zip(&declaration.parameters) {
            if !self.is_valid_event_parameter_type(&resolved.ty) {
                self.report(SemanticError::InvalidEventParameterType {
                    name: resolved.identifier.clone(),
                    ty: resolved.ty.clone(),
                    pos: parameter.identifier.pos,
                });
            }
            self.add_member(
                members,
                Member {
                    identifier: resolved.identifier.clone(),
                    access: Access::Public,
                    kind: MemberKind::Field(VariableKind::Let),
                    ty: resolved.ty.clone(),
                    pos: parameter.identifier.pos,
                },
            );
        }
        FunctionType::new(parameters, Type::Composite(r.clone()))
    }

    fn resolve_enum_members(
        &mut self,
        declaration: &CompositeDeclaration,
        r: &CompositeRef,
        members: &mut Vec<Member>,
    ) -> (Type, FunctionType) {
        let name = &declaration.identifier.name;
        let raw_type = match &declaration.raw_type {
            Some(annotation) => {
                let ty = self.resolve_type(annotation);
                if !ty.is_integer() && !ty.is_invalid() {
                    self.report(SemanticError::InvalidEnumRawType {
                        name: name.clone(),
                        ty,
                        pos: annotation.pos,
                    });
                    Type::Invalid
                } else {
                    ty
                }
            }
            None => {
                self.report(SemanticError::InvalidEnumRawType {
                    name: name.clone(),
                    ty: Type::Void,
                    pos: declaration.identifier.pos,
                });
                Type::Invalid
            }
        };

        let members_of = &declaration.members;
        let stray = members_of
            .fields
            .iter()
            .map(|f| ("field", f.pos))
            .chain(members_of.functions.iter().map(|f| ("function", f.pos)))
            .chain(members_of.initializers.iter().map(|f| ("initializer", f.pos)));
        for (kind, pos) in stray {
            self.report(SemanticError::InvalidDeclaration {
                kind,
                context: "inside an enum",
                pos,
            });
        }

        self.add_member(
            members,
            Member {
                identifier: "rawValue".to_owned(),
                access: Access::Public,
                kind: MemberKind::Field(VariableKind::Let),
                ty: raw_type.clone(),
                pos: declaration.identifier.pos,
            },
        );
        for case in &members_of.enum_cases {
            match case.access {
                Access::Public => {}
                Access::NotSpecified => {
                    self.require_access_modifier(case.access, &case.identifier.name, "enum case", case.pos)
                }
                other => self.report(SemanticError::InvalidAccessModifier {
                    name: case.identifier.name.clone(),
                    declaration_kind: "enum case",
                    access: other,
                    pos: case.pos,
                }),
            }
            self.add_member(
                members,
                Member {
                    identifier: case.identifier.name.clone(),
                    access: Access::Public,
                    kind: MemberKind::EnumCase,
                    ty: Type::Composite(r.clone()),
                    pos: case.identifier.pos,
                },
            );
        }

        let initializer = FunctionType::new(
            vec![FunctionParameter {
                label: Some("rawValue".to_owned()),
                identifier: "rawValue".to_owned(),
                ty: raw_type.clone(),
            }],
            Type::optional(Type::Composite(r.clone())),
        );
        (raw_type, initializer)
    }

    /// Contracts, structs and resources.
    fn resolve_composite_body(
        &mut self,
        declaration: &CompositeDeclaration,
        r: &CompositeRef,
        members: &mut Vec<Member>,
    ) -> FunctionType {
        let body = &declaration.members;
        let context = nesting_context(Some(declaration.kind));
        for case in &body.enum_cases {
            self.report(SemanticError::InvalidDeclaration {
                kind: "enum case",
                context,
                pos: case.pos,
            });
        }

        for field in &body.fields {
            self.require_access_modifier(field.access, &field.identifier.name, "field", field.pos);
            let ty = self.resolve_type(&field.type_annotation);
            self.add_member(
                members,
                Member {
                    identifier: field.identifier.name.clone(),
                    access: field.access,
                    kind: MemberKind::Field(field.kind),
                    ty,
                    pos: field.identifier.pos,
                },
            );
        }

        for function in &body.functions {
            self.require_access_modifier(function.access, &function.identifier.name, "function", function.pos);
            let ty = self.function_type(function);
            self.add_member(
                members,
                Member {
                    identifier: function.identifier.name.clone(),
                    access: function.access,
                    kind: MemberKind::Function,
                    ty: Type::Function(Box::new(ty)),
                    pos: function.identifier.pos,
                },
            );
        }

        for extra in body.initializers.iter().skip(1) {
            self.report(SemanticError::Redeclaration {
                name: "init".to_owned(),
                pos: extra.pos,
            });
        }
        match body.initializers.first() {
            Some(init) => {
                if init.access != Access::NotSpecified {
                    self.report(SemanticError::InvalidAccessModifier {
                        name: "init".to_owned(),
                        declaration_kind: "initializer",
                        access: init.access,
                        pos: init.pos,
                    });
                }
                let parameters = self.resolve_parameters(&init.parameters);
                FunctionType::new(parameters, Type::Composite(r.clone()))
            }
            None => {
                if !body.fields.is_empty() {
                    self.report(SemanticError::MissingInitializer {
                        name: r.qualified_identifier.clone(),
                        pos: declaration.identifier.pos,
                    });
                }
                FunctionType::new(Vec::new(), Type::Composite(r.clone()))
            }
        }
    }

    pub(super) fn resolve_parameters(&mut self, parameters: &[Parameter]) -> Vec<FunctionParameter> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            if !seen.insert(parameter.identifier.name.as_str()) {
                self.report(SemanticError::Redeclaration {
                    name: parameter.identifier.name.clone(),
                    pos: parameter.identifier.pos,
                });
            }
            resolved.push(FunctionParameter {
                label: parameter.effective_label().map(str::to_owned),
                identifier: parameter.identifier.name.clone(),
                ty: self.resolve_type(&parameter.type_annotation),
            });
        }
        resolved
    }

    pub(super) fn function_type(&mut self, function: &FunctionDeclaration) -> FunctionType {
        let parameters = self.resolve_parameters(&function.parameters);
        let return_type = match &function.return_type {
            Some(annotation) => self.resolve_type(annotation),
            None => Type::Void,
        };
        FunctionType::new(parameters, return_type)
    }

    // -- Phase 4: top-level values ------------------------------

    pub(super) fn declare_globals(&mut self, program: &Program) {
        for declaration in &program.declarations {
            match declaration {
                Declaration::Composite(composite) => {
                    let r = self.composite_ref(composite, None);
                    self.declare_global(
                        Variable {
                            identifier: composite.identifier.name.clone(),
                            kind: DeclarationKind::Composite(composite.kind),
                            ty: value_type(r, composite.kind),
                            access: composite.access,
                            pos: Some(composite.identifier.pos),
                        },
                        composite.identifier.pos,
                        true,
                    );
                }
                Declaration::Function(function) => {
                    self.require_access_modifier(
                        function.access,
                        &function.identifier.name,
                        "function",
                        function.pos,
                    );
                    let ty = self.function_type(function);
                    self.declare_global(
                        Variable {
                            identifier: function.identifier.name.clone(),
                            kind: DeclarationKind::Function,
                            ty: Type::Function(Box::new(ty)),
                            access: function.access,
                            pos: Some(function.identifier.pos),
                        },
                        function.identifier.pos,
                        true,
                    );
                }
                Declaration::Variable(_) => {}
            }
        }

        // Initializers may call any top-level function, so variables go last.
        for declaration in &program.declarations {
            if let Declaration::Variable(variable) = declaration {
                self.require_access_modifier(
                    variable.access,
                    &variable.identifier.name,
                    "variable",
                    variable.pos,
                );
                let ty = self.check_variable_value(variable);
                self.declare_global(
                    Variable {
                        identifier: variable.identifier.name.clone(),
                        kind: variable_kind(variable.kind),
                        ty,
                        access: variable.access,
                        pos: Some(variable.identifier.pos),
                    },
                    variable.identifier.pos,
                    true,
                );
            }
        }
    }

    // -- Phase 5: bodies ----------------------------------------

    pub(super) fn check_bodies(&mut self, program: &Program) {
        for declaration in &program.declarations {
            match declaration {
                Declaration::Composite(composite) => self.check_composite_bodies(composite, None),
                Declaration::Function(function) => {
                    let ty = self
                        .globals
                        .get(&function.identifier.name)
                        .map(|v| v.ty.clone());
                    if let Some(Type::Function(ty)) = ty {
                        self.check_function(function, &ty, None, false);
                    }
                }
                Declaration::Variable(_) => {}
            }
        }
    }

    fn check_composite_bodies(
        &mut self,
        declaration: &CompositeDeclaration,
        container: Option<&CompositeRef>,
    ) {
        let r = self.composite_ref(declaration, container);
        self.containers.push(r.clone());

        if let Some(init) = declaration.members.initializers.first() {
            let ty = self.composite(&r).and_then(|c| c.initializer.clone());
            if let Some(ty) = ty {
                self.check_function(init, &ty, Some(&r), true);
            }
        }
        for function in &declaration.members.functions {
            let ty = self
                .lookup_member(&r, &function.identifier.name)
                .map(|m| m.ty);
            if let Some(Type::Function(ty)) = ty {
                self.check_function(function, &ty, Some(&r), false);
            }
        }
        for nested in &declaration.members.composites {
            self.check_composite_bodies(nested, Some(&r));
        }

        self.containers.pop();
    }

    fn check_function(
        &mut self,
        function: &FunctionDeclaration,
        ty: &FunctionType,
        owner: Option<&CompositeRef>,
        is_initializer: bool,
    ) {
        self.push_scope();
        if let Some(owner) = owner {
            self.declare_local(
                Variable {
                    identifier: "self".to_owned(),
                    kind: DeclarationKind::Constant,
                    ty: Type::Composite(owner.clone()),
                    access: Access::Public,
                    pos: None,
                },
                function.pos,
            );
        }
        for (parameter, resolved) in function.parameters.iter().zip(&ty.parameters) {
            self.declare_local(
                Variable {
                    identifier: resolved.identifier.clone(),
                    kind: DeclarationKind::Parameter,
                    ty: resolved.ty.clone(),
                    access: Access::NotSpecified,
                    pos: Some(parameter.identifier.pos),
                },
                parameter.identifier.pos,
            );
        }

        let return_type = if is_initializer {
            Type::Void
        } else {
            ty.return_type.clone()
        };
        self.functions.push(FunctionContext {
            return_type: return_type.clone(),
            initializer_of: if is_initializer { owner.cloned() } else { None },
            assigned_fields: HashSet::new(),
        });
        let halts = self.check_statements(&function.body);
        let context = self.functions.pop();
        self.pop_scope();

        if !halts && !matches!(return_type, Type::Void | Type::Invalid) {
            self.report(SemanticError::MissingReturn { pos: function.pos });
        }

        if let (Some(owner), Some(context)) = (owner.filter(|_| is_initializer), context) {
            let missing: Vec<String> = self
                .composite(owner)
                .map(|c| {
                    c.fields()
                        .filter(|f| !context.assigned_fields.contains(&f.identifier))
                        .map(|f| f.identifier.clone())
                        .collect()
                })
                .unwrap_or_default();
            for field in missing {
                self.report(SemanticError::FieldUninitialized {
                    composite: owner.qualified_identifier.clone(),
                    field,
                    pos: function.pos,
                });
            }
        }
    }
}

pub(super) fn variable_kind(kind: VariableKind) -> DeclarationKind {
    match kind {
        VariableKind::Let => DeclarationKind::Constant,
        VariableKind::Var => DeclarationKind::Variable,
    }
}
