use super::declarations::variable_kind;
use super::Checker;
use crate::access::Access;
use crate::activation::Variable;
use crate::ast::*;
use crate::elaboration::MemberKind;
use crate::error::SemanticError;
use crate::location::Position;
use crate::types::{CompositeRef, Type};

impl Checker {
    // -- Statements ---------------------------------------------

    /// Check a block in its own scope. Returns whether control can never
    /// fall off its end.
    pub(super) fn check_block(&mut self, block: &Block) -> bool {
        self.push_scope();
        let halts = self.check_statements(block);
        self.pop_scope();
        halts
    }

    pub(super) fn check_statements(&mut self, statements: &[Statement]) -> bool {
        let mut halts = false;
        for statement in statements {
            halts |= self.check_statement(statement);
        }
        halts
    }

    fn check_statement(&mut self, statement: &Statement) -> bool {
        match statement {
            Statement::Expression(expression) => {
                let ty = self.check_expression(expression, None);
                ty == Type::Never
            }
            Statement::Variable(declaration) => {
                let ty = self.check_variable_value(declaration);
                self.declare_local(
                    Variable {
                        identifier: declaration.identifier.name.clone(),
                        kind: variable_kind(declaration.kind),
                        ty,
                        access: Access::NotSpecified,
                        pos: Some(declaration.identifier.pos),
                    },
                    declaration.identifier.pos,
                );
                false
            }
            Statement::Assignment { target, value, pos } => {
                self.check_assignment(target, value, *pos);
                false
            }
            Statement::Return { value, pos } => {
                self.check_return(value.as_ref(), *pos);
                true
            }
            Statement::If {
                test,
                then,
                otherwise,
                ..
            } => {
                let then_halts = match test {
                    IfTest::Expression(condition) => {
                        self.check_expression(condition, Some(&Type::Bool));
                        self.check_block(then)
                    }
                    IfTest::Binding {
                        kind,
                        identifier,
                        value,
                    } => {
                        let inner = match self.check_expression(value, None) {
                            Type::Optional(inner) => *inner,
                            Type::Invalid => Type::Invalid,
                            other => {
                                self.report(SemanticError::NonOptional {
                                    ty: other,
                                    pos: value.pos,
                                });
                                Type::Invalid
                            }
                        };
                        self.push_scope();
                        self.declare_local(
                            Variable {
                                identifier: identifier.name.clone(),
                                kind: variable_kind(*kind),
                                ty: inner,
                                access: Access::NotSpecified,
                                pos: Some(identifier.pos),
                            },
                            identifier.pos,
                        );
                        let halts = self.check_block(then);
                        self.pop_scope();
                        halts
                    }
                };
                let else_halts = match otherwise {
                    Some(block) => self.check_block(block),
                    None => false,
                };
                then_halts && else_halts
            }
            Statement::While { test, body, .. } => {
                self.check_expression(test, Some(&Type::Bool));
                self.check_block(body);
                false
            }
            Statement::Emit { invocation, pos } => {
                self.check_emit(invocation, *pos);
                false
            }
        }
    }

    /// Type of a declared variable: the annotation if present, otherwise
    /// the value's inferred type.
    pub(super) fn check_variable_value(&mut self, declaration: &VariableDeclaration) -> Type {
        match &declaration.type_annotation {
            Some(annotation) => {
                let ty = self.resolve_type(annotation);
                self.check_expression(&declaration.value, Some(&ty));
                ty
            }
            None => self.check_expression(&declaration.value, None),
        }
    }

    fn check_return(&mut self, value: Option<&Expression>, pos: Position) {
        let expected = match self.functions.last() {
            Some(context) => context.return_type.clone(),
            None => return,
        };
        match value {
            Some(value) if expected == Type::Void => {
                self.check_expression(value, None);
                self.report(SemanticError::InvalidReturnValue { pos: value.pos });
            }
            Some(value) => {
                self.check_expression(value, Some(&expected));
            }
            None if matches!(expected, Type::Void | Type::Invalid) => {}
            None => self.report(SemanticError::MissingReturnValue { expected, pos }),
        }
    }

    fn check_emit(&mut self, invocation: &Expression, pos: Position) {
        let ExpressionKind::Invocation { callee, arguments } = &invocation.kind else {
            self.check_expression(invocation, None);
            self.report(SemanticError::InvalidEmit { pos });
            return;
        };
        let callee_ty = self.check_expression(callee, None);
        let is_event = match &callee_ty {
            Type::Constructor(r) => self.composite_kind(r) == Some(CompositeKind::Event),
            Type::Invalid => true,
            _ => false,
        };
        if !is_event {
            self.report(SemanticError::InvalidEmit { pos });
        }
        self.check_invocation(callee_ty, arguments, invocation.pos, true);
    }

    fn in_initializer_of(&self, owner: &CompositeRef) -> bool {
        self.functions
            .last()
            .and_then(|context| context.initializer_of.as_ref())
            == Some(owner)
    }

    fn check_assignment(&mut self, target: &Expression, value: &Expression, pos: Position) {
        match &target.kind {
            ExpressionKind::Identifier(name) => match self.find_value(name) {
                Some(variable) => {
                    if !variable.kind.is_assignable() {
                        self.report(SemanticError::AssignmentToConstant {
                            name: name.clone(),
                            pos: target.pos,
                        });
                    }
                    self.check_expression(value, Some(&variable.ty));
                }
                None => {
                    self.report(SemanticError::NotDeclared {
                        kind: "variable",
                        name: name.clone(),
                        pos: target.pos,
                    });
                    self.check_expression(value, None);
                }
            },
            ExpressionKind::Member { target: object, name } => {
                let object_ty = self.check_expression(object, None);
                let Type::Composite(owner) = &object_ty else {
                    if !object_ty.is_invalid() {
                        self.report(SemanticError::NotDeclaredMember {
                            ty: object_ty.clone(),
                            name: name.name.clone(),
                            pos: name.pos,
                        });
                    }
                    self.check_expression(value, None);
                    return;
                };
                let Some(member) = self.lookup_member(owner, &name.name) else {
                    self.report(SemanticError::NotDeclaredMember {
                        ty: object_ty.clone(),
                        name: name.name.clone(),
                        pos: name.pos,
                    });
                    self.check_expression(value, None);
                    return;
                };
                let MemberKind::Field(field_kind) = member.kind else {
                    self.report(SemanticError::InvalidAssignmentTarget { pos });
                    self.check_expression(value, None);
                    return;
                };

                if !self.containers.contains(owner) {
                    self.report(SemanticError::InvalidAssignmentAccess {
                        name: name.name.clone(),
                        pos: name.pos,
                    });
                } else if self.in_initializer_of(owner) {
                    let through_self =
                        matches!(&object.kind, ExpressionKind::Identifier(n) if n == "self");
                    if through_self {
                        if let Some(context) = self.functions.last_mut() {
                            context.assigned_fields.insert(name.name.clone());
                        }
                    }
                } else if field_kind == VariableKind::Let {
                    self.report(SemanticError::AssignmentToConstant {
                        name: name.name.clone(),
                        pos: name.pos,
                    });
                }
                self.check_expression(value, Some(&member.ty));
            }
            ExpressionKind::Index { target: object, index } => {
                match self.check_expression(object, None) {
                    Type::Array(element) => {
                        self.check_index(index);
                        self.check_expression(value, Some(&*element));
                    }
                    Type::Dictionary(key, element) => {
                        self.check_expression(index, Some(&*key));
                        self.check_expression(value, Some(&Type::Optional(element)));
                    }
                    Type::Invalid => {
                        self.check_expression(index, None);
                        self.check_expression(value, None);
                    }
                    other => {
                        self.report(SemanticError::NotIndexable {
                            ty: other,
                            pos: object.pos,
                        });
                        self.check_expression(index, None);
                        self.check_expression(value, None);
                    }
                }
            }
            _ => {
                self.check_expression(target, None);
                self.report(SemanticError::InvalidAssignmentTarget { pos });
                self.check_expression(value, None);
            }
        }
    }
}
