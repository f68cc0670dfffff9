use super::Checker;
use crate::ast::*;
use crate::elaboration::MemberKind;
use crate::error::SemanticError;
use crate::location::{Address, Position};
use crate::types::{FixedKind, FunctionParameter, FunctionType, IntegerKind, Type};

fn is_literal(expression: &Expression) -> bool {
    match &expression.kind {
        ExpressionKind::Integer { .. } | ExpressionKind::Fixed(_) => true,
        ExpressionKind::Unary {
            op: UnaryOp::Negate,
            operand,
        } => is_literal(operand),
        _ => false,
    }
}

fn describe_label(label: Option<&str>) -> String {
    match label {
        Some(label) => format!("`{}`", label),
        None => "no label".to_owned(),
    }
}

fn builtin_method(parameter: (&str, Type), return_type: Type) -> Type {
    let (identifier, ty) = parameter;
    Type::function(
        vec![FunctionParameter {
            label: None,
            identifier: identifier.to_owned(),
            ty,
        }],
        return_type,
    )
}

impl Checker {
    // -- Expressions --------------------------------------------

    /// Infer the type of `expression`, reporting a mismatch if it is not a
    /// subtype of `expected`.
    pub(super) fn check_expression(&mut self, expression: &Expression, expected: Option<&Type>) -> Type {
        let ty = self.infer(expression, expected);
        if let Some(expected) = expected {
            if !ty.is_subtype(expected) {
                self.report(SemanticError::TypeMismatch {
                    expected: expected.clone(),
                    actual: ty.clone(),
                    pos: expression.pos,
                });
            }
        }
        ty
    }

    /// Infer without reporting a mismatch. `hint` only steers literals.
    fn infer(&mut self, expression: &Expression, hint: Option<&Type>) -> Type {
        let pos = expression.pos;
        match &expression.kind {
            ExpressionKind::Bool(_) => Type::Bool,
            ExpressionKind::Nil => Type::optional(Type::Never),
            ExpressionKind::String(_) => Type::String,
            ExpressionKind::Fixed(_) => match hint.map(Type::unwrap_optionals) {
                Some(Type::Fixed(kind)) => Type::Fixed(*kind),
                _ => Type::Fixed(FixedKind::UFix64),
            },
            ExpressionKind::Integer { value, radix } => {
                self.integer_literal(*value, *radix, false, hint, pos)
            }
            ExpressionKind::Identifier(name) => match self.find_value(name) {
                Some(variable) => variable.ty,
                None => {
                    self.report(SemanticError::NotDeclared {
                        kind: "value",
                        name: name.clone(),
                        pos,
                    });
                    Type::Invalid
                }
            },
            ExpressionKind::Array(elements) => self.check_array(elements, hint),
            ExpressionKind::Dictionary(entries) => self.check_dictionary(entries, hint),
            ExpressionKind::Member { target, name } => {
                let target_ty = self.check_expression(target, None);
                self.member_type(&target_ty, name)
            }
            ExpressionKind::Index { target, index } => {
                match self.check_expression(target, None) {
                    Type::Array(element) => {
                        self.check_index(index);
                        *element
                    }
                    Type::Dictionary(key, value) => {
                        self.check_expression(index, Some(&*key));
                        Type::Optional(value)
                    }
                    Type::Invalid => {
                        self.check_expression(index, None);
                        Type::Invalid
                    }
                    other => {
                        self.report(SemanticError::NotIndexable {
                            ty: other,
                            pos: target.pos,
                        });
                        self.check_expression(index, None);
                        Type::Invalid
                    }
                }
            }
            ExpressionKind::Invocation { callee, arguments } => {
                let callee_ty = self.check_expression(callee, None);
                self.check_invocation(callee_ty, arguments, pos, false)
            }
            ExpressionKind::Force(inner) => {
                let inner_hint = hint.map(|h| Type::optional(h.clone()));
                match self.infer(inner, inner_hint.as_ref()) {
                    Type::Optional(inner) => *inner,
                    Type::Invalid => Type::Invalid,
                    other => {
                        self.report(SemanticError::NonOptional {
                            ty: other.clone(),
                            pos: inner.pos,
                        });
                        other
                    }
                }
            }
            ExpressionKind::Unary { op, operand } => self.check_unary(*op, operand, hint, pos),
            ExpressionKind::Binary { op, left, right } => {
                self.check_binary(*op, left, right, hint, pos)
            }
        }
    }

    fn integer_literal(
        &mut self,
        magnitude: u128,
        radix: u32,
        negative: bool,
        hint: Option<&Type>,
        pos: Position,
    ) -> Type {
        match hint.map(Type::unwrap_optionals) {
            Some(Type::Integer(kind)) => {
                let ty = Type::Integer(*kind);
                if !kind.admits(magnitude, negative) {
                    self.report(SemanticError::IntegerLiteralOutOfRange {
                        value: magnitude,
                        negative,
                        ty: ty.clone(),
                        pos,
                    });
                }
                ty
            }
            Some(Type::Address) if radix == 16 && !negative => {
                if Address::from_u128(magnitude).is_none() {
                    self.report(SemanticError::IntegerLiteralOutOfRange {
                        value: magnitude,
                        negative: false,
                        ty: Type::Address,
                        pos,
                    });
                }
                Type::Address
            }
            _ => Type::Integer(IntegerKind::Int),
        }
    }

    pub(super) fn check_index(&mut self, index: &Expression) {
        let int = Type::Integer(IntegerKind::Int);
        let ty = self.infer(index, Some(&int));
        if !ty.is_integer() && !ty.is_invalid() {
            self.report(SemanticError::TypeMismatch {
                expected: int,
                actual: ty,
                pos: index.pos,
            });
        }
    }

    fn check_array(&mut self, elements: &[Expression], hint: Option<&Type>) -> Type {
        if let Some(Type::Array(element)) = hint.map(Type::unwrap_optionals) {
            let element = (**element).clone();
            for e in elements {
                self.check_expression(e, Some(&element));
            }
            return Type::array(element);
        }
        let mut element: Option<Type> = None;
        for e in elements {
            let ty = self.check_expression(e, None);
            element = Some(match element {
                Some(joined) => joined.join(&ty),
                None => ty,
            });
        }
        Type::array(element.unwrap_or(Type::Never))
    }

    fn check_dictionary(&mut self, entries: &[(Expression, Expression)], hint: Option<&Type>) -> Type {
        if let Some(Type::Dictionary(key, value)) = hint.map(Type::unwrap_optionals) {
            let (key, value) = ((**key).clone(), (**value).clone());
            for (k, v) in entries {
                self.check_expression(k, Some(&key));
                self.check_expression(v, Some(&value));
            }
            return Type::Dictionary(Box::new(key), Box::new(value));
        }
        let mut key_ty: Option<Type> = None;
        let mut value_ty: Option<Type> = None;
        for (k, v) in entries {
            let kt = self.check_expression(k, None);
            if !self.is_valid_dictionary_key(&kt) {
                self.report(SemanticError::InvalidDictionaryKeyType {
                    ty: kt.clone(),
                    pos: k.pos,
                });
            }
            let vt = self.check_expression(v, None);
            key_ty = Some(key_ty.map_or(kt.clone(), |t| t.join(&kt)));
            value_ty = Some(value_ty.map_or(vt.clone(), |t| t.join(&vt)));
        }
        Type::Dictionary(
            Box::new(key_ty.unwrap_or(Type::Never)),
            Box::new(value_ty.unwrap_or(Type::Never)),
        )
    }

    fn member_type(&mut self, target: &Type, name: &Identifier) -> Type {
        let not_declared = |ty: &Type| SemanticError::NotDeclaredMember {
            ty: ty.clone(),
            name: name.name.clone(),
            pos: name.pos,
        };
        let int = Type::Integer(IntegerKind::Int);
        let found = match target {
            Type::Invalid => return Type::Invalid,
            Type::Composite(owner) => match self.lookup_member(owner, &name.name) {
                Some(member) if member.kind != MemberKind::EnumCase => {
                    self.check_member_access(owner, &member, name.pos);
                    Some(member.ty)
                }
                _ => None,
            },
            Type::Constructor(owner) => match self.lookup_member(owner, &name.name) {
                Some(member) if member.kind == MemberKind::EnumCase => Some(member.ty),
                _ => None,
            },
            Type::Array(element) => match name.name.as_str() {
                "length" => Some(int),
                "contains" => Some(builtin_method(("element", (**element).clone()), Type::Bool)),
                "append" => Some(builtin_method(("element", (**element).clone()), Type::Void)),
                _ => None,
            },
            Type::Dictionary(key, value) => match name.name.as_str() {
                "length" => Some(int),
                "keys" => Some(Type::array((**key).clone())),
                "values" => Some(Type::array((**value).clone())),
                "containsKey" => Some(builtin_method(("key", (**key).clone()), Type::Bool)),
                _ => None,
            },
            Type::String => match name.name.as_str() {
                "length" => Some(int),
                "utf8" => Some(Type::array(Type::Integer(IntegerKind::UInt8))),
                "concat" => Some(builtin_method(("other", Type::String), Type::String)),
                _ => None,
            },
            _ => None,
        };
        match found {
            Some(ty) => ty,
            None => {
                self.report(not_declared(target));
                Type::Invalid
            }
        }
    }

    /// Check a call. Events may only be constructed when `in_emit` is set.
    pub(super) fn check_invocation(
        &mut self,
        callee: Type,
        arguments: &[Argument],
        pos: Position,
        in_emit: bool,
    ) -> Type {
        match callee {
            Type::Function(function) => {
                self.check_arguments(&function, arguments, pos);
                function.return_type
            }
            Type::Constructor(r) => {
                let Some(composite) = self.composite(&r) else {
                    self.check_untyped_arguments(arguments);
                    return Type::Invalid;
                };
                let kind = composite.kind;
                let name = composite.qualified_identifier.clone();
                let initializer = composite.initializer.clone();
                if kind == CompositeKind::Event && !in_emit {
                    self.report(SemanticError::InvalidEventUsage { name, pos });
                }
                match initializer {
                    Some(initializer) => {
                        self.check_arguments(&initializer, arguments, pos);
                        initializer.return_type
                    }
                    None => {
                        self.check_untyped_arguments(arguments);
                        Type::Invalid
                    }
                }
            }
            Type::Invalid => {
                self.check_untyped_arguments(arguments);
                Type::Invalid
            }
            other => {
                self.report(SemanticError::NotCallable { ty: other, pos });
                self.check_untyped_arguments(arguments);
                Type::Invalid
            }
        }
    }

    fn check_untyped_arguments(&mut self, arguments: &[Argument]) {
        for argument in arguments {
            self.check_expression(&argument.value, None);
        }
    }

    fn check_arguments(&mut self, function: &FunctionType, arguments: &[Argument], pos: Position) {
        let min = function.min_arguments();
        let max = function.parameters.len();
        if arguments.len() < min || arguments.len() > max {
            let expected = if min == max {
                max.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            self.report(SemanticError::ArgumentCount {
                expected,
                actual: arguments.len(),
                pos,
            });
        }

        for (i, argument) in arguments.iter().enumerate() {
            let Some(parameter) = function.parameters.get(i) else {
                self.check_expression(&argument.value, None);
                continue;
            };
            if argument.label.as_deref() != parameter.label.as_deref() {
                self.report(SemanticError::IncorrectArgumentLabel {
                    expected: describe_label(parameter.label.as_deref()),
                    actual: describe_label(argument.label.as_deref()),
                    pos: argument.pos,
                });
            }
            self.check_expression(&argument.value, Some(&parameter.ty));
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expression, hint: Option<&Type>, pos: Position) -> Type {
        match op {
            UnaryOp::Not => {
                self.check_expression(operand, Some(&Type::Bool));
                Type::Bool
            }
            UnaryOp::Negate => {
                if let ExpressionKind::Integer { value, radix } = operand.kind {
                    return self.integer_literal(value, radix, true, hint, pos);
                }
                let ty = self.infer(operand, hint);
                let negatable = match &ty {
                    Type::Integer(kind) => kind.is_signed(),
                    Type::Fixed(kind) => *kind == FixedKind::Fix64,
                    Type::Number | Type::Invalid => true,
                    _ => false,
                };
                if negatable {
                    ty
                } else {
                    self.report(SemanticError::InvalidUnaryOperand {
                        op: op.symbol(),
                        ty,
                        pos,
                    });
                    Type::Invalid
                }
            }
        }
    }

    /// Infer both operands, letting a literal take the type of the other side.
    fn check_operands(&mut self, left: &Expression, right: &Expression, hint: Option<&Type>) -> (Type, Type) {
        if is_literal(left) && !is_literal(right) {
            let right_ty = self.infer(right, hint);
            let left_ty = self.infer(left, Some(&right_ty));
            (left_ty, right_ty)
        } else {
            let left_ty = self.infer(left, hint);
            let right_ty = self.infer(right, Some(&left_ty));
            (left_ty, right_ty)
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        hint: Option<&Type>,
        pos: Position,
    ) -> Type {
        let invalid_operands = |left: Type, right: Type| SemanticError::InvalidBinaryOperands {
            op: op.symbol(),
            left,
            right,
            pos,
        };
        match op {
            BinaryOp::NilCoalescing => {
                let left_hint = hint.map(|h| Type::optional(h.clone()));
                let inner = match self.infer(left, left_hint.as_ref()) {
                    Type::Optional(inner) => *inner,
                    Type::Invalid => Type::Invalid,
                    other => {
                        self.report(SemanticError::NonOptional {
                            ty: other,
                            pos: left.pos,
                        });
                        Type::Invalid
                    }
                };
                let right_hint = match hint {
                    Some(h) => Some(h.clone()),
                    None if inner != Type::Never => Some(inner.clone()),
                    None => None,
                };
                let right_ty = self.infer(right, right_hint.as_ref());
                inner.join(&right_ty)
            }
            BinaryOp::Or | BinaryOp::And => {
                self.check_expression(left, Some(&Type::Bool));
                self.check_expression(right, Some(&Type::Bool));
                Type::Bool
            }
            BinaryOp::Equal | BinaryOp::NotEqual => {
                let (l, r) = self.check_operands(left, right, None);
                let compatible = l.is_subtype(&r) || r.is_subtype(&l);
                if !compatible || !self.is_equatable(&l) || !self.is_equatable(&r) {
                    self.report(invalid_operands(l, r));
                }
                Type::Bool
            }
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                let (l, r) = self.check_operands(left, right, None);
                if !l.is_invalid() && !r.is_invalid() && !(l.is_numeric() && l == r) {
                    self.report(invalid_operands(l, r));
                }
                Type::Bool
            }
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let numeric_hint = hint.map(Type::unwrap_optionals).filter(|h| h.is_numeric());
                let (l, r) = self.check_operands(left, right, numeric_hint);
                if l.is_invalid() || r.is_invalid() {
                    return Type::Invalid;
                }
                if l.is_numeric() && l == r {
                    l
                } else {
                    self.report(invalid_operands(l, r));
                    Type::Invalid
                }
            }
        }
    }
}
