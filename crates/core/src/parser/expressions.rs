use super::Parser;
use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Expression parsing -------------------------------------

    pub(super) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.enter()?;
        let expression = self.parse_nil_coalescing()?;
        self.leave();
        Ok(expression)
    }

    /// `??` is right-associative and binds weakest.
    fn parse_nil_coalescing(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_or()?;
        if self.eat(&Token::DoubleQuestion) {
            self.enter()?;
            let right = self.parse_nil_coalescing()?;
            self.leave();
            return Ok(binary(BinaryOp::NilCoalescing, left, right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;
        let mut wrapped = 0;
        while self.eat(&Token::OrOr) {
            self.enter()?;
            wrapped += 1;
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        self.leave_chain(wrapped);
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_equality()?;
        let mut wrapped = 0;
        while self.eat(&Token::AndAnd) {
            self.enter()?;
            wrapped += 1;
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        self.leave_chain(wrapped);
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_relational()?;
        let mut wrapped = 0;
        loop {
            let op = match self.peek() {
                Token::Eq => BinaryOp::Equal,
                Token::Neq => BinaryOp::NotEqual,
                _ => break,
            };
            self.advance();
            self.enter()?;
            wrapped += 1;
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
        self.leave_chain(wrapped);
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_additive()?;
        let mut wrapped = 0;
        loop {
            let op = match self.peek() {
                Token::Lt => BinaryOp::Less,
                Token::Lte => BinaryOp::LessEqual,
                Token::Gt => BinaryOp::Greater,
                Token::Gte => BinaryOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            self.enter()?;
            wrapped += 1;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        self.leave_chain(wrapped);
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;
        let mut wrapped = 0;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Plus,
                Token::Minus => BinaryOp::Minus,
                _ => break,
            };
            self.advance();
            self.enter()?;
            wrapped += 1;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        self.leave_chain(wrapped);
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        let mut wrapped = 0;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            self.enter()?;
            wrapped += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        self.leave_chain(wrapped);
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let pos = self.cur_pos();
        let op = match self.peek() {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            _ => return self.parse_postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expression {
            kind: ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            pos,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expression = self.parse_primary()?;
        let mut wrapped = 0;
        loop {
            let pos = expression.pos;
            // Calls, indexing and force-unwrap must start on the line
            // of the expression they apply to.
            let applies = match self.peek() {
                Token::Dot => true,
                Token::LParen | Token::LBracket | Token::Bang => self.on_same_line(),
                _ => false,
            };
            if !applies {
                break;
            }
            self.enter()?;
            wrapped += 1;
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let name = self.take_identifier()?;
                    expression = Expression {
                        kind: ExpressionKind::Member {
                            target: Box::new(expression),
                            name,
                        },
                        pos,
                    };
                }
                Token::LParen => {
                    let arguments = self.parse_arguments()?;
                    expression = Expression {
                        kind: ExpressionKind::Invocation {
                            callee: Box::new(expression),
                            arguments,
                        },
                        pos,
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RBracket, "]")?;
                    expression = Expression {
                        kind: ExpressionKind::Index {
                            target: Box::new(expression),
                            index: Box::new(index),
                        },
                        pos,
                    };
                }
                Token::Bang => {
                    self.advance();
                    expression = Expression {
                        kind: ExpressionKind::Force(Box::new(expression)),
                        pos,
                    };
                }
                _ => break,
            }
        }
        self.leave_chain(wrapped);
        Ok(expression)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        self.expect(Token::LParen, "(")?;
        let mut arguments = Vec::new();
        while self.peek() != &Token::RParen {
            let pos = self.cur_pos();
            let label = match (self.peek(), self.peek_at(1)) {
                (Token::Word(w), Token::Colon) => {
                    let label = w.clone();
                    self.advance();
                    self.advance();
                    Some(label)
                }
                _ => None,
            };
            let value = self.parse_expression()?;
            arguments.push(Argument { label, value, pos });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, ")")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let pos = self.cur_pos();
        let kind = match self.peek().clone() {
            Token::Int { value, radix } => {
                self.advance();
                ExpressionKind::Integer { value, radix }
            }
            Token::Fixed(s) => {
                self.advance();
                ExpressionKind::Fixed(s)
            }
            Token::Str(s) => {
                self.advance();
                ExpressionKind::String(s)
            }
            Token::Word(w) => match w.as_str() {
                "true" => {
                    self.advance();
                    ExpressionKind::Bool(true)
                }
                "false" => {
                    self.advance();
                    ExpressionKind::Bool(false)
                }
                "nil" => {
                    self.advance();
                    ExpressionKind::Nil
                }
                _ => ExpressionKind::Identifier(self.take_identifier()?.name),
            },
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen, ")")?;
                return Ok(inner);
            }
            Token::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while self.peek() != &Token::RBracket {
                    elements.push(self.parse_expression()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket, "]")?;
                ExpressionKind::Array(elements)
            }
            Token::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                while self.peek() != &Token::RBrace {
                    let key = self.parse_expression()?;
                    self.expect(Token::Colon, ":")?;
                    let value = self.parse_expression()?;
                    entries.push((key, value));
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBrace, "}")?;
                ExpressionKind::Dictionary(entries)
            }
            other => {
                return Err(self.err(format!(
                    "expected expression, got {}",
                    super::describe(&other)
                )))
            }
        };
        Ok(Expression { kind, pos })
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let pos = left.pos;
    Expression {
        kind: ExpressionKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        pos,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::location::Location;
    use crate::parser::{parse_program, ParserConfig};

    fn expr(src: &str) -> Expression {
        let program = parse_program(
            format!("let x = {}", src).as_bytes(),
            &Location::identifier("Exprs"),
            &ParserConfig::default(),
        )
        .unwrap();
        match program.declarations.into_iter().next() {
            Some(Declaration::Variable(v)) => v.value,
            other => panic!("expected variable, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match expr("1 + 2 * 3").kind {
            ExpressionKind::Binary {
                op: BinaryOp::Plus,
                right,
                ..
            } => assert!(matches!(
                right.kind,
                ExpressionKind::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            )),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nil_coalescing_is_right_associative() {
        match expr("a ?? b ?? c").kind {
            ExpressionKind::Binary {
                op: BinaryOp::NilCoalescing,
                left,
                right,
            } => {
                assert!(matches!(left.kind, ExpressionKind::Identifier(_)));
                assert!(matches!(
                    right.kind,
                    ExpressionKind::Binary {
                        op: BinaryOp::NilCoalescing,
                        ..
                    }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn labelled_invocation_on_member() {
        match expr("Test.Account(address: 0x01, 2)").kind {
            ExpressionKind::Invocation { callee, arguments } => {
                assert!(matches!(callee.kind, ExpressionKind::Member { .. }));
                assert_eq!(arguments[0].label.as_deref(), Some("address"));
                assert_eq!(arguments[1].label, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn force_index_and_collections() {
        assert!(matches!(expr("xs[0]!").kind, ExpressionKind::Force(_)));
        assert!(matches!(expr("[1, 2,]").kind, ExpressionKind::Array(ref e) if e.len() == 2));
        assert!(matches!(
            expr("{\"a\": 1}").kind,
            ExpressionKind::Dictionary(ref e) if e.len() == 1
        ));
    }

    #[test]
    fn unary_operators() {
        assert!(matches!(
            expr("!-x").kind,
            ExpressionKind::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }
}
