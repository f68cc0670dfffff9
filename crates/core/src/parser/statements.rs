use super::Parser;
use crate::access::Access;
use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Statements ---------------------------------------------

    pub(super) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(Token::LBrace, "{")?;
        self.enter()?;
        let mut statements = Vec::new();
        loop {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            if self.peek() == &Token::RBrace || self.peek() == &Token::Eof {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace, "}")?;
        self.leave();
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let pos = self.cur_pos();
        if self.is_word("let") || self.is_word("var") {
            return self
                .parse_variable(Access::NotSpecified, pos)
                .map(Statement::Variable);
        }
        if self.is_word("return") {
            self.advance();
            let has_value = self.on_same_line()
                && !matches!(
                    self.peek(),
                    Token::RBrace | Token::Semicolon | Token::Eof
                );
            let value = if has_value {
                Some(self.parse_expression()?)
            } else {
                None
            };
            return Ok(Statement::Return { value, pos });
        }
        if self.is_word("if") {
            return self.parse_if();
        }
        if self.is_word("while") {
            self.advance();
            let test = self.parse_expression()?;
            let body = self.parse_block()?;
            return Ok(Statement::While { test, body, pos });
        }
        if self.is_word("emit") {
            self.advance();
            let invocation = self.parse_expression()?;
            return Ok(Statement::Emit { invocation, pos });
        }

        let expression = self.parse_expression()?;
        if self.eat(&Token::Assign) {
            let value = self.parse_expression()?;
            return Ok(Statement::Assignment {
                target: expression,
                value,
                pos,
            });
        }
        Ok(Statement::Expression(expression))
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let pos = self.expect_word("if")?;
        let test = if self.is_word("let") || self.is_word("var") {
            let kind = self.parse_variable_kind()?;
            let identifier = self.take_identifier()?;
            self.expect(Token::Assign, "=")?;
            let value = self.parse_expression()?;
            IfTest::Binding {
                kind,
                identifier,
                value,
            }
        } else {
            IfTest::Expression(self.parse_expression()?)
        };
        let then = self.parse_block()?;
        let otherwise = if self.is_word("else") {
            self.advance();
            if self.is_word("if") {
                self.enter()?;
                let nested = self.parse_if()?;
                self.leave();
                Some(vec![nested])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Statement::If {
            test,
            then,
            otherwise,
            pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::location::Location;
    use crate::parser::{parse_program, ParserConfig};

    fn body(src: &str) -> Block {
        let program = parse_program(
            format!("fun f() {{\n{}\n}}", src).as_bytes(),
            &Location::identifier("Stmts"),
            &ParserConfig::default(),
        )
        .unwrap();
        match program.declarations.into_iter().next() {
            Some(Declaration::Function(f)) => f.body,
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn bare_return_before_newline() {
        let stmts = body("return\nfoo()");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[0], Statement::Return { value: None, .. }));
    }

    #[test]
    fn if_let_else_if_chain() {
        let stmts = body("if let x = y { } else if z { } else { }");
        match &stmts[0] {
            Statement::If {
                test: IfTest::Binding { identifier, .. },
                otherwise: Some(otherwise),
                ..
            } => {
                assert_eq!(identifier.name, "x");
                assert!(matches!(otherwise[0], Statement::If { .. }));
            }
            other => panic!("expected if-let, got {:?}", other),
        }
    }

    #[test]
    fn assignment_and_emit() {
        let stmts = body("self.count = self.count + 1\nemit Done(count: 1)");
        assert!(matches!(stmts[0], Statement::Assignment { .. }));
        assert!(matches!(stmts[1], Statement::Emit { .. }));
    }
}
