use super::Parser;
use crate::access::Access;
use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::Token;
use crate::location::Position;

/// Anything that may appear at declaration level.
enum Item {
    Composite(CompositeDeclaration),
    Function(FunctionDeclaration),
    Initializer(FunctionDeclaration),
    Field(FieldDeclaration),
    Variable(VariableDeclaration),
    EnumCase(EnumCaseDeclaration),
}

impl<'a> Parser<'a> {
    // -- Declarations -------------------------------------------

    pub(super) fn parse_top_level_declaration(&mut self) -> Result<Declaration, ParseError> {
        let pos = self.cur_pos();
        match self.parse_item(false)? {
            Item::Composite(c) => Ok(Declaration::Composite(c)),
            Item::Function(f) => Ok(Declaration::Function(f)),
            Item::Variable(v) => Ok(Declaration::Variable(v)),
            Item::Initializer(_) | Item::Field(_) | Item::EnumCase(_) => Err(ParseError::new(
                self.location,
                pos,
                "initializers, fields and enum cases must be declared inside a composite",
            )),
        }
    }

    fn parse_item(&mut self, in_composite: bool) -> Result<Item, ParseError> {
        let pos = self.cur_pos();
        let access = self.parse_access()?;
        let keyword = match self.peek() {
            Token::Word(w) => w.clone(),
            other => {
                return Err(self.err(format!(
                    "expected declaration, got {}",
                    super::describe(other)
                )))
            }
        };
        match keyword.as_str() {
            "contract" => self
                .parse_composite(access, CompositeKind::Contract, pos)
                .map(Item::Composite),
            "struct" => self
                .parse_composite(access, CompositeKind::Struct, pos)
                .map(Item::Composite),
            "resource" => self
                .parse_composite(access, CompositeKind::Resource, pos)
                .map(Item::Composite),
            "event" => self.parse_event(access, pos).map(Item::Composite),
            "enum" => self.parse_enum(access, pos).map(Item::Composite),
            "fun" => self.parse_function(access, pos).map(Item::Function),
            "init" if in_composite => self.parse_initializer(access, pos).map(Item::Initializer),
            "case" if in_composite => {
                self.advance();
                let identifier = self.take_identifier()?;
                Ok(Item::EnumCase(EnumCaseDeclaration {
                    access,
                    identifier,
                    pos,
                }))
            }
            "let" | "var" if in_composite => self.parse_field(access, pos).map(Item::Field),
            "let" | "var" => self.parse_variable(access, pos).map(Item::Variable),
            _ => Err(self.err(format!("unexpected token '{}'", keyword))),
        }
    }

    fn parse_composite(
        &mut self,
        access: Access,
        kind: CompositeKind,
        pos: Position,
    ) -> Result<CompositeDeclaration, ParseError> {
        self.advance();
        let identifier = self.take_identifier()?;
        let members = self.parse_members()?;
        Ok(CompositeDeclaration {
            access,
            kind,
            identifier,
            raw_type: None,
            parameters: Vec::new(),
            members,
            pos,
        })
    }

    fn parse_event(&mut self, access: Access, pos: Position) -> Result<CompositeDeclaration, ParseError> {
        self.expect_word("event")?;
        let identifier = self.take_identifier()?;
        let parameters = self.parse_parameter_list()?;
        Ok(CompositeDeclaration {
            access,
            kind: CompositeKind::Event,
            identifier,
            raw_type: None,
            parameters,
            members: Members::default(),
            pos,
        })
    }

    fn parse_enum(&mut self, access: Access, pos: Position) -> Result<CompositeDeclaration, ParseError> {
        self.expect_word("enum")?;
        let identifier = self.take_identifier()?;
        let raw_type = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let members = self.parse_members()?;
        Ok(CompositeDeclaration {
            access,
            kind: CompositeKind::Enum,
            identifier,
            raw_type,
            parameters: Vec::new(),
            members,
            pos,
        })
    }

    fn parse_members(&mut self) -> Result<Members, ParseError> {
        self.expect(Token::LBrace, "{")?;
        self.enter()?;
        let mut members = Members::default();
        loop {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            if self.peek() == &Token::RBrace || self.peek() == &Token::Eof {
                break;
            }
            match self.parse_item(true)? {
                Item::Composite(c) => members.composites.push(c),
                Item::Function(f) => members.functions.push(f),
                Item::Initializer(f) => members.initializers.push(f),
                Item::Field(f) => members.fields.push(f),
                Item::EnumCase(c) => members.enum_cases.push(c),
                // parse_item never yields variables inside a composite
                Item::Variable(v) => {
                    return Err(ParseError::new(
                        self.location,
                        v.pos,
                        "variable declarations are not allowed in composites",
                    ))
                }
            }
        }
        self.expect(Token::RBrace, "}")?;
        self.leave();
        Ok(members)
    }

    fn parse_function(&mut self, access: Access, pos: Position) -> Result<FunctionDeclaration, ParseError> {
        self.expect_word("fun")?;
        let identifier = self.take_identifier()?;
        let parameters = self.parse_parameter_list()?;
        let return_type = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(FunctionDeclaration {
            access,
            identifier,
            parameters,
            return_type,
            body,
            pos,
        })
    }

    fn parse_initializer(
        &mut self,
        access: Access,
        pos: Position,
    ) -> Result<FunctionDeclaration, ParseError> {
        let init_pos = self.expect_word("init")?;
        let parameters = self.parse_parameter_list()?;
        let body = self.parse_block()?;
        Ok(FunctionDeclaration {
            access,
            identifier: Identifier {
                name: "init".to_owned(),
                pos: init_pos,
            },
            parameters,
            return_type: None,
            body,
            pos,
        })
    }

    pub(super) fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParseError> {
        self.expect(Token::LParen, "(")?;
        let mut parameters = Vec::new();
        while self.peek() != &Token::RParen {
            let first = self.take_identifier()?;
            let (label, identifier) = if matches!(self.peek(), Token::Word(_)) {
                (Some(first.name), self.take_identifier()?)
            } else {
                (None, first)
            };
            self.expect(Token::Colon, ":")?;
            let type_annotation = self.parse_type()?;
            parameters.push(Parameter {
                label,
                identifier,
                type_annotation,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, ")")?;
        Ok(parameters)
    }

    fn parse_field(&mut self, access: Access, pos: Position) -> Result<FieldDeclaration, ParseError> {
        let kind = self.parse_variable_kind()?;
        let identifier = self.take_identifier()?;
        self.expect(Token::Colon, ":")?;
        let type_annotation = self.parse_type()?;
        Ok(FieldDeclaration {
            access,
            kind,
            identifier,
            type_annotation,
            pos,
        })
    }

    pub(super) fn parse_variable(
        &mut self,
        access: Access,
        pos: Position,
    ) -> Result<VariableDeclaration, ParseError> {
        let kind = self.parse_variable_kind()?;
        let identifier = self.take_identifier()?;
        let type_annotation = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(Token::Assign, "=")?;
        let value = self.parse_expression()?;
        Ok(VariableDeclaration {
            access,
            kind,
            identifier,
            type_annotation,
            value,
            pos,
        })
    }

    pub(super) fn parse_variable_kind(&mut self) -> Result<VariableKind, ParseError> {
        if self.is_word("let") {
            self.advance();
            Ok(VariableKind::Let)
        } else if self.is_word("var") {
            self.advance();
            Ok(VariableKind::Var)
        } else {
            Err(self.err(format!(
                "expected 'let' or 'var', got {}",
                super::describe(self.peek())
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::location::Location;
    use crate::parser::{parse_program, ParserConfig};

    fn parse(src: &str) -> Program {
        parse_program(
            src.as_bytes(),
            &Location::identifier("Decl"),
            &ParserConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn contract_with_events_and_members() {
        let program = parse(
            r#"
pub contract Events {
    pub event Created(address: Address, contract: String)
    pub struct Info {
        pub let id: UInt64
        priv var note: String?
        init(id: UInt64) {
            self.id = id
            self.note = nil
        }
        pub fun describe(_ prefix: String): String {
            return prefix
        }
    }
    pub enum Status: UInt8 {
        pub case ok
        pub case failed
    }
}
"#,
        );
        let contract = program.composites().next().unwrap();
        assert_eq!(contract.kind, CompositeKind::Contract);
        assert_eq!(contract.identifier.name, "Events");

        let nested = &contract.members.composites;
        assert_eq!(nested.len(), 3);

        let event = &nested[0];
        assert_eq!(event.kind, CompositeKind::Event);
        assert_eq!(event.parameters.len(), 2);
        assert_eq!(event.parameters[1].identifier.name, "contract");

        let info = &nested[1];
        assert_eq!(info.members.fields.len(), 2);
        assert_eq!(info.members.fields[1].access, crate::access::Access::Private);
        assert_eq!(info.members.initializers.len(), 1);
        let describe = &info.members.functions[0];
        assert_eq!(describe.parameters[0].effective_label(), None);
        assert!(describe.return_type.is_some());

        let status = &nested[2];
        assert_eq!(status.kind, CompositeKind::Enum);
        assert!(status.raw_type.is_some());
        assert_eq!(status.members.enum_cases.len(), 2);
    }

    #[test]
    fn parameter_labels() {
        let program = parse("fun f(_ a: Int, b: Int, with c: Int) {}");
        let Declaration::Function(f) = &program.declarations[0] else {
            panic!("expected function");
        };
        let labels: Vec<Option<&str>> = f.parameters.iter().map(|p| p.effective_label()).collect();
        assert_eq!(labels, vec![None, Some("b"), Some("with")]);
    }

    #[test]
    fn fields_outside_composites_are_rejected() {
        let err = parse_program(
            b"init() {}",
            &Location::identifier("Decl"),
            &ParserConfig::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("unexpected token 'init'"), "{}", err.message);
    }
}
