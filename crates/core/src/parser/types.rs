use super::Parser;
use crate::ast::{TypeAnnotation, TypeAnnotationKind};
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Type parsing -------------------------------------------

    pub(super) fn parse_type(&mut self) -> Result<TypeAnnotation, ParseError> {
        self.enter()?;
        let pos = self.cur_pos();
        let kind = match self.peek() {
            Token::LBracket => {
                self.advance();
                let element = self.parse_type()?;
                self.expect(Token::RBracket, "]")?;
                TypeAnnotationKind::Array(Box::new(element))
            }
            Token::LBrace => {
                self.advance();
                let key = self.parse_type()?;
                self.expect(Token::Colon, ":")?;
                let value = self.parse_type()?;
                self.expect(Token::RBrace, "}")?;
                TypeAnnotationKind::Dictionary {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            _ => {
                let identifier = self.take_identifier()?;
                let mut nested = Vec::new();
                while self.peek() == &Token::Dot {
                    self.advance();
                    nested.push(self.take_identifier()?);
                }
                TypeAnnotationKind::Nominal { identifier, nested }
            }
        };

        let mut annotation = TypeAnnotation { kind, pos };
        while self.peek() == &Token::Question {
            self.advance();
            annotation = TypeAnnotation {
                kind: TypeAnnotationKind::Optional(Box::new(annotation)),
                pos,
            };
        }
        self.leave();
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::location::Location;
    use crate::parser::{parse_program, ParserConfig};

    fn field_type(src: &str) -> TypeAnnotationKind {
        let program = parse_program(
            format!("struct S {{ let f: {} }}", src).as_bytes(),
            &Location::identifier("Types"),
            &ParserConfig::default(),
        )
        .unwrap();
        let s = program.composites().next().unwrap();
        s.members.fields[0].type_annotation.kind.clone()
    }

    #[test]
    fn nested_nominal_type() {
        match field_type("Test.ResultStatus") {
            TypeAnnotationKind::Nominal { identifier, nested } => {
                assert_eq!(identifier.name, "Test");
                assert_eq!(nested.len(), 1);
                assert_eq!(nested[0].name, "ResultStatus");
            }
            other => panic!("expected nominal type, got {:?}", other),
        }
    }

    #[test]
    fn optional_array_of_optional() {
        match field_type("[UInt8?]?") {
            TypeAnnotationKind::Optional(inner) => match inner.kind {
                TypeAnnotationKind::Array(element) => {
                    assert!(matches!(element.kind, TypeAnnotationKind::Optional(_)));
                }
                other => panic!("expected array, got {:?}", other),
            },
            other => panic!("expected optional, got {:?}", other),
        }
    }

    #[test]
    fn dictionary_type() {
        assert!(matches!(
            field_type("{String: [Int]}"),
            TypeAnnotationKind::Dictionary { .. }
        ));
    }
}
