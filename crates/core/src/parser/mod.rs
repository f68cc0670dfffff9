//! Recursive-descent parser from tokens to [`Program`].
//! All nodes carry the position of their first token.
//! Names and types are left unresolved for the checker.
use crate::access::Access;
use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{self, Spanned, Token};
use crate::location::{Address, Location, Position, Range};

mod declarations;
mod expressions;
mod statements;
mod types;

/// Parser options. The defaults are what every caller in this workspace uses.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting of expressions, types and blocks before the parser
    /// gives up, so hostile input cannot exhaust the stack.
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_nesting_depth: 64,
        }
    }
}

const RESERVED_WORDS: &[&str] = &[
    "if", "else", "while", "return", "emit", "let", "var", "fun", "true", "false", "nil",
    "import",
];

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    location: &'a Location,
    config: &'a ParserConfig,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], location: &'a Location, config: &'a ParserConfig) -> Self {
        Parser {
            tokens,
            pos: 0,
            location,
            config,
            depth: 0,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        &self.tokens[(self.pos + ahead).min(self.tokens.len() - 1)].token
    }

    fn cur_pos(&self) -> Position {
        self.cur().pos
    }

    /// Position of the most recently consumed token.
    fn prev_pos(&self) -> Position {
        if self.pos == 0 {
            return self.cur_pos();
        }
        self.tokens[(self.pos - 1).min(self.tokens.len() - 1)].pos
    }

    /// Whether the current token starts on the same line as the previous one.
    fn on_same_line(&self) -> bool {
        self.pos > 0 && self.cur_pos().line == self.prev_pos().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, display: &str) -> Result<Position, ParseError> {
        let pos = self.cur_pos();
        if self.eat(&token) {
            Ok(pos)
        } else {
            Err(self.err(format!("expected '{}', got {}", display, describe(self.peek()))))
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<Position, ParseError> {
        let pos = self.cur_pos();
        if self.is_word(expected) {
            self.advance();
            return Ok(pos);
        }
        Err(self.err(format!("expected '{}', got {}", expected, describe(self.peek()))))
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn take_identifier(&mut self) -> Result<Identifier, ParseError> {
        let pos = self.cur_pos();
        match self.peek().clone() {
            Token::Word(w) if !RESERVED_WORDS.contains(&w.as_str()) => {
                self.advance();
                Ok(Identifier { name: w, pos })
            }
            Token::Word(w) => Err(self.err(format!("expected identifier, got keyword '{}'", w))),
            other => Err(self.err(format!("expected identifier, got {}", describe(&other)))),
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.location, self.cur_pos(), msg)
    }

    /// Enter one level of nesting; pair with [`Parser::leave`].
    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.config.max_nesting_depth {
            return Err(self.err(format!(
                "program nested too deeply (limit {})",
                self.config.max_nesting_depth
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Undo the `enter` calls made while folding an operator chain, one per
    /// node the chain wrapped.
    fn leave_chain(&mut self, wrapped: usize) {
        self.depth = self.depth.saturating_sub(wrapped);
    }

    // -- Program ------------------------------------------------

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        while self.peek() != &Token::Eof {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            if self.is_word("import") {
                program.imports.push(self.parse_import()?);
            } else {
                program.declarations.push(self.parse_top_level_declaration()?);
            }
        }
        Ok(program)
    }

    fn parse_import(&mut self) -> Result<ImportDeclaration, ParseError> {
        let start = self.expect_word("import")?;

        let first = self.take_identifier()?;
        if !self.is_word("from") && self.peek() != &Token::Comma {
            return Ok(ImportDeclaration {
                identifiers: Vec::new(),
                location: Location::Identifier(first.name),
                range: Range::new(start, self.prev_pos()),
            });
        }

        let mut identifiers = vec![first];
        while self.eat(&Token::Comma) {
            identifiers.push(self.take_identifier()?);
        }
        self.expect_word("from")?;

        let location = match self.peek().clone() {
            Token::Str(path) => Location::String(path),
            Token::Int { value, radix: 16 } => Location::Address(
                Address::from_u128(value)
                    .ok_or_else(|| self.err("address literal exceeds 8 bytes"))?,
            ),
            Token::Word(name) => Location::Identifier(name),
            other => {
                return Err(self.err(format!(
                    "expected import location, got {}",
                    describe(&other)
                )))
            }
        };
        self.advance();

        Ok(ImportDeclaration {
            identifiers,
            location,
            range: Range::new(start, self.prev_pos()),
        })
    }

    /// Optional access modifier: `pub`, `priv`, `access(all|self|contract|account)`.
    fn parse_access(&mut self) -> Result<Access, ParseError> {
        if self.is_word("pub") {
            self.advance();
            if self.peek() == &Token::LParen && self.on_same_line() {
                return Err(self.err("settable access modifiers are not supported"));
            }
            return Ok(Access::Public);
        }
        if self.is_word("priv") {
            self.advance();
            return Ok(Access::Private);
        }
        if self.is_word("access") && self.peek_at(1) == &Token::LParen {
            self.advance();
            self.advance();
            let keyword = self.take_identifier()?;
            let access = match keyword.name.as_str() {
                "all" => Access::Public,
                "self" => Access::Private,
                "contract" => Access::Contract,
                "account" => Access::Account,
                other => {
                    return Err(ParseError::new(
                        self.location,
                        keyword.pos,
                        format!("unknown access modifier 'access({})'", other),
                    ))
                }
            };
            self.expect(Token::RParen, ")")?;
            return Ok(access);
        }
        Ok(Access::NotSpecified)
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{}'", w),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Int { value, .. } => format!("integer {}", value),
        Token::Fixed(s) => format!("fixed-point {}", s),
        Token::Eof => "end of input".to_owned(),
        other => format!("{:?}", other),
    }
}

/// Position of the first byte that is not valid UTF-8.
fn utf8_error_position(bytes: &[u8], valid_up_to: usize) -> Position {
    let prefix = String::from_utf8_lossy(&bytes[..valid_up_to]);
    let line = prefix.matches('\n').count() + 1;
    let column = prefix.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    Position {
        offset: valid_up_to,
        line: line as u32,
        column: column as u32,
    }
}

/// Parse source bytes into a [`Program`]. The first error aborts.
pub fn parse_program(
    bytes: &[u8],
    location: &Location,
    config: &ParserConfig,
) -> Result<Program, ParseError> {
    let src = std::str::from_utf8(bytes).map_err(|e| {
        ParseError::new(
            location,
            utf8_error_position(bytes, e.valid_up_to()),
            format!("source is not valid UTF-8: {}", e),
        )
    })?;
    let tokens = lexer::lex(src, location)?;
    let mut p = Parser::new(&tokens, location, config);
    let program = p.parse_program()?;
    tracing::trace!(
        %location,
        imports = program.imports.len(),
        declarations = program.declarations.len(),
        "parsed program"
    );
    Ok(program)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(src: &str) -> Result<Program, ParseError> {
        parse_program(
            src.as_bytes(),
            &Location::identifier("Test0"),
            &ParserConfig::default(),
        )
    }

    #[test]
    fn import_identifier_location_imports_everything() {
        let program = parse("import Test").unwrap();
        assert_eq!(program.imports.len(), 1);
        let import = &program.imports[0];
        assert!(import.identifiers.is_empty());
        assert_eq!(import.location, Location::identifier("Test"));
        assert_eq!(import.range.start.line, 1);
        assert_eq!(import.range.end.column, 8);
    }

    #[test]
    fn import_named_from_address_and_path() {
        let program = parse("import A, B from 0x01\nimport C from \"./c.cdc\"").unwrap();
        assert_eq!(program.imports[0].identifiers.len(), 2);
        assert_eq!(
            program.imports[0].location,
            Location::Address(Address::from_u128(1).unwrap())
        );
        assert_eq!(
            program.imports[1].location,
            Location::String("./c.cdc".into())
        );
    }

    #[test]
    fn access_modifiers() {
        let program = parse(
            "pub fun a() {}\npriv fun b() {}\naccess(contract) fun c() {}\naccess(account) fun d() {}\nfun e() {}",
        )
        .unwrap();
        let accesses: Vec<Access> = program
            .declarations
            .iter()
            .map(|d| match d {
                Declaration::Function(f) => f.access,
                other => panic!("expected function, got {:?}", other),
            })
            .collect();
        assert_eq!(
            accesses,
            vec![
                Access::Public,
                Access::Private,
                Access::Contract,
                Access::Account,
                Access::NotSpecified
            ]
        );
    }

    #[test]
    fn unknown_access_modifier_is_rejected() {
        let err = parse("access(everyone) fun a() {}").unwrap_err();
        assert!(err.message.contains("access(everyone)"), "{}", err.message);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = parse_program(
            &[0xff, 0xfe],
            &Location::identifier("Bad"),
            &ParserConfig::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("UTF-8"));
        assert_eq!((err.pos.line, err.pos.column), (1, 1));
    }

    #[test]
    fn invalid_utf8_points_at_the_offending_byte() {
        let err = parse_program(
            b"let x = 1\nlet \xff = 2",
            &Location::identifier("Bad"),
            &ParserConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.pos.offset, 14);
        assert_eq!((err.pos.line, err.pos.column), (2, 5));
        assert!(err.to_string().contains("2:5"), "{}", err);
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let src = format!("let x = {}1{}", "(".repeat(100), ")".repeat(100));
        let err = parse(&src).unwrap_err();
        assert!(err.message.contains("nested too deeply"), "{}", err.message);
    }

    #[rstest]
    #[case::addition(format!("let x = 1{}", "+1".repeat(2000)))]
    #[case::conjunction(format!("let x = true{}", " && true".repeat(2000)))]
    #[case::comparison(format!("let x = 1{}", " == 1".repeat(2000)))]
    #[case::nil_coalescing(format!("let x = nil{}", " ?? 1".repeat(2000)))]
    #[case::else_if(format!("fun f() {{\nif true {{}}{}\n}}", " else if true {}".repeat(1000)))]
    #[case::member_access(format!("let x = a{}", ".b".repeat(2000)))]
    #[case::invocation(format!("let x = f{}", "()".repeat(2000)))]
    #[case::indexing(format!("let x = a{}", "[0]".repeat(2000)))]
    #[case::force_unwrap(format!("let x = a{}", "!".repeat(2000)))]
    fn long_chains_hit_the_nesting_limit(#[case] src: String) {
        let err = parse(&src).unwrap_err();
        assert!(err.message.contains("nested too deeply"), "{}", err.message);
    }

    #[test]
    fn short_chains_stay_within_the_nesting_limit() {
        let src = format!(
            "let x = 1{}\nlet y = a{}\nfun f() {{\nif true {{}}{}\n}}",
            "+1".repeat(40),
            ".b".repeat(40),
            " else if true {}".repeat(40)
        );
        assert!(parse(&src).is_ok());
    }
}
