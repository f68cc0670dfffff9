use crate::error::ParseError;
use crate::location::{Location, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords; the parser tells them apart
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal with the radix it was written in
    Int { value: u128, radix: u32 },
    /// Fixed-point literal, kept as written
    Fixed(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Question,
    DoubleQuestion,
    Bang,
    Assign,
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    // Logical operators
    AndAnd,
    OrOr,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub pos: Position,
}

struct Cursor {
    chars: Vec<char>,
    idx: usize,
    offset: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.idx + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.idx += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }
}

pub fn lex(src: &str, location: &Location) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut cur = Cursor {
        chars: src.chars().collect(),
        idx: 0,
        offset: 0,
        line: 1,
        column: 1,
    };

    while let Some(c) = cur.peek(0) {
        // Line comment
        if c == '/' && cur.peek(1) == Some('/') {
            while cur.peek(0).is_some_and(|c| c != '\n') {
                cur.bump();
            }
            continue;
        }

        // Block comment, nestable
        if c == '/' && cur.peek(1) == Some('*') {
            let start = cur.pos();
            cur.bump();
            cur.bump();
            let mut depth = 1usize;
            while depth > 0 {
                match (cur.peek(0), cur.peek(1)) {
                    (None, _) => {
                        return Err(ParseError::new(location, start, "unterminated block comment"));
                    }
                    (Some('/'), Some('*')) => {
                        cur.bump();
                        cur.bump();
                        depth += 1;
                    }
                    (Some('*'), Some('/')) => {
                        cur.bump();
                        cur.bump();
                        depth -= 1;
                    }
                    _ => {
                        cur.bump();
                    }
                }
            }
            continue;
        }

        if c.is_whitespace() {
            cur.bump();
            continue;
        }

        let tok_pos = cur.pos();

        if c == '"' {
            cur.bump();
            let s = lex_string(&mut cur, location, tok_pos)?;
            tokens.push(Spanned {
                token: Token::Str(s),
                pos: tok_pos,
            });
            continue;
        }

        if c.is_ascii_digit() {
            let token = lex_number(&mut cur, location, tok_pos)?;
            tokens.push(Spanned {
                token,
                pos: tok_pos,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(c) = cur.peek(0).filter(|c| c.is_alphanumeric() || *c == '_') {
                word.push(c);
                cur.bump();
            }
            tokens.push(Spanned {
                token: Token::Word(word),
                pos: tok_pos,
            });
            continue;
        }

        // Two-character operators first
        let two = match (c, cur.peek(1)) {
            ('=', Some('=')) => Some(Token::Eq),
            ('!', Some('=')) => Some(Token::Neq),
            ('<', Some('=')) => Some(Token::Lte),
            ('>', Some('=')) => Some(Token::Gte),
            ('&', Some('&')) => Some(Token::AndAnd),
            ('|', Some('|')) => Some(Token::OrOr),
            ('?', Some('?')) => Some(Token::DoubleQuestion),
            _ => None,
        };
        if let Some(token) = two {
            cur.bump();
            cur.bump();
            tokens.push(Spanned {
                token,
                pos: tok_pos,
            });
            continue;
        }

        let one = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '?' => Token::Question,
            '!' => Token::Bang,
            '=' => Token::Assign,
            '<' => Token::Lt,
            '>' => Token::Gt,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            _ => {
                return Err(ParseError::new(
                    location,
                    tok_pos,
                    format!("unexpected character '{}'", c),
                ));
            }
        };
        cur.bump();
        tokens.push(Spanned {
            token: one,
            pos: tok_pos,
        });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: cur.pos(),
    });
    Ok(tokens)
}

fn lex_string(cur: &mut Cursor, location: &Location, start: Position) -> Result<String, ParseError> {
    let mut s = String::new();
    loop {
        match cur.bump() {
            None | Some('\n') => {
                return Err(ParseError::new(location, start, "unterminated string literal"));
            }
            Some('"') => return Ok(s),
            Some('\\') => {
                let escaped = match cur.bump() {
                    Some('"') => '"',
                    Some('\'') => '\'',
                    Some('\\') => '\\',
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    Some(other) => {
                        return Err(ParseError::new(
                            location,
                            cur.pos(),
                            format!("invalid escape character '{}'", other),
                        ));
                    }
                    None => {
                        return Err(ParseError::new(
                            location,
                            start,
                            "unterminated escape in string",
                        ));
                    }
                };
                s.push(escaped);
            }
            Some(c) => s.push(c),
        }
    }
}

fn lex_number(cur: &mut Cursor, location: &Location, start: Position) -> Result<Token, ParseError> {
    let radix = match (cur.peek(0), cur.peek(1)) {
        (Some('0'), Some('x')) => 16,
        (Some('0'), Some('b')) => 2,
        (Some('0'), Some('o')) => 8,
        _ => 10,
    };
    if radix != 10 {
        cur.bump();
        cur.bump();
    }

    let mut digits = String::new();
    while let Some(c) = cur.peek(0).filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
        if c != '_' {
            digits.push(c);
        }
        cur.bump();
    }

    if radix == 10 && cur.peek(0) == Some('.') && cur.peek(1).is_some_and(|c| c.is_ascii_digit()) {
        cur.bump();
        let mut fraction = String::new();
        while let Some(c) = cur.peek(0).filter(|c| c.is_ascii_digit() || *c == '_') {
            if c != '_' {
                fraction.push(c);
            }
            cur.bump();
        }
        return Ok(Token::Fixed(format!("{}.{}", digits, fraction)));
    }

    if digits.is_empty() {
        return Err(ParseError::new(location, start, "missing digits in integer literal"));
    }
    let value = u128::from_str_radix(&digits, radix).map_err(|_| {
        ParseError::new(location, start, format!("invalid integer literal '{}'", digits))
    })?;
    Ok(Token::Int { value, radix })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        lex(src, &Location::identifier("Lex"))
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn lexes_declaration_header() {
        assert_eq!(
            tokens("access(all) event Foo(x: Int?)"),
            vec![
                Token::Word("access".into()),
                Token::LParen,
                Token::Word("all".into()),
                Token::RParen,
                Token::Word("event".into()),
                Token::Word("Foo".into()),
                Token::LParen,
                Token::Word("x".into()),
                Token::Colon,
                Token::Word("Int".into()),
                Token::Question,
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_number_forms() {
        assert_eq!(
            tokens("0x01 1_000 0b101 0o17 2.50"),
            vec![
                Token::Int { value: 1, radix: 16 },
                Token::Int { value: 1000, radix: 10 },
                Token::Int { value: 5, radix: 2 },
                Token::Int { value: 15, radix: 8 },
                Token::Fixed("2.50".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn skips_nested_block_comments_and_tracks_lines() {
        let spanned = lex(
            "/* outer /* inner */ still */\n// line\n  foo",
            &Location::identifier("Lex"),
        )
        .unwrap();
        assert_eq!(spanned[0].token, Token::Word("foo".into()));
        assert_eq!(spanned[0].pos.line, 3);
        assert_eq!(spanned[0].pos.column, 3);
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            tokens("a ?? b == c != d && e || !f"),
            vec![
                Token::Word("a".into()),
                Token::DoubleQuestion,
                Token::Word("b".into()),
                Token::Eq,
                Token::Word("c".into()),
                Token::Neq,
                Token::Word("d".into()),
                Token::AndAnd,
                Token::Word("e".into()),
                Token::OrOr,
                Token::Bang,
                Token::Word("f".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes_resolve() {
        assert_eq!(
            tokens(r#""a\"b\n""#),
            vec![Token::Str("a\"b\n".into()), Token::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = lex("\"abc", &Location::identifier("Lex")).unwrap_err();
        assert!(err.message.contains("unterminated string"));
        assert_eq!(err.pos.line, 1);
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = lex("let x = #", &Location::identifier("Lex")).unwrap_err();
        assert!(err.message.contains("unexpected character '#'"));
        assert_eq!(err.pos.column, 9);
    }
}
