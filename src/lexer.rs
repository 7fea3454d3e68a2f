use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// Character offset inside a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.column + 1)
    }
}

/// Errors raised while splitting a statement into tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{ch}' at {position}")]
    InvalidEscape { ch: char, position: Position },

    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Current position, just past the last token read.
    pub fn position(&self) -> Position {
        Position {
            column: self.position,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '#' {
                self.position = self.input.len();
            } else if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    let escaped = self
                        .current_char()
                        .ok_or(LexError::UnterminatedString { position: start })?;
                    match escaped {
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        '0' => result.push('\0'),
                        '"' | '\'' | '\\' => result.push(escaped),
                        'u' => {
                            result.push(self.read_unicode_escape()?);
                            continue;
                        }
                        other => {
                            return Err(LexError::InvalidEscape {
                                ch: other,
                                position: self.position(),
                            });
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Reads the four hex digits after `\u`; the lexer sits on the `u`.
    fn read_unicode_escape(&mut self) -> Result<char, LexError> {
        let position = self.position();
        self.advance();
        let digits: String = (0..4).filter_map(|i| self.peek_char(i)).collect();
        let ch = (digits.len() == 4)
            .then(|| u32::from_str_radix(&digits, 16).ok())
            .flatten()
            .and_then(char::from_u32)
            .ok_or(LexError::InvalidEscape { ch: 'u', position })?;
        self.position += 4;
        Ok(ch)
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if matches!(ch, 'e' | 'E') && self.exponent_follows() {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };
        if is_float {
            number.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            number.parse::<i64>().map(Token::Integer).map_err(|_| invalid())
        }
    }

    fn exponent_follows(&self) -> bool {
        match self.peek_char(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => self.peek_char(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// Consumes one character and returns `single`, or two characters and
    /// returns `double` when the next one is `second`.
    fn one_or_two(&mut self, second: char, double: Token, single: Token) -> Token {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('.') => {
                self.advance();
                Token::Dot
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some('%') => {
                self.advance();
                Token::Percent
            }
            Some('+') => self.one_or_two('=', Token::PlusAssign, Token::Plus),
            Some('-') => self.one_or_two('=', Token::MinusAssign, Token::Minus),
            Some('*') => self.one_or_two('=', Token::StarAssign, Token::Star),
            Some('/') => {
                if self.peek_char(1) == Some('/') {
                    self.advance();
                    self.advance();
                    Token::DoubleSlash
                } else {
                    self.one_or_two('=', Token::SlashAssign, Token::Slash)
                }
            }
            Some('=') => self.one_or_two('=', Token::EqEq, Token::Assign),
            Some('>') => self.one_or_two('=', Token::GtEq, Token::Gt),
            Some('<') => self.one_or_two('=', Token::LtEq, Token::Lt),
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '!',
                        position: self.position(),
                    });
                }
            }
            Some('{') => {
                self.advance();
                Token::LBrace
            }
            Some('}') => {
                self.advance();
                Token::RBrace
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some(quote @ ('"' | '\'')) => Token::String(self.read_string(quote)?),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    "del" => Token::Del,
                    "true" | "True" => Token::Boolean(true),
                    "false" | "False" => Token::Boolean(false),
                    "null" | "None" => Token::Null,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    position: self.position(),
                });
            }
        };

        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not in del True false None null");
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Or);
    assert_eq!(lexer.next_token().unwrap(), Token::Not);
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::Del);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
}

#[test]
fn test_assignment() {
    let mut lexer = Lexer::new("dst.a[0] += 1 # bump");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("dst".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Dot);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("a".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(0));
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::PlusAssign);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(1));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
