use std::mem;

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Program, SourceStatement, Statement, Token},
    lexer::{LexError, Lexer, Position},
};

/// Errors raised while parsing a statement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found:?} at {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: Token,
        position: Position,
    },

    #[error("cannot assign to or delete this expression; targets must be paths under src or dst")]
    InvalidTarget,
}

/// A statement that failed to compile.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("statement {index} `{statement}`: {source}")]
pub struct CompileError {
    /// Zero-based position of the statement in the sequence
    pub index: usize,
    pub statement: String,
    #[source]
    pub source: ParseError,
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected<T>(&self, expected: &'static str) -> Result<T, ParseError> {
        Err(ParseError::UnexpectedToken {
            expected,
            found: self.current_token.clone(),
            position: self.lexer.position(),
        })
    }

    fn expect(&mut self, expected: Token, description: &'static str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return self.unexpected(description);
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect_identifier(&mut self, description: &'static str) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            other => {
                self.current_token = other;
                self.unexpected(description)
            }
        }
    }

    /// Parse primary expressions (atoms): literals, names, calls, groups and
    /// collection literals
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Float(n))
            }
            Token::Integer(n) => {
                self.advance()?;
                Ok(Expr::Integer(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Boolean(b))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Null)
            }

            // Names and builtin calls
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call {
                        function: name,
                        args,
                    })
                } else {
                    Ok(Expr::Name(name))
                }
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }

            Token::LBrace => {
                self.advance()?;
                self.parse_object_literal()
            }
            Token::LBracket => {
                self.advance()?;
                self.parse_array_literal()
            }

            token => {
                self.current_token = token;
                self.unexpected("an expression")
            }
        }
    }

    /// Comma-separated arguments up to the closing parenthesis; the opening one
    /// is already consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];

        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);

            if !self.check(&Token::RParen) {
                self.expect(Token::Comma, "',' or ')'")?;
            }
        }

        self.expect(Token::RParen, "')'")?;
        Ok(args)
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        while !self.check(&Token::RBrace) {
            let key = match mem::replace(&mut self.current_token, Token::Eof) {
                Token::String(s) => s,
                other => {
                    self.current_token = other;
                    return self.unexpected("a string key");
                }
            };

            self.advance()?;

            self.expect(Token::Colon, "':'")?;

            let value = self.parse_expression()?;
            pairs.push((key, value));

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma, "',' or '}'")?;
            }
        }

        self.expect(Token::RBrace, "'}'")?;
        Ok(Expr::Object(pairs))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        while !self.check(&Token::RBracket) {
            elements.push(self.parse_expression()?);

            if !self.check(&Token::RBracket) {
                self.expect(Token::Comma, "',' or ']'")?;
            }
        }

        self.expect(Token::RBracket, "']'")?;
        Ok(Expr::Array(elements))
    }

    /// Parse access expressions: `.name`, `.method(...)` and `[key, ...]`
    fn parse_access(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::LBracket) {
                self.advance()?; // Consume '['

                let mut keys = vec![self.parse_expression()?];
                while self.check(&Token::Comma) {
                    self.advance()?;
                    if self.check(&Token::RBracket) {
                        break;
                    }
                    keys.push(self.parse_expression()?);
                }

                self.expect(Token::RBracket, "']'")?;

                expr = Expr::Index {
                    object: Box::new(expr),
                    keys,
                };
            } else if self.check(&Token::Dot) {
                self.advance()?; // consume '.'

                let name = self.expect_identifier("an identifier after '.'")?;

                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        method: name,
                        args,
                    };
                } else {
                    expr = Expr::Attr {
                        object: Box::new(expr),
                        name,
                    };
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Minus) {
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(match operand {
                Expr::Integer(n) => Expr::Integer(-n),
                Expr::Float(n) => Expr::Float(-n),
                other => Expr::Negate(Box::new(other)),
            });
        }
        self.parse_access()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::DoubleSlash => BinOp::FloorDivide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        let op = match &self.current_token {
            Token::EqEq => BinOp::Equal,
            Token::NotEq => BinOp::NotEqual,
            Token::Lt => BinOp::LessThan,
            Token::Gt => BinOp::GreaterThan,
            Token::LtEq => BinOp::LessEqual,
            Token::GtEq => BinOp::GreaterEqual,
            Token::In => BinOp::In,
            Token::Not => {
                // `not` in operator position can only start `not in`
                self.advance()?;
                if !self.check(&Token::In) {
                    return self.unexpected("'in' after 'not'");
                }
                BinOp::NotIn
            }
            _ => return Ok(left),
        };

        self.advance()?;
        let right = self.parse_additive()?;

        Ok(Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Not) {
            self.advance()?;
            let operand = self.parse_not()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_not()?;

            left = Expr::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;

            left = Expr::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// Parse a standalone expression that must span the whole input
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof, "end of expression")?;
        Ok(expr)
    }

    /// Parse one complete statement
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match &self.current_token {
            Token::Eof => Statement::Pass,
            Token::Del => {
                self.advance()?;
                let target = self.parse_access()?;
                if !target.is_place() {
                    return Err(ParseError::InvalidTarget);
                }
                Statement::Delete(target)
            }
            _ => {
                let expr = self.parse_expression()?;
                let op = match &self.current_token {
                    Token::Assign => Some(None),
                    Token::PlusAssign => Some(Some(BinOp::Add)),
                    Token::MinusAssign => Some(Some(BinOp::Subtract)),
                    Token::StarAssign => Some(Some(BinOp::Multiply)),
                    Token::SlashAssign => Some(Some(BinOp::Divide)),
                    _ => None,
                };

                match op {
                    Some(op) => {
                        if !expr.is_place() {
                            return Err(ParseError::InvalidTarget);
                        }
                        self.advance()?;
                        let value = self.parse_expression()?;
                        Statement::Assign {
                            target: expr,
                            op,
                            value,
                        }
                    }
                    None => Statement::Expr(expr),
                }
            }
        };

        self.expect(Token::Eof, "end of statement")?;
        Ok(statement)
    }
}

/// Parses a single statement from its text.
pub fn parse_statement(text: &str) -> Result<Statement, ParseError> {
    Parser::new(Lexer::new(text))?.parse_statement()
}

impl Program {
    /// Compiles statement texts, in order, into a program.
    ///
    /// Trailing line breaks are dropped from the stored text; blank and
    /// comment-only lines compile to [`Statement::Pass`].
    ///
    /// # Examples
    ///
    /// ```
    /// use json_transformer::ast::Program;
    ///
    /// let program = Program::compile(["dst.a = 1", "dst.a += 1"]).unwrap();
    /// assert_eq!(program.len(), 2);
    ///
    /// let err = Program::compile(["dst.a = 1", "dst.b = "]).unwrap_err();
    /// assert_eq!(err.index, 1);
    /// ```
    pub fn compile<I, S>(texts: I) -> Result<Program, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut statements = Vec::new();
        for (index, text) in texts.into_iter().enumerate() {
            let text = text.as_ref().trim_end_matches(['\n', '\r']).to_string();
            let statement = parse_statement(&text).map_err(|source| CompileError {
                index,
                statement: text.clone(),
                source,
            })?;
            statements.push(SourceStatement { text, statement });
        }
        Ok(Program { statements })
    }
}
