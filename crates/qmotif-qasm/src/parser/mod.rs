//! Recursive-descent parser for the supported `OpenQASM` subset.

mod lowering;

pub use lowering::Parsed;

use crate::ast::{BodyCall, Operand, Program, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a QASM source string into a circuit plus its user-defined gate rules.
pub fn parse(source: &str) -> ParseResult<Parsed> {
    let program = parse_program(source)?;
    lowering::lower(&program)
}

/// Parse a QASM source string into an AST Program.
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let tokens = tokenize(source).map_err(|e| ParseError::LexerError {
        line: e.line,
        slice: e.slice,
    })?;
    Parser { tokens, pos: 0 }.program()
}

/// Parser state.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

#[allow(clippy::cast_possible_truncation)]
impl Parser {
    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    /// Line of the current token (or the last one at EOF).
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    #[allow(clippy::needless_pass_by_value)]
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str, found: Option<Token>) -> ParseError {
        match found {
            Some(found) => ParseError::UnexpectedToken {
                line: self.line(),
                expected: expected.into(),
                found: found.to_string(),
            },
            None => ParseError::UnexpectedEof(expected.into()),
        }
    }

    fn identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            other => Err(self.unexpected("identifier", other)),
        }
    }

    fn int_literal(&mut self) -> ParseResult<u64> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            other => Err(self.unexpected("integer", other)),
        }
    }

    /// Skip a balanced `( ... )` group. The opening paren must be current.
    fn skip_parenthesized(&mut self) -> ParseResult<()> {
        self.expect(Token::LParen)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => depth -= 1,
                Some(_) => {}
                None => return Err(ParseError::UnexpectedEof("closing ')'".into())),
            }
        }
        Ok(())
    }

    fn program(&mut self) -> ParseResult<Program> {
        let version = if self.consume(&Token::OpenQasm) {
            let version = match self.advance() {
                Some(Token::FloatLiteral(v)) => format!("{v:.1}"),
                Some(Token::IntLiteral(v)) => format!("{v}.0"),
                Some(other) => return Err(ParseError::InvalidVersion(other.to_string())),
                None => return Err(ParseError::UnexpectedEof("version number".into())),
            };
            self.expect(Token::Semicolon)?;
            Some(version)
        } else {
            None
        };

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        let line = self.line();
        match self.peek() {
            Some(Token::Include) => {
                self.pos += 1;
                let path = match self.advance() {
                    Some(Token::StringLiteral(s)) => s,
                    other => return Err(self.unexpected("include path", other)),
                };
                self.expect(Token::Semicolon)?;
                Ok(Statement::Include(path))
            }
            Some(Token::Qreg) => {
                self.pos += 1;
                let (name, size) = self.qasm2_register()?;
                Ok(Statement::QubitDecl { name, size })
            }
            Some(Token::Creg) => {
                self.pos += 1;
                let (name, size) = self.qasm2_register()?;
                Ok(Statement::BitDecl { name, size })
            }
            Some(Token::Qubit) => {
                self.pos += 1;
                let (name, size) = self.qasm3_declaration()?;
                Ok(Statement::QubitDecl { name, size })
            }
            Some(Token::Bit) => {
                self.pos += 1;
                let (name, size) = self.qasm3_declaration()?;
                Ok(Statement::BitDecl { name, size })
            }
            Some(Token::Measure) => {
                self.pos += 1;
                let operands = self.operand_list()?;
                if self.consume(&Token::Arrow) {
                    self.operand_list()?;
                }
                self.expect(Token::Semicolon)?;
                Ok(Statement::Measure { operands })
            }
            Some(Token::Reset) => {
                self.pos += 1;
                let operands = self.operand_list()?;
                self.expect(Token::Semicolon)?;
                Ok(Statement::Reset { operands })
            }
            Some(Token::Barrier) => {
                self.pos += 1;
                let operands = if self.check(&Token::Semicolon) {
                    Vec::new()
                } else {
                    self.operand_list()?
                };
                self.expect(Token::Semicolon)?;
                Ok(Statement::Barrier { operands })
            }
            Some(Token::If) => {
                self.pos += 1;
                self.skip_parenthesized()?;
                let inner = self.statement()?;
                Ok(Statement::Conditional(Box::new(inner)))
            }
            Some(Token::Gate) => {
                self.pos += 1;
                self.gate_definition()
            }
            Some(Token::Opaque) => {
                self.pos += 1;
                let name = self.identifier()?.to_lowercase();
                if self.check(&Token::LParen) {
                    self.skip_parenthesized()?;
                }
                let arity = self.identifier_list()?.len();
                self.expect(Token::Semicolon)?;
                Ok(Statement::Opaque { name, arity })
            }
            Some(Token::Identifier(_)) if self.is_measure_assignment() => {
                self.measure_assignment()
            }
            Some(Token::Identifier(_) | Token::GateU | Token::GateCX) => self.gate_call(),
            Some(other) => Err(ParseError::Unsupported {
                line,
                construct: format!("statement starting with '{other}'"),
            }),
            None => Err(ParseError::UnexpectedEof("statement".into())),
        }
    }

    /// `name[size];` after `qreg`/`creg`.
    fn qasm2_register(&mut self) -> ParseResult<(String, u32)> {
        let name = self.identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.int_literal()? as u32;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    /// `[size] name;` or ` name;` after `qubit`/`bit`.
    fn qasm3_declaration(&mut self) -> ParseResult<(String, u32)> {
        let size = if self.consume(&Token::LBracket) {
            let size = self.int_literal()? as u32;
            self.expect(Token::RBracket)?;
            size
        } else {
            1
        };
        let name = self.identifier()?;
        if self.consume(&Token::Eq) {
            // Initializers carry no wire information.
            while !self.check(&Token::Semicolon) {
                if self.advance().is_none() {
                    return Err(ParseError::UnexpectedEof("';'".into()));
                }
            }
        }
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    /// `c = measure q;` or `c[0] = measure q[0];`
    fn is_measure_assignment(&self) -> bool {
        match self.peek_at(1) {
            Some(Token::Eq) => matches!(self.peek_at(2), Some(Token::Measure)),
            Some(Token::LBracket) => {
                matches!(self.peek_at(4), Some(Token::Eq))
                    && matches!(self.peek_at(5), Some(Token::Measure))
            }
            _ => false,
        }
    }

    fn measure_assignment(&mut self) -> ParseResult<Statement> {
        self.operand()?;
        self.expect(Token::Eq)?;
        self.expect(Token::Measure)?;
        let operands = self.operand_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Measure { operands })
    }

    fn gate_call(&mut self) -> ParseResult<Statement> {
        let name = match self.advance() {
            Some(Token::Identifier(s)) => s.to_lowercase(),
            Some(Token::GateU) => "u".to_string(),
            Some(Token::GateCX) => "cx".to_string(),
            other => return Err(self.unexpected("gate name", other)),
        };
        if self.check(&Token::At) {
            return Err(ParseError::Unsupported {
                line: self.line(),
                construct: format!("gate modifier on '{name}'"),
            });
        }
        if self.check(&Token::LParen) {
            self.skip_parenthesized()?;
        }
        let operands = self.operand_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::GateCall { name, operands })
    }

    fn gate_definition(&mut self) -> ParseResult<Statement> {
        let name = match self.advance() {
            Some(Token::Identifier(s)) => s.to_lowercase(),
            Some(Token::GateU) => "u".to_string(),
            Some(Token::GateCX) => "cx".to_string(),
            other => return Err(self.unexpected("gate name", other)),
        };
        if self.check(&Token::LParen) {
            self.skip_parenthesized()?;
        }
        let qubits = self.identifier_list()?;
        self.expect(Token::LBrace)?;

        let mut body = Vec::new();
        while !self.consume(&Token::RBrace) {
            body.push(self.body_call()?);
        }

        Ok(Statement::GateDef { name, qubits, body })
    }

    fn body_call(&mut self) -> ParseResult<BodyCall> {
        let name = match self.advance() {
            Some(Token::Identifier(s)) => s.to_lowercase(),
            Some(Token::GateU) => "u".to_string(),
            Some(Token::GateCX) => "cx".to_string(),
            Some(Token::Barrier) => "barrier".to_string(),
            Some(Token::Reset) => "reset".to_string(),
            Some(Token::Measure) => "measure".to_string(),
            other => return Err(self.unexpected("gate body statement", other)),
        };
        if self.check(&Token::LParen) {
            self.skip_parenthesized()?;
        }
        let args = self.identifier_list()?;
        self.expect(Token::Semicolon)?;
        Ok(BodyCall { name, args })
    }

    fn identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.identifier()?);
        }
        Ok(ids)
    }

    fn operand(&mut self) -> ParseResult<Operand> {
        let register = self.identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let index = self.int_literal()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(Operand { register, index })
    }

    fn operand_list(&mut self) -> ParseResult<Vec<Operand>> {
        let mut operands = vec![self.operand()?];
        while self.consume(&Token::Comma) {
            operands.push(self.operand()?);
        }
        Ok(operands)
    }
}
