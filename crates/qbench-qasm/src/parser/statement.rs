//! Statement parsing for QASM 2.0.

use super::Parser;
use crate::ast::{Argument, GateCall, GateDef, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::QReg => {
                self.advance();
                let (name, size) = self.parse_register_decl()?;
                Ok(Statement::QReg { name, size })
            }
            Token::CReg => {
                self.advance();
                let (name, size) = self.parse_register_decl()?;
                Ok(Statement::CReg { name, size })
            }
            Token::Gate => self.parse_gate_def(),
            Token::Opaque => self.parse_opaque(),
            Token::If => self.parse_if(),
            Token::Measure => self.parse_measure(),
            Token::Reset => {
                self.advance();
                let arg = self.parse_argument()?;
                self.expect(Token::Semicolon)?;
                Ok(Statement::Reset(arg))
            }
            Token::Barrier => self.parse_barrier(),
            Token::Identifier(_) => Ok(Statement::Gate(self.parse_gate_call()?)),
            other => Err(self.unexpected("statement", &other)),
        }
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => {
                self.pos -= 1;
                return Err(self.unexpected("string literal", &other));
            }
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse `name[size];` after `qreg` or `creg`.
    fn parse_register_decl(&mut self) -> ParseResult<(String, u32)> {
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_u32()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    /// Parse gate definition.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let p = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_identifier_list()?;

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            match self.peek() {
                // Barriers inside gate bodies carry no semantics for execution.
                Some(Token::Barrier) => {
                    self.parse_barrier()?;
                }
                Some(Token::Identifier(_)) => body.push(self.parse_gate_call()?),
                Some(other) => {
                    let other = other.clone();
                    return Err(self.unexpected("gate call", &other));
                }
                None => return Err(ParseError::UnexpectedEof("gate body".into())),
            }
        }
        self.expect(Token::RBrace)?;

        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    /// Parse an opaque declaration; the body is unknown so it can never run.
    fn parse_opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let name = self.parse_identifier()?;
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                self.parse_identifier_list()?;
            }
            self.expect(Token::RParen)?;
        }
        self.parse_identifier_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Opaque { name })
    }

    /// Parse `if (creg == value) op;`.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let register = self.parse_identifier()?;
        self.expect(Token::EqEq)?;
        let value = self.parse_int_literal()?;
        self.expect(Token::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::If {
            register,
            value,
            body,
        })
    }

    /// Parse `measure q -> c;`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;
        let qubit = self.parse_argument()?;
        self.expect(Token::Arrow)?;
        let bit = self.parse_argument()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Measure { qubit, bit })
    }

    /// Parse barrier statement.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let args = self.parse_argument_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier(args))
    }

    /// Parse gate call.
    fn parse_gate_call(&mut self) -> ParseResult<GateCall> {
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let args = self.parse_argument_list()?;
        self.expect(Token::Semicolon)?;

        Ok(GateCall { name, params, args })
    }

    /// Parse a comma-separated argument list.
    fn parse_argument_list(&mut self) -> ParseResult<Vec<Argument>> {
        let mut args = vec![self.parse_argument()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_argument()?);
        }
        Ok(args)
    }

    /// Parse `name` or `name[index]`.
    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let register = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Ok(Argument::indexed(register, index))
        } else {
            Ok(Argument::register(register))
        }
    }
}
