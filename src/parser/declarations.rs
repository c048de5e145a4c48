//! Declaration parsing: typedefs and variables.

use crate::ast::*;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    pub(crate) fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.check(&TokenKind::Type) {
            self.typedef_declaration()
        } else if self.check(&TokenKind::Let) {
            self.let_declaration()
        } else {
            self.statement()
        }
    }

    /// Parse a typedef.
    /// Syntax:
    ///   type Port: int
    ///   type User: object { name: string  email: string? }
    pub(crate) fn typedef_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Type)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_typedef_type()?;
        let span = start_span.merge(&self.previous_span());

        Ok(Stmt::new(StmtKind::Typedef(Typedef { name, ty }), span))
    }

    /// Parse a variable declaration.
    /// Syntax:
    ///   let name: string
    ///   let name: string = "value"
    ///   let user: User = new { name = "a" }
    pub(crate) fn let_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Let)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;

        let value = if self.match_token(&TokenKind::Equal) {
            Some(self.value(true)?)
        } else {
            None
        };
        let span = start_span.merge(&self.previous_span());

        Ok(Stmt::new(StmtKind::Assign(Assign { name, ty, value }), span))
    }
}
