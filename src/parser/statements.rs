//! Statement parsing: sections, blocks and call statements.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        let is_section = matches!(self.peek().kind, TokenKind::Identifier(_))
            && self.peek_nth(1).kind == TokenKind::LeftBrace;

        if is_section {
            self.section_statement()
        } else {
            self.call_statement()
        }
    }

    /// Parse a section: `name { statements }`.
    fn section_statement(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        let name = self.expect_identifier()?;
        let block = self.block()?;
        let span = start_span.merge(&self.previous_span());

        Ok(Stmt::new(StmtKind::Section(Section { name, block }), span))
    }

    /// Parse `{ statements }`.
    pub(crate) fn block(&mut self) -> ParseResult<Block> {
        let start_span = self.current_span();
        self.expect(&TokenKind::LeftBrace)?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(ParserError::unexpected_eof(self.current_span()));
            }
            statements.push(self.declaration()?);
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(Block::new(statements, start_span.merge(&self.previous_span())))
    }

    /// Parse a call evaluated for its effect: `print(a)` or `user.greet("hi")`.
    fn call_statement(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        if !matches!(self.peek().kind, TokenKind::Identifier(_)) {
            if self.is_at_end() {
                return Err(ParserError::unexpected_eof(self.current_span()));
            }
            return Err(ParserError::unexpected_token(
                "statement",
                format!("{}", self.peek().kind),
                self.current_span(),
            ));
        }

        let callee = self.path()?;
        if !self.check(&TokenKind::LeftParen) {
            return Err(ParserError::unexpected_token(
                "'(' or '{'",
                format!("{}", self.peek().kind),
                self.current_span(),
            ));
        }
        let call = self.finish_call(callee)?;
        let span = start_span.merge(&self.previous_span());

        Ok(Stmt::new(StmtKind::Expression(call), span))
    }
}
