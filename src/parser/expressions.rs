//! Value expression parsing.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    /// Parse an expression in value position.
    ///
    /// `allow_initialize` is true where a declared type exists to give the
    /// initializer its schema: `let` initializers and initializer fields.
    pub(crate) fn value(&mut self, allow_initialize: bool) -> ParseResult<Expr> {
        let span = self.current_span();

        let expr = match self.peek().kind.clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                Expr::new(ExprKind::Literal(Literal::String(s)), span)
            }
            TokenKind::IntLiteral(n) => {
                self.advance();
                Expr::new(ExprKind::Literal(Literal::Integer(n)), span)
            }
            TokenKind::FloatLiteral(n) => {
                self.advance();
                Expr::new(ExprKind::Literal(Literal::Float(n)), span)
            }
            TokenKind::BoolLiteral(b) => {
                self.advance();
                Expr::new(ExprKind::Literal(Literal::Boolean(b)), span)
            }
            TokenKind::New if allow_initialize => self.initializer()?,
            TokenKind::New => {
                return Err(ParserError::general(
                    "An initializer needs a declared type; use it in a 'let' or a field",
                    span,
                ));
            }
            TokenKind::Identifier(_) => self.path()?,
            TokenKind::Eof => return Err(ParserError::unexpected_eof(span)),
            other => {
                return Err(ParserError::unexpected_token(
                    "value",
                    format!("{}", other),
                    span,
                ));
            }
        };

        if self.check(&TokenKind::LeftParen) {
            return Err(ParserError::general(
                "Calls have no result and cannot be used as values",
                self.current_span(),
            ));
        }

        Ok(expr)
    }

    /// Parse `ident ( "." ident )*`.
    pub(crate) fn path(&mut self) -> ParseResult<Expr> {
        let start_span = self.current_span();
        let name = self.expect_identifier()?;
        let mut expr = Expr::new(ExprKind::Ident(name), start_span);

        while self.match_token(&TokenKind::Dot) {
            let name = self.expect_identifier()?;
            let span = start_span.merge(&self.previous_span());
            expr = Expr::new(
                ExprKind::Member {
                    object: Box::new(expr),
                    name,
                },
                span,
            );
        }

        Ok(expr)
    }

    /// Parse the argument list of a call whose callee has been parsed.
    pub(crate) fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        self.expect(&TokenKind::LeftParen)?;

        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            arguments.push(self.value(false)?);
            while self.match_token(&TokenKind::Comma) {
                arguments.push(self.value(false)?);
            }
        }
        self.expect(&TokenKind::RightParen)?;

        let span = callee.span.merge(&self.previous_span());
        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                arguments,
            },
            span,
        ))
    }

    /// Parse `new { name = value, ... }`. Commas between fields are optional.
    fn initializer(&mut self) -> ParseResult<Expr> {
        let start_span = self.current_span();
        self.expect(&TokenKind::New)?;
        self.expect(&TokenKind::LeftBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let field_span = self.current_span();
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Equal)?;
            let value = self.value(true)?;
            fields.push(InitializeField {
                name,
                value,
                span: field_span.merge(&self.previous_span()),
            });
            self.match_token(&TokenKind::Comma);
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(Expr::new(
            ExprKind::Initialize(fields),
            start_span.merge(&self.previous_span()),
        ))
    }
}
