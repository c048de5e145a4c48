//! Type annotation parsing.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    /// Parse a type in a `let` or field position, where `object` is illegal.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeAnnotation> {
        let ty = self.type_annotation()?;
        if ty.is_object() {
            return Err(ParserError::ObjectOutsideTypedef(ty.span));
        }
        Ok(ty)
    }

    /// Parse the type of a typedef, the only place an `object` shape may appear.
    pub(crate) fn parse_typedef_type(&mut self) -> ParseResult<TypeAnnotation> {
        let ty = self.type_annotation()?;
        if ty.is_object() && ty.array {
            return Err(ParserError::ObjectOutsideTypedef(ty.span));
        }
        Ok(ty)
    }

    fn type_annotation(&mut self) -> ParseResult<TypeAnnotation> {
        let start_span = self.current_span();

        // `[]T` and `[T]` both spell an array of `T`
        let mut array = false;
        let mut bracketed = false;
        if self.match_token(&TokenKind::LeftBracket) {
            array = true;
            bracketed = !self.match_token(&TokenKind::RightBracket);
        }

        let name = self.expect_identifier()?;
        if bracketed {
            self.expect(&TokenKind::RightBracket)?;
        }

        if name == OBJECT_TYPE {
            let fields = self.object_fields()?;
            let span = start_span.merge(&self.previous_span());
            if self.check(&TokenKind::Question) {
                return Err(ParserError::OptionalObject(self.current_span()));
            }
            let mut ty = TypeAnnotation::object(fields, span);
            ty.array = array;
            return Ok(ty);
        }

        let optional = self.match_token(&TokenKind::Question);
        let span = start_span.merge(&self.previous_span());

        Ok(TypeAnnotation {
            name,
            array,
            optional,
            fields: Vec::new(),
            span,
        })
    }

    /// Parse `{ name: type ... }` after the `object` keyword.
    fn object_fields(&mut self) -> ParseResult<Vec<Field>> {
        self.expect(&TokenKind::LeftBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let field_span = self.current_span();
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push(Field {
                name,
                ty,
                span: field_span.merge(&self.previous_span()),
            });
            self.match_token(&TokenKind::Comma);
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(fields)
    }
}
