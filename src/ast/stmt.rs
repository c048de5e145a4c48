//! Statement AST nodes.

use crate::ast::expr::Expr;
use crate::ast::types::TypeAnnotation;
use crate::span::Span;

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `name { ... }`
    Section(Section),
    /// `type Name: type`
    Typedef(Typedef),
    /// `let name: type = value`
    Assign(Assign),
    /// A call evaluated for its effect.
    Expression(Expr),
}

/// A named lexical block.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub ty: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: String,
    pub ty: TypeAnnotation,
    pub value: Option<Expr>,
}

/// An ordered list of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Self { statements, span }
    }
}

/// The root of a parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub block: Block,
}

impl Source {
    pub fn new(block: Block) -> Self {
        Self { block }
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.block.statements
    }
}
