//! Expression AST nodes.

use std::fmt;

use crate::span::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether the expression leaves exactly one value behind when evaluated.
    /// Calls have no result slot, so they never do.
    pub fn is_value(&self) -> bool {
        !matches!(self.kind, ExprKind::Call { .. })
    }
}

/// All expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Name reference: `port`
    Ident(String),
    /// Literal: `"a"`, `42`, `1.5`, `true`
    Literal(Literal),
    /// Struct-literal initializer: `new { name = "a", age = 3 }`
    Initialize(Vec<InitializeField>),
    /// Host function call: `print(a, b)` or `user.greet("hi")`
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    /// Member access: `user.name`
    Member { object: Box<Expr>, name: String },
}

/// `name = value` inside an initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct InitializeField {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}
