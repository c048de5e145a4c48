//! Abstract Syntax Tree for cfglang.

pub mod expr;
pub mod stmt;
pub mod types;

pub use expr::{Expr, ExprKind, InitializeField, Literal};
pub use stmt::{Assign, Block, Section, Source, Stmt, StmtKind, Typedef};
pub use types::{Field, TypeAnnotation, OBJECT_TYPE};
