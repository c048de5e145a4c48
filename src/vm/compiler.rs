//! AST-to-bytecode compiler.
//!
//! Single pass: walks the AST once, depth-first, emitting into a `Chunk`.
//! Names and types are not checked here; the VM resolves them at run time.

use crate::ast::*;
use crate::error::CompileError;
use crate::span::Span;

use super::chunk::Chunk;
use super::opcode::{Op, TypeRef};

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Where an initializer is allowed to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// `let` initializer or initializer field: a declared Type is on the stack.
    Typed,
    /// Call argument or member receiver.
    Untyped,
}

/// The compiler: transforms AST into bytecode.
pub struct Compiler {
    chunk: Chunk,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            chunk: Chunk::new(),
        }
    }

    /// Compile a full source file.
    pub fn compile(source: &Source) -> CompileResult<Chunk> {
        let mut compiler = Compiler::new();
        compiler.compile_block(&source.block)?;
        tracing::debug!(
            target: "cfglang::compiler",
            instructions = compiler.chunk.len(),
            "compiled source"
        );
        Ok(compiler.chunk)
    }

    fn emit(&mut self, op: Op, span: Span) {
        tracing::trace!(target: "cfglang::compiler", op = ?op, span = %span, "emit");
        self.chunk.emit(op, span);
    }

    fn compile_block(&mut self, block: &Block) -> CompileResult<()> {
        for stmt in &block.statements {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Section(section) => {
                self.emit(Op::LoadName(section.name.clone()), stmt.span);
                self.emit(Op::OpenSection, stmt.span);
                self.compile_block(&section.block)?;
                self.emit(Op::CloseSection, section.block.span);
            }
            StmtKind::Typedef(typedef) => {
                self.compile_typedef_type(&typedef.ty)?;
                self.emit(Op::LoadName(typedef.name.clone()), stmt.span);
                self.emit(Op::BindType, stmt.span);
            }
            StmtKind::Assign(assign) => {
                // The declared Type stays on the stack under any initializer.
                self.compile_type(&assign.ty)?;
                if let Some(value) = &assign.value {
                    self.compile_value(value, Position::Typed)?;
                }
                self.emit(Op::LoadName(assign.name.clone()), stmt.span);
                self.emit(
                    Op::Store {
                        has_value: assign.value.is_some(),
                    },
                    stmt.span,
                );
            }
            StmtKind::Expression(expr) => match &expr.kind {
                ExprKind::Call { callee, arguments } => {
                    self.compile_call(callee, arguments, expr.span)?;
                }
                _ => {
                    return Err(CompileError::new(
                        "Only calls can be used as statements",
                        expr.span,
                    ));
                }
            },
        }
        Ok(())
    }

    // --- Types ---

    /// A type in a `let` or field position.
    fn compile_type(&mut self, ty: &TypeAnnotation) -> CompileResult<()> {
        if ty.is_object() {
            return Err(CompileError::new(
                "'object' can only be used as the type of a typedef",
                ty.span,
            ));
        }
        self.emit(Op::LoadName(ty.name.clone()), ty.span);
        self.emit(
            Op::ResolveType {
                kind: TypeRef::from_name(&ty.name),
                array: ty.array,
                optional: ty.optional,
            },
            ty.span,
        );
        Ok(())
    }

    /// The type of a typedef: either an `object` shape or any other type.
    fn compile_typedef_type(&mut self, ty: &TypeAnnotation) -> CompileResult<()> {
        if !ty.is_object() {
            return self.compile_type(ty);
        }
        if ty.array {
            return Err(CompileError::new(
                "'object' can only be used as the type of a typedef",
                ty.span,
            ));
        }
        if ty.optional {
            return Err(CompileError::new("'object' types cannot be optional", ty.span));
        }

        for field in &ty.fields {
            self.compile_type(&field.ty)?;
            self.emit(Op::MakeField(field.name.clone()), field.span);
        }
        self.emit(Op::MakeObjectDef(ty.fields.len()), ty.span);
        Ok(())
    }

    // --- Expressions ---

    /// An expression that must leave exactly one value on the stack.
    fn compile_value(&mut self, expr: &Expr, position: Position) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Ident(name) => {
                self.emit(Op::LoadName(name.clone()), expr.span);
                self.emit(Op::LoadValue, expr.span);
            }
            ExprKind::Literal(literal) => {
                self.emit(Op::LoadConst(literal.clone()), expr.span);
            }
            ExprKind::Member { object, name } => {
                self.compile_value(object, Position::Untyped)?;
                self.emit(Op::LoadName(name.clone()), expr.span);
                self.emit(Op::LoadMember, expr.span);
            }
            ExprKind::Initialize(fields) => {
                if position != Position::Typed {
                    return Err(CompileError::new(
                        "An initializer needs a declared type",
                        expr.span,
                    ));
                }
                self.compile_initialize(fields, expr.span)?;
            }
            ExprKind::Call { .. } => {
                return Err(CompileError::new(
                    "Calls have no result and cannot be used as values",
                    expr.span,
                ));
            }
        }
        Ok(())
    }

    fn compile_initialize(&mut self, fields: &[InitializeField], span: Span) -> CompileResult<()> {
        self.emit(Op::NewObject, span);
        for field in fields {
            self.emit(Op::LoadName(field.name.clone()), field.span);
            self.compile_value(&field.value, Position::Typed)?;
            self.emit(Op::SetField, field.span);
        }
        self.emit(Op::FinalizeInitialize, span);
        Ok(())
    }

    fn compile_call(&mut self, callee: &Expr, arguments: &[Expr], span: Span) -> CompileResult<()> {
        for argument in arguments {
            self.compile_value(argument, Position::Untyped)?;
        }
        self.compile_value(callee, Position::Untyped)?;
        self.emit(Op::MakeCall(arguments.len()), span);
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
