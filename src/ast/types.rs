//! Type annotation AST nodes.

use std::fmt;

use crate::span::Span;

/// Name of the pseudo-type that introduces a structural record shape.
pub const OBJECT_TYPE: &str = "object";

/// A type annotation in the source code: `int`, `[]User`, `string?`,
/// or an `object { .. }` shape (typedefs only).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub array: bool,
    pub optional: bool,
    /// Only populated for the `object` pseudo-type.
    pub fields: Vec<Field>,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            array: false,
            optional: false,
            fields: Vec::new(),
            span,
        }
    }

    pub fn object(fields: Vec<Field>, span: Span) -> Self {
        Self {
            name: OBJECT_TYPE.to_string(),
            array: false,
            optional: false,
            fields,
            span,
        }
    }

    pub fn is_object(&self) -> bool {
        self.name == OBJECT_TYPE
    }
}

/// One field of an `object` shape: `name: type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeAnnotation,
    pub span: Span,
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "[]")?;
        }
        write!(f, "{}", self.name)?;
        if !self.fields.is_empty() {
            write!(f, " {{ ")?;
            for field in &self.fields {
                write!(f, "{}: {} ", field.name, field.ty)?;
            }
            write!(f, "}}")?;
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}
