//! Bytecode opcodes for the cfglang VM.

use crate::ast::Literal;

/// Discriminant carried by [`Op::ResolveType`].
///
/// Builtins resolve without a scope lookup; `User` goes through the frame chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    String,
    Integer,
    Boolean,
    Float,
    User,
}

impl TypeRef {
    /// Map a type name from source to its discriminant.
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => TypeRef::String,
            "int" => TypeRef::Integer,
            "bool" => TypeRef::Boolean,
            "float" => TypeRef::Float,
            _ => TypeRef::User,
        }
    }

    /// Source name of a builtin; `None` for user types.
    pub fn builtin_name(self) -> Option<&'static str> {
        match self {
            TypeRef::String => Some("string"),
            TypeRef::Integer => Some("int"),
            TypeRef::Boolean => Some("bool"),
            TypeRef::Float => Some("float"),
            TypeRef::User => None,
        }
    }
}

/// A single bytecode instruction.
///
/// There are no jumps: the program counter only ever moves forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // --- Constants & names ---
    /// Push a raw name (variable, type, field or section name).
    LoadName(String),
    /// Push a literal value.
    LoadConst(Literal),
    /// Pop a name and push the value bound to it in the scope chain.
    LoadValue,

    // --- Types ---
    /// Pop a type name and push the resolved Type.
    ResolveType {
        kind: TypeRef,
        array: bool,
        optional: bool,
    },
    /// Pop a Type and push a named object field.
    MakeField(String),
    /// Pop N fields and push an object definition.
    MakeObjectDef(usize),
    /// Pop a name and a definition, bind the type in the current frame.
    BindType,

    // --- Bindings ---
    /// Pop a name, an optional value and the declared Type; bind in the current frame.
    Store { has_value: bool },

    // --- Initializers ---
    /// Push the object's schema Type, then an empty object.
    NewObject,
    /// Pop value, field name and object; validate against the schema below; push the object.
    SetField,
    /// Check that the object on top covers every required field of its schema.
    FinalizeInitialize,

    // --- Scopes ---
    /// Pop a section name and push a child frame.
    OpenSection,
    /// Pop the current frame.
    CloseSection,

    // --- Access & calls ---
    /// Pop a field name and a value; push the field, or a method lookup before a call.
    LoadMember,
    /// Pop the callee and N arguments, then invoke the host function.
    MakeCall(usize),
}
