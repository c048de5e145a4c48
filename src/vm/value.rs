//! Runtime types and values manipulated by the VM.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::ast::Literal;

use super::opcode::TypeRef;

/// Name given to array types.
pub const ARRAY_TYPE: &str = "array";
/// Name given to function types.
pub const FUNCTION_TYPE: &str = "function";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    String,
    Integer,
    Boolean,
    Float,
    Array,
    Object,
    Function,
}

/// A resolved runtime type.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub name: String,
    pub optional: bool,
    pub object_def: Option<Rc<ObjectDef>>,
    /// For arrays, `generic_params[0]` is the element type.
    pub generic_params: Vec<Type>,
}

impl Type {
    fn builtin(id: TypeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            optional: false,
            object_def: None,
            generic_params: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::builtin(TypeId::String, "string")
    }

    pub fn integer() -> Self {
        Self::builtin(TypeId::Integer, "int")
    }

    pub fn boolean() -> Self {
        Self::builtin(TypeId::Boolean, "bool")
    }

    pub fn float() -> Self {
        Self::builtin(TypeId::Float, "float")
    }

    pub fn function() -> Self {
        Self::builtin(TypeId::Function, FUNCTION_TYPE)
    }

    /// The primitive type for a builtin discriminant, or `None` for user types.
    pub fn primitive(kind: TypeRef) -> Option<Self> {
        match kind {
            TypeRef::String => Some(Self::string()),
            TypeRef::Integer => Some(Self::integer()),
            TypeRef::Boolean => Some(Self::boolean()),
            TypeRef::Float => Some(Self::float()),
            TypeRef::User => None,
        }
    }

    pub fn array_of(element: Type) -> Self {
        Self {
            id: TypeId::Array,
            name: ARRAY_TYPE.to_string(),
            optional: false,
            object_def: None,
            generic_params: vec![element],
        }
    }

    pub fn object(name: impl Into<String>, def: ObjectDef) -> Self {
        Self {
            id: TypeId::Object,
            name: name.into(),
            optional: false,
            object_def: Some(Rc::new(def)),
            generic_params: Vec::new(),
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn is_array(&self) -> bool {
        self.id == TypeId::Array
    }

    pub fn is_object(&self) -> bool {
        self.id == TypeId::Object
    }

    /// Structural equality: `id`, `name` and pairwise `generic_params`.
    ///
    /// `optional` and `object_def` are not compared, so two object types
    /// sharing a name are equal whatever their fields.
    pub fn equals(&self, other: &Type) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.generic_params.len() == other.generic_params.len()
            && self
                .generic_params
                .iter()
                .zip(&other.generic_params)
                .all(|(a, b)| a.equals(b))
    }

    /// Display name used in diagnostics: `[]T`, `T[G1, G2]`, `T?`.
    pub fn full_name(&self) -> String {
        let mut name = match (self.id, self.generic_params.as_slice()) {
            (TypeId::Array, [element]) => format!("[]{}", element.full_name()),
            (_, []) => self.name.clone(),
            (_, params) => {
                let params: Vec<String> = params.iter().map(Type::full_name).collect();
                format!("{}[{}]", self.name, params.join(", "))
            }
        };
        if self.optional {
            name.push('?');
        }
        name
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

#[derive(Debug, Clone)]
pub struct ObjectField {
    pub name: String,
    pub ty: Type,
}

/// The schema of an object type.
#[derive(Debug, Clone, Default)]
pub struct ObjectDef {
    pub fields: Vec<ObjectField>,
}

impl ObjectDef {
    pub fn new(fields: Vec<ObjectField>) -> Self {
        Self { fields }
    }

    pub fn field_by_name(&self, name: &str) -> Option<&ObjectField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Field values of an object, in initializer order.
#[derive(Debug, Clone, Default)]
pub struct Object {
    fields: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// A host function receives the resolved arguments and performs a side effect.
pub type HostFn = Rc<dyn Fn(&[Value])>;

#[derive(Clone)]
pub struct Function {
    pub name: String,
    pub func: HostFn,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) + 'static,
    {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) {
        (self.func)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// The untyped content of a [`Value`]; its meaning comes from the value's Type.
#[derive(Debug, Clone)]
pub enum Payload {
    /// An optional binding without a value.
    Nil,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Object(Object),
    Array(Vec<Value>),
    Function(Function),
}

/// A typed runtime value.
#[derive(Debug, Clone)]
pub struct Value {
    pub ty: Type,
    pub mutable: bool,
    pub payload: Payload,
}

impl Value {
    pub fn new(ty: Type, payload: Payload) -> Self {
        Self {
            ty,
            mutable: false,
            payload,
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Type::string(), Payload::String(s.into()))
    }

    pub fn integer(n: i64) -> Self {
        Self::new(Type::integer(), Payload::Integer(n))
    }

    pub fn float(n: f64) -> Self {
        Self::new(Type::float(), Payload::Float(n))
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(Type::boolean(), Payload::Boolean(b))
    }

    pub fn nil(ty: Type) -> Self {
        Self::new(ty, Payload::Nil)
    }

    pub fn array(ty: Type, items: Vec<Value>) -> Self {
        Self::new(ty, Payload::Array(items))
    }

    pub fn object(ty: Type, object: Object) -> Self {
        Self::new(ty, Payload::Object(object))
    }

    /// Wrap a host closure as a callable value.
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) + 'static,
    {
        Self::new(Type::function(), Payload::Function(Function::new(name, func)))
    }

    pub fn from_literal(literal: &Literal) -> Self {
        match literal {
            Literal::String(s) => Self::string(s.clone()),
            Literal::Integer(n) => Self::integer(*n),
            Literal::Float(n) => Self::float(*n),
            Literal::Boolean(b) => Self::boolean(*b),
        }
    }

    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.payload, Payload::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.payload {
            Payload::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.payload {
            Payload::Float(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match &self.payload {
            Payload::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.payload {
            Payload::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.payload {
            Payload::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Nil => write!(f, "nil"),
            Payload::String(s) => write!(f, "{}", s),
            Payload::Integer(n) => write!(f, "{}", n),
            Payload::Float(n) => write!(f, "{}", n),
            Payload::Boolean(b) => write!(f, "{}", b),
            Payload::Object(object) => {
                write!(f, "{} {{", self.ty.name)?;
                for (i, (name, value)) in object.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {} = {}", name, value)?;
                }
                write!(f, " }}")
            }
            Payload::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Payload::Function(function) => write!(f, "<function {}>", function.name),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.payload {
            Payload::Nil => serializer.serialize_none(),
            Payload::String(s) => serializer.serialize_str(s),
            Payload::Integer(n) => serializer.serialize_i64(*n),
            Payload::Float(n) => serializer.serialize_f64(*n),
            Payload::Boolean(b) => serializer.serialize_bool(*b),
            Payload::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (name, value) in object.iter() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Payload::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Payload::Function(function) => {
                serializer.serialize_str(&format!("<function {}>", function.name))
            }
        }
    }
}
