//! The data stack shared by every instruction.

use crate::error::RuntimeError;

use super::value::{Object, ObjectDef, ObjectField, Type, Value};

/// A method call target captured by member access right before a call.
#[derive(Debug, Clone)]
pub struct FunctionLookup {
    pub name: String,
    pub receiver: Value,
}

/// Everything that can sit on the data stack.
#[derive(Debug, Clone)]
pub enum Cell {
    Name(String),
    Type(Type),
    Value(Value),
    /// An object under construction. Always sits directly on top of its schema Type.
    Object(Object),
    Field(ObjectField),
    ObjectDef(ObjectDef),
    Lookup(FunctionLookup),
}

impl Cell {
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Name(_) => "name",
            Cell::Type(_) => "type",
            Cell::Value(_) => "value",
            Cell::Object(_) => "object",
            Cell::Field(_) => "field",
            Cell::ObjectDef(_) => "object definition",
            Cell::Lookup(_) => "function lookup",
        }
    }
}

/// Operand stack. Every pop checks the kind of the cell it takes, so a
/// mismatch between compiler and VM surfaces as an internal error.
#[derive(Debug)]
pub struct DataStack {
    cells: Vec<Cell>,
    limit: usize,
}

impl DataStack {
    pub fn new(limit: usize) -> Self {
        Self {
            cells: Vec::with_capacity(limit.min(64)),
            limit,
        }
    }

    pub fn push(&mut self, cell: Cell) -> Result<(), RuntimeError> {
        if self.cells.len() >= self.limit {
            return Err(RuntimeError::StackOverflow(
                format!("data stack exceeded {} cells", self.limit),
                Default::default(),
            ));
        }
        self.cells.push(cell);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Cell, RuntimeError> {
        self.cells
            .pop()
            .ok_or_else(|| RuntimeError::internal("data stack is empty"))
    }

    /// The cell `distance` slots below the top.
    pub fn peek(&self, distance: usize) -> Result<&Cell, RuntimeError> {
        self.cells
            .len()
            .checked_sub(distance + 1)
            .and_then(|index| self.cells.get(index))
            .ok_or_else(|| RuntimeError::internal(format!("no cell at depth {}", distance)))
    }

    pub fn pop_name(&mut self) -> Result<String, RuntimeError> {
        match self.pop()? {
            Cell::Name(name) => Ok(name),
            other => Err(unexpected("name", &other)),
        }
    }

    pub fn pop_type(&mut self) -> Result<Type, RuntimeError> {
        match self.pop()? {
            Cell::Type(ty) => Ok(ty),
            other => Err(unexpected("type", &other)),
        }
    }

    pub fn pop_object(&mut self) -> Result<Object, RuntimeError> {
        match self.pop()? {
            Cell::Object(object) => Ok(object),
            other => Err(unexpected("object", &other)),
        }
    }

    pub fn pop_field(&mut self) -> Result<ObjectField, RuntimeError> {
        match self.pop()? {
            Cell::Field(field) => Ok(field),
            other => Err(unexpected("field", &other)),
        }
    }

    /// Pop something usable as a value: a plain value, or a finished object
    /// together with the schema Type underneath it.
    pub fn pop_value(&mut self) -> Result<Value, RuntimeError> {
        match self.pop()? {
            Cell::Value(value) => Ok(value),
            Cell::Object(object) => {
                let ty = self.pop_type()?;
                Ok(Value::object(ty, object))
            }
            other => Err(unexpected("value", &other)),
        }
    }

    pub fn peek_type(&self, distance: usize) -> Result<&Type, RuntimeError> {
        match self.peek(distance)? {
            Cell::Type(ty) => Ok(ty),
            other => Err(unexpected("type", other)),
        }
    }

    pub fn peek_object(&self, distance: usize) -> Result<&Object, RuntimeError> {
        match self.peek(distance)? {
            Cell::Object(object) => Ok(object),
            other => Err(unexpected("object", other)),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

fn unexpected(expected: &str, found: &Cell) -> RuntimeError {
    RuntimeError::internal(format!(
        "expected {} on data stack, found {}",
        expected,
        found.kind()
    ))
}
