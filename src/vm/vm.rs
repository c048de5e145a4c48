//! The bytecode virtual machine: stack-based execution engine.

use std::rc::Rc;

use crate::config::VmConfig;
use crate::error::RuntimeError;
use crate::span::Span;

use super::chunk::Chunk;
use super::frame::{Bindings, CallStack, FrameKind};
use super::opcode::{Op, TypeRef};
use super::stack::{Cell, DataStack, FunctionLookup};
use super::value::{Object, ObjectDef, ObjectField, Payload, Type, TypeId, Value};

/// The bytecode VM.
///
/// A VM evaluates one chunk once. Host bindings are added to the root frame
/// with [`Vm::set`] before [`Vm::run`]; afterwards the root frame holds the
/// evaluated configuration.
#[derive(Debug)]
pub struct Vm {
    chunk: Rc<Chunk>,
    /// Instruction pointer. Only ever moves forward.
    ip: usize,
    stack: DataStack,
    frames: CallStack,
    config: VmConfig,
    /// The error that aborted the run, returned again by later `run` calls.
    failed: Option<RuntimeError>,
}

impl Vm {
    pub fn new(chunk: Chunk) -> Self {
        Self::with_config(chunk, &VmConfig::default())
    }

    pub fn with_config(chunk: Chunk, config: &VmConfig) -> Self {
        Self {
            chunk: Rc::new(chunk),
            ip: 0,
            stack: DataStack::new(config.max_stack_size),
            frames: CallStack::new(),
            config: config.clone(),
            failed: None,
        }
    }

    /// Bind a value in the root frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.frames.root_mut().set(name, value);
    }

    /// Bind a host function in the root frame.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[Value]) + 'static,
    {
        self.set(name, Value::function(name, func));
    }

    /// A binding of the root frame.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.root().local(name)
    }

    /// A type declared in the root frame.
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.frames.root().local_type(name)
    }

    /// All root bindings, host functions included, in declaration order.
    pub fn globals(&self) -> &Bindings {
        self.frames.root().bindings()
    }

    /// Root bindings as pretty JSON, without host functions.
    pub fn dump_json(&self) -> Result<String, serde_json::Error> {
        let values: indexmap::IndexMap<&str, &Value> = self
            .globals()
            .iter()
            .filter(|(_, value)| value.ty.id != TypeId::Function)
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        serde_json::to_string_pretty(&values)
    }

    /// Whether the instruction pointer reached the end of the chunk.
    pub fn is_halted(&self) -> bool {
        self.ip >= self.chunk.len()
    }

    /// The error that aborted the run, if it failed.
    ///
    /// A halted VM without one completed normally.
    pub fn failed(&self) -> Option<&RuntimeError> {
        self.failed.as_ref()
    }

    /// Run the dispatch loop to the end of the chunk or the first error.
    ///
    /// Once a run has failed, every later call returns the same error.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }

        let chunk = Rc::clone(&self.chunk);
        tracing::debug!(target: "cfglang::vm", instructions = chunk.len(), "run");

        while let Some(op) = chunk.get(self.ip) {
            let span = chunk.span_at(self.ip);
            let next = chunk.get(self.ip + 1);
            self.ip += 1;

            tracing::trace!(
                target: "cfglang::vm",
                ip = self.ip - 1,
                op = ?op,
                depth = self.stack.len(),
                "execute"
            );

            if let Err(err) = self.execute(op, next, span) {
                let err = err.with_span(span);
                tracing::debug!(target: "cfglang::vm", error = %err, "run failed");
                return Err(self.abort(err));
            }
        }

        if !self.stack.is_empty() || self.frames.depth() != 1 {
            let err = RuntimeError::internal(format!(
                "run ended with {} stack cells and {} frames",
                self.stack.len(),
                self.frames.depth()
            ));
            return Err(self.abort(err));
        }
        Ok(())
    }

    fn abort(&mut self, err: RuntimeError) -> RuntimeError {
        self.halt();
        self.failed = Some(err.clone());
        err
    }

    fn halt(&mut self) {
        self.ip = self.chunk.len();
        self.stack.clear();
        self.frames.unwind();
    }

    fn execute(&mut self, op: &Op, next: Option<&Op>, span: Span) -> Result<(), RuntimeError> {
        match op {
            Op::LoadName(name) => self.stack.push(Cell::Name(name.clone())),
            Op::LoadConst(literal) => self.stack.push(Cell::Value(Value::from_literal(literal))),
            Op::LoadValue => self.load_value(next),

            Op::ResolveType {
                kind,
                array,
                optional,
            } => self.resolve_type(*kind, *array, *optional),
            Op::MakeField(name) => {
                let ty = self.stack.pop_type()?;
                self.stack.push(Cell::Field(ObjectField {
                    name: name.clone(),
                    ty,
                }))
            }
            Op::MakeObjectDef(count) => self.make_object_def(*count),
            Op::BindType => self.bind_type(),

            Op::Store { has_value } => self.store(*has_value),

            Op::NewObject => self.new_object(),
            Op::SetField => self.set_field(),
            Op::FinalizeInitialize => self.finalize_initialize(),

            Op::OpenSection => {
                let name = self.stack.pop_name()?;
                self.push_frame(FrameKind::Block, name, span)
            }
            Op::CloseSection => {
                let frame = self.frames.pop()?;
                tracing::debug!(target: "cfglang::vm", section = %frame.name, "close section");
                Ok(())
            }

            Op::LoadMember => self.load_member(next),
            Op::MakeCall(argc) => self.make_call(*argc, span),
        }
    }

    fn push_frame(&mut self, kind: FrameKind, name: String, span: Span) -> Result<(), RuntimeError> {
        if self.frames.depth() >= self.config.max_frame_depth {
            return Err(RuntimeError::StackOverflow(
                format!("frame depth exceeded {}", self.config.max_frame_depth),
                span,
            ));
        }
        tracing::debug!(target: "cfglang::vm", kind = ?kind, name = %name, "push frame");
        self.frames.push(kind, name, span);
        Ok(())
    }

    // --- Names ---

    fn load_value(&mut self, next: Option<&Op>) -> Result<(), RuntimeError> {
        let name = self.stack.pop_name()?;
        match self.frames.get(&name) {
            Some(value) => {
                let value = value.clone();
                self.stack.push(Cell::Value(value))
            }
            None if matches!(next, Some(Op::MakeCall(_))) => {
                Err(RuntimeError::function_not_found(name, Span::default()))
            }
            None => Err(RuntimeError::name_not_found(name, Span::default())),
        }
    }

    // --- Types ---

    fn resolve_type(&mut self, kind: TypeRef, array: bool, optional: bool) -> Result<(), RuntimeError> {
        let name = self.stack.pop_name()?;
        let resolved = match Type::primitive(kind) {
            Some(ty) => ty,
            None => self
                .frames
                .get_type(&name)
                .cloned()
                .ok_or_else(|| RuntimeError::type_not_found(&name, Span::default()))?,
        };

        let mut ty = if array {
            Type::array_of(resolved)
        } else {
            resolved
        };
        ty.optional = ty.optional || optional;
        self.stack.push(Cell::Type(ty))
    }

    fn make_object_def(&mut self, count: usize) -> Result<(), RuntimeError> {
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            fields.push(self.stack.pop_field()?);
        }
        fields.reverse();

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|earlier| earlier.name == field.name) {
                return Err(RuntimeError::DuplicateField(field.name.clone(), Span::default()));
            }
        }
        self.stack.push(Cell::ObjectDef(ObjectDef::new(fields)))
    }

    fn bind_type(&mut self) -> Result<(), RuntimeError> {
        let name = self.stack.pop_name()?;
        let ty = match self.stack.pop()? {
            Cell::ObjectDef(def) => Type::object(name.as_str(), def),
            // Aliases are transparent: `type Port: int` is still `int`.
            Cell::Type(ty) => ty,
            other => {
                return Err(RuntimeError::internal(format!(
                    "expected type definition on data stack, found {}",
                    other.kind()
                )));
            }
        };
        tracing::debug!(target: "cfglang::vm", name = %name, ty = %ty, "bind type");
        self.frames.current_mut().set_type(name, ty);
        Ok(())
    }

    // --- Bindings ---

    fn store(&mut self, has_value: bool) -> Result<(), RuntimeError> {
        let name = self.stack.pop_name()?;
        let value = if has_value {
            Some(self.stack.pop_value()?)
        } else {
            None
        };
        let declared = self.stack.pop_type()?;

        let value = match value {
            Some(value) => check_assignable(&name, &declared, value)?,
            None if declared.is_array() => Value::array(declared, Vec::new()),
            None if declared.optional => Value::nil(declared),
            None => return Err(RuntimeError::missing_value(name, Span::default())),
        };

        tracing::debug!(target: "cfglang::vm", name = %name, ty = %value.ty, "store");
        self.frames
            .current_mut()
            .set(name, value.with_mutable(true));
        Ok(())
    }

    // --- Initializers ---

    fn new_object(&mut self) -> Result<(), RuntimeError> {
        // Every object gets its own schema Type pushed underneath it. Nested in a
        // field ([Type, Object, Name]) the schema is the field's type; otherwise
        // it is a copy of the declared Type on top.
        let nested_field = match self.stack.peek(0)? {
            Cell::Name(field_name) => Some(field_name.clone()),
            _ => None,
        };

        let ty = match nested_field {
            Some(field_name) => schema_field(self.stack.peek_type(2)?, &field_name)?.ty.clone(),
            None => self.stack.peek_type(0)?.clone(),
        };
        if !ty.is_object() {
            return Err(RuntimeError::type_mismatch(ty.full_name(), "object", Span::default()));
        }

        self.stack.push(Cell::Type(ty))?;
        self.stack.push(Cell::Object(Object::new()))
    }

    fn set_field(&mut self) -> Result<(), RuntimeError> {
        let value = self.stack.pop_value()?;
        let field_name = self.stack.pop_name()?;
        let mut object = self.stack.pop_object()?;
        let ty = self.stack.peek_type(0)?;

        let field = schema_field(ty, &field_name)?;
        if object.contains(&field_name) {
            return Err(RuntimeError::DuplicateField(field_name, Span::default()));
        }
        let value = check_assignable(&field_name, &field.ty, value)?;

        object.set(field_name, value.with_mutable(true));
        self.stack.push(Cell::Object(object))
    }

    fn finalize_initialize(&mut self) -> Result<(), RuntimeError> {
        let object = self.stack.peek_object(0)?;
        let ty = self.stack.peek_type(1)?;
        let def = ty
            .object_def
            .as_ref()
            .ok_or_else(|| RuntimeError::NotAnObject(ty.full_name(), Span::default()))?;

        let missing = def
            .fields
            .iter()
            .find(|field| !field.ty.optional && !field.ty.is_array() && !object.contains(&field.name));
        match missing {
            Some(field) => Err(RuntimeError::missing_value(
                format!("{}.{}", ty.name, field.name),
                Span::default(),
            )),
            None => Ok(()),
        }
    }

    // --- Access & calls ---

    fn load_member(&mut self, next: Option<&Op>) -> Result<(), RuntimeError> {
        let name = self.stack.pop_name()?;
        let receiver = self.stack.pop_value()?;

        if matches!(next, Some(Op::MakeCall(_))) {
            return self.stack.push(Cell::Lookup(FunctionLookup { name, receiver }));
        }

        let ty = &receiver.ty;
        if !ty.is_object() {
            return Err(RuntimeError::NotAnObject(ty.full_name(), Span::default()));
        }
        let object = match &receiver.payload {
            Payload::Object(object) => object,
            Payload::Nil => {
                return Err(RuntimeError::missing_value(
                    format!("{}.{}", ty.name, name),
                    Span::default(),
                ));
            }
            _ => return Err(RuntimeError::internal("object type without object payload")),
        };

        let value = match object.get(&name) {
            Some(value) => value.clone(),
            None => {
                let field = schema_field(ty, &name)?;
                if field.ty.is_array() {
                    Value::array(field.ty.clone(), Vec::new())
                } else if field.ty.optional {
                    Value::nil(field.ty.clone())
                } else {
                    return Err(RuntimeError::missing_value(
                        format!("{}.{}", ty.name, name),
                        Span::default(),
                    ));
                }
            }
        };
        self.stack.push(Cell::Value(value))
    }

    fn make_call(&mut self, argc: usize, span: Span) -> Result<(), RuntimeError> {
        let (function, receiver) = match self.stack.pop()? {
            Cell::Lookup(lookup) => {
                // `value.method(..)` dispatches to `<TypeName>_<method>`.
                let target = format!("{}_{}", lookup.receiver.ty.name, lookup.name);
                let function = self
                    .frames
                    .get(&target)
                    .cloned()
                    .ok_or_else(|| RuntimeError::function_not_found(&target, Span::default()))?;
                (function, Some(lookup.receiver))
            }
            Cell::Value(value) => (value, None),
            other => {
                return Err(RuntimeError::internal(format!(
                    "expected callee on data stack, found {}",
                    other.kind()
                )));
            }
        };

        let function = match function.payload {
            Payload::Function(function) => function,
            _ => {
                return Err(RuntimeError::not_callable(
                    function.ty.full_name(),
                    Span::default(),
                ));
            }
        };

        let mut args = Vec::with_capacity(argc + 1);
        for _ in 0..argc {
            args.push(self.stack.pop_value()?);
        }
        args.extend(receiver);
        args.reverse();

        self.push_frame(FrameKind::Function, function.name.clone(), span)?;
        tracing::debug!(target: "cfglang::vm", function = %function.name, args = args.len(), "host call");
        function.call(&args);
        self.frames.pop()?;
        Ok(())
    }
}

/// The schema field `name` of object type `ty`.
fn schema_field<'t>(ty: &'t Type, name: &str) -> Result<&'t ObjectField, RuntimeError> {
    let def = ty
        .object_def
        .as_ref()
        .ok_or_else(|| RuntimeError::NotAnObject(ty.full_name(), Span::default()))?;
    def.field_by_name(name)
        .ok_or_else(|| RuntimeError::unknown_field(&ty.name, name, Span::default()))
}

/// Check `value` against a declared type and retype it as that type.
fn check_assignable(name: &str, declared: &Type, value: Value) -> Result<Value, RuntimeError> {
    if !value.ty.equals(declared) {
        return Err(RuntimeError::type_mismatch(
            declared.full_name(),
            value.ty.full_name(),
            Span::default(),
        ));
    }
    if value.is_nil() && !declared.optional {
        return Err(RuntimeError::missing_value(name, Span::default()));
    }
    Ok(Value {
        ty: declared.clone(),
        mutable: value.mutable,
        payload: value.payload,
    })
}
