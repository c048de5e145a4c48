//! Bytecode VM for cfglang: compiles the AST to a flat instruction list and
//! evaluates it on a stack machine with a chain of lexical frames.

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod frame;
pub mod opcode;
pub mod stack;
pub mod value;
#[allow(clippy::module_inception)]
pub mod vm;

#[cfg(test)]
mod tests;

pub use chunk::Chunk;
pub use compiler::Compiler;
pub use disassembler::disassemble;
pub use frame::{CallStack, Frame, FrameKind};
pub use opcode::{Op, TypeRef};
pub use stack::{Cell, DataStack, FunctionLookup};
pub use value::{Function, HostFn, Object, ObjectDef, ObjectField, Payload, Type, TypeId, Value};
pub use vm::Vm;
