//! Bytecode chunk: a flat instruction list with source locations.

use crate::span::Span;

use super::opcode::Op;

/// A compiled program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    /// The bytecode instructions.
    pub code: Vec<Op>,
    /// Source locations, parallel to `code`.
    pub spans: Vec<Span>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an instruction and record its source location.
    pub fn emit(&mut self, op: Op, span: Span) -> usize {
        let offset = self.code.len();
        self.code.push(op);
        self.spans.push(span);
        offset
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The instruction at `offset`, if any.
    pub fn get(&self, offset: usize) -> Option<&Op> {
        self.code.get(offset)
    }

    pub fn span_at(&self, offset: usize) -> Span {
        self.spans.get(offset).copied().unwrap_or_default()
    }

    /// Iterate over `(instruction, location)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Op, Span)> + '_ {
        self.code.iter().zip(self.spans.iter().copied())
    }
}
