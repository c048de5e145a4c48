//! Lexical frames and the call stack that chains them.

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::span::Span;

use super::value::{Type, Value};

/// Bindings keep declaration order so the root frame dumps deterministically.
pub type Bindings = IndexMap<String, Value, ahash::RandomState>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Root,
    Function,
    Block,
}

/// One level of the scope chain.
#[derive(Debug)]
pub struct Frame {
    pub kind: FrameKind,
    pub name: String,
    /// Index of the enclosing frame in the [`CallStack`] arena.
    pub parent: Option<usize>,
    pub span: Span,
    data: Bindings,
    types: AHashMap<String, Type>,
}

impl Frame {
    pub fn new(kind: FrameKind, name: impl Into<String>, parent: Option<usize>, span: Span) -> Self {
        Self {
            kind,
            name: name.into(),
            parent,
            span,
            data: Bindings::default(),
            types: AHashMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.data.insert(name.into(), value);
    }

    pub fn set_type(&mut self, name: impl Into<String>, ty: Type) {
        self.types.insert(name.into(), ty);
    }

    /// A binding declared in this frame only.
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// A type declared in this frame only.
    pub fn local_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.data
    }
}

/// Arena of frames. Only the active path is kept: pushing a frame makes the
/// current top its parent, popping discards it along with its bindings.
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    /// A call stack seeded with the root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(FrameKind::Root, "<root>", None, Span::default())],
        }
    }

    /// Push a child of the current frame and return its index.
    pub fn push(&mut self, kind: FrameKind, name: impl Into<String>, span: Span) -> usize {
        let parent = self.frames.len() - 1;
        self.frames.push(Frame::new(kind, name, Some(parent), span));
        self.frames.len() - 1
    }

    pub fn pop(&mut self) -> Result<Frame, RuntimeError> {
        if self.frames.len() <= 1 {
            return Err(RuntimeError::internal("cannot pop the root frame"));
        }
        self.frames
            .pop()
            .ok_or_else(|| RuntimeError::internal("call stack is empty"))
    }

    /// Drop every frame above the root.
    pub fn unwind(&mut self) {
        self.frames.truncate(1);
    }

    /// Number of frames, the root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    pub fn root(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn root_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// Resolve a binding from the current frame outwards.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.chain().find_map(|frame| frame.local(name))
    }

    /// Resolve a type from the current frame outwards.
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.chain().find_map(|frame| frame.local_type(name))
    }

    /// Frames from the current one up to the root, following parent links.
    fn chain(&self) -> impl Iterator<Item = &Frame> + '_ {
        let mut next = Some(self.frames.len() - 1);
        std::iter::from_fn(move || {
            let frame = &self.frames[next?];
            next = frame.parent;
            Some(frame)
        })
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
