//! Error types for all compilation phases.

use crate::span::Span;
use thiserror::Error;

/// Lexer errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexerError {
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, Span),

    #[error("Unterminated string at {0}")]
    UnterminatedString(Span),

    #[error("Invalid escape sequence '\\{0}' at {1}")]
    InvalidEscape(char, Span),

    #[error("Invalid number '{0}' at {1}")]
    InvalidNumber(String, Span),
}

impl LexerError {
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::UnexpectedChar(c, span)
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::UnterminatedString(span)
    }

    pub fn invalid_escape(c: char, span: Span) -> Self {
        Self::InvalidEscape(c, span)
    }

    pub fn invalid_number(s: String, span: Span) -> Self {
        Self::InvalidNumber(s, span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar(_, span) => *span,
            Self::UnterminatedString(span) => *span,
            Self::InvalidEscape(_, span) => *span,
            Self::InvalidNumber(_, span) => *span,
        }
    }
}

/// Syntax errors raised by the parser.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserError {
    #[error("Unexpected token '{found}', expected {expected} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file at {0}")]
    UnexpectedEof(Span),

    #[error("'object' can only be used as the type of a typedef at {0}")]
    ObjectOutsideTypedef(Span),

    #[error("'object' types cannot be optional at {0}")]
    OptionalObject(Span),

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl ParserError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::UnexpectedEof(span)
    }

    pub fn general(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } => *span,
            Self::UnexpectedEof(span) => *span,
            Self::ObjectOutsideTypedef(span) => *span,
            Self::OptionalObject(span) => *span,
            Self::General { span, .. } => *span,
        }
    }
}

impl From<LexerError> for ParserError {
    fn from(err: LexerError) -> Self {
        Self::General {
            message: err.to_string(),
            span: err.span(),
        }
    }
}

/// Bytecode compilation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::General { span, .. } => *span,
        }
    }
}

/// Runtime errors.
///
/// Everything except [`RuntimeError::Internal`] is caused by the evaluated
/// program. `Internal` means the instruction stream broke the stack contract
/// between compiler and VM.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Type not found: '{0}' at {1}")]
    TypeNotFound(String, Span),

    #[error("Type mismatch: expected {expected}, found {found} at {span}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Missing value for '{0}' at {1}")]
    MissingValue(String, Span),

    #[error("Unknown field '{field}' on type '{type_name}' at {span}")]
    UnknownField {
        type_name: String,
        field: String,
        span: Span,
    },

    #[error("Field '{0}' is initialized more than once at {1}")]
    DuplicateField(String, Span),

    #[error("Cannot access a field on non-object type '{0}' at {1}")]
    NotAnObject(String, Span),

    #[error("Name not found: '{0}' at {1}")]
    NameNotFound(String, Span),

    #[error("Function not found: '{0}' at {1}")]
    FunctionNotFound(String, Span),

    #[error("Cannot call non-function value of type '{0}' at {1}")]
    NotCallable(String, Span),

    #[error("Stack overflow: {0} at {1}")]
    StackOverflow(String, Span),

    #[error("Internal error: {message} at {span}")]
    Internal { message: String, span: Span },
}

impl RuntimeError {
    pub fn type_not_found(name: impl Into<String>, span: Span) -> Self {
        Self::TypeNotFound(name.into(), span)
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn missing_value(name: impl Into<String>, span: Span) -> Self {
        Self::MissingValue(name.into(), span)
    }

    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>, span: Span) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
            span,
        }
    }

    pub fn name_not_found(name: impl Into<String>, span: Span) -> Self {
        Self::NameNotFound(name.into(), span)
    }

    pub fn function_not_found(name: impl Into<String>, span: Span) -> Self {
        Self::FunctionNotFound(name.into(), span)
    }

    pub fn not_callable(type_name: impl Into<String>, span: Span) -> Self {
        Self::NotCallable(type_name.into(), span)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            span: Span::default(),
        }
    }

    /// Whether this error points at a defect rather than at the user's program.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    pub fn span(&self) -> Span {
        match self {
            Self::TypeNotFound(_, span) => *span,
            Self::TypeMismatch { span, .. } => *span,
            Self::MissingValue(_, span) => *span,
            Self::UnknownField { span, .. } => *span,
            Self::DuplicateField(_, span) => *span,
            Self::NotAnObject(_, span) => *span,
            Self::NameNotFound(_, span) => *span,
            Self::FunctionNotFound(_, span) => *span,
            Self::NotCallable(_, span) => *span,
            Self::StackOverflow(_, span) => *span,
            Self::Internal { span, .. } => *span,
        }
    }

    /// Retag the error with the location of the instruction that raised it.
    pub fn with_span(mut self, at: Span) -> Self {
        match &mut self {
            Self::TypeNotFound(_, span)
            | Self::MissingValue(_, span)
            | Self::DuplicateField(_, span)
            | Self::NotAnObject(_, span)
            | Self::NameNotFound(_, span)
            | Self::FunctionNotFound(_, span)
            | Self::NotCallable(_, span)
            | Self::StackOverflow(_, span) => *span = at,
            Self::TypeMismatch { span, .. }
            | Self::UnknownField { span, .. }
            | Self::Internal { span, .. } => *span = at,
        }
        self
    }
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum CfgError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Syntax error: {0}")]
    Parser(#[from] ParserError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CfgError {
    /// Source location of the error, when it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer(err) => Some(err.span()),
            Self::Parser(err) => Some(err.span()),
            Self::Compile(err) => Some(err.span()),
            Self::Runtime(err) => Some(err.span()),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_span_retags() {
        let at = Span::new(4, 9, 3, 5);
        let err = RuntimeError::name_not_found("x", Span::default()).with_span(at);
        assert_eq!(err.span(), at);
        assert_eq!(err.to_string(), "Name not found: 'x' at 3:5");
    }

    #[test]
    fn test_internal_is_distinguished() {
        assert!(RuntimeError::internal("data stack is empty").is_internal());
        assert!(!RuntimeError::missing_value("x", Span::default()).is_internal());
    }

    #[test]
    fn test_unified_error_keeps_location() {
        let err: CfgError = ParserError::OptionalObject(Span::new(0, 6, 2, 9)).into();
        assert_eq!(err.span(), Some(Span::new(0, 6, 2, 9)));
        assert!(err.to_string().starts_with("Syntax error:"));
    }
}
