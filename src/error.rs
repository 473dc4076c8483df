// ABOUTME: Error types for every stage of the interpreter pipeline

use crate::value::Value;
use thiserror::Error;

/// Errors raised while loading a source file, before any lexing happens.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{path}: cannot read source file: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}: source file must have a .rkt suffix")]
    NotRacketSource(String),

    #[error("{path}:{line}: line exceeds 1024 bytes")]
    LineTooLong { path: String, line: usize },
}

/// Errors raised while turning source lines into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("source must start with a language line, supports only: #lang racket")]
    MissingLanguage,

    #[error("unsupported language, supports only: #lang racket: #{0}")]
    UnsupportedLanguage(String),

    #[error("a character literal holds exactly one character: #\\{0}")]
    BadCharacterLiteral(String),

    #[error("a number can not be: {0}")]
    MalformedNumber(String),

    #[error("a string must be closed on its own line: \"{0}")]
    UnterminatedString(String),

    #[error("can not handle character: {0:?}")]
    UnexpectedCharacter(char),
}

/// Errors raised while assembling tokens into the syntax tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}: bad syntax")]
    BadSyntax(&'static str),

    #[error("can not handle token: {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("number literal out of range: {0}")]
    NumberOutOfRange(String),
}

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Type mismatch with procedure name, expected type, actual type, and position
    #[error("{function}: expected {expected}, given {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: &'static str,
        actual: String,
        position: usize,
    },

    /// Arity error with procedure name, expected count or lower bound, and actual count
    #[error("{function}: arity mismatch; expected {expected}, given {actual}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Runtime error with procedure context
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    #[error("{function}: division by zero")]
    DivisionByZero { function: String },

    #[error("{0}: undefined; cannot reference an identifier before its definition")]
    UndefinedSymbol(String),

    #[error("{0}: undefined; cannot use before initialization")]
    UseBeforeInitialization(String),

    #[error("set!: cannot set undefined identifier: {0}")]
    SetUndefined(String),

    #[error("application: not a procedure: {0}")]
    NotCallable(String),
}

impl EvalError {
    /// Create a type mismatch error with full context
    pub fn type_error(
        function: &str,
        expected: &'static str,
        actual: &Value,
        position: usize,
    ) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected,
            actual: actual.type_name().to_string(),
            position,
        }
    }

    /// Create an arity error with expected and actual counts
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    /// Create a runtime error with procedure context
    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Top-level error for the pipeline driver: any stage, one diagnostic line.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
