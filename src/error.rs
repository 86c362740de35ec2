use std::fmt;

use thiserror::Error;

/// Where a fatal error was observed: the top-level statement number and the
/// source line of the word being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub statement: usize,
    pub line: usize,
}

impl Location {
    pub fn new(statement: usize, line: usize) -> Self {
        Self { statement, line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stmt {} line {}", self.statement, self.line)
    }
}

fn located(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!("\nAt: {}", loc),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum LangError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}{}", located(.1))]
    Parse(String, Option<Location>),
    #[error("Reference error: {0}{}", located(.1))]
    Reference(String, Option<Location>),
    #[error("Arity error: {0}{}", located(.1))]
    Arity(String, Option<Location>),
    #[error("Import error: {0}{}", located(.1))]
    Import(String, Option<Location>),
    #[error("Type error: {0}{}", located(.1))]
    Type(String, Option<Location>),
    #[error("Runtime error: {0}{}", located(.1))]
    Runtime(String, Option<Location>),
}

pub type LangResult<T> = Result<T, LangError>;

impl LangError {
    pub fn parse(message: impl Into<String>) -> Self {
        LangError::Parse(message.into(), None)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        LangError::Reference(message.into(), None)
    }

    pub fn arity(message: impl Into<String>) -> Self {
        LangError::Arity(message.into(), None)
    }

    pub fn import(message: impl Into<String>) -> Self {
        LangError::Import(message.into(), None)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        LangError::Type(message.into(), None)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        LangError::Runtime(message.into(), None)
    }

    /// Attaches `location` unless an inner statement already did.
    pub fn at(self, location: Location) -> Self {
        match self {
            LangError::Parse(msg, None) => LangError::Parse(msg, Some(location)),
            LangError::Reference(msg, None) => LangError::Reference(msg, Some(location)),
            LangError::Arity(msg, None) => LangError::Arity(msg, Some(location)),
            LangError::Import(msg, None) => LangError::Import(msg, Some(location)),
            LangError::Type(msg, None) => LangError::Type(msg, Some(location)),
            LangError::Runtime(msg, None) => LangError::Runtime(msg, Some(location)),
            other => other,
        }
    }

    /// Prefixes the message with the module it was raised in. The kind and
    /// location are kept.
    pub fn in_module(self, module: &str) -> Self {
        let prefix = |msg: String| format!("in module '{}': {}", module, msg);
        match self {
            LangError::Io(err) => LangError::Io(err),
            LangError::Parse(msg, loc) => LangError::Parse(prefix(msg), loc),
            LangError::Reference(msg, loc) => LangError::Reference(prefix(msg), loc),
            LangError::Arity(msg, loc) => LangError::Arity(prefix(msg), loc),
            LangError::Import(msg, loc) => LangError::Import(prefix(msg), loc),
            LangError::Type(msg, loc) => LangError::Type(prefix(msg), loc),
            LangError::Runtime(msg, loc) => LangError::Runtime(prefix(msg), loc),
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            LangError::Io(_) => None,
            LangError::Parse(_, loc)
            | LangError::Reference(_, loc)
            | LangError::Arity(_, loc)
            | LangError::Import(_, loc)
            | LangError::Type(_, loc)
            | LangError::Runtime(_, loc) => *loc,
        }
    }
}
