//! Error types shared by the tokenizer, parser and evaluator
//!
//! Every stage reports failures as a `QuillError`; nothing in the core
//! terminates the process. The host decides whether to abort (file mode)
//! or report and continue (REPL).

use thiserror::Error;

/// Convenience alias used throughout the core crate
pub type Result<T, E = QuillError> = std::result::Result<T, E>;

/// Any failure produced while turning source text into a value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuillError {
    /// The tokenizer met a character outside the recognised set
    #[error("Unrecognized character found in source: '{character}'")]
    Lex { character: char },

    /// The parser expected a different token
    #[error("Syntax error: {message} (found {found})")]
    Syntax { message: String, found: String },

    /// Evaluation failed
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl QuillError {
    pub fn syntax(message: impl Into<String>, found: impl Into<String>) -> Self {
        QuillError::Syntax {
            message: message.into(),
            found: found.into(),
        }
    }

    /// Short category label, used by the REPL when printing diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            QuillError::Lex { .. } => "Lex error",
            QuillError::Syntax { .. } => "Parse error",
            QuillError::Runtime(_) => "Runtime error",
        }
    }
}

/// Semantic failures detected while walking the tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Cannot resolve '{0}' as it does not exist")]
    UndefinedVariable(String),

    #[error("Cannot declare variable '{0}' as it is already defined")]
    AlreadyDeclared(String),

    #[error("Cannot reassign to variable '{0}' as it was declared constant")]
    ConstantReassignment(String),

    /// The left-hand side of `=` was not a plain identifier
    #[error("Invalid left-hand side in assignment: {0}")]
    InvalidAssignmentTarget(String),

    #[error("Cannot call value that is not a function: {0}")]
    NotCallable(String),

    #[error("Cannot access property of non-object value: {0}")]
    InvalidMemberAccess(String),

    #[error("Property '{0}' does not exist on object")]
    PropertyNotFound(String),

    /// Raised by a host-provided function
    #[error("{name}(): {message}")]
    Native { name: String, message: String },
}
