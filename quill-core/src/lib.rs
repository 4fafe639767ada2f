//! # Quill Core
//!
//! Tokenizer, parser and tree-walking evaluator for the Quill scripting
//! language. Has no terminal or filesystem dependencies; the `quill` binary
//! builds the REPL on top of it.
//!
//! ## Example
//!
//! ```
//! use quill_core::{Interpreter, Value};
//!
//! let mut interpreter = Interpreter::new();
//! let result = interpreter.run("fn add(a, b) { a + b } add(2, 3)").unwrap();
//! assert_eq!(result, Value::Number(5.0));
//! ```

pub mod error;
pub mod parser;
pub mod runtime;

// Re-export commonly used types
pub use error::{QuillError, RuntimeError};
pub use parser::{produce_ast, tokenize, Program, Token, TokenKind};
pub use runtime::{Environment, Interpreter, ScopeId, Value};
