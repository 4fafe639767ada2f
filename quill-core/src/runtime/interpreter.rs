//! Interpreter for executing Quill programs
//!
//! Owns one environment and evaluates programs against its global scope, so
//! a REPL session keeps bindings between lines without any process-wide
//! state.

use crate::error::Result;
use crate::parser::ast::Program;
use crate::parser::statement_parser::produce_ast;
use crate::runtime::environment::{Environment, ScopeId};
use crate::runtime::evaluator::Evaluator;
use crate::runtime::value::Value;

/// Interpreter for executing Quill programs
pub struct Interpreter {
    /// Variable environment; the global scope lives for the interpreter's
    /// whole lifetime
    pub environment: Environment,
    /// Number of programs evaluated so far
    runs: usize,
}

impl Interpreter {
    /// Create an interpreter whose global scope carries the built-ins
    pub fn new() -> Self {
        Self::with_environment(Environment::with_globals())
    }

    /// Create an interpreter over a caller-provided environment
    pub fn with_environment(environment: Environment) -> Self {
        Interpreter {
            environment,
            runs: 0,
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    /// Parse and evaluate `source` in the global scope
    pub fn run(&mut self, source: &str) -> Result<Value> {
        let program = produce_ast(source)?;
        self.run_program(&program)
    }

    /// Run a complete program
    pub fn run_program(&mut self, program: &Program) -> Result<Value> {
        self.runs += 1;
        tracing::debug!(run = self.runs, statements = program.len(), "running program");
        Evaluator::new(&mut self.environment).evaluate_program(program, ScopeId::GLOBAL)
    }

    /// Discard all bindings and start over with fresh globals
    pub fn reset(&mut self) {
        self.environment = Environment::with_globals();
        self.runs = 0;
    }

    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
