// quill-core/src/runtime/mod.rs

pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod value;


pub use environment::{Environment, Scope, ScopeId};
pub use evaluator::{evaluate, Evaluator};
pub use interpreter::Interpreter;
pub use value::{FunctionValue, NativeFunction, Value};
