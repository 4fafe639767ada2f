use crate::error::{Result, RuntimeError};
use crate::runtime::environment::{Environment, ScopeId};
use crate::runtime::value::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Name, description and signature of a global, for the REPL help listing
pub struct DocItem {
    pub name: &'static str,
    pub description: &'static str,
    pub signature: &'static str,
}

pub const DOCUMENTATION: &[DocItem] = &[
    DocItem {
        name: "true",
        description: "Boolean true.",
        signature: "true",
    },
    DocItem {
        name: "false",
        description: "Boolean false.",
        signature: "false",
    },
    DocItem {
        name: "null",
        description: "The null value.",
        signature: "null",
    },
    DocItem {
        name: "print",
        description: "Writes its arguments to stdout, separated by spaces.",
        signature: "print(...values) -> null",
    },
    DocItem {
        name: "time",
        description: "Milliseconds elapsed since the Unix epoch.",
        signature: "time() -> number",
    },
];

/// Seed the global scope with constants and native functions
pub fn register_globals(env: &mut Environment) {
    let globals = [
        ("true", Value::Boolean(true)),
        ("false", Value::Boolean(false)),
        ("null", Value::Null),
        ("print", Value::native("print", native_print)),
        ("time", Value::native("time", native_time)),
    ];

    for (name, value) in globals {
        // A fresh global scope cannot already hold these names
        if let Err(e) = env.declare_var(ScopeId::GLOBAL, name, value, true) {
            tracing::warn!(name, error = %e, "failed to register global");
        }
    }
}

/// Render arguments the way `print` writes them
pub fn format_args(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn native_print(args: &[Value], _env: &mut Environment, _scope: ScopeId) -> Result<Value> {
    println!("{}", format_args(args));
    Ok(Value::Null)
}

fn native_time(_args: &[Value], _env: &mut Environment, _scope: ScopeId) -> Result<Value> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| RuntimeError::Native {
            name: "time".to_string(),
            message: e.to_string(),
        })?;
    Ok(Value::Number(elapsed.as_millis() as f64))
}
