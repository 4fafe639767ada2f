//! # Quill
//!
//! Command-line host for the Quill scripting language. The language itself
//! (tokenizer, parser, evaluator) lives in `quill-core`; this crate adds the
//! pieces that need a terminal or a filesystem.
//!
//! ## Modules
//!
//! - `commands`: REPL commands such as `env`, `reset` and `load`.
//! - `config`: REPL settings layered from flags, environment and defaults.
//! - `logging`: opt-in `tracing` output controlled by `RUST_LOG`.
//! - `repl`: the interactive loop and the file watcher behind `--watch`.

pub mod commands;
pub mod config;
pub mod logging;
pub mod repl;

use anyhow::{Context, Result};
use quill_core::{Interpreter, Value};
use std::path::Path;

// Re-export commonly used types
pub use quill_core::{QuillError, RuntimeError};

/// Run a script once in a fresh interpreter and return its final value
pub fn run_file(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = source.len(), "running script");
    let value = Interpreter::new()
        .run(&source)
        .with_context(|| format!("failed to run {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_file_returns_last_value() {
        let path = std::env::temp_dir().join(format!("quill-run-{}.ql", std::process::id()));
        std::fs::write(&path, "const r = { w: 3, h: 4 };\nfn area(s) { s.w * s.h }\narea(r)")
            .unwrap();

        assert_eq!(run_file(&path).unwrap(), Value::Number(12.0));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_run_file_errors_carry_context() {
        let path = std::env::temp_dir().join(format!("quill-fail-{}.ql", std::process::id()));
        std::fs::write(&path, "const x = 1; x = 2;").unwrap();

        let err = run_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("declared constant"));
        assert!(err.downcast_ref::<QuillError>().is_some());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_run_file_missing() {
        let err = run_file(Path::new("/definitely/not/here.ql")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }
}
