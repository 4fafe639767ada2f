//! Command registry for REPL commands
//!
//! Lines matching a registered prefix are handled here; everything else is
//! evaluated as Quill source.

pub mod general;

use quill_core::{Interpreter, QuillError, Value};

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, try evaluating as source
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a file for changes
    Watch(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub interpreter: Interpreter,
}

impl CommandContext {
    pub fn new(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    /// Evaluate source in the session's global scope
    pub fn eval(&mut self, input: &str) -> Result<Value, QuillError> {
        self.interpreter.run(input)
    }

    /// Whether the session has declared `name` at global scope
    pub fn is_bound(&self, name: &str) -> bool {
        let global = self.interpreter.global_scope();
        self.interpreter.environment.resolve(global, name).is_ok()
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new(Interpreter::new())
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found. A
    /// session binding named like a command's first word shadows it.
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let word = prefix.split_whitespace().next().unwrap_or(prefix.as_str());
                if ctx.is_bound(word) {
                    tracing::debug!(command = %prefix, "shadowed by a binding");
                    return CommandResult::NotACommand;
                }

                let args = input[prefix.len()..].trim();
                tracing::debug!(command = %prefix, args, "running command");
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry holding every built-in command
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("env", general::cmd_env);
    registry.register("reset", general::cmd_reset);
    registry.register("watch", general::cmd_watch);
    registry.register("load", general::cmd_load);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd_echo(args: &str, _ctx: &mut CommandContext) -> CommandResult {
        CommandResult::Message(format!("short:{}", args))
    }

    fn cmd_echo_long(args: &str, _ctx: &mut CommandContext) -> CommandResult {
        CommandResult::Message(format!("long:{}", args))
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut registry = CommandRegistry::new();
        registry.register("show", cmd_echo);
        registry.register("show all", cmd_echo_long);
        let mut ctx = CommandContext::default();

        assert_eq!(
            registry.execute("show all  x ", &mut ctx),
            CommandResult::Message("long:x".to_string())
        );
        assert_eq!(
            registry.execute("show one", &mut ctx),
            CommandResult::Message("short:one".to_string())
        );
        assert_eq!(registry.list_commands(), vec!["show all", "show"]);
    }

    #[test]
    fn test_prefix_must_be_whole_word() {
        let mut registry = CommandRegistry::new();
        registry.register("env", cmd_echo);
        let mut ctx = CommandContext::default();

        assert_eq!(registry.execute("envelope", &mut ctx), CommandResult::NotACommand);
        assert_eq!(
            registry.execute("env", &mut ctx),
            CommandResult::Message("short:".to_string())
        );
    }

    #[test]
    fn test_binding_shadows_command() {
        let registry = create_registry();
        let mut ctx = CommandContext::default();

        assert!(matches!(registry.execute("env", &mut ctx), CommandResult::Message(_)));

        ctx.eval("let env = 1;").unwrap();
        assert_eq!(registry.execute("env", &mut ctx), CommandResult::NotACommand);
        assert_eq!(ctx.eval("env").unwrap(), Value::Number(1.0));
        assert!(ctx.is_bound("env"));
        assert!(!ctx.is_bound("reset"));
    }

    #[test]
    fn test_source_is_not_a_command() {
        let registry = create_registry();
        let mut ctx = CommandContext::default();

        assert_eq!(
            registry.execute("let x = 1;", &mut ctx),
            CommandResult::NotACommand
        );
        assert_eq!(ctx.eval("1 + 2").unwrap(), Value::Number(3.0));
    }
}
