//! General REPL commands (help, quit, env, reset, watch, load)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use quill_core::runtime::builtins::DOCUMENTATION;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `env`: list the bindings declared in this session
pub fn cmd_env(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let global = ctx.interpreter.global_scope();
    let lines: Vec<String> = ctx
        .interpreter
        .environment
        .bindings(global)
        .into_iter()
        .filter(|(name, _)| !DOCUMENTATION.iter().any(|doc| doc.name == name.as_str()))
        .map(|(name, value)| format!("  {} = {}", name.cyan(), value))
        .collect();

    if lines.is_empty() {
        CommandResult::Message("No bindings declared".to_string())
    } else {
        CommandResult::Message(lines.join("\n"))
    }
}

/// Handle `reset`: drop every session binding
pub fn cmd_reset(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.interpreter.reset();
    CommandResult::Message("Environment reset".bright_green().to_string())
}

/// Handle `watch [file]` command
pub fn cmd_watch(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: watch <file>".to_string());
    }
    CommandResult::Watch(args.to_string())
}

/// Handle `load [file]`: evaluate a script into the current session
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: load <file>".to_string());
    }

    let source = match std::fs::read_to_string(args) {
        Ok(source) => source,
        Err(e) => return CommandResult::Error(format!("Failed to read {}: {}", args, e)),
    };

    match ctx.eval(&source) {
        Ok(value) if value.is_null() => CommandResult::Success,
        Ok(value) => CommandResult::Message(value.to_string()),
        Err(e) => CommandResult::Error(format!("{}: {}", e.kind(), e)),
    }
}

fn print_help() {
    println!("{}", "Quill Language Help".bold());
    println!("{}", "===================".bold());
    println!();
    println!("{}", "Declarations:".green());
    println!("  {}          - Mutable binding", "let x = 5;".cyan());
    println!("  {}       - Constant binding", "const y = 10;".cyan());
    println!("  {}             - Declared, holds null", "let z;".cyan());
    println!("  {}          - Assign an existing binding", "x = x + 1".cyan());
    println!();
    println!("{}", "Arithmetic:".green());
    println!(
        "  {}   - Numbers with + - * / %",
        "(2 + 3) * 4 % 7".cyan()
    );
    println!();
    println!("{}", "Objects:".green());
    println!(
        "  {}  - Literal, `b` is shorthand for `b: b`",
        "{ a: 1, b }".cyan()
    );
    println!("  {}  - Member access", "point.x  point[key]".cyan());
    println!();
    println!("{}", "Functions:".green());
    println!(
        "  {}  - Returns its last expression",
        "fn add(a, b) { a + b }".cyan()
    );
    println!("  {}              - Call", "add(2, 3)".cyan());
    println!();
    println!("{}", "Built-ins:".green());
    for doc in DOCUMENTATION {
        println!("  {} {}", format!("{:<28}", doc.signature).cyan(), doc.description);
    }
    println!();
    println!("{}", "Commands:".green());
    println!("  {}            - List session bindings", "env".bright_green());
    println!("  {}          - Start over with a fresh environment", "reset".bright_green());
    println!("  {}    - Evaluate a file into the session", "load <file>".bright_green());
    println!("  {}   - Re-run a file whenever it changes", "watch <file>".bright_green());
    println!("  {}           - Show this help", "help".bright_green());
    println!("  {}           - Exit the REPL", "exit".bright_red());
    println!();
    println!(
        "A variable named like a command (e.g. {}) hides that command.",
        "let env = 1;".cyan()
    );
}
