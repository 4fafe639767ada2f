//! REPL (Read-Eval-Print Loop) for the Quill language

use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::config::ReplConfig;
use crate::repl::watcher::FileWatcher;
use anyhow::Result;
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::event::ModifyKind;
use notify::{Event, EventKind};
use quill_core::{Interpreter, QuillError, Value};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::path::Path;
use std::thread;

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// What the loop should do after handling a line
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

/// Any line mentioning `exit` ends the session, not only the bare command
pub fn is_exit_request(line: &str) -> bool {
    line.contains("exit")
}

/// Whether a watcher event means the file's contents may have changed.
/// Metadata and access events do not.
pub fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any)
    )
}

/// Interactive REPL for the Quill language
pub struct Repl {
    editor: Option<DefaultEditor>,
    config: ReplConfig,
    ctx: CommandContext,
    registry: CommandRegistry,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    // File watcher
    watcher: Option<FileWatcher>,
    /// Source of the last script run by a reload
    last_source: Option<String>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: ReplConfig) -> RustylineResult<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &config.history_path {
            // A missing history file is normal on first use
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), error = %e, "no history loaded");
            }
        }

        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            config,
            ctx: CommandContext::new(Interpreter::new()),
            registry: create_registry(),
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
            last_source: None,
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "Quill".bright_cyan().bold());
        println!(
            "Type expressions like: {}, {}, {}",
            "let x = 2 + 3;".cyan(),
            "{ a: 1, b: x }".cyan(),
            "fn add(a, b) { a + b }".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "exit".bright_red(),
            "Ctrl+C".bright_red()
        );

        if let Some(path) = self.config.watch_file.clone() {
            self.reload_file(&path);
            self.start_watching(&path.to_string_lossy());
        }

        self.spawn_reader()?;

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if self.handle_line(&line) == Flow::Exit {
                            println!("{}", "Goodbye!".bright_cyan());
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted | ReadlineError::Eof))) => {
                        println!("{}", "Goodbye!".bright_cyan());
                        break;
                    }
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                        break;
                    }
                    Err(_) => break, // Channel closed
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => self.handle_watch_event(event),
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break, // Channel closed
                }
            }
        }

        Ok(())
    }

    /// Move the editor onto a reader thread that forwards lines to the loop
    fn spawn_reader(&mut self) -> Result<()> {
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow::anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();
        let prompt = format!("{} ", self.config.prompt.bright_magenta().bold());
        let history_path = self.config.history_path.clone();

        thread::spawn(move || loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                        if let Some(path) = &history_path {
                            if let Err(e) = editor.save_history(path) {
                                tracing::warn!(path = %path.display(), error = %e, "failed to save history");
                            }
                        }
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        if is_exit_request(line) {
            return Flow::Exit;
        }

        match self.registry.execute(line, &mut self.ctx) {
            CommandResult::Success => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => return Flow::Exit,
            CommandResult::Error(e) => {
                println!("{} {}", "Error:".bright_red().bold(), e.red());
            }
            CommandResult::Watch(path) => self.start_watching(&path),
            CommandResult::NotACommand => {
                let result = self.ctx.eval(line);
                print_result(result);
            }
        }

        Flow::Continue
    }

    fn start_watching(&mut self, path: &str) {
        if self.watcher.is_none() {
            match FileWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => println!("{} Failed to create watcher: {}", "Error:".red(), e),
            }
        }

        if let Some(w) = &mut self.watcher {
            if let Err(e) = w.watch(path) {
                println!("{} Failed to watch {}: {}", "Error:".red(), path, e);
            } else {
                println!("Watching {} for changes...", path.bright_green());
            }
        }
    }

    fn handle_watch_event(&mut self, event: Event) {
        if !is_content_change(&event.kind) {
            return;
        }

        let mut paths = event.paths;
        paths.dedup();
        for path in paths {
            let Some(contents) = read_script(&path) else {
                continue;
            };
            // Editors often emit several events for one save
            if self.last_source.as_deref() == Some(contents.as_str()) {
                tracing::debug!(path = %path.display(), "contents unchanged, skipping reload");
                continue;
            }

            println!("{} File changed: {}", "*".bright_yellow(), path.display());
            self.run_script(&path, contents);
        }
    }

    /// Re-run a script from scratch so its declarations do not collide with
    /// the previous run
    fn reload_file(&mut self, path: &Path) {
        if let Some(contents) = read_script(path) {
            self.run_script(path, contents);
        }
    }

    fn run_script(&mut self, path: &Path, contents: String) {
        tracing::info!(path = %path.display(), "reloading script");
        self.ctx.interpreter.reset();
        match self.ctx.eval(&contents) {
            Ok(value) => {
                if !value.is_null() {
                    println!("{}", value);
                }
                println!("{} Reloaded successfully", "ok".bright_green());
            }
            Err(e) => print_error(&e),
        }
        self.last_source = Some(contents);
    }
}

fn read_script(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            println!("{} Failed to read file: {}", "Error:".red(), e);
            None
        }
    }
}

fn print_result(result: Result<Value, QuillError>) {
    match result {
        Ok(value) => println!("{}", value),
        Err(e) => print_error(&e),
    }
}

fn print_error(e: &QuillError) {
    println!(
        "{} {}",
        format!("{}:", e.kind()).bright_red().bold(),
        e.to_string().red()
    );
}

/// Convenience function to start the REPL
pub fn start(config: ReplConfig) -> Result<()> {
    let mut repl =
        Repl::new(config).map_err(|e| anyhow::anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}
