use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::*;
use quill::config::{CliOverrides, ReplConfig};

/// Quill is a small scripting language with objects, closures and a REPL.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run. Starts the REPL when omitted.
    file: Option<PathBuf>,

    /// Run FILE, then stay in the REPL and re-run it whenever it changes.
    #[arg(short, long, requires = "file")]
    watch: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// File to load REPL history from and save it to.
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,
}

fn main() -> ExitCode {
    quill::logging::init_tracing();
    let args = Args::parse();

    let config = ReplConfig::from_env(CliOverrides {
        history: args.history,
        no_color: args.no_color,
        watch_file: args.file.clone().filter(|_| args.watch),
    });
    config.apply_color();

    let outcome = match args.file {
        Some(file) if !args.watch => quill::run_file(&file).map(|value| {
            if !value.is_null() {
                println!("{}", value);
            }
        }),
        _ => quill::repl::start(config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
