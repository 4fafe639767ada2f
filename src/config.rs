//! REPL configuration
//!
//! Settings are layered: command-line flags first, then environment
//! variables, then built-in defaults.

use std::path::PathBuf;

/// Environment variable naming a file to persist REPL history in
pub const HISTORY_VAR: &str = "QUILL_HISTORY";
/// Presence (with a non-empty value) disables colored output
pub const NO_COLOR_VAR: &str = "NO_COLOR";

/// Settings taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub history: Option<PathBuf>,
    pub no_color: bool,
    pub watch_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    pub prompt: String,
    /// Where history is loaded from and saved to; in-memory only when unset
    pub history_path: Option<PathBuf>,
    pub color: bool,
    /// File to run on startup and re-run whenever it changes
    pub watch_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: "quill>".to_string(),
            history_path: None,
            color: true,
            watch_file: None,
        }
    }
}

impl ReplConfig {
    /// Build a config from CLI flags and the process environment
    pub fn from_env(cli: CliOverrides) -> Self {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI flags, falling back to `lookup` for
    /// environment variables
    pub fn resolve(cli: CliOverrides, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ReplConfig::default();

        let history_path = cli.history.or_else(|| {
            lookup(HISTORY_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });

        let env_no_color = lookup(NO_COLOR_VAR).is_some_and(|v| !v.is_empty());
        let color = defaults.color && !cli.no_color && !env_no_color;

        ReplConfig {
            history_path,
            color,
            watch_file: cli.watch_file,
            ..defaults
        }
    }

    /// Turn colored output off globally when the config asks for it
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
