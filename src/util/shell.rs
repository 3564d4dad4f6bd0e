//! Leveled console output for the build driver.
//!
//! Every user-facing line goes through [`Shell`], which prefixes it with the
//! level tag (`[I]`, `[W]`, `[E]`) and flushes immediately so the output
//! interleaves correctly with the child processes that share the terminal.
//!
//! The fatal path optionally blocks for operator acknowledgment. That
//! behavior is a [`PausePolicy`] chosen by the caller, never implicit.

use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, Write};

/// Message level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// The bracketed tag printed before the message.
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Info => "[I]",
            Level::Warning => "[W]",
            Level::Error => "[E]",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            // Info: bold blue
            Level::Info => "\x1b[1;34m",
            // Warning: bold yellow
            Level::Warning => "\x1b[1;33m",
            // Error: bold red
            Level::Error => "\x1b[1;31m",
        }
    }
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// What to do after a fatal error has been printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PausePolicy {
    /// Wait for Enter, but only when stdin is a terminal.
    #[default]
    Interactive,
    /// Never block.
    Never,
}

impl PausePolicy {
    /// Pick the policy from the explicit flag and the environment.
    ///
    /// A non-empty `CI` variable always disables the pause.
    pub fn resolve(no_pause: bool, ci: Option<&str>) -> Self {
        let in_ci = ci.is_some_and(|v| !v.is_empty());
        if no_pause || in_ci {
            PausePolicy::Never
        } else {
            PausePolicy::Interactive
        }
    }
}

/// Console output for the build driver.
#[derive(Debug, Clone)]
pub struct Shell {
    use_color: bool,
    pause: PausePolicy,
}

impl Shell {
    /// Create a new shell.
    pub fn new(color: ColorChoice, pause: PausePolicy) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell { use_color, pause }
    }

    /// Print an `[I]` line.
    pub fn info(&self, msg: impl Display) {
        self.emit(Level::Info, msg);
    }

    /// Print a `[W]` line.
    pub fn warn(&self, msg: impl Display) {
        self.emit(Level::Warning, msg);
    }

    /// Print an `[E]` line.
    pub fn error(&self, msg: impl Display) {
        self.emit(Level::Error, msg);
    }

    /// Print an unprefixed line.
    pub fn print(&self, msg: impl Display) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", msg);
        let _ = out.flush();
    }

    /// Report a fatal error and apply the pause policy.
    ///
    /// Terminating the process is left to the caller.
    pub fn fatal(&self, msg: impl Display) {
        self.error(msg);
        self.wait_for_ack();
    }

    fn wait_for_ack(&self) {
        if self.pause == PausePolicy::Never || !io::stdin().is_terminal() {
            return;
        }

        self.print("Press Enter to continue . . .");
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }

    fn emit(&self, level: Level, msg: impl Display) {
        let line = self.format_line(level, msg);
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }

    /// Format a message with its level tag.
    pub fn format_line(&self, level: Level, msg: impl Display) -> String {
        if self.use_color {
            format!("{}{}\x1b[0m {}", level.color_code(), level.tag(), msg)
        } else {
            format!("{} {}", level.tag(), msg)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ColorChoice::Auto, PausePolicy::default())
    }
}
