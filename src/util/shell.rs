//! Centralized shell output.
//!
//! The Shell is the user-facing channel for everything gzbuild reports:
//! - Status messages with right-aligned, colored status words
//! - Configure-style `Message`/`Result` lines for capability probes
//! - Progress bars (via indicatif) for long-running release steps
//! - JSON output mode for machine-readable output
//!
//! Status lines go to stderr. Probe results go to stdout so an outer build
//! can capture them.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Shell output mode - Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors and progress bars.
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Machine-readable JSON output only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: no status lines, no progress
    Quiet,
    #[default]
    Normal,
    /// --verbose: no progress bars, per-item lines instead
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
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

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Created,
    Installed,
    Finished,
    Removed,

    // In-progress statuses (cyan)
    Cleaning,
    Staging,
    Copying,
    Pruning,
    Packaging,

    // Info statuses (blue/default)
    Info,

    // Warning statuses (yellow)
    Skipped,
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Installed => "Installed",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Cleaning => "Cleaning",
            Status::Staging => "Staging",
            Status::Copying => "Copying",
            Status::Pruning => "Pruning",
            Status::Packaging => "Packaging",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Created | Status::Installed | Status::Finished | Status::Removed => {
                "\x1b[1;32m"
            }
            Status::Cleaning
            | Status::Staging
            | Status::Copying
            | Status::Pruning
            | Status::Packaging => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
        }
    }

    /// Get the width for alignment (12 characters).
    fn width(&self) -> usize {
        12
    }
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
    /// Probe message waiting for its result
    pending_message: Mutex<Option<String>>,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell {
            mode,
            use_color,
            pending_message: Mutex::new(None),
        }
    }

    /// Create a shell from CLI flags with proper precedence.
    ///
    /// JSON mode takes precedence over quiet/verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    /// A shell that prints nothing. Used by library callers and tests.
    pub fn silent() -> Self {
        Shell::new(ShellMode::Human {
            verbosity: Verbosity::Quiet,
            color: ColorChoice::Never,
        })
    }

    pub fn is_quiet(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                ..
            }
        )
    }

    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    ///
    /// Nothing is printed in quiet or JSON mode; errors reach the user
    /// through the returned `Result` instead.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || self.is_quiet() {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Announce a check whose outcome follows via [`Shell::result`].
    pub fn message(&self, msg: impl Display) {
        if let Ok(mut pending) = self.pending_message.lock() {
            *pending = Some(msg.to_string());
        }
    }

    /// Complete the pending [`Shell::message`] with `yes` or `no`.
    pub fn result(&self, ok: bool) {
        let pending = self
            .pending_message
            .lock()
            .ok()
            .and_then(|mut p| p.take());

        if self.is_json() || self.is_quiet() {
            return;
        }

        let answer = if ok { "yes" } else { "no" };
        let mut stdout = io::stdout().lock();
        let _ = match pending {
            Some(msg) => writeln!(stdout, "{} {}", msg, answer),
            None => writeln!(stdout, "{}", answer),
        };
        let _ = stdout.flush();
    }

    /// Print a JSON event to stdout.
    ///
    /// Only works in JSON mode; silently ignored in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }

        let json_str = serde_json::to_string(event).unwrap_or_default();
        println!("{}", json_str);
        let _ = io::stdout().flush();
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        let width = status.width();

        if self.use_color {
            format!("{}{:>width$}\x1b[0m", status.color_code(), text, width = width)
        } else {
            format!("{:>width$}", text, width = width)
        }
    }

    /// Create a progress bar.
    ///
    /// Hidden in quiet, verbose and JSON modes, and when stderr is not a
    /// terminal.
    pub fn progress(&self, total: u64, msg: impl Display) -> Progress<'_> {
        let pb = if self.is_quiet()
            || self.is_verbose()
            || self.is_json()
            || total <= 1
            || !io::stderr().is_terminal()
        {
            None
        } else {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(msg.to_string());
            Some(pb)
        };

        Progress {
            shell: self,
            pb,
            current: 0,
            total,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// Progress bar wrapper that respects shell mode.
pub struct Progress<'a> {
    shell: &'a Shell,
    pb: Option<ProgressBar>,
    current: u64,
    total: u64,
}

impl Progress<'_> {
    /// Advance by `delta`, naming the item just handled.
    pub fn inc(&mut self, delta: u64, item: impl Display) {
        self.current += delta;

        if let Some(pb) = &self.pb {
            pb.inc(delta);
        }

        if self.shell.is_verbose() {
            eprintln!("  {} [{}/{}]", item, self.current, self.total);
        }
    }

    pub fn position(&self) -> u64 {
        self.current
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Progress<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_modes() {
        let shell = Shell::new(ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Never,
        });
        assert!(!shell.is_quiet());
        assert!(!shell.is_verbose());
        assert!(!shell.is_json());

        assert!(Shell::silent().is_quiet());
        assert!(Shell::new(ShellMode::Json).is_json());
    }

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("ALWAYS".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("sometimes".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Never,
        });

        let formatted = shell.format_status(Status::Packaging);
        assert_eq!(formatted.trim(), "Packaging");
        assert_eq!(formatted.len(), 12);
    }

    #[test]
    fn test_from_flags() {
        assert!(Shell::from_flags(true, false, ColorChoice::Auto, false).is_quiet());
        assert!(Shell::from_flags(false, true, ColorChoice::Auto, false).is_verbose());

        // JSON takes precedence
        let shell = Shell::from_flags(true, true, ColorChoice::Auto, true);
        assert!(shell.is_json());
        assert!(!shell.is_quiet());
    }

    #[test]
    fn test_result_consumes_pending_message() {
        let shell = Shell::silent();
        shell.message("Checking for ODE...");
        shell.result(false);
        assert!(shell.pending_message.lock().unwrap().is_none());
    }

    #[test]
    fn test_progress_counts_without_bar() {
        let shell = Shell::silent();
        let mut progress = shell.progress(3, "archiving");
        progress.inc(1, "a");
        progress.inc(2, "b");
        assert_eq!(progress.position(), 3);
    }
}
