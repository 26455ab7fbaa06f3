//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output respects the quiet and debug flags. When running inside GitHub
//! Actions, notices, warnings and errors are emitted as workflow commands
//! (`::notice::...`) so they show up as annotations on the run, and step
//! outputs are appended to the `$GITHUB_OUTPUT` file.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    #[default]
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Kind of annotation, named as GitHub's workflow commands name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Notice,
    Warning,
    Error,
}

impl Level {
    fn command(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    fn plain_prefix(self) -> &'static str {
        match self {
            Level::Debug => "[debug] ",
            Level::Notice => "",
            Level::Warning => "warning: ",
            Level::Error => "error: ",
        }
    }
}

/// Where and how user-facing messages and step outputs go.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    verbosity: Verbosity,
    /// Render messages as GitHub workflow commands
    workflow_commands: bool,
    /// `$GITHUB_OUTPUT` file, if set
    output_file: Option<PathBuf>,
}

impl Reporter {
    /// Plain terminal output.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            workflow_commands: false,
            output_file: None,
        }
    }

    /// Detect GitHub Actions from `GITHUB_ACTIONS` and `GITHUB_OUTPUT`.
    pub fn from_env(verbosity: Verbosity) -> Self {
        let in_actions = std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            verbosity,
            workflow_commands: in_actions,
            output_file,
        }
    }

    pub fn with_workflow_commands(mut self, enabled: bool) -> Self {
        self.workflow_commands = enabled;
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Informational message (respects quiet mode).
    pub fn notice(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            println!("{}", self.render(Level::Notice, &message.to_string()));
        }
    }

    /// Debug message (only in debug mode).
    pub fn debug(&self, message: impl Display) {
        if self.verbosity == Verbosity::Debug {
            eprintln!("{}", self.render(Level::Debug, &message.to_string()));
        }
    }

    /// Warning message (respects quiet mode).
    pub fn warn(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            eprintln!("{}", self.render(Level::Warning, &message.to_string()));
        }
    }

    /// Format a message for the current mode.
    pub fn render(&self, level: Level, message: &str) -> String {
        if self.workflow_commands {
            format!("::{}::{}", level.command(), escape_data(message))
        } else {
            format!("{}{}", level.plain_prefix(), message)
        }
    }

    /// Publish a step output.
    ///
    /// Appended to the output file when one is configured; otherwise
    /// printed as `name=value` (respects quiet mode).
    pub fn set_output(&self, name: &str, value: &str) -> std::io::Result<()> {
        match &self.output_file {
            Some(path) => append_output(path, name, value),
            None => {
                if self.verbosity != Verbosity::Quiet {
                    println!("{}={}", name, value);
                }
                Ok(())
            }
        }
    }
}

/// Escape a message for a workflow command.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Render one `$GITHUB_OUTPUT` entry.
///
/// Multi-line values use the heredoc form with a delimiter that does not
/// occur in the value.
pub fn format_output(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{}={}\n", name, value);
    }
    let mut delimiter = String::from("TAGTRACK_EOF");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
}

fn append_output(path: &Path, name: &str, value: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_output(name, value).as_bytes())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
