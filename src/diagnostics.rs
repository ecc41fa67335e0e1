//! Per-call diagnostics.
//!
//! Operations that can warn without failing (redundant exclusions, missing
//! metadata keys, schema mismatches) take a `&mut Diagnostics` instead of
//! writing to a process-wide logger. Every entry is forwarded to the `log`
//! facade and kept, so callers can inspect what a specific call reported.
//!
//! ```rust
//! use diaqc::diagnostics::{Diagnostics, Level};
//!
//! let mut diag = Diagnostics::new("exclude");
//! diag.warning("Replicate 'S1' matched 2 exclusion criteria");
//! assert_eq!(diag.count(Level::Warning), 1);
//! assert!(!diag.has_errors());
//! ```

use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

/// Severity of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Informational note
    Info,
    /// Suspicious but non-fatal condition
    Warning,
    /// Failed check
    Error,
}

impl Level {
    fn symbol(self) -> &'static str {
        match self {
            Level::Info => "i",
            Level::Warning => "⚠",
            Level::Error => "✗",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// One recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub level: Level,
    /// Human-readable message
    pub message: String,
}

/// Diagnostics collected while running one operation
#[derive(Debug, Clone)]
pub struct Diagnostics {
    context: String,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector labelled with the calling context
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            entries: Vec::new(),
        }
    }

    /// Label given at construction
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Record an informational note
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Level::Warning, message.into());
    }

    /// Record an error
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        match level {
            Level::Info => log::info!("[{}] {}", self.context, message),
            Level::Warning => log::warn!("[{}] {}", self.context, message),
            Level::Error => log::error!("[{}] {}", self.context, message),
        }
        self.entries.push(Diagnostic { level, message });
    }

    /// All entries in the order they were recorded
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Messages recorded at exactly `level`
    pub fn messages(&self, level: Level) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |d| d.level == level)
            .map(|d| d.message.as_str())
    }

    /// Number of entries at exactly `level`
    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }

    /// True when any error was recorded
    pub fn has_errors(&self) -> bool {
        self.count(Level::Error) > 0
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format the entries with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            output.push_str(&format!("{}\n", style(&self.context).bold().cyan()));

            for entry in &self.entries {
                let label = match entry.level {
                    Level::Info => style(entry.level.label()).dim(),
                    Level::Warning => style(entry.level.label()).yellow().bold(),
                    Level::Error => style(entry.level.label()).red().bold(),
                };
                output.push_str(&format!(
                    "[{}] {}: {}\n",
                    entry.level.symbol(),
                    label,
                    entry.message
                ));
            }

            output.push_str(&format!(
                "{}: {} warnings, {} errors\n",
                style("Summary").bold(),
                style(self.count(Level::Warning)).yellow(),
                style(self.count(Level::Error)).red()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.context)?;
        for entry in &self.entries {
            writeln!(
                f,
                "[{}] {}: {}",
                entry.level.symbol(),
                entry.level.label(),
                entry.message
            )?;
        }
        writeln!(
            f,
            "Summary: {} warnings, {} errors",
            self.count(Level::Warning),
            self.count(Level::Error)
        )
    }
}
