//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Results
//! go to stdout; errors and debug notes go to stderr.

use std::fmt::Display;

use crate::engine::{ModuleStatus, UpdateOutcome};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
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

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// One `pkg list` row: `[x] author/name  1.2.0`.
pub fn format_module(status: &ModuleStatus) -> String {
    let mark = if status.entry.enabled { "x" } else { " " };
    let version = status.local_version.as_deref().unwrap_or("(missing)");
    format!("[{}] {}  {}", mark, status.entry.identifier, version)
}

/// Human summary of an update.
pub fn format_update(id: impl Display, outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::UpToDate { version } => format!("{} is up to date ({})", id, version),
        UpdateOutcome::Updated { from, to } => format!("Updated {} {} -> {}", id, from, to),
        UpdateOutcome::Reinstalled { version } => format!("Reinstalled {} at {}", id, version),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Identifier, MetadataUrl};
    use crate::core::vault::VaultEntry;

    #[test]
    fn verbosity_quiet_wins() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn module_row() {
        let mut status = ModuleStatus {
            entry: VaultEntry::installed(Identifier::new("a/b").unwrap(), MetadataUrl::new("u")),
            local_version: Some("1.0".into()),
        };
        assert_eq!(format_module(&status), "[x] a/b  1.0");

        status.entry.enabled = false;
        status.local_version = None;
        assert_eq!(format_module(&status), "[ ] a/b  (missing)");
    }

    #[test]
    fn update_summary() {
        let outcome = UpdateOutcome::Updated {
            from: "1".into(),
            to: "2".into(),
        };
        assert_eq!(format_update("a/b", &outcome), "Updated a/b 1 -> 2");
    }
}
