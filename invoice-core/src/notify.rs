//! User-facing notifications raised by save and validation.

use std::fmt;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Capability for surfacing a message to the user, passed in by whoever
/// owns the screen.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        title: &str,
        message: &str,
        severity: Severity,
    );
}
