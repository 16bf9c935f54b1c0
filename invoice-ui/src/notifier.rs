use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use invoice_core::{Notifier, Severity};
use tracing::debug;

/// Writes notifications straight to a terminal stream, stderr by default.
///
/// Independent of the log layers, so `--quiet` does not hide them.
#[derive(Debug)]
pub struct ConsoleNotifier<W = io::Stderr> {
    out: Mutex<W>,
}

impl ConsoleNotifier {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(
        &self,
        title: &str,
        message: &str,
        severity: Severity,
    ) {
        debug!(%severity, title, "notify");
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let label = match severity {
            Severity::Error => "error: ",
            Severity::Info | Severity::Success => "",
        };
        // Nowhere left to report a failed terminal write
        let _ = writeln!(out, "{label}{title}: {message}");
    }
}
