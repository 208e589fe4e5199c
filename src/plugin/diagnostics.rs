//! Diagnostic Output
//!
//! Where the registry reports plugins it could not load. The default sink is
//! the process-wide stderr stream; `BufferSink` captures the text instead.

use std::io::{self, Write};
use parking_lot::Mutex;

/// Receiver for human-readable load diagnostics
pub trait DiagnosticSink: Send + Sync {
    /// Write a complete diagnostic message
    fn report(&self, message: &str);
}

/// Build the two-line message for a library that failed to load
pub fn format_load_failure(path: &str, message: &str) -> String {
    format!("Error opening '{}': {}\n  -load request ignored.\n", path, message)
}

/// Writes diagnostics to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, message: &str) {
        let mut stderr = io::stderr().lock();
        // Nothing sensible to do if stderr itself is gone
        let _ = stderr.write_all(message.as_bytes());
        let _ = stderr.flush();
    }
}

/// Accumulates diagnostics in memory
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: Mutex<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}

impl DiagnosticSink for BufferSink {
    fn report(&self, message: &str) {
        self.buffer.lock().push_str(message);
    }
}
