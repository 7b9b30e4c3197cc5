//! Diagnostic side channel
//!
//! Features report non-fatal conditions (such as an unsupported sensor) through an
//! injected [`DiagnosticSink`] instead of a global logger, so callers decide where
//! the notices go and tests can inspect them.

use log::Level;
use std::sync::Mutex;

/// A single diagnostic notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    /// Feature that emitted the notice
    pub feature: String,
    pub message: String,
}

/// Receiver for diagnostics emitted during feature computation
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);

    fn info(&self, feature: &str, message: &str) {
        self.emit(Diagnostic {
            level: Level::Info,
            feature: feature.to_string(),
            message: message.to_string(),
        });
    }
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::log!(diagnostic.level, "[{}] {}", diagnostic.feature, diagnostic.message);
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push(diagnostic);
    }
}
