//! Diagnostic sink for collecting diagnostics in source order.

use crate::Diagnostic;

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before further errors are dropped
    /// (0 = unlimited).
    pub error_limit: usize,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig { error_limit: 64 }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig { error_limit: 0 }
    }
}

/// Sink for collecting diagnostics during a compilation.
///
/// Diagnostics are kept in emission order, which matches source order for
/// a single-pass front end. Once the error limit is reached, further
/// errors are counted but not stored.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    dropped: usize,
    config: DiagnosticConfig,
}

impl DiagnosticSink {
    /// Create a sink with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink with a specific configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticSink {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic to the sink.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
            if self.config.error_limit != 0 && self.error_count > self.config.error_limit {
                self.dropped += 1;
                return;
            }
        }
        self.diagnostics.push(diagnostic);
    }

    /// Number of errors seen, including any dropped past the limit.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Check whether any errors were reported.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of errors dropped due to the error limit.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// View the collected diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the collected diagnostics, leaving the sink empty.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.dropped = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn counts_errors_not_warnings() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::warning(ErrorCode::E4006).with_message("shadowed"));
        assert!(!sink.has_errors());
        sink.push(Diagnostic::error(ErrorCode::E4001).with_message("undeclared"));
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn error_limit_drops_overflow() {
        let mut sink = DiagnosticSink::with_config(DiagnosticConfig { error_limit: 2 });
        for _ in 0..5 {
            sink.push(Diagnostic::error(ErrorCode::E4001).with_message("undeclared"));
        }
        assert_eq!(sink.error_count(), 5);
        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(sink.dropped_count(), 3);
    }

    #[test]
    fn flush_resets() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::error(ErrorCode::E9001).with_message("ice"));
        let taken = sink.flush();
        assert_eq!(taken.len(), 1);
        assert!(!sink.has_errors());
        assert!(sink.diagnostics().is_empty());
    }
}
