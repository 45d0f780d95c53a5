//! Diagnostic infrastructure for the Silica compiler.
//!
//! Diagnostics are built with a fluent API and collected in a
//! [`DiagnosticSink`]:
//!
//! ```
//! use silica_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
//! use silica_syntax::Span;
//!
//! let mut sink = DiagnosticSink::new();
//! sink.push(
//!     Diagnostic::error(ErrorCode::E4001)
//!         .with_message("undeclared identifier 'clk'")
//!         .with_label(Span::new(10, 13), "not found in this scope"),
//! );
//! assert!(sink.has_errors());
//! ```

mod diagnostic;
mod error_code;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use sink::{DiagnosticConfig, DiagnosticSink};
