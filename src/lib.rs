pub mod analysis;
pub mod check;
pub mod config;
pub mod diagnostics;
pub mod sql;
pub mod syntax;

// Re-export commonly used types
pub use check::Report;
pub use config::{CheckOptions, LimitCounting, ReadBackBasis};
pub use diagnostics::{Diagnostic, DiagnosticKind, Position};
