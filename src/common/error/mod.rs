//! Unified error types for the formatter.
//!
//! Conversion failures are reported through a single error type so callers
//! can tell malformed input apart from collaborator failures.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
