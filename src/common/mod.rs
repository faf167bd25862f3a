//! Common types and utilities shared by both conversion directions.
//!
//! This module provides the error type, HTML escaping, and the UTF-16
//! working representation every offset computation runs on.

// Submodule declarations
pub mod error;
pub mod escape;
pub mod utf16;

// Re-exports for convenience
pub use error::{Error, Result};
pub use utf16::{Utf16Text, collapse, expand, utf16_len};
