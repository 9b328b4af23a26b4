//! Unified error types for longan.
//!
//! This module provides a single error type shared by the container, the part
//! registry, the style engines, the renderer and the span splicer.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
