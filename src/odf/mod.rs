//! OpenDocument packages.
//!
//! [`Document`] is the entry point: it owns the package container, caches the
//! typed XML parts, manages styles and renders the body as text.

/// Mimetypes, part paths and element tables
pub mod constants;
/// Package container, manifest, metadata and XML parts
pub mod core;
/// The document handle
pub mod document;
/// ODF XML element helpers
pub mod elements;
/// Formatted-text rendering
pub mod render;

pub use core::{Packaging, SaveOptions, TextMode};
pub use document::Document;
