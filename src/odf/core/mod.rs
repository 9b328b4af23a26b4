//! Package-level building blocks: the archive store, the zip writer and
//! templates, save options, and the typed XML parts.

/// In-memory archive store
mod container;
/// ODF manifest part
mod manifest;
/// ODF metadata part
mod metadata;
/// Save and render options
mod options;
/// ODF package writing and templates
mod writer;
/// Typed XML parts
mod xml;

pub use container::Container;
pub use manifest::Manifest;
pub use metadata::{Meta, parse_datetime};
pub use options::{Packaging, SaveOptions, TextMode};
pub use writer::{OdfStructure, PackageWriter};
pub use xml::{Content, Styles, XmlPart};
