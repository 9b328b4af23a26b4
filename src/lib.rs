//! Longan - A Rust library for editing OpenDocument packages
//!
//! This library reads, edits and writes ODF documents (.odt, .ods, .odp,
//! .odg and their templates) at the package and style level.
//!
//! # Features
//!
//! - **Package access**: Read and write zip, folder and in-memory packages
//! - **Typed parts**: Content, styles, meta, settings and manifest, parsed lazily and cached
//! - **Style engine**: Query, insert, delete and merge styles across parts
//! - **Text rendering**: Plain text and reStructuredText output with notes, annotations, lists, tables and images
//! - **Templates**: Create blank documents or instantiate `.ott`/`.otp` templates
//!
//! # Example - Extracting text
//!
//! ```no_run
//! use longan::odf::{Document, TextMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::open("report.odt")?;
//! println!("{}", doc.get_formatted_meta()?);
//! println!("{}", doc.get_formatted_text(TextMode::Rst)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Copying styles between documents
//!
//! ```no_run
//! use longan::odf::{Document, SaveOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut theme = Document::open("theme.ott")?;
//! let mut doc = Document::new_from_template("text")?;
//! let copied = doc.merge_styles_from(&mut theme)?;
//! println!("copied {copied} styles");
//! doc.save(Some(Path::new("styled.odt")), &SaveOptions::new())?;
//! # Ok(())
//! # }
//! ```

/// Errors and shared result type
pub mod common;

/// OpenDocument packages, parts and styles
pub mod odf;

pub use common::{Error, Result};
pub use odf::Document;
