//! Unified error type for longan.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! distinguishes programming/input mistakes (`NotFound`, `Invariant`,
//! `InvalidArgument`, `Unsupported`) from failures of the collaborators the
//! document layer sits on (I/O, XML, ZIP).
use thiserror::Error;

/// Main error type for longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing part, path, element or manifest entry
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempt to break a structural rule of the package, e.g. deleting a
    /// mandatory part or opening an archive that is not an ODF document
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Conflicting or unrecognized arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Combination of inputs this crate does not handle
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed bytes where XML or text was expected
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// XML reading or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Invalid regular expression given for span styling
    #[error("Pattern error: {0}")]
    Pattern(String),
}

/// Result type for longan operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error reports a missing part, path or element.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
