//! Save configuration.

/// How a document is packaged on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Packaging {
    /// Zip archive with `mimetype` stored first (the normal ODF package)
    #[default]
    Zip,
    /// Single flat XML file; not implemented, saving fails with `Unsupported`
    Flat,
    /// One file per part under a directory, for debugging
    Folder,
}

impl Packaging {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Flat => "flat",
            Self::Folder => "folder",
        }
    }
}

/// Options for saving a document.
///
/// # Examples
///
/// ```rust
/// use longan::odf::{Packaging, SaveOptions};
///
/// let options = SaveOptions::new()
///     .with_packaging(Packaging::Folder)
///     .with_pretty(true)
///     .with_backup(true);
/// assert_eq!(options.packaging, Packaging::Folder);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Package format
    pub packaging: Packaging,
    /// Indent the XML parts
    pub pretty: bool,
    /// Copy an existing target to `<target>.backup` before overwriting it
    pub backup: bool,
}

impl SaveOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_packaging(mut self, packaging: Packaging) -> Self {
        self.packaging = packaging;
        self
    }

    /// Set whether XML parts are pretty printed.
    ///
    /// Indentation is only added between elements, never inside text.
    #[inline]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[inline]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }
}

/// Output flavour of the formatted-text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Plain text with `[n]`, `(n)` and `[*]` markers
    #[default]
    Plain,
    /// reStructuredText: footnote directives, section underlines, grid
    /// tables and image substitutions
    Rst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SaveOptions::default();
        assert_eq!(options.packaging, Packaging::Zip);
        assert!(!options.pretty);
        assert!(!options.backup);
        assert_eq!(TextMode::default(), TextMode::Plain);
    }

    #[test]
    fn test_builder_chain() {
        let options = SaveOptions::new().with_pretty(true).with_packaging(Packaging::Flat);
        assert!(options.pretty);
        assert_eq!(options.packaging.as_str(), "flat");
    }
}
