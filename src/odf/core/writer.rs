//! ODF package writing and built-in templates.
//!
//! [`PackageWriter`] streams parts into a zip archive with the `mimetype`
//! entry first and uncompressed, as ODF consumers require.
//! [`OdfStructure`] produces the parts of the built-in blank documents.

use crate::common::{Error, Result};
use crate::odf::constants::{
    ODF_CONTENT, ODF_DRAWING, ODF_MANIFEST, ODF_META, ODF_MIMETYPE, ODF_PRESENTATION,
    ODF_SETTINGS, ODF_SPREADSHEET, ODF_STYLES, ODF_TEXT, OFFICE_VERSION,
};
use std::io::{Seek, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Streaming writer for ODF zip packages.
///
/// # Examples
///
/// ```
/// # use longan::odf::core::PackageWriter;
/// # use longan::Result;
/// # fn example() -> Result<()> {
/// let mut writer = PackageWriter::new(std::io::Cursor::new(Vec::new()));
/// writer.write_mimetype("application/vnd.oasis.opendocument.text")?;
/// writer.add_file("content.xml", b"<office:document-content/>")?;
/// let bytes = writer.finish()?.into_inner();
/// assert!(!bytes.is_empty());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct PackageWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
    mimetype_written: bool,
    entries: usize,
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip_writer: ZipWriter::new(writer),
            mimetype_written: false,
            entries: 0,
        }
    }

    /// Write the `mimetype` entry. Must come before any other file.
    pub fn write_mimetype(&mut self, mimetype: &str) -> Result<()> {
        if self.entries > 0 {
            return Err(Error::Invariant("mimetype must be the first entry".to_string()));
        }
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        self.zip_writer.start_file(ODF_MIMETYPE, options)?;
        self.zip_writer.write_all(mimetype.as_bytes())?;
        self.mimetype_written = true;
        self.entries += 1;
        Ok(())
    }

    /// Add a deflated file to the package.
    pub fn add_file(&mut self, path: &str, content: &[u8]) -> Result<()> {
        if !self.mimetype_written {
            return Err(Error::Invariant(format!("'{path}' written before mimetype")));
        }
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip_writer.start_file(path, options)?;
        self.zip_writer.write_all(content)?;
        self.entries += 1;
        log::debug!("wrote {path} ({} bytes)", content.len());
        Ok(())
    }

    /// Number of entries written so far
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Finalize the archive and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip_writer.finish()?)
    }
}

const OFFICE_NAMESPACES: &str = concat!(
    r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" "#,
    r#"xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" "#,
    r#"xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" "#,
    r#"xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" "#,
    r#"xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" "#,
    r#"xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" "#,
    r#"xmlns:xlink="http://www.w3.org/1999/xlink" "#,
    r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
    r#"xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" "#,
    r#"xmlns:number="urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0" "#,
    r#"xmlns:presentation="urn:oasis:names:tc:opendocument:xmlns:presentation:1.0" "#,
    r#"xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" "#,
    r#"xmlns:chart="urn:oasis:names:tc:opendocument:xmlns:chart:1.0" "#,
    r#"xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0""#,
);

/// Built-in blank documents
pub struct OdfStructure;

impl OdfStructure {
    /// Mimetype and body tag of a template kind (`text`, `spreadsheet`,
    /// `presentation`, `drawing` or `graphics`).
    pub fn template_kind(kind: &str) -> Result<(&'static str, &'static str)> {
        match kind {
            "text" => Ok((ODF_TEXT, "office:text")),
            "spreadsheet" => Ok((ODF_SPREADSHEET, "office:spreadsheet")),
            "presentation" => Ok((ODF_PRESENTATION, "office:presentation")),
            "drawing" | "graphics" => Ok((ODF_DRAWING, "office:drawing")),
            _ => Err(Error::InvalidArgument(format!("unknown template '{kind}'"))),
        }
    }

    /// Every part of a blank document, `mimetype` included.
    pub fn template_parts(kind: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let (mimetype, body_tag) = Self::template_kind(kind)?;
        let parts = vec![
            (ODF_MIMETYPE.to_string(), mimetype.as_bytes().to_vec()),
            (ODF_CONTENT.to_string(), Self::default_content_xml(body_tag).into_bytes()),
            (ODF_STYLES.to_string(), Self::default_styles_xml().into_bytes()),
            (ODF_META.to_string(), Self::default_meta_xml().into_bytes()),
            (ODF_SETTINGS.to_string(), Self::default_settings_xml().into_bytes()),
            (ODF_MANIFEST.to_string(), Self::default_manifest_xml(mimetype).into_bytes()),
        ];
        Ok(parts)
    }

    pub fn default_content_xml(body_tag: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {OFFICE_NAMESPACES} office:version="{OFFICE_VERSION}">
  <office:scripts/>
  <office:font-face-decls/>
  <office:automatic-styles/>
  <office:body>
    <{body_tag}/>
  </office:body>
</office:document-content>
"#
        )
    }

    pub fn default_styles_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles {OFFICE_NAMESPACES} office:version="{OFFICE_VERSION}">
  <office:font-face-decls/>
  <office:styles>
    <style:default-style style:family="paragraph">
      <style:text-properties fo:font-size="12pt"/>
    </style:default-style>
    <style:style style:name="Standard" style:family="paragraph" style:class="text"/>
  </office:styles>
  <office:automatic-styles>
    <style:page-layout style:name="pm1">
      <style:page-layout-properties fo:page-width="21cm" fo:page-height="29.7cm"/>
    </style:page-layout>
  </office:automatic-styles>
  <office:master-styles>
    <style:master-page style:name="Standard" style:page-layout-name="pm1"/>
  </office:master-styles>
</office:document-styles>
"#
        )
    }

    pub fn default_meta_xml() -> String {
        let now = chrono::Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta {OFFICE_NAMESPACES} office:version="{OFFICE_VERSION}">
  <office:meta>
    <meta:creation-date>{now}</meta:creation-date>
    <dc:date>{now}</dc:date>
    <meta:editing-cycles>1</meta:editing-cycles>
  </office:meta>
</office:document-meta>
"#
        )
    }

    pub fn default_settings_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-settings {OFFICE_NAMESPACES} office:version="{OFFICE_VERSION}">
  <office:settings>
    <config:config-item-set config:name="ooo:view-settings">
      <config:config-item config:name="ViewAreaTop" config:type="long">0</config:config-item>
      <config:config-item config:name="ViewAreaLeft" config:type="long">0</config:config-item>
    </config:config-item-set>
  </office:settings>
</office:document-settings>
"#
        )
    }

    pub fn default_manifest_xml(mimetype: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="{OFFICE_VERSION}">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="{mimetype}"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="styles.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="meta.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="settings.xml" manifest:media-type="text/xml"/>
</manifest:manifest>
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::elements::parser::parse;
    use std::io::{Cursor, Read};

    #[test]
    fn test_mimetype_first_and_stored() {
        let mut writer = PackageWriter::new(Cursor::new(Vec::new()));
        writer.write_mimetype(ODF_TEXT).unwrap();
        writer.add_file("content.xml", b"<a/>").unwrap();
        assert_eq!(writer.len(), 2);
        let bytes = writer.finish().unwrap().into_inner();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        let mut mimetype = String::new();
        first.read_to_string(&mut mimetype).unwrap();
        assert_eq!(mimetype, ODF_TEXT);
    }

    #[test]
    fn test_file_before_mimetype_is_rejected() {
        let mut writer = PackageWriter::new(Cursor::new(Vec::new()));
        assert!(matches!(writer.add_file("content.xml", b"<a/>"), Err(Error::Invariant(_))));
    }

    #[test]
    fn test_templates_parse() {
        for kind in ["text", "spreadsheet", "presentation", "drawing", "graphics"] {
            for (path, bytes) in OdfStructure::template_parts(kind).unwrap() {
                if path != ODF_MIMETYPE {
                    assert!(parse(&bytes).is_ok(), "{kind}: {path}");
                }
            }
        }
        assert!(OdfStructure::template_parts("database").is_err());
    }
}
