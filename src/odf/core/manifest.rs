//! The `META-INF/manifest.xml` part.
//!
//! The manifest lists every file of the package with its media type; the
//! root entry `/` carries the document mimetype.

use crate::common::{Error, Result};
use crate::odf::core::xml::XmlPart;
use crate::odf::elements::element::{NodeId, Tree};

const FILE_ENTRY: &str = "manifest:file-entry";
const FULL_PATH: &str = "manifest:full-path";
const MEDIA_TYPE: &str = "manifest:media-type";

/// ODF manifest part
#[derive(Debug, Clone)]
pub struct Manifest {
    xml: XmlPart,
}

impl Manifest {
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            xml: XmlPart::from_bytes(path, bytes)?,
        })
    }

    pub fn xml(&self) -> &XmlPart {
        &self.xml
    }

    pub fn tree(&self) -> &Tree {
        self.xml.tree()
    }

    pub fn instance_id(&self) -> u64 {
        self.xml.instance_id()
    }

    fn entries(&self) -> impl Iterator<Item = NodeId> + '_ {
        let tree = self.xml.tree();
        tree.children(self.xml.root())
            .iter()
            .copied()
            .filter(move |&c| tree.tag(c) == FILE_ENTRY)
    }

    fn entry(&self, full_path: &str) -> Option<NodeId> {
        let tree = self.xml.tree();
        self.entries().find(|&e| tree.attribute(e, FULL_PATH) == Some(full_path))
    }

    /// Every full path, in manifest order
    pub fn get_paths(&self) -> Vec<String> {
        let tree = self.xml.tree();
        self.entries()
            .filter_map(|e| tree.attribute(e, FULL_PATH).map(str::to_string))
            .collect()
    }

    /// `(full path, media type)` pairs, in manifest order
    pub fn get_path_medias(&self) -> Vec<(String, String)> {
        let tree = self.xml.tree();
        self.entries()
            .filter_map(|e| {
                let path = tree.attribute(e, FULL_PATH)?;
                let media = tree.attribute(e, MEDIA_TYPE).unwrap_or_default();
                Some((path.to_string(), media.to_string()))
            })
            .collect()
    }

    /// Media type of a path; `None` when the path is not listed.
    pub fn get_media_type(&self, full_path: &str) -> Option<&str> {
        let entry = self.entry(full_path)?;
        Some(self.xml.tree().attribute(entry, MEDIA_TYPE).unwrap_or_default())
    }

    /// Change the media type of an existing entry.
    pub fn set_media_type(&mut self, full_path: &str, media_type: &str) -> Result<()> {
        let entry = self
            .entry(full_path)
            .ok_or_else(|| Error::NotFound(format!("manifest entry '{full_path}'")))?;
        self.xml.tree_mut().set_attribute(entry, MEDIA_TYPE, media_type);
        Ok(())
    }

    /// Add an entry, or update the media type of an existing one.
    pub fn add_full_path(&mut self, full_path: &str, media_type: &str) {
        if let Some(entry) = self.entry(full_path) {
            self.xml.tree_mut().set_attribute(entry, MEDIA_TYPE, media_type);
            return;
        }
        let root = self.xml.root();
        let tree = self.xml.tree_mut();
        let entry = tree.create_element(FILE_ENTRY);
        tree.set_attribute(entry, FULL_PATH, full_path);
        tree.set_attribute(entry, MEDIA_TYPE, media_type);
        tree.append_child(root, entry);
    }

    pub fn del_full_path(&mut self, full_path: &str) -> Result<()> {
        let entry = self
            .entry(full_path)
            .ok_or_else(|| Error::NotFound(format!("manifest entry '{full_path}'")))?;
        self.xml.tree_mut().detach(entry);
        Ok(())
    }

    pub fn serialize(&self, pretty: bool) -> Result<Vec<u8>> {
        self.xml.serialize(pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<manifest:manifest manifest:version="1.2">
 <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
 <manifest:file-entry manifest:full-path="Pictures/" manifest:media-type=""/>
</manifest:manifest>"#;

    #[test]
    fn test_paths_and_media_types() {
        let manifest = Manifest::from_bytes("META-INF/manifest.xml", MANIFEST.as_bytes()).unwrap();
        assert_eq!(manifest.get_paths(), vec!["/", "content.xml", "Pictures/"]);
        assert_eq!(manifest.get_media_type("content.xml"), Some("text/xml"));
        assert_eq!(manifest.get_media_type("Pictures/"), Some(""));
        assert_eq!(manifest.get_media_type("missing.png"), None);
        assert_eq!(manifest.get_path_medias()[0].1, "application/vnd.oasis.opendocument.text");
    }

    #[test]
    fn test_add_update_delete() {
        let mut manifest = Manifest::from_bytes("META-INF/manifest.xml", MANIFEST.as_bytes()).unwrap();
        manifest.add_full_path("Pictures/a.png", "image/png");
        manifest.add_full_path("Pictures/a.png", "image/x-png");
        assert_eq!(manifest.get_paths().len(), 4);
        assert_eq!(manifest.get_media_type("Pictures/a.png"), Some("image/x-png"));

        manifest.set_media_type("/", "application/vnd.oasis.opendocument.text-template").unwrap();
        assert!(manifest.set_media_type("nope", "x").unwrap_err().is_not_found());

        manifest.del_full_path("Pictures/a.png").unwrap();
        assert!(manifest.get_media_type("Pictures/a.png").is_none());
        assert!(manifest.del_full_path("Pictures/a.png").is_err());
    }
}
