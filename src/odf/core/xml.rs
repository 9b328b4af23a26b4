//! Typed XML parts: the shared [`XmlPart`] base, `content.xml` and
//! `styles.xml`.

use crate::common::Result;
use crate::odf::constants::{PART_CHILD_ORDER, STYLE_CONTAINERS};
use crate::odf::elements::element::{NodeId, Tree};
use crate::odf::elements::parser;
use crate::odf::elements::style::{style_display_name, style_family, style_matches};
use crate::odf::elements::tag_matcher::match_tag;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

fn next_instance_id() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// A parsed XML part of the package.
///
/// Each materialized part gets a process-unique instance id, including
/// clones, so callers can tell a re-parsed part from a cached one.
#[derive(Debug)]
pub struct XmlPart {
    path: String,
    tree: Tree,
    instance_id: u64,
}

impl Clone for XmlPart {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            tree: self.tree.clone(),
            instance_id: next_instance_id(),
        }
    }
}

impl XmlPart {
    /// Parse a part from its archive bytes
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self> {
        let tree = parser::parse(bytes)?;
        Ok(Self {
            path: path.to_string(),
            tree,
            instance_id: next_instance_id(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// First element with the given tag: the root itself or a descendant.
    pub fn get_element(&self, tag: &str) -> Option<NodeId> {
        let root = self.tree.root();
        if self.tree.tag(root) == tag {
            return Some(root);
        }
        self.tree.find_first(root, tag)
    }

    /// Top-level child of the root with the given tag, created at its
    /// canonical position when missing.
    pub fn ensure_top_level(&mut self, tag: &str) -> NodeId {
        let root = self.tree.root();
        if let Some(existing) = self.tree.child_by_tag(root, tag) {
            return existing;
        }
        let rank = |t: &str| PART_CHILD_ORDER.iter().position(|o| *o == t).unwrap_or(PART_CHILD_ORDER.len());
        let wanted = rank(tag);
        let position = self
            .tree
            .children(root)
            .iter()
            .position(|&c| rank(self.tree.tag(c)) > wanted)
            .unwrap_or(self.tree.children(root).len());
        let node = self.tree.create_element(tag);
        self.tree.insert_child(root, position, node);
        log::debug!("created <{tag}> in {}", self.path);
        node
    }

    /// Serialize the part for the archive.
    pub fn serialize(&self, pretty: bool) -> Result<Vec<u8>> {
        parser::serialize(&self.tree, pretty)
    }

    /// Registered style children of the given top-level containers,
    /// optionally restricted to one family.
    pub(crate) fn styles_in(&self, containers: &[&str], family: Option<&str>) -> Vec<NodeId> {
        let root = self.tree.root();
        let mut out = Vec::new();
        for container in containers {
            let Some(node) = self.tree.child_by_tag(root, container) else {
                continue;
            };
            for &child in self.tree.children(node) {
                if !match_tag(self.tree.tag(child)).is_registered_style() {
                    continue;
                }
                if let Some(family) = family
                    && style_family(&self.tree, child).as_deref() != Some(family)
                {
                    continue;
                }
                out.push(child);
            }
        }
        out
    }

    /// First style of `family` in the containers, by name, display name, or
    /// the family default when both are `None`.
    pub(crate) fn find_style(
        &self,
        containers: &[&str],
        family: &str,
        name: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<NodeId> {
        self.styles_in(containers, Some(family))
            .into_iter()
            .find(|&node| match display_name {
                Some(display) => style_display_name(&self.tree, node) == Some(display),
                None => style_matches(&self.tree, node, family, name),
            })
    }
}

/// Style containers searched in `content.xml`
const CONTENT_STYLE_CONTAINERS: [&str; 2] = ["office:automatic-styles", "office:font-face-decls"];


/// The `content.xml` part
#[derive(Debug, Clone)]
pub struct Content {
    xml: XmlPart,
}

impl Content {
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            xml: XmlPart::from_bytes(path, bytes)?,
        })
    }

    pub fn xml(&self) -> &XmlPart {
        &self.xml
    }

    pub fn xml_mut(&mut self) -> &mut XmlPart {
        &mut self.xml
    }

    pub fn tree(&self) -> &Tree {
        self.xml.tree()
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        self.xml.tree_mut()
    }

    pub fn instance_id(&self) -> u64 {
        self.xml.instance_id()
    }

    /// The element actual content goes into: the first child of `office:body`
    /// (`office:text`, `office:presentation`, ...).
    pub fn body(&self) -> Option<NodeId> {
        let body = self.xml.get_element("office:body")?;
        self.tree().children(body).first().copied()
    }

    /// Styles declared in the content part
    pub fn get_styles(&self, family: Option<&str>) -> Vec<NodeId> {
        self.xml.styles_in(&CONTENT_STYLE_CONTAINERS, family)
    }

    pub fn get_style(&self, family: &str, name: Option<&str>, display_name: Option<&str>) -> Option<NodeId> {
        self.xml.find_style(&CONTENT_STYLE_CONTAINERS, family, name, display_name)
    }
}

/// The `styles.xml` part
#[derive(Debug, Clone)]
pub struct Styles {
    xml: XmlPart,
}

impl Styles {
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            xml: XmlPart::from_bytes(path, bytes)?,
        })
    }

    pub fn xml(&self) -> &XmlPart {
        &self.xml
    }

    pub fn xml_mut(&mut self) -> &mut XmlPart {
        &mut self.xml
    }

    pub fn tree(&self) -> &Tree {
        self.xml.tree()
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        self.xml.tree_mut()
    }

    pub fn instance_id(&self) -> u64 {
        self.xml.instance_id()
    }

    /// Styles of the part; `automatic` limits the search to
    /// `office:automatic-styles`.
    pub fn get_styles(&self, family: Option<&str>, automatic: bool) -> Vec<NodeId> {
        if automatic {
            self.xml.styles_in(&["office:automatic-styles"], family)
        } else {
            self.xml.styles_in(&STYLE_CONTAINERS, family)
        }
    }

    pub fn get_style(&self, family: &str, name: Option<&str>, display_name: Option<&str>) -> Option<NodeId> {
        self.xml.find_style(&STYLE_CONTAINERS, family, name, display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<office:document-styles>
  <office:font-face-decls><style:font-face style:name="Sans" svg:font-family="Sans"/></office:font-face-decls>
  <office:styles>
    <style:default-style style:family="paragraph"/>
    <style:style style:name="Standard" style:family="paragraph" style:display-name="Default Paragraph"/>
    <text:list-style style:name="L1"/>
  </office:styles>
  <office:automatic-styles><style:page-layout style:name="pm1"/></office:automatic-styles>
  <office:master-styles><style:master-page style:name="Standard" style:page-layout-name="pm1"/></office:master-styles>
</office:document-styles>"#;

    #[test]
    fn test_styles_lookup() {
        let styles = Styles::from_bytes("styles.xml", STYLES.as_bytes()).unwrap();
        let tree = styles.tree();

        let default = styles.get_style("paragraph", None, None).unwrap();
        assert_eq!(tree.tag(default), "style:default-style");

        let standard = styles.get_style("paragraph", Some("Standard"), None).unwrap();
        assert_eq!(tree.attribute(standard, "style:display-name"), Some("Default Paragraph"));
        assert_eq!(styles.get_style("paragraph", None, Some("Default Paragraph")), Some(standard));

        let master = styles.get_style("master-page", Some("Standard"), None).unwrap();
        assert_eq!(tree.tag(master), "style:master-page");
        assert!(styles.get_style("list", Some("L1"), None).is_some());
        assert!(styles.get_style("font-face", Some("Sans"), None).is_some());
        assert!(styles.get_style("text", Some("Standard"), None).is_none());
    }

    #[test]
    fn test_styles_listing() {
        let styles = Styles::from_bytes("styles.xml", STYLES.as_bytes()).unwrap();
        assert_eq!(styles.get_styles(None, false).len(), 6);
        assert_eq!(styles.get_styles(None, true).len(), 1);
        assert_eq!(styles.get_styles(Some("paragraph"), false).len(), 2);
    }

    #[test]
    fn test_content_body_and_container_creation() {
        let xml = br#"<office:document-content><office:scripts/><office:body><office:text><text:p>x</text:p></office:text></office:body></office:document-content>"#;
        let mut content = Content::from_bytes("content.xml", xml).unwrap();
        let body = content.body().unwrap();
        assert_eq!(content.tree().tag(body), "office:text");

        let auto = content.xml_mut().ensure_top_level("office:automatic-styles");
        let root = content.xml().root();
        let tags: Vec<&str> = content.tree().children(root).iter().map(|&c| content.tree().tag(c)).collect();
        assert_eq!(tags, vec!["office:scripts", "office:automatic-styles", "office:body"]);
        assert_eq!(content.xml_mut().ensure_top_level("office:automatic-styles"), auto);
    }

    #[test]
    fn test_clone_gets_new_instance_id() {
        let content = Content::from_bytes("content.xml", b"<office:document-content/>").unwrap();
        let copy = content.clone();
        assert_ne!(content.instance_id(), copy.instance_id());
    }
}
