//! The `meta.xml` part.
//!
//! Getters read the `office:meta` element of the part; setters create the
//! child element on demand. The generator keeps a "modified" flag so saving
//! only stamps its own generator string when the user did not set one.

use crate::common::Result;
use crate::odf::core::xml::XmlPart;
use crate::odf::elements::element::{NodeId, Tree};
use chrono::NaiveDateTime;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an ODF date-time value, tolerating fractional seconds and a
/// trailing `Z`.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// The `meta.xml` part
#[derive(Debug, Clone)]
pub struct Meta {
    xml: XmlPart,
    generator_modified: bool,
}

impl Meta {
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            xml: XmlPart::from_bytes(path, bytes)?,
            generator_modified: false,
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

    fn meta_element(&self) -> Option<NodeId> {
        self.xml.get_element("office:meta")
    }

    fn ensure_meta_element(&mut self) -> NodeId {
        match self.meta_element() {
            Some(node) => node,
            None => self.xml.ensure_top_level("office:meta"),
        }
    }

    fn get_text(&self, tag: &str) -> Option<String> {
        let meta = self.meta_element()?;
        let node = self.tree().child_by_tag(meta, tag)?;
        Some(self.tree().text_content(node))
    }

    fn set_text(&mut self, tag: &str, value: &str) {
        let meta = self.ensure_meta_element();
        let tree = self.xml.tree_mut();
        let node = match tree.child_by_tag(meta, tag) {
            Some(node) => node,
            None => {
                let node = tree.create_element(tag);
                tree.append_child(meta, node);
                node
            },
        };
        tree.set_text_content(node, value);
    }

    pub fn title(&self) -> Option<String> {
        self.get_text("dc:title")
    }

    pub fn set_title(&mut self, title: &str) {
        self.set_text("dc:title", title);
    }

    pub fn description(&self) -> Option<String> {
        self.get_text("dc:description")
    }

    pub fn set_description(&mut self, description: &str) {
        self.set_text("dc:description", description);
    }

    pub fn subject(&self) -> Option<String> {
        self.get_text("dc:subject")
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.set_text("dc:subject", subject);
    }

    pub fn language(&self) -> Option<String> {
        self.get_text("dc:language")
    }

    pub fn set_language(&mut self, language: &str) {
        self.set_text("dc:language", language);
    }

    /// Last modification date (`dc:date`)
    pub fn modification_date(&self) -> Option<NaiveDateTime> {
        self.get_text("dc:date").as_deref().and_then(parse_datetime)
    }

    pub fn set_modification_date(&mut self, date: NaiveDateTime) {
        self.set_text("dc:date", &date.format(DATE_FORMAT).to_string());
    }

    pub fn creation_date(&self) -> Option<NaiveDateTime> {
        self.get_text("meta:creation-date").as_deref().and_then(parse_datetime)
    }

    pub fn set_creation_date(&mut self, date: NaiveDateTime) {
        self.set_text("meta:creation-date", &date.format(DATE_FORMAT).to_string());
    }

    pub fn initial_creator(&self) -> Option<String> {
        self.get_text("meta:initial-creator")
    }

    pub fn set_initial_creator(&mut self, creator: &str) {
        self.set_text("meta:initial-creator", creator);
    }

    /// Keywords, one `meta:keyword` element each
    pub fn keywords(&self) -> Vec<String> {
        let Some(meta) = self.meta_element() else {
            return Vec::new();
        };
        let tree = self.tree();
        tree.children(meta)
            .iter()
            .filter(|&&c| tree.tag(c) == "meta:keyword")
            .map(|&c| tree.text_content(c))
            .collect()
    }

    pub fn set_keywords(&mut self, keywords: &[&str]) {
        let meta = self.ensure_meta_element();
        let tree = self.xml.tree_mut();
        for existing in tree.find_all(meta, "meta:keyword") {
            tree.detach(existing);
        }
        for keyword in keywords {
            let node = tree.create_element("meta:keyword");
            tree.set_text(node, keyword);
            tree.append_child(meta, node);
        }
    }

    pub fn editing_cycles(&self) -> Option<u32> {
        self.get_text("meta:editing-cycles")?.trim().parse().ok()
    }

    pub fn set_editing_cycles(&mut self, cycles: u32) {
        self.set_text("meta:editing-cycles", &cycles.to_string());
    }

    /// Total editing time as an ISO 8601 duration (`PT1H2M3S`)
    pub fn editing_duration(&self) -> Option<String> {
        self.get_text("meta:editing-duration")
    }

    pub fn set_editing_duration(&mut self, duration: &str) {
        self.set_text("meta:editing-duration", duration);
    }

    pub fn generator(&self) -> Option<String> {
        self.get_text("meta:generator")
    }

    /// Set the generator and mark it as chosen by the user.
    pub fn set_generator(&mut self, generator: &str) {
        self.set_text("meta:generator", generator);
        self.generator_modified = true;
    }

    pub fn generator_modified(&self) -> bool {
        self.generator_modified
    }

    /// Stamp the generator without marking it as user-modified.
    pub(crate) fn stamp_generator(&mut self, generator: &str) {
        self.set_text("meta:generator", generator);
    }

    /// Attributes of `meta:document-statistic` (`meta:page-count`, ...)
    pub fn statistics(&self) -> Vec<(String, String)> {
        self.meta_element()
            .and_then(|meta| self.tree().child_by_tag(meta, "meta:document-statistic"))
            .map(|node| self.tree().attributes(node).to_vec())
            .unwrap_or_default()
    }

    pub fn set_statistic(&mut self, name: &str, value: u64) {
        let meta = self.ensure_meta_element();
        let tree = self.xml.tree_mut();
        let node = match tree.child_by_tag(meta, "meta:document-statistic") {
            Some(node) => node,
            None => {
                let node = tree.create_element("meta:document-statistic");
                tree.append_child(meta, node);
                node
            },
        };
        tree.set_attribute(node, name, &value.to_string());
    }

    /// `(meta:name, value)` of every `meta:user-defined` element
    pub fn user_defined_metadata(&self) -> Vec<(String, String)> {
        let Some(meta) = self.meta_element() else {
            return Vec::new();
        };
        let tree = self.tree();
        tree.children(meta)
            .iter()
            .filter(|&&c| tree.tag(c) == "meta:user-defined")
            .map(|&c| {
                let name = tree.attribute(c, "meta:name").unwrap_or_default().to_string();
                (name, tree.text_content(c))
            })
            .collect()
    }

    /// Set a user-defined value, typed as a string.
    pub fn set_user_defined(&mut self, name: &str, value: &str) {
        let meta = self.ensure_meta_element();
        let tree = self.xml.tree_mut();
        let existing = tree
            .children(meta)
            .iter()
            .copied()
            .find(|&c| tree.tag(c) == "meta:user-defined" && tree.attribute(c, "meta:name") == Some(name));
        let node = match existing {
            Some(node) => node,
            None => {
                let node = tree.create_element("meta:user-defined");
                tree.set_attribute(node, "meta:name", name);
                tree.append_child(meta, node);
                node
            },
        };
        tree.set_attribute(node, "meta:value-type", "string");
        tree.set_text_content(node, value);
    }

    pub fn serialize(&self, pretty: bool) -> Result<Vec<u8>> {
        self.xml.serialize(pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"<office:document-meta><office:meta>
<meta:generator>Writer/7.0</meta:generator>
<dc:title>Report</dc:title>
<meta:creation-date>2023-02-01T08:30:00.120000000</meta:creation-date>
<meta:editing-cycles>3</meta:editing-cycles>
<meta:keyword>alpha</meta:keyword><meta:keyword>beta</meta:keyword>
<meta:document-statistic meta:page-count="2" meta:word-count="120"/>
<meta:user-defined meta:name="Reviewer">Kim</meta:user-defined>
</office:meta></office:document-meta>"#;

    #[test]
    fn test_getters() {
        let meta = Meta::from_bytes("meta.xml", META.as_bytes()).unwrap();
        assert_eq!(meta.title().as_deref(), Some("Report"));
        assert_eq!(meta.generator().as_deref(), Some("Writer/7.0"));
        assert_eq!(meta.editing_cycles(), Some(3));
        assert_eq!(meta.keywords(), vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(meta.statistics().len(), 2);
        assert_eq!(meta.user_defined_metadata(), vec![("Reviewer".to_string(), "Kim".to_string())]);
        let created = meta.creation_date().unwrap();
        assert_eq!(created.format("%Y-%m-%d %H:%M").to_string(), "2023-02-01 08:30");
        assert!(meta.subject().is_none());
    }

    #[test]
    fn test_setters_create_elements() {
        let mut meta = Meta::from_bytes("meta.xml", b"<office:document-meta/>").unwrap();
        meta.set_subject("Budget");
        meta.set_keywords(&["x"]);
        meta.set_statistic("meta:page-count", 4);
        meta.set_user_defined("Status", "draft");
        meta.set_user_defined("Status", "final");
        assert_eq!(meta.subject().as_deref(), Some("Budget"));
        assert_eq!(meta.keywords(), vec!["x".to_string()]);
        assert_eq!(meta.statistics(), vec![("meta:page-count".to_string(), "4".to_string())]);
        assert_eq!(meta.user_defined_metadata(), vec![("Status".to_string(), "final".to_string())]);
    }

    #[test]
    fn test_generator_flag() {
        let mut meta = Meta::from_bytes("meta.xml", META.as_bytes()).unwrap();
        meta.stamp_generator("tool 1");
        assert!(!meta.generator_modified());
        meta.set_generator("mine");
        assert!(meta.generator_modified());
        assert_eq!(meta.generator().as_deref(), Some("mine"));
    }
}
