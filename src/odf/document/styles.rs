//! Style lookup, insertion and reporting across `content.xml` and
//! `styles.xml`.
//!
//! Lookups search the content part first, then the styles part; the first
//! match wins. Insertion dispatches on the [`StyleKind`] of the style to pick
//! the destination part and container, replacing any style already there
//! with the same family and name.

use super::Document;
use crate::common::{Error, Result};
use crate::odf::constants::STYLE_REFERENCE_ATTRIBUTES;
use crate::odf::core::{Content, Styles, XmlPart};
use crate::odf::elements::element::{NodeId, Tree};
use crate::odf::elements::style::{
    Style, StyleKind, style_display_name, style_family, style_name, style_properties,
};
use crate::odf::elements::tag_matcher::match_tag;
use log::debug;
use std::collections::HashSet;

const AUTO_NAME_PREFIX: &str = "lpod_auto_";
const AUTOMATIC_STYLES: &str = "office:automatic-styles";
const COMMON_STYLES: &str = "office:styles";
const MASTER_STYLES: &str = "office:master-styles";
const FONT_FACE_DECLS: &str = "office:font-face-decls";

/// Which style-bearing part a node lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleLocation {
    Content,
    Styles,
}

/// Handle to an element of the content or styles part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleRef {
    pub location: StyleLocation,
    pub node: NodeId,
}

impl StyleRef {
    fn content(node: NodeId) -> Self {
        Self {
            location: StyleLocation::Content,
            node,
        }
    }

    fn styles(node: NodeId) -> Self {
        Self {
            location: StyleLocation::Styles,
            node,
        }
    }
}

pub(super) fn location_tree<'a>(content: &'a Content, styles: &'a Styles, location: StyleLocation) -> &'a Tree {
    match location {
        StyleLocation::Content => content.tree(),
        StyleLocation::Styles => styles.tree(),
    }
}

/// Whether `node` is a style with the given family and name. Unnamed styles
/// only match unnamed styles of the same family.
fn same_style_key(tree: &Tree, node: NodeId, family: Option<&str>, name: Option<&str>) -> bool {
    match_tag(tree.tag(node)).is_registered_style()
        && style_family(tree, node).as_deref() == family
        && style_name(tree, node) == name
}

/// Copy the style at `source_node` of `source` into `container_tag` of
/// `part`, removing styles with the same family and name first.
pub(crate) fn replace_style(part: &mut XmlPart, container_tag: &str, source: &Tree, source_node: NodeId) -> NodeId {
    let family = style_family(source, source_node);
    let name = style_name(source, source_node);
    let container = part.ensure_top_level(container_tag);
    let existing = part.tree();
    let duplicates: Vec<NodeId> = existing
        .children(container)
        .iter()
        .copied()
        .filter(|&c| same_style_key(existing, c, family.as_deref(), name))
        .collect();
    let tree = part.tree_mut();
    for duplicate in duplicates {
        tree.detach(duplicate);
    }
    let node = tree.import(source, source_node);
    tree.append_child(container, node);
    node
}

impl Document {
    /// Styles of the content part followed by those of the styles part.
    /// `automatic` restricts the styles part to its automatic styles.
    pub fn get_styles(&mut self, family: Option<&str>, automatic: bool) -> Result<Vec<StyleRef>> {
        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        let mut out: Vec<StyleRef> = content.get_styles(family).into_iter().map(StyleRef::content).collect();
        out.extend(styles.get_styles(family, automatic).into_iter().map(StyleRef::styles));
        Ok(out)
    }

    /// Look a style up by family and name or display name; with neither,
    /// the family's default style.
    pub fn get_style(
        &mut self,
        family: &str,
        name: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Option<StyleRef>> {
        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        if let Some(node) = content.get_style(family, name, display_name) {
            return Ok(Some(StyleRef::content(node)));
        }
        Ok(styles.get_style(family, name, display_name).map(StyleRef::styles))
    }

    /// The tree a [`StyleRef`] points into.
    pub fn style_tree(&mut self, location: StyleLocation) -> Result<&Tree> {
        Ok(match location {
            StyleLocation::Content => self.cache.content(&self.container)?.tree(),
            StyleLocation::Styles => self.cache.styles(&self.container)?.tree(),
        })
    }

    /// A detached copy of a style of the document.
    pub fn get_style_object(&mut self, style: StyleRef) -> Result<Style> {
        let tree = self.style_tree(style.location)?;
        Style::from_tree(tree.extract(style.node))
    }

    /// Insert a copy of `style` and return the name it was stored under.
    ///
    /// An explicit `name` is written onto the style first. Unnamed automatic
    /// styles get the next free `lpod_auto_<n>` name, and default styles lose
    /// their name. The style object is updated to match what was stored.
    pub fn insert_style(
        &mut self,
        style: &mut Style,
        name: Option<&str>,
        automatic: bool,
        default: bool,
    ) -> Result<Option<String>> {
        self.place_style(style, name, automatic, default).map(|(_, name)| name)
    }

    pub(crate) fn place_style(
        &mut self,
        style: &mut Style,
        name: Option<&str>,
        automatic: bool,
        default: bool,
    ) -> Result<(StyleRef, Option<String>)> {
        if automatic && default {
            return Err(Error::InvalidArgument(
                "a style cannot be both automatic and default".to_string(),
            ));
        }
        if let Some(name) = name {
            style.set_name(name);
        }
        let (location, container) = match style.kind() {
            StyleKind::MasterPage => (StyleLocation::Styles, MASTER_STYLES),
            StyleKind::FontFace if default => (StyleLocation::Styles, FONT_FACE_DECLS),
            StyleKind::FontFace => (StyleLocation::Content, FONT_FACE_DECLS),
            StyleKind::PageLayout => (StyleLocation::Styles, AUTOMATIC_STYLES),
            StyleKind::Common | StyleKind::Default => {
                if automatic {
                    if style.name().is_none() {
                        let generated = self.next_automatic_name(style.family().as_deref())?;
                        style.set_name(&generated);
                    }
                    (StyleLocation::Content, AUTOMATIC_STYLES)
                } else if default || style.kind() == StyleKind::Default {
                    style.force_tag("style:default-style");
                    style.remove_name();
                    (StyleLocation::Styles, COMMON_STYLES)
                } else if style.name().is_some() {
                    (StyleLocation::Styles, COMMON_STYLES)
                } else {
                    return Err(Error::InvalidArgument(format!(
                        "unnamed <{}> needs a name, automatic or default",
                        style.tag()
                    )));
                }
            },
        };

        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        let part = match location {
            StyleLocation::Content => content.xml_mut(),
            StyleLocation::Styles => styles.xml_mut(),
        };
        let node = replace_style(part, container, style.tree(), style.node());
        let name = style.name().map(str::to_string);
        debug!("inserted <{}> {:?} into {} {container}", style.tag(), name, part.path());
        Ok((StyleRef { location, node }, name))
    }

    /// `lpod_auto_<max + 1>` over the automatic styles of the family.
    fn next_automatic_name(&mut self, family: Option<&str>) -> Result<String> {
        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        let candidates = [
            (content.tree(), content.xml().styles_in(&[AUTOMATIC_STYLES], family)),
            (styles.tree(), styles.get_styles(family, true)),
        ];
        let mut highest = 0u32;
        for (tree, nodes) in &candidates {
            for &node in nodes {
                let suffix = style_name(tree, node)
                    .and_then(|name| name.strip_prefix(AUTO_NAME_PREFIX))
                    .and_then(|suffix| suffix.parse::<u32>().ok());
                if let Some(n) = suffix {
                    highest = highest.max(n);
                }
            }
        }
        Ok(format!("{AUTO_NAME_PREFIX}{}", highest + 1))
    }

    /// Elements of the content and styles parts referencing a style through
    /// one of the style-name attributes, optionally only the given name.
    pub fn get_styled_elements(&mut self, name: Option<&str>) -> Result<Vec<StyleRef>> {
        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        let mut out = Vec::new();
        for (location, tree) in [
            (StyleLocation::Content, content.tree()),
            (StyleLocation::Styles, styles.tree()),
        ] {
            let root = tree.root();
            for node in std::iter::once(root).chain(tree.descendants(root)) {
                let styled = STYLE_REFERENCE_ATTRIBUTES.iter().any(|attr| match (tree.attribute(node, attr), name) {
                    (Some(value), Some(name)) => value == name,
                    (Some(_), None) => true,
                    (None, _) => false,
                });
                if styled {
                    out.push(StyleRef { location, node });
                }
            }
        }
        Ok(out)
    }

    /// Remove every style reference and every named style. Returns how many
    /// styles were deleted; default styles are kept.
    pub fn delete_styles(&mut self) -> Result<usize> {
        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        for part in [content.xml_mut(), styles.xml_mut()] {
            let tree = part.tree_mut();
            let root = tree.root();
            for node in std::iter::once(root).chain(tree.descendants(root)) {
                for attr in STYLE_REFERENCE_ATTRIBUTES {
                    tree.remove_attribute(node, attr);
                }
            }
        }

        let mut deleted = 0;
        let content_styles = content.get_styles(None);
        let styles_styles = styles.get_styles(None, false);
        for (tree, nodes) in [(content.tree_mut(), content_styles), (styles.tree_mut(), styles_styles)] {
            for node in nodes {
                if style_name(tree, node).is_some() {
                    tree.detach(node);
                    deleted += 1;
                }
            }
        }
        debug!("deleted {deleted} styles");
        Ok(deleted)
    }

    /// Names referenced by styled elements of both parts
    fn referenced_style_names(content: &Content, styles: &Styles) -> HashSet<String> {
        let mut names = HashSet::new();
        for tree in [content.tree(), styles.tree()] {
            let root = tree.root();
            for node in std::iter::once(root).chain(tree.descendants(root)) {
                for attr in STYLE_REFERENCE_ATTRIBUTES {
                    if let Some(value) = tree.attribute(node, attr) {
                        names.insert(value.to_string());
                    }
                }
            }
        }
        names
    }

    /// One aligned line per style: scope, used flag, family, parent style,
    /// name and display name, optionally followed by its properties. Common
    /// and used styles come first.
    pub fn show_styles(&mut self, automatic: bool, common: bool, properties: bool) -> Result<String> {
        struct Info {
            kind: &'static str,
            used: &'static str,
            family: String,
            parent: String,
            name: String,
            display_name: Option<String>,
            properties: Vec<(String, String)>,
        }

        let refs = self.get_styles(None, false)?;
        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        let referenced = Self::referenced_style_names(content, styles);

        let mut infos = Vec::new();
        for style in refs {
            let tree = location_tree(content, styles, style.location);
            let is_auto = tree
                .parent(style.node)
                .is_some_and(|p| tree.tag(p) == AUTOMATIC_STYLES);
            if (is_auto && !automatic) || (!is_auto && !common) {
                continue;
            }
            let name = style_name(tree, style.node);
            let used = match name {
                Some(name) => referenced.contains(name),
                None => !referenced.is_empty(),
            };
            infos.push(Info {
                kind: if is_auto { "auto  " } else { "common" },
                used: if used { "y" } else { "n" },
                family: style_family(tree, style.node).unwrap_or_default(),
                parent: tree
                    .attribute(style.node, "style:parent-style-name")
                    .unwrap_or_default()
                    .to_string(),
                name: name.unwrap_or_default().to_string(),
                display_name: style_display_name(tree, style.node).map(str::to_string),
                properties: if properties {
                    style_properties(tree, style.node)
                } else {
                    Vec::new()
                },
            });
        }
        if infos.is_empty() {
            return Ok(String::new());
        }

        infos.sort_by(|a, b| (&a.family, &a.name).cmp(&(&b.family, &b.name)));
        infos.sort_by(|a, b| (b.kind, b.used).cmp(&(a.kind, a.used)));
        let family_width = infos.iter().map(|i| i.family.chars().count()).max().unwrap_or(0);
        let parent_width = infos.iter().map(|i| i.parent.chars().count()).max().unwrap_or(0);

        let mut lines = Vec::new();
        for info in &infos {
            let mut line = format!(
                "{} used:{} family:{:<family_width$} parent:{:<parent_width$} name:{}",
                info.kind, info.used, info.family, info.parent, info.name
            );
            if let Some(display_name) = &info.display_name {
                line.push_str(" display_name:");
                line.push_str(display_name);
            }
            lines.push(line);
            for (key, value) in &info.properties {
                lines.push(format!("   - {key}: {value}"));
            }
        }
        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let mut doc = Document::new_from_template("text").unwrap();
        let xml = br#"<office:document-content>
  <office:font-face-decls/>
  <office:automatic-styles>
    <style:style style:name="P1" style:family="paragraph" style:parent-style-name="Standard"/>
    <style:style style:name="lpod_auto_7" style:family="text"/>
  </office:automatic-styles>
  <office:body>
    <office:text>
      <text:p text:style-name="P1">Hello</text:p>
      <text:p text:style-name="Standard">World</text:p>
    </office:text>
  </office:body>
</office:document-content>"#;
        doc.set_part("content", xml.to_vec());
        doc
    }

    fn count_key(doc: &mut Document, location: StyleLocation, family: &str, name: &str) -> usize {
        let tree = doc.style_tree(location).unwrap();
        tree.descendants(tree.root())
            .into_iter()
            .filter(|&n| same_style_key(tree, n, Some(family), Some(name)))
            .count()
    }

    #[test]
    fn test_get_style_precedence() {
        let mut doc = document();
        let p1 = doc.get_style("paragraph", Some("P1"), None).unwrap().unwrap();
        assert_eq!(p1.location, StyleLocation::Content);
        let standard = doc.get_style("paragraph", Some("Standard"), None).unwrap().unwrap();
        assert_eq!(standard.location, StyleLocation::Styles);
        let default = doc.get_style("paragraph", None, None).unwrap().unwrap();
        assert_eq!(doc.style_tree(default.location).unwrap().tag(default.node), "style:default-style");
        assert!(doc.get_style("paragraph", Some("Nope"), None).unwrap().is_none());
    }

    #[test]
    fn test_get_styles_order() {
        let mut doc = document();
        let all = doc.get_styles(Some("paragraph"), false).unwrap();
        assert_eq!(all[0].location, StyleLocation::Content);
        assert!(all.iter().any(|s| s.location == StyleLocation::Styles));
        let object = doc.get_style_object(all[0]).unwrap();
        assert_eq!(object.name(), Some("P1"));
        assert_eq!(object.parent_style(), Some("Standard"));
    }

    #[test]
    fn test_automatic_and_default_conflict() {
        let mut doc = document();
        let mut style = Style::new("paragraph", Some("X")).unwrap();
        assert!(matches!(
            doc.insert_style(&mut style, None, true, true),
            Err(Error::InvalidArgument(_))
        ));
        let mut unnamed = Style::new("paragraph", None).unwrap();
        assert!(matches!(
            doc.insert_style(&mut unnamed, None, false, false),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_automatic_names_increment() {
        let mut doc = document();
        let mut first = Style::new("paragraph", None).unwrap();
        let mut second = Style::new("paragraph", None).unwrap();
        let a = doc.insert_style(&mut first, None, true, false).unwrap().unwrap();
        let b = doc.insert_style(&mut second, None, true, false).unwrap().unwrap();
        assert_eq!(a, "lpod_auto_1");
        assert_eq!(b, "lpod_auto_2");
        assert_eq!(first.name(), Some("lpod_auto_1"));

        let mut text = Style::new("text", None).unwrap();
        let c = doc.insert_style(&mut text, None, true, false).unwrap().unwrap();
        assert_eq!(c, "lpod_auto_8");
        let found = doc.get_style("paragraph", Some(&b), None).unwrap().unwrap();
        assert_eq!(found.location, StyleLocation::Content);
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut doc = document();
        let mut old = Style::new("paragraph", Some("Body")).unwrap();
        old.set_property("text", "fo:color", "#ff0000");
        doc.insert_style(&mut old, None, false, false).unwrap();

        let mut new = Style::new("paragraph", Some("Body")).unwrap();
        new.set_property("text", "fo:color", "#0000ff");
        let (placed, name) = doc.place_style(&mut new, None, false, false).unwrap();
        assert_eq!(name.as_deref(), Some("Body"));
        assert_eq!(count_key(&mut doc, StyleLocation::Styles, "paragraph", "Body"), 1);

        let found = doc.get_style("paragraph", Some("Body"), None).unwrap().unwrap();
        assert_eq!(found, placed);
        let tree = doc.style_tree(found.location).unwrap();
        assert!(tree.is_attached(found.node));
        let object = doc.get_style_object(found).unwrap();
        assert_eq!(object.to_xml().unwrap(), new.to_xml().unwrap());
    }

    #[test]
    fn test_insert_explicit_name_and_default() {
        let mut doc = document();
        let mut style = Style::new("paragraph", Some("Old")).unwrap();
        let name = doc.insert_style(&mut style, Some("Renamed"), false, false).unwrap();
        assert_eq!(name.as_deref(), Some("Renamed"));
        assert!(doc.get_style("paragraph", Some("Renamed"), None).unwrap().is_some());

        let mut default = Style::new("paragraph", Some("Ignored")).unwrap();
        default.set_property("paragraph", "fo:margin-top", "1cm");
        let name = doc.insert_style(&mut default, None, false, true).unwrap();
        assert_eq!(name, None);
        assert_eq!(default.tag(), "style:default-style");
        let defaults: Vec<StyleRef> = doc
            .get_styles(Some("paragraph"), false)
            .unwrap()
            .into_iter()
            .filter(|s| s.location == StyleLocation::Styles)
            .collect();
        let tree = doc.style_tree(StyleLocation::Styles).unwrap();
        let default_count = defaults
            .iter()
            .filter(|s| tree.tag(s.node) == "style:default-style")
            .count();
        assert_eq!(default_count, 1);
    }

    #[test]
    fn test_insert_dispatch_by_kind() {
        let mut doc = document();
        let mut master = Style::master_page("Landscape", Some("pm1"));
        let (placed, _) = doc.place_style(&mut master, None, false, false).unwrap();
        assert_eq!(placed.location, StyleLocation::Styles);
        let tree = doc.style_tree(StyleLocation::Styles).unwrap();
        let parent = tree.parent(placed.node).unwrap();
        assert_eq!(tree.tag(parent), "office:master-styles");

        let mut font = Style::font_face("Mono", "DejaVu Sans Mono");
        let (placed, _) = doc.place_style(&mut font, None, false, false).unwrap();
        assert_eq!(placed.location, StyleLocation::Content);
        let mut font = Style::font_face("Mono", "DejaVu Sans Mono");
        let (placed, _) = doc.place_style(&mut font, None, false, true).unwrap();
        assert_eq!(placed.location, StyleLocation::Styles);

        let mut layout = Style::page_layout("pm2");
        let (placed, _) = doc.place_style(&mut layout, None, false, false).unwrap();
        let tree = doc.style_tree(StyleLocation::Styles).unwrap();
        let parent = tree.parent(placed.node).unwrap();
        assert_eq!(tree.tag(parent), "office:automatic-styles");
    }

    #[test]
    fn test_styled_elements_and_delete() {
        let mut doc = document();
        assert_eq!(doc.get_styled_elements(Some("P1")).unwrap().len(), 1);
        let all = doc.get_styled_elements(None).unwrap();
        assert!(all.len() >= 3);

        let deleted = doc.delete_styles().unwrap();
        assert!(deleted >= 4);
        assert!(doc.get_styled_elements(None).unwrap().is_empty());
        assert!(doc.get_style("paragraph", Some("P1"), None).unwrap().is_none());
        assert!(doc.get_style("paragraph", None, None).unwrap().is_some());
    }

    #[test]
    fn test_show_styles() {
        let mut doc = document();
        let report = doc.show_styles(true, true, false).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "common used:y family:master-page parent:         name:Standard");
        assert!(lines[1].starts_with("common used:y family:paragraph   parent:"));
        assert!(report.contains("auto   used:y family:paragraph   parent:Standard name:P1"));
        let unused = format!("auto   used:n family:{:<11} parent:{:<8} name:lpod_auto_7", "text", "");
        assert!(report.contains(&unused));
        assert!(report.ends_with('\n'));

        let only_auto = doc.show_styles(true, false, false).unwrap();
        assert!(only_auto.lines().all(|l| l.starts_with("auto")));
        assert_eq!(doc.show_styles(false, false, false).unwrap(), "");

        let with_properties = doc.show_styles(false, true, true).unwrap();
        assert!(with_properties.contains("   - fo:font-size: 12pt"));
    }
}
