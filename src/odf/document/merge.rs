//! Copying styles from another document.

use super::Document;
use super::styles::{StyleLocation, location_tree, replace_style};
use crate::common::{Error, Result};
use crate::odf::constants::guess_media_type;
use crate::odf::elements::element::{Fragment, NodeId, Tree};
use crate::odf::elements::tag_matcher::{OdfTag, match_tag};
use log::{debug, warn};

const XLINK_HREF: &str = "xlink:href";

/// A style read from the other document, ready to be placed.
struct ForeignStyle {
    location: StyleLocation,
    container: String,
    fragment: Fragment,
}

/// Package files referenced by a style that travel with it.
fn referenced_files(tree: &Tree, node: NodeId) -> Vec<String> {
    let hrefs: Vec<&str> = match match_tag(tree.tag(node)) {
        OdfTag::StyleMasterPage => tree
            .find_all(node, "draw:image")
            .into_iter()
            .filter_map(|image| tree.attribute(image, XLINK_HREF))
            .collect(),
        OdfTag::DrawFillImage => tree.attribute(node, XLINK_HREF).into_iter().collect(),
        _ => Vec::new(),
    };
    hrefs
        .into_iter()
        .filter(|href| !href.contains("://"))
        .map(|href| href.trim_start_matches("./").to_string())
        .collect()
}

impl Document {
    /// Copy every style of `other` (content and styles parts) into this
    /// document, replacing local styles with the same family and name.
    ///
    /// Images used by master pages and fill images are copied along with
    /// their manifest entries. Returns the number of styles copied. The
    /// operation is not transactional: a failure leaves the styles merged so
    /// far in place.
    pub fn merge_styles_from(&mut self, other: &mut Document) -> Result<usize> {
        let refs = other.get_styles(None, false)?;
        let mut foreign = Vec::with_capacity(refs.len());
        let mut files = Vec::new();
        {
            let (content, styles) = other.cache.content_and_styles(&other.container)?;
            for style in refs {
                let tree = location_tree(content, styles, style.location);
                let tag = tree.tag(style.node);
                let container = tree
                    .parent(style.node)
                    .ok_or_else(|| Error::Invariant(format!("<{tag}> has no container")))?;
                let container_tag = tree.tag(container);
                let part_tag = tree.parent(container).map(|p| tree.tag(p)).unwrap_or_default();
                let location = match part_tag {
                    "office:document-styles" => StyleLocation::Styles,
                    "office:document-content" => StyleLocation::Content,
                    _ => return Err(Error::Unsupported(format!("styles inside <{part_tag}>"))),
                };
                if !match_tag(container_tag).is_style_container() {
                    return Err(Error::Unsupported(format!("style container <{container_tag}>")));
                }
                if !match_tag(tag).is_registered_style() {
                    return Err(Error::Unsupported(format!("style element <{tag}>")));
                }
                files.extend(referenced_files(tree, style.node));
                foreign.push(ForeignStyle {
                    location,
                    container: container_tag.to_string(),
                    fragment: tree.extract(style.node),
                });
            }
        }

        let mut copied_files = Vec::with_capacity(files.len());
        if !files.is_empty() {
            let manifest = other.cache.manifest(&other.container)?;
            for path in files {
                let bytes = other.container.get_part(&path)?.to_vec();
                let media_type = match manifest.get_media_type(&path) {
                    Some(media_type) => media_type.to_string(),
                    None => {
                        warn!("no manifest media type for {path}, guessing");
                        guess_media_type(&path).to_string()
                    },
                };
                copied_files.push((path, bytes, media_type));
            }
        }

        let (content, styles) = self.cache.content_and_styles(&self.container)?;
        for style in &foreign {
            let part = match style.location {
                StyleLocation::Content => content.xml_mut(),
                StyleLocation::Styles => styles.xml_mut(),
            };
            replace_style(part, &style.container, &style.fragment, style.fragment.root());
        }
        for (path, bytes, media_type) in copied_files {
            self.set_part(&path, bytes);
            self.manifest()?.add_full_path(&path, &media_type);
            debug!("copied {path} ({media_type})");
        }
        debug!("merged {} styles", foreign.len());
        Ok(foreign.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::elements::style::{style_family, style_name};
    use std::collections::HashMap;

    const FOREIGN_STYLES: &str = r##"<office:document-styles>
  <office:styles>
    <style:style style:name="Standard" style:family="paragraph">
      <style:text-properties fo:color="#336699"/>
    </style:style>
    <style:style style:name="Quote" style:family="paragraph"/>
    <draw:fill-image draw:name="Paper" xlink:href="Pictures/paper.png"/>
  </office:styles>
  <office:automatic-styles>
    <style:page-layout style:name="pm1"/>
  </office:automatic-styles>
  <office:master-styles>
    <style:master-page style:name="Letter" style:page-layout-name="pm1">
      <style:header><text:p><draw:frame><draw:image xlink:href="Pictures/logo.png"/></draw:frame></text:p></style:header>
    </style:master-page>
  </office:master-styles>
</office:document-styles>"##;

    const FOREIGN_CONTENT: &str = r#"<office:document-content>
  <office:automatic-styles>
    <style:style style:name="P1" style:family="paragraph"/>
  </office:automatic-styles>
  <office:body><office:text/></office:body>
</office:document-content>"#;

    fn foreign() -> Document {
        let mut doc = Document::new_from_template("text").unwrap();
        doc.set_part("styles", FOREIGN_STYLES.as_bytes().to_vec());
        doc.set_part("content", FOREIGN_CONTENT.as_bytes().to_vec());
        doc.set_part("Pictures/logo.png", vec![1, 2, 3]);
        doc.set_part("Pictures/paper.png", vec![4, 5]);
        let manifest = doc.manifest().unwrap();
        manifest.add_full_path("Pictures/logo.png", "image/png");
        doc
    }

    fn keys(doc: &mut Document) -> HashMap<(StyleLocation, String, String, String), usize> {
        let refs = doc.get_styles(None, false).unwrap();
        let mut counts = HashMap::new();
        for style in refs {
            let tree = doc.style_tree(style.location).unwrap();
            let container = tree.tag(tree.parent(style.node).unwrap()).to_string();
            let family = style_family(tree, style.node).unwrap_or_default();
            let name = style_name(tree, style.node).unwrap_or_default().to_string();
            *counts.entry((style.location, container, family, name)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_merge_copies_styles_and_images() {
        let _ = env_logger::try_init();
        let mut local = Document::new_from_template("text").unwrap();
        let mut other = foreign();
        let merged = local.merge_styles_from(&mut other).unwrap();
        assert_eq!(merged, 6);

        let quote = local.get_style("paragraph", Some("Quote"), None).unwrap().unwrap();
        assert_eq!(quote.location, StyleLocation::Styles);
        let p1 = local.get_style("paragraph", Some("P1"), None).unwrap().unwrap();
        assert_eq!(p1.location, StyleLocation::Content);
        let standard = local.get_style("paragraph", Some("Standard"), None).unwrap().unwrap();
        let object = local.get_style_object(standard).unwrap();
        assert_eq!(object.properties(), vec![("fo:color".to_string(), "#336699".to_string())]);
        assert!(local.get_style("master-page", Some("Letter"), None).unwrap().is_some());

        assert_eq!(local.container().get_part("Pictures/logo.png").unwrap(), &[1, 2, 3]);
        assert_eq!(local.container().get_part("Pictures/paper.png").unwrap(), &[4, 5]);
        let manifest = local.manifest().unwrap();
        assert_eq!(manifest.get_media_type("Pictures/logo.png"), Some("image/png"));
        assert_eq!(manifest.get_media_type("Pictures/paper.png"), Some("image/png"));
    }

    #[test]
    fn test_merge_twice_has_no_duplicates() {
        let mut local = Document::new_from_template("text").unwrap();
        let mut other = foreign();
        local.merge_styles_from(&mut other).unwrap();
        let once = keys(&mut local);
        local.merge_styles_from(&mut other).unwrap();
        let twice = keys(&mut local);
        assert_eq!(once, twice);
        assert!(twice.values().all(|&count| count == 1), "{twice:?}");
    }

    #[test]
    fn test_merge_rejects_unknown_part_root() {
        let mut local = Document::new_from_template("text").unwrap();
        let mut other = Document::new_from_template("text").unwrap();
        let flat = br#"<office:document><office:automatic-styles><style:style style:name="P1" style:family="paragraph"/></office:automatic-styles></office:document>"#;
        other.set_part("content", flat.to_vec());
        assert!(matches!(
            local.merge_styles_from(&mut other),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_referenced_files() {
        let tree = crate::odf::elements::parser::parse(
            br#"<style:master-page style:name="M"><draw:image xlink:href="./Pictures/a.png"/><draw:image xlink:href="http://x/y.png"/></style:master-page>"#,
        )
        .unwrap();
        assert_eq!(referenced_files(&tree, tree.root()), vec!["Pictures/a.png"]);
    }
}
