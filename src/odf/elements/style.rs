//! Style elements.
//!
//! A style is an element whose tag is one of the registered style tags. Its
//! structural [`StyleKind`] is derived from that tag once, when the [`Style`]
//! is built, and the document layer matches on it exhaustively when deciding
//! where the style goes.
//!
//! The free functions at the bottom read family, name and properties from any
//! style node of any tree, so the same logic serves standalone styles and the
//! styles that live inside a part.

use crate::common::{Error, Result};
use crate::odf::constants::{FAMILY_TAGS, STYLE_STYLE_FAMILIES, TAG_FAMILIES};
use crate::odf::elements::element::{Fragment, NodeId, Tree};
use crate::odf::elements::parser;
use crate::odf::elements::tag_matcher::{OdfTag, is_namespace, match_tag};

/// Structural kind of a style, decided by its tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    /// `style:style` and every other registered style tag
    Common,
    /// `style:master-page`
    MasterPage,
    /// `style:font-face`
    FontFace,
    /// `style:page-layout`
    PageLayout,
    /// `style:default-style`
    Default,
}

impl StyleKind {
    /// Classify a tag; `None` when the tag is not a registered style.
    pub fn classify(tag: &str) -> Option<Self> {
        let odf_tag = match_tag(tag);
        if !odf_tag.is_registered_style() {
            return None;
        }
        Some(match odf_tag {
            OdfTag::StyleMasterPage => Self::MasterPage,
            OdfTag::StyleFontFace => Self::FontFace,
            OdfTag::StylePageLayout => Self::PageLayout,
            OdfTag::StyleDefaultStyle => Self::Default,
            _ => Self::Common,
        })
    }
}

/// A detached style element, owned together with its subtree.
#[derive(Debug, Clone)]
pub struct Style {
    tree: Fragment,
    kind: StyleKind,
}

impl Style {
    /// Create an empty style of the given family.
    ///
    /// Families stored as `style:style` (paragraph, text, graphic, ...) get a
    /// `style:family` attribute; the others use their dedicated tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::odf::elements::style::{Style, StyleKind};
    ///
    /// let style = Style::new("paragraph", Some("Body")).unwrap();
    /// assert_eq!(style.tag(), "style:style");
    /// assert_eq!(style.family().as_deref(), Some("paragraph"));
    /// assert_eq!(style.name(), Some("Body"));
    /// assert_eq!(style.kind(), StyleKind::Common);
    /// ```
    pub fn new(family: &str, name: Option<&str>) -> Result<Self> {
        let mut tree = if STYLE_STYLE_FAMILIES.contains(&family) {
            let mut tree = Tree::new("style:style");
            let root = tree.root();
            tree.set_attribute(root, "style:family", family);
            tree
        } else if let Some(tag) = FAMILY_TAGS.get(family) {
            Tree::new(tag)
        } else {
            return Err(Error::InvalidArgument(format!("unknown style family '{family}'")));
        };
        if let Some(name) = name {
            let root = tree.root();
            let attribute = name_attribute(tree.tag(root));
            tree.set_attribute(root, attribute, name);
        }
        Self::from_tree(tree)
    }

    /// Create a master page bound to a page layout.
    pub fn master_page(name: &str, page_layout: Option<&str>) -> Self {
        let mut tree = Tree::new("style:master-page");
        let root = tree.root();
        tree.set_attribute(root, "style:name", name);
        if let Some(layout) = page_layout {
            tree.set_attribute(root, "style:page-layout-name", layout);
        }
        Self {
            tree,
            kind: StyleKind::MasterPage,
        }
    }

    /// Create a font face declaration.
    pub fn font_face(name: &str, font_family: &str) -> Self {
        let mut tree = Tree::new("style:font-face");
        let root = tree.root();
        tree.set_attribute(root, "style:name", name);
        tree.set_attribute(root, "svg:font-family", font_family);
        Self {
            tree,
            kind: StyleKind::FontFace,
        }
    }

    /// Create an empty page layout.
    pub fn page_layout(name: &str) -> Self {
        let mut tree = Tree::new("style:page-layout");
        let root = tree.root();
        tree.set_attribute(root, "style:name", name);
        Self {
            tree,
            kind: StyleKind::PageLayout,
        }
    }

    /// Parse a style from an XML snippet.
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::from_tree(parser::parse(xml.as_bytes())?)
    }

    /// Wrap a tree whose root is a style element.
    pub fn from_tree(tree: Fragment) -> Result<Self> {
        let tag = tree.tag(tree.root());
        let kind = StyleKind::classify(tag)
            .ok_or_else(|| Error::InvalidArgument(format!("not a style element: <{tag}>")))?;
        Ok(Self { tree, kind })
    }

    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The style element itself
    pub fn node(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tag(&self) -> &str {
        self.tree.tag(self.tree.root())
    }

    /// Change the tag and reclassify the style.
    pub(crate) fn force_tag(&mut self, tag: &str) {
        let root = self.tree.root();
        self.tree.set_tag(root, tag);
        if let Some(kind) = StyleKind::classify(tag) {
            self.kind = kind;
        }
    }

    pub fn family(&self) -> Option<String> {
        style_family(&self.tree, self.tree.root())
    }

    pub fn name(&self) -> Option<&str> {
        style_name(&self.tree, self.tree.root())
    }

    pub fn set_name(&mut self, name: &str) {
        let root = self.tree.root();
        let attribute = name_attribute(self.tree.tag(root));
        self.tree.set_attribute(root, attribute, name);
    }

    pub(crate) fn remove_name(&mut self) {
        let root = self.tree.root();
        let attribute = name_attribute(self.tree.tag(root));
        self.tree.remove_attribute(root, attribute);
    }

    pub fn display_name(&self) -> Option<&str> {
        style_display_name(&self.tree, self.tree.root())
    }

    pub fn set_display_name(&mut self, display_name: &str) {
        let root = self.tree.root();
        let attribute = if is_namespace(self.tag().as_bytes(), b"draw") {
            "draw:display-name"
        } else {
            "style:display-name"
        };
        self.tree.set_attribute(root, attribute, display_name);
    }

    pub fn parent_style(&self) -> Option<&str> {
        self.tree.attribute(self.tree.root(), "style:parent-style-name")
    }

    pub fn set_parent_style(&mut self, parent: &str) {
        let root = self.tree.root();
        self.tree.set_attribute(root, "style:parent-style-name", parent);
    }

    /// Set one property in the `style:<area>-properties` child, creating the
    /// child when missing. `area` is e.g. `text`, `paragraph`, `graphic`.
    pub fn set_property(&mut self, area: &str, name: &str, value: &str) {
        let root = self.tree.root();
        let tag = format!("style:{area}-properties");
        let properties = match self.tree.child_by_tag(root, &tag) {
            Some(node) => node,
            None => {
                let node = self.tree.create_element(&tag);
                self.tree.append_child(root, node);
                node
            },
        };
        self.tree.set_attribute(properties, name, value);
    }

    /// Properties of the style's family area, see [`style_properties`].
    pub fn properties(&self) -> Vec<(String, String)> {
        style_properties(&self.tree, self.tree.root())
    }

    /// Serialize the style as an XML snippet.
    pub fn to_xml(&self) -> Result<String> {
        parser::serialize_node(&self.tree, self.tree.root(), false)
    }
}

/// Anything that can designate a style by name: a [`Style`] or a plain name.
pub trait StyleReference {
    fn style_name(&self) -> Option<&str>;
}

impl StyleReference for Style {
    fn style_name(&self) -> Option<&str> {
        self.name()
    }
}

impl StyleReference for str {
    fn style_name(&self) -> Option<&str> {
        Some(self)
    }
}

impl StyleReference for String {
    fn style_name(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: StyleReference + ?Sized> StyleReference for &T {
    fn style_name(&self) -> Option<&str> {
        (**self).style_name()
    }
}

// ============================================================================
// NODE-LEVEL ACCESSORS
// ============================================================================

/// Attribute holding the name of a style with the given tag
#[inline]
pub fn name_attribute(tag: &str) -> &'static str {
    if is_namespace(tag.as_bytes(), b"draw") {
        "draw:name"
    } else {
        "style:name"
    }
}

/// Family of a style node: the `style:family` attribute for `style:style`
/// and `style:default-style`, the family implied by the tag otherwise.
pub fn style_family(tree: &Tree, node: NodeId) -> Option<String> {
    let tag = tree.tag(node);
    match match_tag(tag) {
        OdfTag::StyleStyle | OdfTag::StyleDefaultStyle => {
            tree.attribute(node, "style:family").map(str::to_string)
        },
        _ => TAG_FAMILIES.get(tag).map(|f| f.to_string()),
    }
}

pub fn style_name(tree: &Tree, node: NodeId) -> Option<&str> {
    tree.attribute(node, name_attribute(tree.tag(node)))
}

pub fn style_display_name(tree: &Tree, node: NodeId) -> Option<&str> {
    tree.attribute(node, "style:display-name")
        .or_else(|| tree.attribute(node, "draw:display-name"))
}

/// Properties of a style node: the attributes of its
/// `style:<family>-properties` child, or of its first `*-properties` child
/// when the family has no dedicated area.
pub fn style_properties(tree: &Tree, node: NodeId) -> Vec<(String, String)> {
    let family = style_family(tree, node).unwrap_or_default();
    let preferred = format!("style:{family}-properties");
    let area = tree.child_by_tag(node, &preferred).or_else(|| {
        tree.children(node)
            .iter()
            .copied()
            .find(|&c| tree.tag(c).ends_with("-properties"))
    });
    area.map(|a| tree.attributes(a).to_vec()).unwrap_or_default()
}

/// Whether a style node matches a family and an optional name.
///
/// With `name == None` only default styles (`style:default-style`) match.
pub fn style_matches(tree: &Tree, node: NodeId, family: &str, name: Option<&str>) -> bool {
    if style_family(tree, node).as_deref() != Some(family) {
        return false;
    }
    match name {
        Some(name) => style_name(tree, node) == Some(name),
        None => match_tag(tree.tag(node)) == OdfTag::StyleDefaultStyle,
    }
}
