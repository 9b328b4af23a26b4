//! Arena-backed XML element tree.
//!
//! Every ODF part is parsed into one [`Tree`]: a flat vector of nodes that
//! reference their parent and children by [`NodeId`]. Handles stay valid for
//! the lifetime of the tree, including after a node is detached, so the style
//! engine, the splicer and the renderer can all hold ids into the same part
//! without fighting over borrows.
//!
//! Text follows the text/tail model: `text` is the character data before the
//! first child, `tail` the character data after the node's end tag and before
//! its next sibling.

use std::fmt;

/// Handle of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    tail: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned XML element tree.
///
/// Cloning a tree is a plain arena copy; node ids taken from the original are
/// valid in the clone and designate the same positions.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

/// A detached subtree built from an XML snippet, ready to be imported into a
/// part's tree.
pub type Fragment = Tree;

impl Tree {
    /// Create a tree holding a single empty root element.
    pub fn new(root_tag: &str) -> Self {
        let root = Node {
            tag: root_tag.to_string(),
            ..Node::default()
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Root element of the tree
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes allocated in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        id
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    // ------------------------------------------------------------------
    // Tag and attributes
    // ------------------------------------------------------------------

    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    pub fn set_tag(&mut self, id: NodeId, tag: &str) {
        self.node_mut(id).tag = tag.to_string();
    }

    /// Attributes in document order
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        &self.node(id).attributes
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let attributes = &mut self.node_mut(id).attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let attributes = &mut self.node_mut(id).attributes;
        let pos = attributes.iter().position(|(key, _)| key == name)?;
        Some(attributes.remove(pos).1)
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.node_mut(id).text = text.to_string();
    }

    pub fn tail(&self, id: NodeId) -> &str {
        &self.node(id).tail
    }

    pub fn set_tail(&mut self, id: NodeId, tail: &str) {
        self.node_mut(id).tail = tail.to_string();
    }

    pub(crate) fn text_mut(&mut self, id: NodeId) -> &mut String {
        &mut self.node_mut(id).text
    }

    pub(crate) fn tail_mut(&mut self, id: NodeId) -> &mut String {
        &mut self.node_mut(id).tail
    }

    /// Concatenated character data of the element and its descendants,
    /// excluding the element's own tail.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        out.push_str(&node.text);
        for &child in &node.children {
            self.collect_text(child, out);
            out.push_str(&self.node(child).tail);
        }
    }

    /// Replace all content of the element with a single text run.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        for child in self.node(id).children.clone() {
            self.node_mut(child).parent = None;
        }
        let node = self.node_mut(id);
        node.children.clear();
        node.text = text.to_string();
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Position of the node among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last().copied().unwrap_or(id) == self.root
    }

    /// Ancestors from the parent up to the topmost element.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// All descendants in document order, the node itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// First direct child with the given tag
    pub fn child_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.tag(c) == tag)
    }

    /// First descendant with the given tag, in document order.
    pub fn find_first(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id).into_iter().find(|&d| self.tag(d) == tag)
    }

    /// Every descendant with the given tag, in document order.
    pub fn find_all(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&d| self.tag(d) == tag)
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `child` at `index` among the children of `parent`, detaching it
    /// first. Indexes past the end append.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Remove the node from its parent.
    ///
    /// The node's tail stays in the document: it is appended to the previous
    /// sibling's tail, or to the parent's text when the node was first.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let Some(index) = self.index_in_parent(id) else {
            return;
        };
        self.node_mut(parent).children.remove(index);
        self.node_mut(id).parent = None;

        let tail = std::mem::take(&mut self.node_mut(id).tail);
        if tail.is_empty() {
            return;
        }
        if index == 0 {
            self.node_mut(parent).text.push_str(&tail);
        } else {
            let previous = self.node(parent).children[index - 1];
            self.node_mut(previous).tail.push_str(&tail);
        }
    }

    /// Deep-copy the subtree rooted at `node` of `other` into this arena.
    ///
    /// The copy is returned detached; the source node's tail is not copied.
    pub fn import(&mut self, other: &Tree, node: NodeId) -> NodeId {
        let copy = self.create_element(other.tag(node));
        {
            let source = other.node(node);
            let target = self.node_mut(copy);
            target.attributes = source.attributes.clone();
            target.text = source.text.clone();
        }
        for &child in other.children(node) {
            let child_copy = self.import(other, child);
            self.node_mut(child_copy).tail = other.tail(child).to_string();
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Deep copy of the subtree rooted at `node` as a standalone tree.
    pub fn extract(&self, node: NodeId) -> Fragment {
        let mut fragment = Tree::new("");
        let copy = fragment.import(self, node);
        fragment.root = copy;
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new("text:p");
        let root = tree.root();
        tree.set_text(root, "Hello ");
        let a = tree.create_element("text:span");
        tree.set_text(a, "big");
        tree.set_tail(a, " world");
        tree.append_child(root, a);
        let b = tree.create_element("text:s");
        tree.set_tail(b, "!");
        tree.append_child(root, b);
        (tree, root, a, b)
    }

    #[test]
    fn test_text_content_follows_document_order() {
        let (tree, root, a, _) = sample();
        assert_eq!(tree.text_content(root), "Hello big world!");
        assert_eq!(tree.text_content(a), "big");
    }

    #[test]
    fn test_attributes_keep_order_and_replace_in_place() {
        let mut tree = Tree::new("style:style");
        let root = tree.root();
        tree.set_attribute(root, "style:name", "A");
        tree.set_attribute(root, "style:family", "paragraph");
        tree.set_attribute(root, "style:name", "B");
        assert_eq!(tree.attribute(root, "style:name"), Some("B"));
        assert_eq!(tree.attributes(root)[0].0, "style:name");
        assert_eq!(tree.remove_attribute(root, "style:name").as_deref(), Some("B"));
        assert_eq!(tree.attribute(root, "style:name"), None);
    }

    #[test]
    fn test_detach_keeps_tail_text() {
        let (mut tree, root, a, b) = sample();
        tree.detach(a);
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.text(root), "Hello  world");
        assert_eq!(tree.text_content(root), "Hello  world!");
        assert!(!tree.is_attached(a));

        tree.detach(b);
        assert_eq!(tree.text(root), "Hello  world!");
    }

    #[test]
    fn test_insert_child_and_index() {
        let (mut tree, root, a, b) = sample();
        let c = tree.create_element("text:tab");
        tree.insert_child(root, 1, c);
        assert_eq!(tree.children(root), &[a, c, b]);
        assert_eq!(tree.index_in_parent(c), Some(1));
        assert_eq!(tree.parent(c), Some(root));
    }

    #[test]
    fn test_import_copies_subtree() {
        let (source, root, _, _) = sample();
        let mut target = Tree::new("office:text");
        let copy = target.import(&source, root);
        let target_root = target.root();
        target.append_child(target_root, copy);
        assert_eq!(target.text_content(target_root), "Hello big world!");
        assert_eq!(target.find_all(target_root, "text:span").len(), 1);
    }

    #[test]
    fn test_extract_builds_fragment() {
        let (source, root, a, _) = sample();
        let fragment = source.extract(a);
        assert_eq!(fragment.tag(fragment.root()), "text:span");
        assert_eq!(fragment.text_content(fragment.root()), "big");
        assert_eq!(fragment.tail(fragment.root()), "");
        assert_eq!(source.text_content(root), "Hello big world!");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut tree = Tree::new("a");
        let root = tree.root();
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        let d = tree.create_element("d");
        tree.append_child(root, b);
        tree.append_child(b, c);
        tree.append_child(root, d);
        assert_eq!(tree.descendants(root), vec![b, c, d]);
        assert_eq!(tree.ancestors(c), vec![b, root]);
        assert_eq!(tree.find_first(root, "d"), Some(d));
    }
}
