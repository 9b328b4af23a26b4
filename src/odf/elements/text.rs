//! Text elements: constructors for paragraphs, headings, spans, notes and
//! annotations, and the span splicer that applies a character style to
//! ranges of a paragraph's text.

use crate::common::{Error, Result};
use crate::odf::elements::element::{NodeId, Tree};
use crate::odf::elements::style::StyleReference;
use regex::Regex;

/// Note class of a `text:note`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClass {
    Footnote,
    Endnote,
}

impl NoteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Footnote => "footnote",
            Self::Endnote => "endnote",
        }
    }

    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "footnote" => Some(Self::Footnote),
            "endnote" => Some(Self::Endnote),
            _ => None,
        }
    }
}

/// Create a detached `text:p`.
pub fn create_paragraph(tree: &mut Tree, text: Option<&str>, style: Option<&str>) -> NodeId {
    let p = tree.create_element("text:p");
    if let Some(text) = text {
        tree.set_text(p, text);
    }
    if let Some(style) = style {
        tree.set_attribute(p, "text:style-name", style);
    }
    p
}

/// Create a detached `text:h` at the given outline level.
pub fn create_heading(tree: &mut Tree, level: u32, text: Option<&str>, style: Option<&str>) -> NodeId {
    let h = tree.create_element("text:h");
    tree.set_attribute(h, "text:outline-level", &level.to_string());
    if let Some(text) = text {
        tree.set_text(h, text);
    }
    if let Some(style) = style {
        tree.set_attribute(h, "text:style-name", style);
    }
    h
}

/// Create a detached `text:span` carrying a style name.
pub fn create_span(tree: &mut Tree, text: &str, style: &str) -> NodeId {
    let span = tree.create_element("text:span");
    tree.set_attribute(span, "text:style-name", style);
    tree.set_text(span, text);
    span
}

/// Create a detached `text:note` with its citation and a one-paragraph body.
pub fn create_note(
    tree: &mut Tree,
    class: NoteClass,
    id: Option<&str>,
    citation: &str,
    body: &str,
) -> NodeId {
    let note = tree.create_element("text:note");
    tree.set_attribute(note, "text:note-class", class.as_str());
    if let Some(id) = id {
        tree.set_attribute(note, "text:id", id);
    }
    let citation_node = tree.create_element("text:note-citation");
    tree.set_text(citation_node, citation);
    tree.append_child(note, citation_node);

    let body_node = tree.create_element("text:note-body");
    let p = create_paragraph(tree, Some(body), None);
    tree.append_child(body_node, p);
    tree.append_child(note, body_node);
    note
}

/// Create a detached `office:annotation`. The date defaults to now.
pub fn create_annotation(
    tree: &mut Tree,
    body: &str,
    creator: Option<&str>,
    date: Option<chrono::NaiveDateTime>,
) -> NodeId {
    let annotation = tree.create_element("office:annotation");
    if let Some(creator) = creator {
        let node = tree.create_element("dc:creator");
        tree.set_text(node, creator);
        tree.append_child(annotation, node);
    }
    let date = date.unwrap_or_else(|| chrono::Local::now().naive_local());
    let date_node = tree.create_element("dc:date");
    tree.set_text(date_node, &date.format("%Y-%m-%dT%H:%M:%S").to_string());
    tree.append_child(annotation, date_node);

    let p = create_paragraph(tree, Some(body), None);
    tree.append_child(annotation, p);
    annotation
}

/// Body of a note: the text of each paragraph of `text:note-body`, one per line.
pub fn note_body(tree: &Tree, note: NodeId) -> String {
    tree.child_by_tag(note, "text:note-body")
        .map(|body| paragraphs_text(tree, body))
        .unwrap_or_default()
}

/// Citation of a note, empty when absent.
pub fn note_citation(tree: &Tree, note: NodeId) -> String {
    tree.child_by_tag(note, "text:note-citation")
        .map(|c| tree.text_content(c))
        .unwrap_or_default()
}

/// Body of an annotation: its paragraphs, one per line.
pub fn annotation_body(tree: &Tree, annotation: NodeId) -> String {
    paragraphs_text(tree, annotation)
}

fn paragraphs_text(tree: &Tree, node: NodeId) -> String {
    tree.children(node)
        .iter()
        .copied()
        .filter(|&c| matches!(tree.tag(c), "text:p" | "text:h"))
        .map(|c| tree.text_content(c))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert a note as the first child of `paragraph`, or right after the first
/// occurrence of `after` in its text.
pub fn insert_note(tree: &mut Tree, paragraph: NodeId, note: NodeId, after: Option<&str>) -> Result<()> {
    insert_inline(tree, paragraph, note, after)
}

/// Insert an annotation as the first child of `paragraph`, or right after the
/// first occurrence of `after` in its text.
pub fn insert_annotation(
    tree: &mut Tree,
    paragraph: NodeId,
    annotation: NodeId,
    after: Option<&str>,
) -> Result<()> {
    insert_inline(tree, paragraph, annotation, after)
}

fn insert_inline(tree: &mut Tree, paragraph: NodeId, inline: NodeId, after: Option<&str>) -> Result<()> {
    let Some(after) = after else {
        tree.insert_child(paragraph, 0, inline);
        return Ok(());
    };
    for leaf in collect_leaves(tree, paragraph) {
        let Some(pos) = leaf.text(tree).find(after) else {
            continue;
        };
        let split = pos + after.len();
        let current = leaf.text(tree).to_string();
        let (before, rest) = current.split_at(split);
        tree.set_tail(inline, rest);
        leaf.set_text(tree, before);
        leaf.insert_after(tree, inline)?;
        return Ok(());
    }
    Err(Error::NotFound(format!("text '{after}' not found in paragraph")))
}

// ============================================================================
// SPAN SPLICER
// ============================================================================

/// Selection of the text a span is applied to
#[derive(Debug, Clone, Copy)]
pub enum SpanTarget<'a> {
    /// Every non-overlapping match of a regular expression, in each text leaf
    Pattern(&'a str),
    /// A character range over the element's whole text; `None` runs to the end
    Range { offset: usize, length: Option<usize> },
}

/// A run of character data: the text of a node or its tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    Text(NodeId),
    Tail(NodeId),
}

impl Leaf {
    fn text<'t>(&self, tree: &'t Tree) -> &'t str {
        match *self {
            Leaf::Text(node) => tree.text(node),
            Leaf::Tail(node) => tree.tail(node),
        }
    }

    fn set_text(&self, tree: &mut Tree, value: &str) {
        match *self {
            Leaf::Text(node) => tree.set_text(node, value),
            Leaf::Tail(node) => tree.set_tail(node, value),
        }
    }

    /// Put `inline` right after this run: first child for a text run, next
    /// sibling for a tail run.
    fn insert_after(&self, tree: &mut Tree, inline: NodeId) -> Result<()> {
        match *self {
            Leaf::Text(node) => tree.insert_child(node, 0, inline),
            Leaf::Tail(node) => {
                let (Some(parent), Some(index)) = (tree.parent(node), tree.index_in_parent(node)) else {
                    return Err(Error::Invariant("tail text without a parent".to_string()));
                };
                tree.insert_child(parent, index + 1, inline);
            },
        }
        Ok(())
    }
}

/// Text leaves under `element` in document order, its own tail excluded.
fn collect_leaves(tree: &Tree, element: NodeId) -> Vec<Leaf> {
    fn walk(tree: &Tree, node: NodeId, out: &mut Vec<Leaf>) {
        out.push(Leaf::Text(node));
        for &child in tree.children(node) {
            walk(tree, child, out);
            out.push(Leaf::Tail(child));
        }
    }
    let mut leaves = Vec::new();
    walk(tree, element, &mut leaves);
    leaves
}

/// Wrap the byte range `start..end` of a leaf in a styled `text:span`.
fn split_leaf(tree: &mut Tree, leaf: Leaf, start: usize, end: usize, style: &str) -> Result<()> {
    // Re-read: earlier splits of the same leaf truncated it.
    let current = leaf.text(tree).to_string();
    let before = &current[..start];
    let matched = &current[start..end];
    let after = &current[end..];

    let span = create_span(tree, matched, style);
    tree.set_tail(span, after);
    leaf.set_text(tree, before);
    leaf.insert_after(tree, span)
}

/// Apply a character style to parts of the text under `element`.
///
/// Each selected range becomes a `text:span` carrying `text:style-name`. The
/// concatenated text of the element is unchanged. Matches inside a leaf are
/// applied from last to first so earlier byte offsets stay valid; zero-length
/// matches are skipped. Returns the number of spans created.
///
/// # Examples
///
/// ```
/// use longan::odf::elements::parser::parse;
/// use longan::odf::elements::text::{set_span, SpanTarget};
///
/// let mut tree = parse(b"<text:p>red fish, blue fish</text:p>").unwrap();
/// let p = tree.root();
/// let count = set_span(&mut tree, p, "Em", SpanTarget::Pattern("fish")).unwrap();
/// assert_eq!(count, 2);
/// assert_eq!(tree.text_content(p), "red fish, blue fish");
/// ```
pub fn set_span<S: StyleReference + ?Sized>(
    tree: &mut Tree,
    element: NodeId,
    style: &S,
    target: SpanTarget<'_>,
) -> Result<usize> {
    let style = style
        .style_name()
        .ok_or_else(|| Error::InvalidArgument("style has no name".to_string()))?
        .to_string();

    let leaves = collect_leaves(tree, element);
    let mut created = 0;
    match target {
        SpanTarget::Pattern(pattern) => {
            let regex = Regex::new(pattern)?;
            for leaf in leaves {
                let ranges: Vec<(usize, usize)> = regex
                    .find_iter(leaf.text(tree))
                    .filter(|m| !m.is_empty())
                    .map(|m| (m.start(), m.end()))
                    .collect();
                for (start, end) in ranges.into_iter().rev() {
                    split_leaf(tree, leaf, start, end, &style)?;
                    created += 1;
                }
            }
        },
        SpanTarget::Range { offset, length } => {
            let end = match length {
                Some(length) => offset.saturating_add(length),
                None => usize::MAX,
            };
            for (leaf, start, stop) in leaf_ranges(tree, &leaves, offset, end) {
                split_leaf(tree, leaf, start, stop, &style)?;
                created += 1;
            }
        },
    }
    Ok(created)
}

/// Intersect the character range `offset..end` with each leaf, giving byte
/// ranges local to the leaves.
fn leaf_ranges(tree: &Tree, leaves: &[Leaf], offset: usize, end: usize) -> Vec<(Leaf, usize, usize)> {
    let mut out = Vec::new();
    let mut position = 0usize;
    for &leaf in leaves {
        let text = leaf.text(tree);
        let chars = text.chars().count();
        let leaf_start = position;
        let leaf_end = position + chars;
        position = leaf_end;

        let from = offset.max(leaf_start);
        let to = end.min(leaf_end);
        if from >= to {
            continue;
        }
        let byte_at = |char_index: usize| {
            text.char_indices()
                .nth(char_index)
                .map(|(b, _)| b)
                .unwrap_or(text.len())
        };
        out.push((leaf, byte_at(from - leaf_start), byte_at(to - leaf_start)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::elements::parser::{parse, serialize_node};
    use crate::odf::elements::style::Style;
    use proptest::prelude::*;

    #[test]
    fn test_two_matches_in_one_run() {
        let mut tree = parse(b"<text:p>a one b one c</text:p>").unwrap();
        let p = tree.root();
        let count = set_span(&mut tree, p, "Bold", SpanTarget::Pattern("one")).unwrap();
        assert_eq!(count, 2);

        assert_eq!(tree.text(p), "a ");
        let spans = tree.children(p).to_vec();
        assert_eq!(spans.len(), 2);
        assert_eq!(tree.text(spans[0]), "one");
        assert_eq!(tree.tail(spans[0]), " b ");
        assert_eq!(tree.text(spans[1]), "one");
        assert_eq!(tree.tail(spans[1]), " c");
        assert_eq!(tree.attribute(spans[0], "text:style-name"), Some("Bold"));
        assert_eq!(tree.text_content(p), "a one b one c");
    }

    #[test]
    fn test_tail_leaf_span_inserted_after_sibling() {
        let mut tree = parse(b"<text:p>x<text:s/>tail word end</text:p>").unwrap();
        let p = tree.root();
        let count = set_span(&mut tree, p, "S", SpanTarget::Pattern("word")).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            serialize_node(&tree, p, false).unwrap(),
            r#"<text:p>x<text:s/>tail <text:span text:style-name="S">word</text:span> end</text:p>"#
        );
    }

    #[test]
    fn test_no_match_leaves_tree_untouched() {
        let mut tree = parse(b"<text:p>nothing here</text:p>").unwrap();
        let p = tree.root();
        let before = serialize_node(&tree, p, false).unwrap();
        assert_eq!(set_span(&mut tree, p, "S", SpanTarget::Pattern("zzz")).unwrap(), 0);
        assert_eq!(set_span(&mut tree, p, "S", SpanTarget::Pattern("x*")).unwrap(), 0);
        assert_eq!(serialize_node(&tree, p, false).unwrap(), before);
    }

    #[test]
    fn test_range_spanning_leaves() {
        let mut tree = parse("<text:p>héllo <text:span>wörld</text:span> again</text:p>".as_bytes()).unwrap();
        let p = tree.root();
        let count = set_span(
            &mut tree,
            p,
            "R",
            SpanTarget::Range {
                offset: 4,
                length: Some(5),
            },
        )
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(tree.text_content(p), "héllo wörld again");
        let styled: Vec<String> = tree
            .find_all(p, "text:span")
            .into_iter()
            .filter(|&s| tree.attribute(s, "text:style-name") == Some("R"))
            .map(|s| tree.text(s).to_string())
            .collect();
        assert_eq!(styled, vec!["o ".to_string(), "wör".to_string()]);
    }

    #[test]
    fn test_range_to_end_and_style_object() {
        let mut tree = parse(b"<text:p>abcdef</text:p>").unwrap();
        let p = tree.root();
        let style = Style::new("text", Some("Tail")).unwrap();
        let target = SpanTarget::Range { offset: 3, length: None };
        assert_eq!(set_span(&mut tree, p, &style, target).unwrap(), 1);
        let span = tree.children(p)[0];
        assert_eq!(tree.text(p), "abc");
        assert_eq!(tree.text(span), "def");
        assert_eq!(tree.attribute(span, "text:style-name"), Some("Tail"));
    }

    #[test]
    fn test_unnamed_style_and_bad_pattern_fail() {
        let mut tree = parse(b"<text:p>abc</text:p>").unwrap();
        let p = tree.root();
        let anonymous = Style::new("text", None).unwrap();
        assert!(matches!(
            set_span(&mut tree, p, &anonymous, SpanTarget::Pattern("a")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            set_span(&mut tree, p, "S", SpanTarget::Pattern("(")),
            Err(Error::Pattern(_))
        ));
    }

    #[test]
    fn test_insert_note_after_text() {
        let mut tree = parse(b"<text:p>See here for more</text:p>").unwrap();
        let p = tree.root();
        let note = create_note(&mut tree, NoteClass::Footnote, Some("ftn1"), "1", "The note");
        insert_note(&mut tree, p, note, Some("here")).unwrap();
        assert_eq!(tree.text(p), "See here");
        assert_eq!(tree.tail(note), " for more");
        assert_eq!(note_body(&tree, note), "The note");
        assert_eq!(note_citation(&tree, note), "1");

        let other = create_note(&mut tree, NoteClass::Endnote, None, "i", "x");
        assert!(insert_note(&mut tree, p, other, Some("absent")).is_err());
    }

    #[test]
    fn test_insert_annotation_first_child() {
        let mut tree = parse(b"<text:p>Body<text:s/></text:p>").unwrap();
        let p = tree.root();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let annotation = create_annotation(&mut tree, "Check", Some("Ann"), Some(date));
        insert_annotation(&mut tree, p, annotation, None).unwrap();
        assert_eq!(tree.children(p)[0], annotation);
        assert_eq!(annotation_body(&tree, annotation), "Check");
        let date_node = tree.child_by_tag(annotation, "dc:date").unwrap();
        assert_eq!(tree.text(date_node), "2024-05-01T10:00:00");
    }

    proptest! {
        #[test]
        fn prop_set_span_preserves_text(a in "[ab ]{0,20}", b in "[ab ]{0,20}", c in "[ab ]{0,20}") {
            let mut tree = Tree::new("text:p");
            let p = tree.root();
            tree.set_text(p, &a);
            let inner = tree.create_element("text:span");
            tree.set_text(inner, &b);
            tree.set_tail(inner, &c);
            tree.append_child(p, inner);

            let expected = a.matches("ab").count() + b.matches("ab").count() + c.matches("ab").count();
            let created = set_span(&mut tree, p, "S", SpanTarget::Pattern("ab")).unwrap();
            prop_assert_eq!(created, expected);
            prop_assert_eq!(tree.text_content(p), format!("{a}{b}{c}"));
        }
    }
}
