//! XML reading and writing for [`Tree`].
//!
//! Parsing is a single pass over quick-xml events: start tags allocate nodes,
//! character data goes to the text of the open element or to the tail of the
//! element that just closed. Comments, processing instructions and the
//! doctype are dropped.
//!
//! Serialization writes the tree back verbatim, or with two-space indentation
//! when `pretty` is set. Indentation is only introduced inside element-only
//! content, so mixed content such as a paragraph never changes its text.

use crate::common::{Error, Result};
use crate::odf::elements::element::{NodeId, Tree};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};

/// Parse a complete XML document or snippet into a tree.
///
/// # Examples
///
/// ```
/// use longan::odf::elements::parser::parse;
///
/// let tree = parse(br#"<text:p text:style-name="P1">a &amp; b<text:s/></text:p>"#).unwrap();
/// assert_eq!(tree.tag(tree.root()), "text:p");
/// assert_eq!(tree.text(tree.root()), "a & b");
/// ```
pub fn parse(bytes: &[u8]) -> Result<Tree> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut tree: Option<Tree> = None;
    let mut stack: Vec<NodeId> = Vec::new();
    // Element that closed most recently at the current depth: receives tail text.
    let mut last_closed: Option<NodeId> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let id = open_element(&mut tree, &stack, e)?;
                stack.push(id);
                last_closed = None;
            },
            Event::Empty(ref e) => {
                let id = open_element(&mut tree, &stack, e)?;
                last_closed = Some(id);
            },
            Event::End(_) => {
                last_closed = stack.pop();
            },
            Event::Text(ref t) => {
                let raw = t.decode().map_err(|e| Error::Xml(e.to_string()))?;
                let text = quick_xml::escape::unescape(&raw)?;
                push_character_data(&mut tree, &stack, last_closed, &text);
            },
            Event::CData(ref t) => {
                let text = reader.decoder().decode(t).map_err(|e| Error::Xml(e.to_string()))?;
                push_character_data(&mut tree, &stack, last_closed, &text);
            },
            Event::GeneralRef(ref r) => {
                let resolved = resolve_reference(r)?;
                push_character_data(&mut tree, &stack, last_closed, &resolved);
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unexpected end of document".to_string()));
    }
    tree.ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

fn open_element(tree: &mut Option<Tree>, stack: &[NodeId], e: &BytesStart<'_>) -> Result<NodeId> {
    let tag = std::str::from_utf8(e.name().as_ref())?.to_string();
    let id = match (tree.as_mut(), stack.last()) {
        (None, _) => {
            let new_tree = Tree::new(&tag);
            let root = new_tree.root();
            *tree = Some(new_tree);
            root
        },
        (Some(t), Some(&parent)) => {
            let id = t.create_element(&tag);
            t.append_child(parent, id);
            id
        },
        (Some(_), None) => {
            return Err(Error::Xml(format!("second root element <{tag}>")));
        },
    };

    if let Some(t) = tree.as_mut() {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::Xml(err.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let raw = std::str::from_utf8(&attr.value)?;
            let value = quick_xml::escape::unescape(raw)?;
            t.set_attribute(id, key, &value);
        }
    }
    Ok(id)
}

fn push_character_data(
    tree: &mut Option<Tree>,
    stack: &[NodeId],
    last_closed: Option<NodeId>,
    text: &str,
) {
    let Some(tree) = tree.as_mut() else {
        return;
    };
    match (last_closed, stack.last()) {
        (Some(closed), _) if tree.parent(closed).is_some() => tree.tail_mut(closed).push_str(text),
        (_, Some(&open)) => tree.text_mut(open).push_str(text),
        // Character data after the root element is dropped.
        _ => {},
    }
}

/// Resolve a character or predefined entity reference.
fn resolve_reference(r: &BytesRef<'_>) -> Result<String> {
    let name = r.decode().map_err(|e| Error::Xml(e.to_string()))?;
    let entity = format!("&{name};");
    Ok(quick_xml::escape::unescape(&entity)?.into_owned())
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Serialize a whole tree as an XML document with a UTF-8 declaration.
pub fn serialize(tree: &Tree, pretty: bool) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    write_node(&mut writer, tree, tree.root(), pretty, 0)?;
    if pretty {
        writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    }
    Ok(writer.into_inner())
}

/// Serialize one element (without its tail) as an XML snippet.
pub fn serialize_node(tree: &Tree, node: NodeId, pretty: bool) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, tree, node, pretty, 0)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Element-only content: at least one child and nothing but whitespace
/// between the children.
fn has_element_only_content(tree: &Tree, node: NodeId) -> bool {
    let children = tree.children(node);
    !children.is_empty() && is_blank(tree.text(node)) && children.iter().all(|&c| is_blank(tree.tail(c)))
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    tree: &Tree,
    node: NodeId,
    pretty: bool,
    depth: usize,
) -> Result<()> {
    let tag = tree.tag(node);
    let mut start = BytesStart::new(tag);
    for (key, value) in tree.attributes(node) {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let children = tree.children(node);
    if children.is_empty() && tree.text(node).is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    let indent = pretty && has_element_only_content(tree, node);
    if indent {
        for &child in children {
            write_indent(writer, depth + 1)?;
            write_node(writer, tree, child, pretty, depth + 1)?;
        }
        write_indent(writer, depth)?;
    } else {
        write_text(writer, tree.text(node))?;
        for &child in children {
            write_node(writer, tree, child, pretty, depth + 1)?;
            write_text(writer, tree.tail(child))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    Ok(())
}

fn write_indent(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<()> {
    let indent = format!("\n{}", "  ".repeat(depth));
    writer.write_event(Event::Text(BytesText::from_escaped(indent)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_tails() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<office:text><text:p>one <text:span text:style-name="T1">two</text:span> three<text:s text:c="2"/>four</text:p></office:text>"#;
        let tree = parse(xml).unwrap();
        let root = tree.root();
        assert_eq!(tree.tag(root), "office:text");
        let p = tree.children(root)[0];
        assert_eq!(tree.text(p), "one ");
        let span = tree.children(p)[0];
        assert_eq!(tree.attribute(span, "text:style-name"), Some("T1"));
        assert_eq!(tree.tail(span), " three");
        let s = tree.children(p)[1];
        assert_eq!(tree.attribute(s, "text:c"), Some("2"));
        assert_eq!(tree.tail(s), "four");
        assert_eq!(tree.text_content(p), "one two threefour");
    }

    #[test]
    fn test_parse_references() {
        let tree = parse(b"<a x=\"&lt;1&gt;\">&#65;&amp;&#x42;</a>").unwrap();
        let root = tree.root();
        assert_eq!(tree.text(root), "A&B");
        assert_eq!(tree.attribute(root, "x"), Some("<1>"));
    }

    #[test]
    fn test_parse_rejects_unclosed() {
        assert!(parse(b"<a><b></b>").is_err());
        assert!(parse(b"").is_err());
    }

    #[test]
    fn test_serialize_roundtrip_preserves_mixed_content() {
        let xml = br#"<text:p a="1 &amp; 2">x <text:span>y</text:span> z</text:p>"#;
        let tree = parse(xml).unwrap();
        let snippet = serialize_node(&tree, tree.root(), true).unwrap();
        assert_eq!(snippet, r#"<text:p a="1 &amp; 2">x <text:span>y</text:span> z</text:p>"#);
    }

    #[test]
    fn test_pretty_indents_element_only_content() {
        let tree = parse(b"<a><b><c/></b><d>t</d></a>").unwrap();
        let out = serialize_node(&tree, tree.root(), true).unwrap();
        assert_eq!(out, "<a>\n  <b>\n    <c/>\n  </b>\n  <d>t</d>\n</a>");
        let flat = serialize_node(&tree, tree.root(), false).unwrap();
        assert_eq!(flat, "<a><b><c/></b><d>t</d></a>");
    }

    #[test]
    fn test_serialize_document_has_declaration() {
        let tree = parse(b"<office:document-meta/>").unwrap();
        let bytes = serialize(&tree, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<office:document-meta/>"));
    }
}
