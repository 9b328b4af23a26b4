//! Formatted-text rendering of a document body.
//!
//! The renderer walks the body in document order. Each top-level block is
//! rendered, then the footnotes, annotations and images it produced are
//! flushed right after it; endnotes are written once at the very end. Tables
//! are rendered atomically and skip the per-block flush.
//!
//! Two output modes are supported, see [`TextMode`]: plain text with
//! bracketed markers, and reStructuredText.
//!
//! # Examples
//!
//! ```
//! use longan::odf::{Document, TextMode};
//!
//! # fn main() -> longan::Result<()> {
//! let mut doc = Document::new_from_template("text")?;
//! let text = doc.get_formatted_text(TextMode::Plain)?;
//! assert!(text.is_empty());
//! # Ok(())
//! # }
//! ```

mod context;
mod table;

use crate::common::{Error, Result};
use crate::odf::constants::FORMATTED_TEXT_TYPES;
use crate::odf::core::TextMode;
use crate::odf::document::Document;
use crate::odf::elements::element::{NodeId, Tree};
use crate::odf::elements::tag_matcher::{OdfTag, match_tag};
use crate::odf::elements::text::{NoteClass, annotation_body, note_body, note_citation};
use context::RenderContext;

/// Underline characters of rst section titles, by outline level
const LEVEL_STYLES: [char; 10] = ['#', '=', '-', '~', '`', '+', '^', '°', '\'', '.'];

impl Document {
    /// Render the body as text.
    ///
    /// Only text and presentation documents (and their templates) are
    /// supported; any other type fails with [`Error::Unsupported`].
    pub fn get_formatted_text(&mut self, mode: TextMode) -> Result<String> {
        let doc_type = self.get_type()?;
        if !FORMATTED_TEXT_TYPES.contains(&doc_type.as_str()) {
            return Err(Error::Unsupported(format!("formatted text of a '{doc_type}' document")));
        }
        let body = self.body()?;
        let content = self.content()?;
        TextRenderer::new(content.tree(), mode).render_body(body)
    }
}

/// Recursive-descent renderer over one content tree.
pub(crate) struct TextRenderer<'a> {
    tree: &'a Tree,
    context: RenderContext,
}

impl<'a> TextRenderer<'a> {
    pub fn new(tree: &'a Tree, mode: TextMode) -> Self {
        Self {
            tree,
            context: RenderContext::new(mode),
        }
    }

    /// Render every child of `body`, flushing out-of-band content after each
    /// non-table block and the endnotes at the end.
    pub fn render_body(mut self, body: NodeId) -> Result<String> {
        let tree = self.tree;
        let mut out = String::with_capacity(4096);
        for &child in tree.children(body) {
            if match_tag(tree.tag(child)) == OdfTag::TableTable {
                self.render_table(child, &mut out)?;
            } else {
                self.render_block(child, &mut out)?;
                self.context.flush_block(&mut out);
            }
        }
        self.context.flush_endnotes(&mut out);
        Ok(out)
    }

    fn render_block(&mut self, node: NodeId, out: &mut String) -> Result<()> {
        let tree = self.tree;
        match match_tag(tree.tag(node)) {
            OdfTag::TextP => {
                self.render_inline(node, out)?;
                out.push('\n');
            },
            OdfTag::TextH => self.render_heading(node, out)?,
            OdfTag::TextList => self.render_list(node, out)?,
            OdfTag::TableTable => self.render_table(node, out)?,
            OdfTag::DrawFrame => self.render_frame(node, out)?,
            OdfTag::DrawPage | OdfTag::PresentationNotes => {
                for &child in tree.children(node) {
                    self.render_block(child, out)?;
                }
                out.push('\n');
            },
            _ => {
                for &child in tree.children(node) {
                    self.render_block(child, out)?;
                }
            },
        }
        Ok(())
    }

    /// Text of a paragraph-like element, markers for notes and annotations
    /// included.
    fn render_inline(&mut self, node: NodeId, out: &mut String) -> Result<()> {
        let tree = self.tree;
        out.push_str(tree.text(node));
        for &child in tree.children(node) {
            match match_tag(tree.tag(child)) {
                OdfTag::TextSpan | OdfTag::TextA | OdfTag::TextP => self.render_inline(child, out)?,
                OdfTag::TextNote => self.render_note(child, out),
                OdfTag::OfficeAnnotation => {
                    self.context.annotations.push(annotation_body(tree, child));
                    out.push_str("[*]");
                },
                OdfTag::TextTab => out.push('\t'),
                OdfTag::TextLineBreak => out.push('\n'),
                OdfTag::TextS => {
                    let count = tree
                        .attribute(child, "text:c")
                        .and_then(|c| c.parse::<usize>().ok())
                        .unwrap_or(1);
                    out.extend(std::iter::repeat_n(' ', count));
                },
                OdfTag::DrawFrame => self.render_frame(child, out)?,
                OdfTag::OfficeAnnotationEnd | OdfTag::TextSoftPageBreak => {},
                _ => self.render_inline(child, out)?,
            }
            out.push_str(tree.tail(child));
        }
        Ok(())
    }

    fn render_note(&mut self, note: NodeId, out: &mut String) {
        let tree = self.tree;
        let class = tree
            .attribute(note, "text:note-class")
            .and_then(NoteClass::from_attribute)
            .unwrap_or(NoteClass::Footnote);
        let notes = match class {
            NoteClass::Footnote => &mut self.context.footnotes,
            NoteClass::Endnote => &mut self.context.endnotes,
        };
        let mut citation = note_citation(tree, note);
        if citation.is_empty() {
            citation = notes.len().to_string();
        }
        match class {
            NoteClass::Footnote => out.push_str(&format!("[{citation}]")),
            NoteClass::Endnote => out.push_str(&format!("({citation})")),
        }
        notes.push((citation, note_body(tree, note)));
    }

    fn render_heading(&mut self, heading: NodeId, out: &mut String) -> Result<()> {
        let mut title = String::new();
        self.context.inline_image_level += 1;
        let rendered = self.render_inline(heading, &mut title);
        self.context.inline_image_level -= 1;
        rendered?;
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        if !self.context.is_rst() {
            out.push_str(&title);
            out.push('\n');
            return Ok(());
        }
        let level = self
            .tree
            .attribute(heading, "text:outline-level")
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        let underline = LEVEL_STYLES
            .get(level - 1)
            .ok_or_else(|| Error::Unsupported(format!("heading level {level}")))?;
        let underline: String = std::iter::repeat_n(*underline, title.chars().count()).collect();
        out.push('\n');
        out.push_str(&title);
        out.push('\n');
        out.push_str(&underline);
        out.push('\n');
        Ok(())
    }

    fn render_list(&mut self, list: NodeId, out: &mut String) -> Result<()> {
        let tree = self.tree;
        let rst = self.context.is_rst();
        if rst {
            out.push('\n');
        }
        for &item in tree.children(list) {
            if !matches!(match_tag(tree.tag(item)), OdfTag::TextListItem | OdfTag::TextListHeader) {
                continue;
            }
            let mut buffer = String::new();
            for &child in tree.children(item) {
                self.render_block(child, &mut buffer)?;
            }
            out.push_str("- ");
            out.push_str(&buffer.trim_matches('\n').replace('\n', "\n  "));
            out.push('\n');
        }
        if rst {
            out.push('\n');
        }
        Ok(())
    }

    fn render_frame(&mut self, frame: NodeId, out: &mut String) -> Result<()> {
        let tree = self.tree;
        for &child in tree.children(frame) {
            match match_tag(tree.tag(child)) {
                OdfTag::DrawImage => self.render_image(frame, child, out),
                OdfTag::DrawTextBox => {
                    let mut inner = String::new();
                    for &element in tree.children(child) {
                        self.render_block(element, &mut inner)?;
                    }
                    let indented = format!("  {}", inner.replace('\n', "\n  "));
                    out.push_str(indented.trim_end_matches(' '));
                },
                _ => self.render_block(child, out)?,
            }
        }
        out.push('\n');
        Ok(())
    }

    fn render_image(&mut self, frame: NodeId, image: NodeId, out: &mut String) {
        let tree = self.tree;
        let path = tree.attribute(image, "xlink:href").unwrap_or_default();
        if self.context.inline_image_level > 0 {
            out.push_str(path);
        } else if self.context.is_rst() {
            let reference = self.context.push_image(
                path,
                tree.attribute(frame, "svg:width"),
                tree.attribute(frame, "svg:height"),
            );
            out.push_str(&reference);
        } else {
            out.push_str(&format!("[{path}]"));
        }
    }
}
