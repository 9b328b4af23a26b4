//! ODF XML elements: the node arena, the quick-xml bridge, tag dispatch and
//! the element-level helpers for styles, notes, annotations and spans.

/// Arena tree of XML elements
pub mod element;
/// Parsing and serialization of element trees
pub mod parser;
/// Style elements
pub mod style;
/// Qualified tag dispatch
pub mod tag_matcher;
/// Text elements (paragraphs, headings, spans, notes, annotations)
pub mod text;
