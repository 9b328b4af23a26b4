//! ODF tag classification.
//!
//! Tag names are mapped once to an [`OdfTag`] through a compile-time perfect
//! hash map, so the renderer and the style engine dispatch with `match`
//! instead of chains of string comparisons.

use phf::{Map, phf_map};

/// ODF element tags the crate dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OdfTag {
    // Text elements
    TextP,
    TextH,
    TextSpan,
    TextA,
    TextLineBreak,
    TextS,
    TextTab,
    TextList,
    TextListItem,
    TextListHeader,
    TextNote,
    TextNoteBody,
    TextNoteCitation,
    TextSection,
    TextSoftPageBreak,
    TextListStyle,
    TextOutlineStyle,

    // Table elements
    TableTable,
    TableTableRow,
    TableTableCell,
    TableCoveredTableCell,
    TableTableColumn,
    TableTableHeaderRows,
    TableTableRows,
    TableTableRowGroup,

    // Drawing elements
    DrawFrame,
    DrawImage,
    DrawTextBox,
    DrawPage,
    DrawFillImage,
    DrawMarker,
    DrawGradient,
    DrawHatch,
    DrawOpacity,
    DrawStrokeDash,

    // Style elements
    StyleStyle,
    StyleDefaultStyle,
    StyleFontFace,
    StyleMasterPage,
    StylePageLayout,
    StylePresentationPageLayout,

    // Number style elements
    NumberNumberStyle,
    NumberCurrencyStyle,
    NumberPercentageStyle,
    NumberDateStyle,
    NumberTimeStyle,
    NumberBooleanStyle,
    NumberTextStyle,

    // Office elements
    OfficeDocumentContent,
    OfficeDocumentStyles,
    OfficeBody,
    OfficeText,
    OfficeSpreadsheet,
    OfficePresentation,
    OfficeDrawing,
    OfficeStyles,
    OfficeAutomaticStyles,
    OfficeMasterStyles,
    OfficeFontFaceDecls,
    OfficeAnnotation,
    OfficeAnnotationEnd,

    // Presentation elements
    PresentationNotes,

    /// Anything not listed above
    Unknown,
}

static TAG_MAP: Map<&'static [u8], OdfTag> = phf_map! {
    b"text:p" => OdfTag::TextP,
    b"text:h" => OdfTag::TextH,
    b"text:span" => OdfTag::TextSpan,
    b"text:a" => OdfTag::TextA,
    b"text:line-break" => OdfTag::TextLineBreak,
    b"text:s" => OdfTag::TextS,
    b"text:tab" => OdfTag::TextTab,
    b"text:list" => OdfTag::TextList,
    b"text:list-item" => OdfTag::TextListItem,
    b"text:list-header" => OdfTag::TextListHeader,
    b"text:note" => OdfTag::TextNote,
    b"text:note-body" => OdfTag::TextNoteBody,
    b"text:note-citation" => OdfTag::TextNoteCitation,
    b"text:section" => OdfTag::TextSection,
    b"text:soft-page-break" => OdfTag::TextSoftPageBreak,
    b"text:list-style" => OdfTag::TextListStyle,
    b"text:outline-style" => OdfTag::TextOutlineStyle,

    b"table:table" => OdfTag::TableTable,
    b"table:table-row" => OdfTag::TableTableRow,
    b"table:table-cell" => OdfTag::TableTableCell,
    b"table:covered-table-cell" => OdfTag::TableCoveredTableCell,
    b"table:table-column" => OdfTag::TableTableColumn,
    b"table:table-header-rows" => OdfTag::TableTableHeaderRows,
    b"table:table-rows" => OdfTag::TableTableRows,
    b"table:table-row-group" => OdfTag::TableTableRowGroup,

    b"draw:frame" => OdfTag::DrawFrame,
    b"draw:image" => OdfTag::DrawImage,
    b"draw:text-box" => OdfTag::DrawTextBox,
    b"draw:page" => OdfTag::DrawPage,
    b"draw:fill-image" => OdfTag::DrawFillImage,
    b"draw:marker" => OdfTag::DrawMarker,
    b"draw:gradient" => OdfTag::DrawGradient,
    b"draw:hatch" => OdfTag::DrawHatch,
    b"draw:opacity" => OdfTag::DrawOpacity,
    b"draw:stroke-dash" => OdfTag::DrawStrokeDash,

    b"style:style" => OdfTag::StyleStyle,
    b"style:default-style" => OdfTag::StyleDefaultStyle,
    b"style:font-face" => OdfTag::StyleFontFace,
    b"style:master-page" => OdfTag::StyleMasterPage,
    b"style:page-layout" => OdfTag::StylePageLayout,
    b"style:presentation-page-layout" => OdfTag::StylePresentationPageLayout,

    b"number:number-style" => OdfTag::NumberNumberStyle,
    b"number:currency-style" => OdfTag::NumberCurrencyStyle,
    b"number:percentage-style" => OdfTag::NumberPercentageStyle,
    b"number:date-style" => OdfTag::NumberDateStyle,
    b"number:time-style" => OdfTag::NumberTimeStyle,
    b"number:boolean-style" => OdfTag::NumberBooleanStyle,
    b"number:text-style" => OdfTag::NumberTextStyle,

    b"office:document-content" => OdfTag::OfficeDocumentContent,
    b"office:document-styles" => OdfTag::OfficeDocumentStyles,
    b"office:body" => OdfTag::OfficeBody,
    b"office:text" => OdfTag::OfficeText,
    b"office:spreadsheet" => OdfTag::OfficeSpreadsheet,
    b"office:presentation" => OdfTag::OfficePresentation,
    b"office:drawing" => OdfTag::OfficeDrawing,
    b"office:styles" => OdfTag::OfficeStyles,
    b"office:automatic-styles" => OdfTag::OfficeAutomaticStyles,
    b"office:master-styles" => OdfTag::OfficeMasterStyles,
    b"office:font-face-decls" => OdfTag::OfficeFontFaceDecls,
    b"office:annotation" => OdfTag::OfficeAnnotation,
    b"office:annotation-end" => OdfTag::OfficeAnnotationEnd,

    b"presentation:notes" => OdfTag::PresentationNotes,
};

impl OdfTag {
    /// Whether the tag names a style element accepted by insertion and merge.
    pub fn is_registered_style(self) -> bool {
        matches!(
            self,
            OdfTag::StyleStyle
                | OdfTag::StyleDefaultStyle
                | OdfTag::StyleFontFace
                | OdfTag::StyleMasterPage
                | OdfTag::StylePageLayout
                | OdfTag::StylePresentationPageLayout
                | OdfTag::TextListStyle
                | OdfTag::TextOutlineStyle
                | OdfTag::DrawFillImage
                | OdfTag::DrawMarker
                | OdfTag::DrawGradient
                | OdfTag::DrawHatch
                | OdfTag::DrawOpacity
                | OdfTag::DrawStrokeDash
                | OdfTag::NumberNumberStyle
                | OdfTag::NumberCurrencyStyle
                | OdfTag::NumberPercentageStyle
                | OdfTag::NumberDateStyle
                | OdfTag::NumberTimeStyle
                | OdfTag::NumberBooleanStyle
                | OdfTag::NumberTextStyle
        )
    }

    /// Whether the tag is one of the four style containers.
    pub fn is_style_container(self) -> bool {
        matches!(
            self,
            OdfTag::OfficeStyles
                | OdfTag::OfficeAutomaticStyles
                | OdfTag::OfficeMasterStyles
                | OdfTag::OfficeFontFaceDecls
        )
    }
}

/// Extract namespace prefix from tag (zero-copy)
///
/// # Examples
///
/// ```
/// # use longan::odf::elements::tag_matcher::extract_prefix;
/// assert_eq!(extract_prefix(b"text:p"), b"text");
/// assert_eq!(extract_prefix(b"p"), b"");
/// ```
#[inline(always)]
pub fn extract_prefix(tag: &[u8]) -> &[u8] {
    if let Some(colon_pos) = memchr::memchr(b':', tag) {
        &tag[..colon_pos]
    } else {
        b""
    }
}

/// Match a tag name to its [`OdfTag`] variant; unknown tags give
/// [`OdfTag::Unknown`].
///
/// ```
/// # use longan::odf::elements::tag_matcher::{match_tag, OdfTag};
/// assert_eq!(match_tag("text:p"), OdfTag::TextP);
/// assert_eq!(match_tag("unknown:tag"), OdfTag::Unknown);
/// ```
#[inline(always)]
pub fn match_tag(tag: &str) -> OdfTag {
    TAG_MAP.get(tag.as_bytes()).copied().unwrap_or(OdfTag::Unknown)
}

/// Check if a tag belongs to a namespace prefix
#[inline(always)]
pub fn is_namespace(tag: &[u8], namespace: &[u8]) -> bool {
    !namespace.is_empty() && extract_prefix(tag) == namespace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matching() {
        assert_eq!(match_tag("text:p"), OdfTag::TextP);
        assert_eq!(match_tag("text:h"), OdfTag::TextH);
        assert_eq!(match_tag("table:table"), OdfTag::TableTable);
        assert_eq!(match_tag("office:document-styles"), OdfTag::OfficeDocumentStyles);
        assert_eq!(match_tag("foo:bar"), OdfTag::Unknown);
    }

    #[test]
    fn test_style_classification() {
        assert!(match_tag("style:style").is_registered_style());
        assert!(match_tag("draw:fill-image").is_registered_style());
        assert!(match_tag("number:date-style").is_registered_style());
        assert!(!match_tag("text:p").is_registered_style());
        assert!(match_tag("office:master-styles").is_style_container());
        assert!(!match_tag("office:body").is_style_container());
    }

    #[test]
    fn test_prefix_and_local_name() {
        assert_eq!(extract_prefix(b"table:table-row"), b"table");
        assert!(is_namespace(b"draw:frame", b"draw"));
        assert!(!is_namespace(b"draw", b"draw"));
        assert!(!is_namespace(b"text:p", b"table"));
    }
}
