//! ODF constants: MIME types, part paths and style vocabularies.
//!
//! Everything the document layer needs to map logical names onto archive
//! paths, and tag names onto style families, lives here as compile-time
//! tables so lookups never allocate.

use phf::{Map, phf_map};

/// ODF specification version written into generated parts
pub const OFFICE_VERSION: &str = "1.2";

// ============================================================================
// MIME TYPES
// ============================================================================

/// MIME type for OpenDocument Text (.odt)
pub const ODF_TEXT: &str = "application/vnd.oasis.opendocument.text";

/// MIME type for OpenDocument Text Template (.ott)
pub const ODF_TEXT_TEMPLATE: &str = "application/vnd.oasis.opendocument.text-template";

/// MIME type for OpenDocument Spreadsheet (.ods)
pub const ODF_SPREADSHEET: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// MIME type for OpenDocument Spreadsheet Template (.ots)
pub const ODF_SPREADSHEET_TEMPLATE: &str =
    "application/vnd.oasis.opendocument.spreadsheet-template";

/// MIME type for OpenDocument Presentation (.odp)
pub const ODF_PRESENTATION: &str = "application/vnd.oasis.opendocument.presentation";

/// MIME type for OpenDocument Presentation Template (.otp)
pub const ODF_PRESENTATION_TEMPLATE: &str =
    "application/vnd.oasis.opendocument.presentation-template";

/// MIME type for OpenDocument Drawing (.odg)
pub const ODF_DRAWING: &str = "application/vnd.oasis.opendocument.graphics";

/// MIME type for OpenDocument Drawing Template (.otg)
pub const ODF_DRAWING_TEMPLATE: &str = "application/vnd.oasis.opendocument.graphics-template";

/// MIME type for OpenDocument Chart (.odc)
pub const ODF_CHART: &str = "application/vnd.oasis.opendocument.chart";

/// MIME type for OpenDocument Chart Template (.otc)
pub const ODF_CHART_TEMPLATE: &str = "application/vnd.oasis.opendocument.chart-template";

/// MIME type for OpenDocument Image (.odi)
pub const ODF_IMAGE: &str = "application/vnd.oasis.opendocument.image";

/// MIME type for OpenDocument Image Template (.oti)
pub const ODF_IMAGE_TEMPLATE: &str = "application/vnd.oasis.opendocument.image-template";

/// MIME type for OpenDocument Formula (.odf)
pub const ODF_FORMULA: &str = "application/vnd.oasis.opendocument.formula";

/// MIME type for OpenDocument Formula Template (.otf)
pub const ODF_FORMULA_TEMPLATE: &str = "application/vnd.oasis.opendocument.formula-template";

/// MIME type for OpenDocument Master (.odm)
pub const ODF_MASTER: &str = "application/vnd.oasis.opendocument.text-master";

/// MIME type for OpenDocument Web (.oth)
pub const ODF_WEB: &str = "application/vnd.oasis.opendocument.text-web";

/// MIME type to file extension mapping
pub static ODF_MIMETYPES: Map<&'static str, &'static str> = phf_map! {
    "application/vnd.oasis.opendocument.text" => "odt",
    "application/vnd.oasis.opendocument.text-template" => "ott",
    "application/vnd.oasis.opendocument.spreadsheet" => "ods",
    "application/vnd.oasis.opendocument.spreadsheet-template" => "ots",
    "application/vnd.oasis.opendocument.presentation" => "odp",
    "application/vnd.oasis.opendocument.presentation-template" => "otp",
    "application/vnd.oasis.opendocument.graphics" => "odg",
    "application/vnd.oasis.opendocument.graphics-template" => "otg",
    "application/vnd.oasis.opendocument.chart" => "odc",
    "application/vnd.oasis.opendocument.chart-template" => "otc",
    "application/vnd.oasis.opendocument.image" => "odi",
    "application/vnd.oasis.opendocument.image-template" => "oti",
    "application/vnd.oasis.opendocument.formula" => "odf",
    "application/vnd.oasis.opendocument.formula-template" => "otf",
    "application/vnd.oasis.opendocument.text-master" => "odm",
    "application/vnd.oasis.opendocument.text-web" => "oth",
};

/// Document types (last segment of the MIME type) the text renderer accepts
pub const FORMATTED_TEXT_TYPES: [&str; 4] =
    ["text", "text-template", "presentation", "presentation-template"];

// ============================================================================
// STANDARD ODF PARTS PATHS
// ============================================================================

/// Path to the mimetype entry
pub const ODF_MIMETYPE: &str = "mimetype";

/// Path to content.xml (main document content)
pub const ODF_CONTENT: &str = "content.xml";

/// Path to meta.xml (document metadata)
pub const ODF_META: &str = "meta.xml";

/// Path to settings.xml (application settings)
pub const ODF_SETTINGS: &str = "settings.xml";

/// Path to styles.xml (document styles)
pub const ODF_STYLES: &str = "styles.xml";

/// Path to manifest.xml (package manifest)
pub const ODF_MANIFEST: &str = "META-INF/manifest.xml";

/// Folder receiving files added through `Document::add_file`
pub const PICTURES_FOLDER: &str = "Pictures/";

/// Logical part names and the canonical archive path each one stands for
pub static ODF_PART_PATHS: Map<&'static str, &'static str> = phf_map! {
    "content" => ODF_CONTENT,
    "meta" => ODF_META,
    "settings" => ODF_SETTINGS,
    "styles" => ODF_STYLES,
    "manifest" => ODF_MANIFEST,
};

/// Order in which the privileged XML parts are written after `mimetype`
pub const ODF_SAVE_ORDER: [&str; 4] = [ODF_CONTENT, ODF_META, ODF_SETTINGS, ODF_STYLES];

// ============================================================================
// STYLES
// ============================================================================

/// The four elements that may hold styles, in lookup precedence order
pub const STYLE_CONTAINERS: [&str; 4] = [
    "office:styles",
    "office:automatic-styles",
    "office:master-styles",
    "office:font-face-decls",
];

/// Canonical order of the top-level children of a content or styles part
pub const PART_CHILD_ORDER: [&str; 7] = [
    "office:scripts",
    "office:font-face-decls",
    "office:styles",
    "office:automatic-styles",
    "office:master-styles",
    "office:body",
    "office:settings",
];

/// Style families whose styles are written as `style:style`
pub const STYLE_STYLE_FAMILIES: [&str; 14] = [
    "paragraph",
    "text",
    "section",
    "table",
    "table-column",
    "table-row",
    "table-cell",
    "table-page",
    "chart",
    "drawing-page",
    "graphic",
    "presentation",
    "control",
    "ruby",
];

/// Family to tag name for the families that own a dedicated element
pub static FAMILY_TAGS: Map<&'static str, &'static str> = phf_map! {
    "list" => "text:list-style",
    "outline" => "text:outline-style",
    "font-face" => "style:font-face",
    "master-page" => "style:master-page",
    "page-layout" => "style:page-layout",
    "presentation-page-layout" => "style:presentation-page-layout",
    "marker" => "draw:marker",
    "fill-image" => "draw:fill-image",
    "gradient" => "draw:gradient",
    "hatch" => "draw:hatch",
    "opacity" => "draw:opacity",
    "stroke-dash" => "draw:stroke-dash",
    "number" => "number:number-style",
    "percentage" => "number:percentage-style",
    "currency" => "number:currency-style",
    "date" => "number:date-style",
    "time" => "number:time-style",
    "boolean" => "number:boolean-style",
    "text-style" => "number:text-style",
};

/// Tag name to family, the inverse of [`FAMILY_TAGS`]
pub static TAG_FAMILIES: Map<&'static str, &'static str> = phf_map! {
    "text:list-style" => "list",
    "text:outline-style" => "outline",
    "style:font-face" => "font-face",
    "style:master-page" => "master-page",
    "style:page-layout" => "page-layout",
    "style:presentation-page-layout" => "presentation-page-layout",
    "draw:marker" => "marker",
    "draw:fill-image" => "fill-image",
    "draw:gradient" => "gradient",
    "draw:hatch" => "hatch",
    "draw:opacity" => "opacity",
    "draw:stroke-dash" => "stroke-dash",
    "number:number-style" => "number",
    "number:percentage-style" => "percentage",
    "number:currency-style" => "currency",
    "number:date-style" => "date",
    "number:time-style" => "time",
    "number:boolean-style" => "boolean",
    "number:text-style" => "text-style",
};

/// Attributes through which content refers to a style by name
pub const STYLE_REFERENCE_ATTRIBUTES: [&str; 5] = [
    "text:style-name",
    "draw:style-name",
    "draw:text-style-name",
    "table:style-name",
    "style:page-layout-name",
];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Resolve a logical part name (`content`, `styles`, ...) to its archive path.
///
/// Any other name is returned unchanged.
///
/// # Examples
///
/// ```
/// use longan::odf::constants::canonical_part_path;
///
/// assert_eq!(canonical_part_path("manifest"), "META-INF/manifest.xml");
/// assert_eq!(canonical_part_path("Pictures/a.png"), "Pictures/a.png");
/// ```
#[inline]
pub fn canonical_part_path(name: &str) -> &str {
    ODF_PART_PATHS.get(name).copied().unwrap_or(name)
}

/// Check whether an archive path is one of the five privileged XML parts
#[inline]
pub fn is_privileged_path(path: &str) -> bool {
    ODF_PART_PATHS.values().any(|p| *p == path)
}

/// Check if a given MIME type is a valid ODF MIME type
#[inline]
pub fn is_odf_mime_type(mime_type: &str) -> bool {
    ODF_MIMETYPES.contains_key(mime_type)
}

/// Guess the media type of a package file from its extension.
///
/// Directory entries (ending in `/`) get an empty media type.
pub fn guess_media_type(path: &str) -> &'static str {
    if path.ends_with('/') {
        return "";
    }
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xml" => "text/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "wmf" => "image/x-wmf",
        "emf" => "image/x-emf",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_names_map_to_paths() {
        assert_eq!(canonical_part_path("content"), ODF_CONTENT);
        assert_eq!(canonical_part_path("meta"), ODF_META);
        assert_eq!(canonical_part_path("settings"), ODF_SETTINGS);
        assert_eq!(canonical_part_path("styles"), ODF_STYLES);
        assert_eq!(canonical_part_path("manifest"), ODF_MANIFEST);
        assert_eq!(canonical_part_path("Thumbnails/thumbnail.png"), "Thumbnails/thumbnail.png");
    }

    #[test]
    fn test_is_privileged_path() {
        assert!(is_privileged_path("content.xml"));
        assert!(is_privileged_path("META-INF/manifest.xml"));
        assert!(!is_privileged_path("content"));
        assert!(!is_privileged_path("Pictures/x.png"));
    }

    #[test]
    fn test_family_tables_are_inverse() {
        for (family, tag) in FAMILY_TAGS.entries() {
            assert_eq!(TAG_FAMILIES.get(tag), Some(family));
        }
    }

    #[test]
    fn test_mime_helpers() {
        assert!(is_odf_mime_type(ODF_PRESENTATION));
        assert!(!is_odf_mime_type("text/plain"));
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("Pictures/a.PNG"), "image/png");
        assert_eq!(guess_media_type("Pictures/"), "");
        assert_eq!(guess_media_type("blob"), "application/octet-stream");
    }
}
