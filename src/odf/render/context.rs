//! Out-of-band content collected during one rendering pass.

use crate::odf::core::TextMode;

/// An image met while rendering, emitted as an rst substitution definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageRef {
    /// Substitution reference, `|imgN|`
    pub reference: String,
    pub path: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Per-call rendering state.
///
/// Footnotes, annotations and images are flushed after the block that
/// produced them; endnotes accumulate until the end of the document.
#[derive(Debug)]
pub(crate) struct RenderContext {
    pub mode: TextMode,
    pub footnotes: Vec<(String, String)>,
    pub endnotes: Vec<(String, String)>,
    pub annotations: Vec<String>,
    pub images: Vec<ImageRef>,
    pub image_counter: usize,
    /// Depth of constructs (headings, tables) where images render inline
    pub inline_image_level: usize,
}

impl RenderContext {
    pub fn new(mode: TextMode) -> Self {
        Self {
            mode,
            footnotes: Vec::new(),
            endnotes: Vec::new(),
            annotations: Vec::new(),
            images: Vec::new(),
            image_counter: 0,
            inline_image_level: 0,
        }
    }

    #[inline]
    pub fn is_rst(&self) -> bool {
        self.mode == TextMode::Rst
    }

    /// Record an image and return its substitution reference.
    pub fn push_image(&mut self, path: &str, width: Option<&str>, height: Option<&str>) -> String {
        self.image_counter += 1;
        let reference = format!("|img{}|", self.image_counter);
        self.images.push(ImageRef {
            reference: reference.clone(),
            path: path.to_string(),
            width: width.map(str::to_string),
            height: height.map(str::to_string),
        });
        reference
    }

    /// Write the footnotes, annotations and images collected since the last
    /// flush, then forget them.
    pub fn flush_block(&mut self, out: &mut String) {
        let rst = self.is_rst();
        if !self.footnotes.is_empty() {
            out.push_str(if rst { "\n" } else { "----\n" });
            for (citation, body) in self.footnotes.drain(..) {
                if rst {
                    out.push_str(&format!(".. [#] {body}\n"));
                } else {
                    out.push_str(&format!("[{citation}] {body}\n"));
                }
            }
            out.push('\n');
        }
        if !self.annotations.is_empty() {
            out.push_str(if rst { "\n" } else { "----\n" });
            for body in self.annotations.drain(..) {
                if rst {
                    out.push_str(&format!(".. [#] {body}\n"));
                } else {
                    out.push_str(&format!("[*] {body}\n"));
                }
            }
        }
        if !self.images.is_empty() {
            out.push('\n');
            for image in self.images.drain(..) {
                out.push_str(&format!(".. {} image:: {}\n", image.reference, image.path));
                if let Some(width) = image.width {
                    out.push_str(&format!("   :width: {width}\n"));
                }
                if let Some(height) = image.height {
                    out.push_str(&format!("   :height: {height}\n"));
                }
                out.push('\n');
            }
        }
    }

    /// Write the endnotes collected over the whole document.
    pub fn flush_endnotes(&mut self, out: &mut String) {
        if self.endnotes.is_empty() {
            return;
        }
        let rst = self.is_rst();
        out.push_str(if rst { "\n\n" } else { "\n========\n" });
        for (citation, body) in self.endnotes.drain(..) {
            if rst {
                out.push_str(&format!(".. [*] {body}\n"));
            } else {
                out.push_str(&format!("({citation}) {body}\n"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_footnotes_plain_and_rst() {
        let mut context = RenderContext::new(TextMode::Plain);
        context.footnotes.push(("1".to_string(), "Source".to_string()));
        let mut out = String::new();
        context.flush_block(&mut out);
        assert_eq!(out, "----\n[1] Source\n\n");
        assert!(context.footnotes.is_empty());

        let mut context = RenderContext::new(TextMode::Rst);
        context.footnotes.push(("1".to_string(), "Source".to_string()));
        let mut out = String::new();
        context.flush_block(&mut out);
        assert_eq!(out, "\n.. [#] Source\n\n");
    }

    #[test]
    fn test_flush_annotations_and_images() {
        let mut context = RenderContext::new(TextMode::Rst);
        context.annotations.push("Check".to_string());
        let reference = context.push_image("Pictures/a.png", Some("2cm"), None);
        assert_eq!(reference, "|img1|");
        let mut out = String::new();
        context.flush_block(&mut out);
        assert_eq!(out, "\n.. [#] Check\n\n.. |img1| image:: Pictures/a.png\n   :width: 2cm\n\n");
        assert_eq!(context.push_image("b.png", None, None), "|img2|");
    }

    #[test]
    fn test_flush_endnotes() {
        let mut context = RenderContext::new(TextMode::Plain);
        let mut out = String::new();
        context.flush_endnotes(&mut out);
        assert!(out.is_empty());
        context.endnotes.push(("i".to_string(), "Late".to_string()));
        context.flush_endnotes(&mut out);
        assert_eq!(out, "\n========\n(i) Late\n");
    }
}
