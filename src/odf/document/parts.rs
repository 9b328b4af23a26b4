//! Cache of materialized XML parts, keyed by canonical archive path.

use crate::common::{Error, Result};
use crate::odf::constants::{ODF_CONTENT, ODF_MANIFEST, ODF_META, ODF_SETTINGS, ODF_STYLES};
use crate::odf::core::{Container, Content, Manifest, Meta, Styles, XmlPart};

/// A part returned by `Document::get_part`: one of the five typed XML parts,
/// or the raw bytes of any other entry.
#[derive(Debug)]
pub enum Part<'a> {
    Content(&'a mut Content),
    Styles(&'a mut Styles),
    Meta(&'a mut Meta),
    Settings(&'a mut XmlPart),
    Manifest(&'a mut Manifest),
    Raw(&'a [u8]),
}

impl Part<'_> {
    /// Instance id of a typed part; `None` for raw bytes.
    pub fn instance_id(&self) -> Option<u64> {
        match self {
            Part::Content(p) => Some(p.instance_id()),
            Part::Styles(p) => Some(p.instance_id()),
            Part::Meta(p) => Some(p.instance_id()),
            Part::Settings(p) => Some(p.instance_id()),
            Part::Manifest(p) => Some(p.instance_id()),
            Part::Raw(_) => None,
        }
    }

    /// Raw bytes, when the part is not one of the typed XML parts.
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Part::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// One slot per privileged path; `None` until the part is first requested.
#[derive(Debug, Clone, Default)]
pub(crate) struct PartCache {
    pub(crate) content: Option<Content>,
    pub(crate) styles: Option<Styles>,
    pub(crate) meta: Option<Meta>,
    pub(crate) settings: Option<XmlPart>,
    pub(crate) manifest: Option<Manifest>,
}

macro_rules! cached_accessor {
    ($name:ident, $field:ident, $ty:ty, $path:expr, $parse:expr) => {
        pub(crate) fn $name(&mut self, container: &Container) -> Result<&mut $ty> {
            if self.$field.is_none() {
                let bytes = container.get_part($path)?;
                self.$field = Some($parse($path, bytes)?);
                log::debug!("materialized {}", $path);
            }
            self.$field
                .as_mut()
                .ok_or_else(|| Error::Invariant(format!("{} not cached", $path)))
        }
    };
}

impl PartCache {
    cached_accessor!(content, content, Content, ODF_CONTENT, Content::from_bytes);
    cached_accessor!(styles, styles, Styles, ODF_STYLES, Styles::from_bytes);
    cached_accessor!(meta, meta, Meta, ODF_META, Meta::from_bytes);
    cached_accessor!(settings, settings, XmlPart, ODF_SETTINGS, XmlPart::from_bytes);
    cached_accessor!(manifest, manifest, Manifest, ODF_MANIFEST, Manifest::from_bytes);

    /// Both style-bearing parts at once.
    pub(crate) fn content_and_styles(&mut self, container: &Container) -> Result<(&mut Content, &mut Styles)> {
        self.content(container)?;
        self.styles(container)?;
        match (self.content.as_mut(), self.styles.as_mut()) {
            (Some(content), Some(styles)) => Ok((content, styles)),
            _ => Err(Error::Invariant("style parts not cached".to_string())),
        }
    }

    /// Drop the cached part at `path`; returns whether something was evicted.
    pub(crate) fn evict(&mut self, path: &str) -> bool {
        match path {
            ODF_CONTENT => self.content.take().is_some(),
            ODF_STYLES => self.styles.take().is_some(),
            ODF_META => self.meta.take().is_some(),
            ODF_SETTINGS => self.settings.take().is_some(),
            ODF_MANIFEST => self.manifest.take().is_some(),
            _ => false,
        }
    }

    /// Serialize every cached part.
    pub(crate) fn serialize_all(&self, pretty: bool) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut out = Vec::new();
        if let Some(part) = &self.content {
            out.push((ODF_CONTENT, part.xml().serialize(pretty)?));
        }
        if let Some(part) = &self.styles {
            out.push((ODF_STYLES, part.xml().serialize(pretty)?));
        }
        if let Some(part) = &self.meta {
            out.push((ODF_META, part.serialize(pretty)?));
        }
        if let Some(part) = &self.settings {
            out.push((ODF_SETTINGS, part.serialize(pretty)?));
        }
        if let Some(part) = &self.manifest {
            out.push((ODF_MANIFEST, part.serialize(pretty)?));
        }
        Ok(out)
    }

    pub(crate) fn len(&self) -> usize {
        [
            self.content.is_some(),
            self.styles.is_some(),
            self.meta.is_some(),
            self.settings.is_some(),
            self.manifest.is_some(),
        ]
        .into_iter()
        .filter(|cached| *cached)
        .count()
    }
}
