//! The ODF document: an archive store plus a cache of typed XML parts.
//!
//! [`Document`] resolves logical part names (`content`, `styles`, `meta`,
//! `settings`, `manifest`) to their archive paths, materializes those parts
//! on first access and keeps at most one live object per path. Writing raw
//! bytes over a cached part evicts it, and saving serializes every cached
//! part back into the container before packaging.
//!
//! # Examples
//!
//! ```
//! use longan::odf::Document;
//!
//! # fn main() -> longan::Result<()> {
//! let mut doc = Document::new_from_template("text")?;
//! assert_eq!(doc.get_type()?, "text");
//! doc.meta()?.set_title("Report");
//! assert!(doc.get_formatted_meta()?.contains("Title: Report"));
//! # Ok(())
//! # }
//! ```

mod merge;
mod parts;
mod styles;

pub use parts::Part;
pub use styles::{StyleLocation, StyleRef};

use crate::common::{Error, Result};
use crate::odf::constants::{
    ODF_CONTENT, ODF_MANIFEST, ODF_META, ODF_MIMETYPE, ODF_SETTINGS, ODF_STYLES, PICTURES_FOLDER,
    canonical_part_path, guess_media_type, is_privileged_path,
};
use crate::odf::core::{Container, Content, Manifest, Meta, SaveOptions, Styles, XmlPart};
use crate::odf::elements::element::NodeId;
use log::{debug, info, warn};
use parts::PartCache;
use std::io::{Seek, Write};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Strip leading `./` and `/` and map privileged logical names to paths.
pub fn normalize_part_name(name: &str) -> String {
    let mut path = name;
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            break;
        }
    }
    canonical_part_path(path).to_string()
}

/// An ODF document
#[derive(Debug, Clone)]
pub struct Document {
    container: Container,
    cache: PartCache,
}

impl Document {
    /// Wrap an already loaded container.
    pub fn new(container: Container) -> Self {
        Self {
            container,
            cache: PartCache::default(),
        }
    }

    /// Open a document from a zip package or an unpacked folder.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Container::open(path)?))
    }

    /// Load a zip package from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(Container::from_bytes(bytes)?))
    }

    /// A blank `text`, `spreadsheet`, `presentation` or `drawing` document.
    pub fn new_from_template(kind: &str) -> Result<Self> {
        Ok(Self::new(Container::from_template(kind)?))
    }

    /// A new document from a template file. A `*-template` mimetype becomes
    /// the plain document type in the `mimetype` part and in the manifest.
    pub fn new_from_template_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut container = Container::open(path)?;
        container.clear_source();
        let mut document = Self::new(container);
        let mimetype = document.get_mimetype()?;
        if let Some(plain) = mimetype.strip_suffix("-template") {
            let plain = plain.to_string();
            document.container.set_part(ODF_MIMETYPE, plain.clone().into_bytes());
            document.manifest()?.set_media_type("/", &plain)?;
            debug!("template {mimetype} instantiated as {plain}");
        }
        Ok(document)
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Every archive path, sorted
    pub fn get_parts(&self) -> Vec<String> {
        self.container.list_parts()
    }

    pub fn get_mimetype(&self) -> Result<String> {
        self.container.mimetype()
    }

    /// Last dot-separated segment of the mimetype (`text`, `spreadsheet`,
    /// `text-template`, ...).
    pub fn get_type(&self) -> Result<String> {
        let mimetype = self.get_mimetype()?;
        Ok(mimetype.rsplit('.').next().unwrap_or_default().to_string())
    }

    /// Get a part by logical name or archive path.
    ///
    /// The five privileged parts come back typed and cached; any other
    /// entry is returned as raw bytes.
    pub fn get_part(&mut self, name: &str) -> Result<Part<'_>> {
        let path = normalize_part_name(name);
        let part = match path.as_str() {
            ODF_CONTENT => Part::Content(self.cache.content(&self.container)?),
            ODF_STYLES => Part::Styles(self.cache.styles(&self.container)?),
            ODF_META => Part::Meta(self.cache.meta(&self.container)?),
            ODF_SETTINGS => Part::Settings(self.cache.settings(&self.container)?),
            ODF_MANIFEST => Part::Manifest(self.cache.manifest(&self.container)?),
            _ => Part::Raw(self.container.get_part(&path)?),
        };
        Ok(part)
    }

    /// Write raw bytes to an entry, evicting the cached part at that path.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        let path = normalize_part_name(name);
        if self.cache.evict(&path) {
            debug!("evicted cached {path}");
        }
        self.container.set_part(&path, data);
    }

    /// Remove an entry. The privileged parts cannot be removed.
    pub fn del_part(&mut self, name: &str) -> Result<()> {
        let path = normalize_part_name(name);
        if is_privileged_path(&path) {
            return Err(Error::Invariant(format!("'{path}' is mandatory and cannot be deleted")));
        }
        self.container.del_part(&path)
    }

    pub fn content(&mut self) -> Result<&mut Content> {
        self.cache.content(&self.container)
    }

    pub fn styles(&mut self) -> Result<&mut Styles> {
        self.cache.styles(&self.container)
    }

    pub fn meta(&mut self) -> Result<&mut Meta> {
        self.cache.meta(&self.container)
    }

    pub fn settings(&mut self) -> Result<&mut XmlPart> {
        self.cache.settings(&self.container)
    }

    pub fn manifest(&mut self) -> Result<&mut Manifest> {
        self.cache.manifest(&self.container)
    }

    /// First child of `office:body`: where the document content lives.
    pub fn body(&mut self) -> Result<NodeId> {
        self.content()?
            .body()
            .ok_or_else(|| Error::NotFound("office:body content".to_string()))
    }

    /// Read a file from disk and store it with [`Document::add_file_bytes`].
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<String> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidArgument(format!("no file name in '{}'", path.display())))?;
        let data = std::fs::read(path)?;
        self.add_file_bytes(&name, data)
    }

    /// Store a file under `Pictures/`, register it in the manifest and
    /// return its archive path. A colliding name gets a `_<uuid>` suffix.
    pub fn add_file_bytes(&mut self, name: &str, data: Vec<u8>) -> Result<String> {
        let (stem, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext.to_ascii_lowercase())),
            _ => (name, String::new()),
        };
        let mut full_path = format!("{PICTURES_FOLDER}{stem}{extension}");
        let manifest = self.cache.manifest(&self.container)?;
        if self.container.contains(&full_path) || manifest.get_media_type(&full_path).is_some() {
            full_path = format!("{PICTURES_FOLDER}{stem}_{}{extension}", uuid::Uuid::new_v4());
        }
        if manifest.get_media_type(PICTURES_FOLDER).is_none() {
            manifest.add_full_path(PICTURES_FOLDER, "");
        }
        manifest.add_full_path(&full_path, guess_media_type(&full_path));
        self.container.set_part(&full_path, data);
        debug!("added {full_path}");
        Ok(full_path)
    }

    /// Serialize every cached part into the container.
    fn sync_parts(&mut self, pretty: bool) -> Result<usize> {
        let generator = format!("longan {}", env!("CARGO_PKG_VERSION"));
        match self.cache.meta(&self.container) {
            Ok(meta) => {
                if !meta.generator_modified() {
                    meta.stamp_generator(&generator);
                }
            },
            Err(e) if e.is_not_found() => warn!("document has no {ODF_META}, generator not stamped"),
            Err(e) => return Err(e),
        }
        for (path, bytes) in self.cache.serialize_all(pretty)? {
            self.container.set_part(path, bytes);
        }
        Ok(self.cache.len())
    }

    /// Save to `target`, or back to the file the document was opened from.
    pub fn save(&mut self, target: Option<&Path>, options: &SaveOptions) -> Result<()> {
        let count = self.sync_parts(options.pretty)?;
        let shown = target
            .or(self.container.source())
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        info!(
            "saving {shown} as {} ({count} cached parts, {} entries)",
            options.packaging.as_str(),
            self.container.list_parts().len()
        );
        self.container.save(target, options)
    }

    /// Write the document as a zip package to any seekable sink.
    pub fn save_to_writer<W: Write + Seek>(&mut self, sink: W, pretty: bool) -> Result<W> {
        let count = self.sync_parts(pretty)?;
        info!("saving to writer ({count} cached parts)");
        self.container.write_zip(sink)
    }

    /// A textual report of the document metadata.
    pub fn get_formatted_meta(&mut self) -> Result<String> {
        let meta = self.meta()?;
        let mut lines = Vec::new();
        let mut push = |label: &str, value: Option<String>| {
            if let Some(value) = value {
                lines.push(format!("{label}: {value}"));
            }
        };
        push("Title", meta.title());
        push("Subject", meta.subject());
        push("Language", meta.language());
        push(
            "Modification date",
            meta.modification_date().map(|d| d.format(DATE_FORMAT).to_string()),
        );
        push(
            "Creation date",
            meta.creation_date().map(|d| d.format(DATE_FORMAT).to_string()),
        );
        push("Initial creator", meta.initial_creator());
        let keywords = meta.keywords();
        push("Keyword", (!keywords.is_empty()).then(|| keywords.join(", ")));
        push("Editing duration", meta.editing_duration());
        push("Editing cycles", meta.editing_cycles().map(|c| c.to_string()));
        push("Generator", meta.generator());

        lines.push("Statistic:".to_string());
        for (name, value) in meta.statistics() {
            lines.push(format!("  - {}: {value}", statistic_label(&name)));
        }
        lines.push("User defined metadata:".to_string());
        for (name, value) in meta.user_defined_metadata() {
            lines.push(format!("  - {name}: {value}"));
        }
        if let Some(description) = meta.description() {
            lines.push(format!("Description: {description}"));
        }
        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

/// `meta:page-count` -> `Page count`
fn statistic_label(attribute: &str) -> String {
    let local = attribute.split_once(':').map_or(attribute, |(_, local)| local);
    let spaced = local.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
