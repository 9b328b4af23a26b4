//! The archive store behind a document.
//!
//! A [`Container`] holds every entry of an ODF package as raw bytes, keyed by
//! archive path. It can be loaded from a zip file, an unpacked folder, bytes
//! or any seekable reader, or instantiated from a built-in template, and it
//! writes itself back as a zip archive or a folder.

use crate::common::{Error, Result};
use crate::odf::constants::{ODF_MANIFEST, ODF_MIMETYPE, ODF_SAVE_ORDER, is_odf_mime_type};
use crate::odf::core::options::{Packaging, SaveOptions};
use crate::odf::core::writer::{OdfStructure, PackageWriter};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

/// Upper bound on the buffer reserved from a zip entry's declared size
const MAX_PREALLOCATION: usize = 1 << 24;

/// Whether an entry name resolves inside the package root.
fn is_enclosed(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name.contains('\\')
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// In-memory ODF package
#[derive(Debug, Clone, Default)]
pub struct Container {
    parts: BTreeMap<String, Vec<u8>>,
    source: Option<PathBuf>,
}

impl Container {
    /// Open a package from a zip file or an unpacked folder.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut container = if path.is_dir() {
            Self::from_folder(path)?
        } else {
            Self::from_reader(fs::File::open(path)?)?
        };
        container.source = Some(path.to_path_buf());
        log::debug!("opened {} ({} parts)", path.display(), container.parts.len());
        Ok(container)
    }

    /// Read a zip package from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read a zip package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| Error::InvalidFormat(format!("Invalid ZIP archive: {e}")))?;
        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            if file.enclosed_name().is_none() || !is_enclosed(&name) {
                return Err(Error::Invariant(format!("entry '{name}' escapes the package root")));
            }
            let declared = usize::try_from(file.size()).unwrap_or(MAX_PREALLOCATION);
            let mut content = Vec::with_capacity(declared.min(MAX_PREALLOCATION));
            file.read_to_end(&mut content)?;
            parts.insert(name, content);
        }
        Self::from_parts(parts)
    }

    fn from_folder(root: &Path) -> Result<Self> {
        fn walk(root: &Path, dir: &Path, parts: &mut BTreeMap<String, Vec<u8>>) -> Result<()> {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    walk(root, &path, parts)?;
                    continue;
                }
                let relative = path
                    .strip_prefix(root)
                    .map_err(|e| Error::InvalidArgument(e.to_string()))?;
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                parts.insert(name, fs::read(&path)?);
            }
            Ok(())
        }
        let mut parts = BTreeMap::new();
        walk(root, root, &mut parts)?;
        Self::from_parts(parts)
    }

    /// Build a container from entries, checking the mimetype.
    pub fn from_parts(parts: BTreeMap<String, Vec<u8>>) -> Result<Self> {
        let container = Self { parts, source: None };
        let mimetype = container.mimetype()?;
        if !is_odf_mime_type(&mimetype) {
            return Err(Error::Invariant(format!("not an ODF mimetype: '{mimetype}'")));
        }
        Ok(container)
    }

    /// A blank `text`, `spreadsheet`, `presentation` or `drawing` package.
    pub fn from_template(kind: &str) -> Result<Self> {
        let parts = OdfStructure::template_parts(kind)?.into_iter().collect();
        Self::from_parts(parts)
    }

    /// Path the container was opened from, used as the default save target
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Forget the source path so saving requires an explicit target.
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// The package mimetype, trimmed.
    pub fn mimetype(&self) -> Result<String> {
        let bytes = self
            .parts
            .get(ODF_MIMETYPE)
            .ok_or_else(|| Error::Invariant("package has no mimetype".to_string()))?;
        Ok(String::from_utf8_lossy(bytes).trim().to_string())
    }

    /// Every entry path, sorted
    pub fn list_parts(&self) -> Vec<String> {
        self.parts.keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    pub fn get_part(&self, path: &str) -> Result<&[u8]> {
        self.parts
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::NotFound(format!("part '{path}'")))
    }

    pub fn set_part(&mut self, path: &str, data: Vec<u8>) {
        self.parts.insert(path.to_string(), data);
    }

    pub fn del_part(&mut self, path: &str) -> Result<()> {
        self.parts
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("part '{path}'")))
    }

    /// Entries in package order: `mimetype`, the XML parts, the others, and
    /// the manifest last.
    fn ordered_parts(&self) -> Vec<(&str, &[u8])> {
        let mut ordered: Vec<(&str, &[u8])> = Vec::with_capacity(self.parts.len());
        for path in ODF_SAVE_ORDER {
            if let Some(data) = self.parts.get(path) {
                ordered.push((path, data.as_slice()));
            }
        }
        for (path, data) in &self.parts {
            let path = path.as_str();
            if path == ODF_MIMETYPE || path == ODF_MANIFEST || ODF_SAVE_ORDER.contains(&path) {
                continue;
            }
            ordered.push((path, data.as_slice()));
        }
        if let Some(data) = self.parts.get(ODF_MANIFEST) {
            ordered.push((ODF_MANIFEST, data.as_slice()));
        }
        ordered
    }

    /// Write the package as a zip archive to any seekable sink.
    pub fn write_zip<W: Write + Seek>(&self, sink: W) -> Result<W> {
        let mut writer = PackageWriter::new(sink);
        writer.write_mimetype(&self.mimetype()?)?;
        for (path, data) in self.ordered_parts() {
            writer.add_file(path, data)?;
        }
        writer.finish()
    }

    /// Save to `target`, or to the path the container was opened from.
    pub fn save(&self, target: Option<&Path>, options: &SaveOptions) -> Result<()> {
        let target = match target.or(self.source.as_deref()) {
            Some(target) => target.to_path_buf(),
            None => return Err(Error::InvalidArgument("no save target".to_string())),
        };
        if options.packaging == Packaging::Flat {
            return Err(Error::Unsupported("flat XML packaging".to_string()));
        }
        if options.backup && target.exists() {
            Self::make_backup(&target)?;
        }
        if options.packaging == Packaging::Folder {
            self.write_folder(&target)?;
        } else {
            let file = fs::File::create(&target)?;
            self.write_zip(std::io::BufWriter::new(file))?.flush()?;
        }
        log::debug!("container written to {} as {}", target.display(), options.packaging.as_str());
        Ok(())
    }

    fn write_folder(&self, target: &Path) -> Result<()> {
        if let Some(path) = self.parts.keys().find(|path| !is_enclosed(path)) {
            return Err(Error::Invariant(format!("entry '{path}' escapes the package root")));
        }
        fs::create_dir_all(target)?;
        fs::write(target.join(ODF_MIMETYPE), self.mimetype()?)?;
        for (path, data) in self.ordered_parts() {
            let destination = target.join(path);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(destination, data)?;
        }
        Ok(())
    }

    fn make_backup(target: &Path) -> Result<()> {
        let mut backup = target.as_os_str().to_owned();
        backup.push(".backup");
        let backup = PathBuf::from(backup);
        if target.is_dir() {
            if backup.exists() {
                fs::remove_dir_all(&backup)?;
            }
            fs::rename(target, &backup)?;
        } else {
            fs::copy(target, &backup)?;
        }
        log::debug!("backup written to {}", backup.display());
        Ok(())
    }
}
