//! In-memory Office Open XML package (a zip archive of parts).

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use std::str;

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::DocumentError;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    compression: CompressionMethod,
    is_dir: bool,
    data: Vec<u8>,
}

/// All parts of a package, loaded into memory.
///
/// Entry order and compression are kept when the package is written back, so
/// parts that are not edited come out byte-for-byte the same.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Load a package from a file.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(file)?)
    }

    /// Load a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, ZipError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }
        Ok(Self { entries })
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| entry.name.as_str())
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name && !entry.is_dir)
            .map(|entry| entry.data.as_slice())
    }

    /// A part as UTF-8 text.
    pub fn part_text(&self, name: &str) -> Result<&str, DocumentError> {
        let data = self.part(name).ok_or_else(|| DocumentError::MissingPart {
            part: name.to_string(),
        })?;
        let text = str::from_utf8(data).map_err(|_| DocumentError::Encoding {
            part: name.to_string(),
        })?;
        // Parts may start with a byte-order mark.
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }

    /// Replace a part's contents, adding the part if it does not exist.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name && !entry.is_dir)
        {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                compression: CompressionMethod::Deflated,
                is_dir: false,
                data,
            }),
        }
    }

    /// Write the package as a zip archive.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, ZipError> {
        let mut zip = ZipWriter::new(writer);
        for entry in &self.entries {
            let compression = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(compression);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }
        zip.finish()
    }

    /// Write the package to a file, replacing it.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let file = File::create(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(file)?;
        Ok(())
    }
}
