pub mod chunk;
pub mod codecs;
pub mod compression;
pub mod cursor;
pub mod error;
pub mod options;
mod prelude;
pub mod properties;
pub mod tag;
use std::path::{Path, PathBuf};

use codecs::*;
use crate::prelude::*;

pub use codecs::{Container, ContainerKind};
pub use error::Error;
pub use options::ReadOptions;
pub use properties::{AudioProperties, Endianness};
pub use tag::{CompositeTag, FieldKey, TagField, TagStore};

#[derive(Debug, Clone)]
pub struct AudioFile {
    pub path: Option<PathBuf>,
    pub container: ContainerKind,
    pub properties: AudioProperties,
    pub tag: CompositeTag,
}

impl AudioFile {
    /// Map a file into memory and scan it.
    pub fn open(input_file: impl AsRef<Path>, options: &ReadOptions) -> R<Self> {
        let path = input_file.as_ref();
        if !path.exists() {
            return Err(anyhow!("Input file does not exist: {}", path.display()));
        }

        let file = std::fs::File::open(path)?;
        let mapped_file = unsafe { MmapOptions::new().map(&file)? };

        let container = detect_container(&mapped_file).or_else(|_| {
            get_container(&path.to_string_lossy())
        })?;
        let scan = container
            .read(&mapped_file, options)
            .map_err(|e| anyhow!("{}: {}", path.display(), e))?;

        log::debug!(
            "read {} as {:?} ({} fields)",
            path.display(),
            scan.kind,
            scan.tag.field_count()
        );

        Ok(Self::from_scan(Some(path.to_path_buf()), scan))
    }

    pub fn from_bytes(data: &[u8], options: &ReadOptions) -> R<Self> {
        let scan = detect_container(data)?.read(data, options)?;
        Ok(Self::from_scan(None, scan))
    }

    fn from_scan(path: Option<PathBuf>, scan: Scan) -> Self {
        Self {
            path,
            container: scan.kind,
            properties: scan.properties,
            tag: scan.tag,
        }
    }

    pub fn get_filename(&self) -> &str {
        self.path
            .as_deref()
            .and_then(|path| path.file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
    }
}

/// Scan many files in parallel. Results keep the order of `paths`.
pub fn read_many<P>(paths: &[P], options: &ReadOptions) -> Vec<R<AudioFile>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| AudioFile::open(path, options))
        .collect()
}
