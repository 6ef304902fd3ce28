//! Read and write the `.mmap` ZIP container.
//!
//! The container is treated as an opaque name→bytes store. Only the
//! document entry is interpreted; every other entry is copied byte-for-byte
//! on write. Updates follow a preserve-then-replace discipline: the whole
//! source archive is read into memory, a complete replacement archive is
//! written to a temporary path and renamed into place, so a crash leaves
//! either the old file or the new one, never a torn write.

use std::{
    fs,
    io::{Cursor, Read, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, instrument, warn};
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::document::{self, DocumentError};
use crate::model::MindMap;

/// Name of the container entry holding the document markup.
pub const DOCUMENT_ENTRY: &str = "Document.xml";

/// Errors raised by container reads and writes.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The input path does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    /// The file is not a valid ZIP container.
    #[error("not a valid .mmap container: {0}")]
    InvalidContainer(#[from] ZipError),
    /// The container has no document entry.
    #[error("no {DOCUMENT_ENTRY} entry in container")]
    MissingDocument,
    /// The document entry could not be decoded.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads a `.mmap` container into a mind map.
///
/// The returned map records `path` as its source, which makes a later
/// [`write`] update that container in place rather than creating a fresh
/// one.
///
/// # Errors
///
/// Returns [`ContainerError::NotFound`] when the path does not exist,
/// [`ContainerError::InvalidContainer`] when it is not a ZIP archive,
/// [`ContainerError::MissingDocument`] when the document entry is absent,
/// or [`ContainerError::Document`] when the document cannot be decoded.
#[instrument]
pub fn read(path: &Path) -> Result<MindMap, ContainerError> {
    if !path.exists() {
        return Err(ContainerError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let document = read_entry(&mut archive, DOCUMENT_ENTRY).map_err(|error| match error {
        ZipError::FileNotFound => ContainerError::MissingDocument,
        other => ContainerError::InvalidContainer(other),
    })?;

    let mut map = document::decode(&document)?;
    map.set_source_path(path);
    debug!(topics = map.topic_count(), "read container");
    Ok(map)
}

/// Writes a mind map to a `.mmap` container at `path`.
///
/// When the map's source container still exists, this is a surgical update:
/// the source archive is read whole, the document entry replaced, and every
/// other entry copied unchanged. Otherwise a minimal new container holding
/// only the document entry is created.
///
/// With `backup` set, a pre-existing destination is first copied aside to
/// `<path>.bak`, best-effort.
///
/// # Errors
///
/// Returns [`ContainerError::InvalidContainer`] or
/// [`ContainerError::MissingDocument`] when the source archive cannot be
/// reused, or [`ContainerError::Io`] when the destination cannot be
/// written.
#[instrument(skip(map))]
pub fn write(map: &MindMap, path: &Path, backup: bool) -> Result<PathBuf, ContainerError> {
    let source = map.source_path();
    let bytes = if !source.as_os_str().is_empty() && source.exists() {
        update_archive(map, source)?
    } else {
        create_archive(map)?
    };

    if backup && path.exists() {
        let backup_path = path.with_extension("mmap.bak");
        if let Err(error) = fs::copy(path, &backup_path) {
            warn!(%error, "backup copy failed, continuing");
        }
    }

    // The replacement is complete before the destination is touched.
    let staging = path.with_extension("mmap.tmp");
    fs::write(&staging, &bytes)?;
    fs::rename(&staging, path)?;

    debug!(bytes = bytes.len(), "wrote container");
    Ok(path.to_path_buf())
}

/// Replaces the document entry of the source archive, copying everything
/// else byte-for-byte.
fn update_archive(map: &MindMap, source: &Path) -> Result<Vec<u8>, ContainerError> {
    let bytes = fs::read(source)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.push((entry.name().to_string(), data));
    }

    let document = entries
        .iter_mut()
        .find(|(name, _)| name == DOCUMENT_ENTRY)
        .ok_or(ContainerError::MissingDocument)?;
    document.1 = document::encode_into(map, &document.1)?;

    Ok(build_archive(&entries)?)
}

/// Builds a minimal container holding only the document entry.
fn create_archive(map: &MindMap) -> Result<Vec<u8>, ContainerError> {
    let entries = [(DOCUMENT_ENTRY.to_string(), document::encode(map))];
    Ok(build_archive(&entries)?)
}

fn build_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(data)?;
    }
    Ok(writer.finish()?.into_inner())
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    name: &str,
) -> Result<Vec<u8>, ZipError> {
    let mut entry = archive.by_name(name)?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}
