use std::io::{Cursor, Read};

use crate::error::AppError;
use crate::utils::filename::has_extension;

/// Maximum decompressed size per archive entry (128 MB).
const MAX_DECOMPRESSED_FILE_SIZE: u64 = 128 * 1024 * 1024;

/// Maximum total decompressed size across all entries (512 MB).
const MAX_TOTAL_DECOMPRESSED_SIZE: u64 = 512 * 1024 * 1024;

/// One file extracted from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name as stored in the archive.
    pub name: String,
    pub data: Vec<u8>,
}

/// Expand a ZIP archive whose entries must all carry `leaf_extension`.
///
/// All-or-nothing: any entry with a different extension rejects the whole
/// archive and nothing is returned, directory entries included. Entries come
/// back in archive order. An empty archive expands to no entries.
pub fn expand_archive(data: &[u8], leaf_extension: &str) -> Result<Vec<ArchiveEntry>, AppError> {
    let leaf_extension = leaf_extension.trim_start_matches('.');
    let only_leaves = || {
        AppError::Validation(format!(
            "ZIP file must contain only {} files",
            leaf_extension.to_uppercase()
        ))
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| AppError::Validation(format!("Invalid ZIP archive: {e}")))?;

    let mut entries = Vec::with_capacity(archive.len());
    let mut total_decompressed: u64 = 0;

    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| AppError::Validation(format!("ZIP read error: {e}")))?;

        let name = file.name().to_string();
        if !has_extension(&name, leaf_extension) {
            return Err(only_leaves());
        }

        let mut buf = Vec::new();
        file.take(MAX_DECOMPRESSED_FILE_SIZE + 1)
            .read_to_end(&mut buf)
            .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;

        if buf.len() as u64 > MAX_DECOMPRESSED_FILE_SIZE {
            return Err(AppError::Validation(format!(
                "File '{name}' exceeds maximum decompressed size of 128MB"
            )));
        }

        total_decompressed += buf.len() as u64;
        if total_decompressed > MAX_TOTAL_DECOMPRESSED_SIZE {
            return Err(AppError::Validation(
                "Total decompressed ZIP content exceeds 512MB limit".into(),
            ));
        }

        entries.push(ArchiveEntry { name, data: buf });
    }

    Ok(entries)
}
