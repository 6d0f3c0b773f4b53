//! Archive Extractor
//!
//! Reads a zipped project, keeps source-like files and decodes them as
//! text. The archive format itself sits behind [`ArchiveReader`] so the
//! extractor can be driven by an in-memory fake in tests.
//!
//! Selection happens on the entry path before any bytes are read; the
//! UTF-8 decodes of the selected entries fan out over rayon and are joined
//! in archive order. One undecodable entry fails the whole extraction.

use crate::{CoreConfig, ProjectData, ProjectFile};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{debug, info};

/// Failures while turning an upload into project files
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    /// Upload name does not end in `.zip`
    #[error("Unsupported file '{name}': only .zip archives can be audited")]
    UnsupportedFormat { name: String },

    /// Blob is not a readable archive
    #[error("Invalid archive: {0}")]
    Invalid(String),

    /// An entry could not be read out of the archive
    #[error("Failed to read archive entry '{path}': {reason}")]
    Entry { path: String, reason: String },

    /// A selected entry is not valid UTF-8 text
    #[error("Archive entry '{path}' could not be decoded as text")]
    Decode { path: String },
}

/// Reject uploads whose name does not end in `.zip` (case-insensitive).
///
/// Only the name is checked; the contents are not sniffed.
pub fn ensure_zip_name(name: &str) -> Result<(), ArchiveError> {
    if name.to_lowercase().ends_with(".zip") {
        Ok(())
    } else {
        Err(ArchiveError::UnsupportedFormat {
            name: name.to_string(),
        })
    }
}

/// A file entry whose bytes have been read but not yet decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl RawEntry {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Archive decoding backend.
///
/// Implementations enumerate file entries in archive order, skip
/// directories, and read bytes only for entries whose path `select`
/// accepts.
pub trait ArchiveReader: Send + Sync {
    fn read_entries(
        &self,
        archive: &[u8],
        select: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<RawEntry>, ArchiveError>;
}

/// `ArchiveReader` backed by the `zip` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveReader;

impl ArchiveReader for ZipArchiveReader {
    fn read_entries(
        &self,
        archive: &[u8],
        select: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<RawEntry>, ArchiveError> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive))
            .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

        let mut entries = Vec::new();
        for index in 0..zip.len() {
            let mut file = zip
                .by_index(index)
                .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

            if file.is_dir() {
                continue;
            }

            let path = file.name().to_string();
            if !select(&path) {
                continue;
            }

            let mut bytes = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut bytes).map_err(|e| ArchiveError::Entry {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            entries.push(RawEntry { path, bytes });
        }

        Ok(entries)
    }
}

/// Which entries survive extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub max_files: usize,
    /// Lowercase extensions without the leading dot
    pub allowed_extensions: HashSet<String>,
}

impl ExtractionPolicy {
    /// Extension after the last `.` of the final path segment, lowercased
    fn extension_of(path: &str) -> Option<String> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    /// Whether an entry path has an allow-listed extension
    pub fn accepts(&self, path: &str) -> bool {
        Self::extension_of(path).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self::from(&CoreConfig::default())
    }
}

impl From<&CoreConfig> for ExtractionPolicy {
    fn from(config: &CoreConfig) -> Self {
        Self {
            max_files: config.max_files,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }
}

/// Turns an archive blob into `ProjectData`
#[derive(Clone)]
pub struct ArchiveExtractor {
    reader: Arc<dyn ArchiveReader>,
    policy: ExtractionPolicy,
}

impl std::fmt::Debug for ArchiveExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveExtractor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ArchiveExtractor {
    pub fn new(reader: Arc<dyn ArchiveReader>, policy: ExtractionPolicy) -> Self {
        Self { reader, policy }
    }

    /// Extractor over real zip archives
    pub fn zip(policy: ExtractionPolicy) -> Self {
        Self::new(Arc::new(ZipArchiveReader), policy)
    }

    pub fn policy(&self) -> &ExtractionPolicy {
        &self.policy
    }

    /// Extract synchronously. Prefer [`Self::extract_async`] from async code.
    pub fn extract(&self, name: &str, archive: &[u8]) -> Result<ProjectData, ArchiveError> {
        let policy = &self.policy;
        let raw = self
            .reader
            .read_entries(archive, &|path: &str| policy.accepts(path))?;
        debug!("Archive '{}': {} candidate entries", name, raw.len());

        // Every selected entry is decoded before the cap applies, so a bad
        // entry past the cap still fails the run
        let mut files = raw
            .into_par_iter()
            .filter(|entry| policy.accepts(&entry.path))
            .map(|RawEntry { path, bytes }| match String::from_utf8(bytes) {
                Ok(content) => Ok(ProjectFile { path, content }),
                Err(_) => Err(ArchiveError::Decode { path }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if files.len() > policy.max_files {
            info!(
                "Archive '{}' has {} eligible files, keeping the first {}",
                name,
                files.len(),
                policy.max_files
            );
            files.truncate(policy.max_files);
        }

        Ok(ProjectData::new(name, files))
    }

    /// Extract on the blocking pool so the decode never stalls the executor
    pub async fn extract_async(&self, name: String, archive: Vec<u8>) -> crate::Result<ProjectData> {
        let extractor = self.clone();
        let project = tokio::task::spawn_blocking(move || extractor.extract(&name, &archive))
            .await
            .map_err(|e| crate::Error::Task(e.to_string()))??;
        Ok(project)
    }
}
