//! Project extractors
//!
//! Turn an uploaded bundle into `ProjectData`.

pub mod archive;

pub use archive::{ArchiveError, ArchiveExtractor, ArchiveReader, ExtractionPolicy, RawEntry, ZipArchiveReader};
