//! Extracted project contents

use serde::{Deserialize, Serialize};

/// One retained archive entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Path inside the archive, as the archive reports it
    pub path: String,
    /// Full decoded text
    pub content: String,
}

impl ProjectFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Everything one audit run knows about the uploaded project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Display name of the uploaded archive (e.g. `my-app.zip`)
    pub name: String,
    /// Retained files in archive enumeration order
    pub files: Vec<ProjectFile>,
}

impl ProjectData {
    pub fn new(name: impl Into<String>, files: Vec<ProjectFile>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total characters across all file bodies
    pub fn total_chars(&self) -> usize {
        self.files.iter().map(|f| f.content.chars().count()).sum()
    }
}
