//! Storage directory
//!
//! All logs live as flat files directly under one directory:
//! `<root>/<category>`.

use crate::durability::SyncMode;
use crate::line_file::LineFile;
use linelog_core::{Category, Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory holding one file per category
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
    sync: SyncMode,
}

impl LogDir {
    /// Wrap `root` without touching the filesystem
    pub fn new(root: impl Into<PathBuf>, sync: SyncMode) -> Self {
        Self {
            root: root.into(),
            sync,
        }
    }

    /// Wrap `root`, creating it if needed
    pub fn create(root: impl Into<PathBuf>, sync: SyncMode) -> Result<Self> {
        let dir = Self::new(root, sync);
        fs::create_dir_all(&dir.root).map_err(|source| Error::FileCreate {
            path: dir.root.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sync mode handed to every file
    pub fn sync_mode(&self) -> SyncMode {
        self.sync
    }

    /// Path of the file backing `category`
    pub fn path_for(&self, category: &Category) -> PathBuf {
        self.root.join(category.as_str())
    }

    /// File handle for `category`
    pub fn file(&self, category: &Category) -> LineFile {
        LineFile::new(self.path_for(category), self.sync)
    }

    /// Categories that currently have a file, sorted by name
    ///
    /// Entries that are not regular files or whose names are not valid
    /// categories are skipped. A missing directory has no categories.
    pub fn categories(&self) -> Result<Vec<Category>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::Read {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut categories = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Read {
                path: self.root.clone(),
                source,
            })?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(category) = Category::new(name) {
                    categories.push(category);
                }
            }
        }
        categories.sort();
        Ok(categories)
    }
}
