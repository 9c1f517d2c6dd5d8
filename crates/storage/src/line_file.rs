//! Line-oriented log file
//!
//! [`LineFile`] performs the raw file operations behind every log:
//! read all entries, append one entry, rewrite the whole file, remove it.
//!
//! The file never ends with a separator: the first entry is written
//! verbatim and every later entry is written as `"\n" + entry`.
//!
//! # Thread Safety
//!
//! `LineFile` holds no lock. Two concurrent `append` calls on the same path
//! can interleave their length check and write. Mutations must be funnelled
//! through a single writer.

use crate::durability::SyncMode;
use crate::format::{join_entries, split_entries, SEPARATOR};
use linelog_core::{Error, Result};
use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One log file on disk
#[derive(Debug, Clone)]
pub struct LineFile {
    path: PathBuf,
    sync: SyncMode,
}

impl LineFile {
    /// Create a handle for the file at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>, sync: SyncMode) -> Self {
        Self {
            path: path.into(),
            sync,
        }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync mode used for mutations
    pub fn sync_mode(&self) -> SyncMode {
        self.sync
    }

    /// Check if the file currently exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read all entries
    ///
    /// A missing or zero-length file has no entries. Content must be UTF-8.
    pub fn read_entries(&self) -> Result<Vec<String>> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.read_error(e)),
        };
        if meta.len() == 0 {
            return Ok(Vec::new());
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(split_entries(&content)),
            // Removed between the metadata call and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.read_error(e)),
        }
    }

    /// Read all entries, replacing invalid UTF-8 with U+FFFD
    ///
    /// Used where one bad byte must not block the whole log.
    pub fn read_entries_lossy(&self) -> Result<Vec<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.read_error(e)),
        };

        let content = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = content {
            warn!(path = %self.path.display(), "replaced invalid UTF-8 in log file");
        }
        Ok(split_entries(&content))
    }

    /// Create the file (and its directory) if absent
    pub fn ensure_exists(&self) -> Result<()> {
        self.open_append().map(drop)
    }

    /// Append one entry
    ///
    /// The entry is written verbatim into an empty file and prefixed with
    /// the separator otherwise. The entry itself is not validated here.
    pub fn append(&self, entry: &str) -> Result<()> {
        let mut file = self.open_append()?;
        let len = file.metadata().map_err(|e| self.write_error(e))?.len();

        let mut buf = String::with_capacity(entry.len() + 1);
        if len > 0 {
            buf.push(SEPARATOR);
        }
        buf.push_str(entry);

        file.write_all(buf.as_bytes())
            .map_err(|e| self.write_error(e))?;
        self.finish(&file)
    }

    /// Replace the file's content with exactly `entries`
    pub fn rewrite<S: AsRef<str>>(&self, entries: &[S]) -> Result<()> {
        let mut file = File::create(&self.path).map_err(|e| self.write_error(e))?;
        file.write_all(join_entries(entries).as_bytes())
            .map_err(|e| self.write_error(e))?;
        self.finish(&file)
    }

    /// Keep only the entries for which `keep` returns true
    ///
    /// Creates the file first if it is missing. Invalid UTF-8 is replaced
    /// with U+FFFD, and the rewrite stores the replacement. Returns the
    /// number of entries removed.
    pub fn retain<F>(&self, mut keep: F) -> Result<usize>
    where
        F: FnMut(&str) -> bool,
    {
        self.ensure_exists()?;
        let entries = self.read_entries_lossy()?;
        let before = entries.len();
        let kept: Vec<String> = entries.into_iter().filter(|e| keep(e)).collect();
        self.rewrite(&kept)?;
        Ok(before - kept.len())
    }

    /// Delete the file
    ///
    /// Returns `Ok(false)` if there was nothing to delete.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn open_append(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::FileCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let existed = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| Error::FileCreate {
                path: self.path.clone(),
                source,
            })?;
        if !existed {
            debug!(path = %self.path.display(), "created log file");
        }
        Ok(file)
    }

    fn finish(&self, file: &File) -> Result<()> {
        if self.sync.requires_fsync() {
            file.sync_all().map_err(|e| self.write_error(e))?;
        }
        Ok(())
    }

    fn read_error(&self, source: io::Error) -> Error {
        Error::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: io::Error) -> Error {
        Error::Write {
            path: self.path.clone(),
            source,
        }
    }
}
