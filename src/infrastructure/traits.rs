//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Files found below a directory.
#[derive(Debug, Default)]
pub struct DirListing {
    pub files: Vec<PathBuf>,
    /// Entries below the directory that could not be read
    pub unreadable: Vec<(PathBuf, io::Error)>,
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// List all regular files below a directory, recursively.
    ///
    /// Fails only if `dir` itself cannot be read; unreadable entries below
    /// it are collected in [`DirListing::unreadable`].
    fn list_files(&self, dir: &Path) -> io::Result<DirListing>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> io::Result<DirListing> {
        let mut listing = DirListing::default();
        for entry in WalkDir::new(dir) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => listing.files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) if e.depth() == 0 => return Err(io::Error::from(e)),
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    listing.unreadable.push((path, io::Error::from(e)));
                }
            }
        }
        Ok(listing)
    }
}
