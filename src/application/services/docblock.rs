//! Doc comment service
//!
//! Parses standalone doc comments from files and scans source code for
//! every `/** ... */` block it contains.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::ScanConfig;
use crate::domain::TagTree;
use crate::infrastructure::traits::FileSystem;

/// The lazy form needs a `*` after `/**`, so `/**/` is matched on its own first.
static DOCBLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)/\*\*/|/\*\*.*?\*/").expect("docblock pattern compiles")
});

/// A doc comment found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocblockMatch {
    pub path: PathBuf,
    /// 1-based line on which the comment opens
    pub line: usize,
    pub tags: TagTree,
}

/// Result of scanning a file or directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Files that were read successfully
    pub files_scanned: usize,
    /// Files and directory entries skipped because they could not be read
    pub files_skipped: usize,
    /// Doc comments in path order, then line order
    pub matches: Vec<DocblockMatch>,
}

/// Service for reading doc comments from the filesystem.
pub struct DocblockService {
    fs: Arc<dyn FileSystem>,
}

impl DocblockService {
    /// Create a new doc comment service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a single doc comment, ignoring surrounding whitespace.
    pub fn parse_str(&self, doc: &str) -> ApplicationResult<TagTree> {
        Ok(TagTree::parse(doc.trim())?)
    }

    /// Parse a file that contains exactly one doc comment.
    #[instrument(level = "debug", skip(self))]
    pub fn parse_file(&self, path: &Path) -> ApplicationResult<TagTree> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read doc comment", path)?;
        self.parse_str(&content)
    }

    /// Value at a fully-qualified key.
    pub fn value_at<'a>(tags: &'a TagTree, key: &str) -> ApplicationResult<&'a str> {
        tags.lookup(key).ok_or_else(|| ApplicationError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Find all doc comments in source text.
    ///
    /// Returns each comment with the 1-based line it opens on.
    pub fn extract_blocks(source: &str) -> Vec<(usize, &str)> {
        let mut line = 1;
        let mut last = 0;
        DOCBLOCK_RE
            .find_iter(source)
            .map(|m| {
                line += source[last..m.start()].matches('\n').count();
                last = m.start();
                (line, m.as_str())
            })
            .collect()
    }

    /// Parse every doc comment in one source file.
    ///
    /// Comments without tags are dropped unless `include_empty` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn scan_file(
        &self,
        path: &Path,
        include_empty: bool,
    ) -> ApplicationResult<Vec<DocblockMatch>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read source file", path)?;

        let mut matches = Vec::new();
        for (line, block) in Self::extract_blocks(&content) {
            let tags = TagTree::parse(block)?;
            if tags.is_empty() && !include_empty {
                continue;
            }
            matches.push(DocblockMatch {
                path: path.to_path_buf(),
                line,
                tags,
            });
        }
        debug!("scan_file: {} doc comments in {}", matches.len(), path.display());
        Ok(matches)
    }

    /// Scan a file, or every matching file below a directory.
    ///
    /// Directory entries are filtered by `scan.file_extensions` and parsed
    /// in parallel. Unreadable files or subdirectories inside a directory
    /// are skipped with a warning; an unreadable single file is an error.
    #[instrument(level = "debug", skip(self, scan))]
    pub fn scan(&self, path: &Path, scan: &ScanConfig) -> ApplicationResult<ScanReport> {
        if self.fs.is_file(path) {
            let matches = self.scan_file(path, scan.include_empty)?;
            return Ok(ScanReport {
                files_scanned: 1,
                files_skipped: 0,
                matches,
            });
        }

        if !self.fs.is_dir(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("path not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "path does not exist",
                )),
            });
        }

        let listing = self
            .fs
            .list_files(path)
            .with_path_context("list directory", path)?;
        for (entry, e) in &listing.unreadable {
            warn!("skipping {}: {}", entry.display(), e);
        }

        let mut files: Vec<PathBuf> = listing
            .files
            .into_iter()
            .filter(|file| has_extension(file, &scan.file_extensions))
            .collect();
        files.sort();
        debug!("scan: {} candidate files in {}", files.len(), path.display());

        let results: Vec<_> = files
            .par_iter()
            .map(|file| (file, self.scan_file(file, scan.include_empty)))
            .collect();

        let mut report = ScanReport {
            files_skipped: listing.unreadable.len(),
            ..ScanReport::default()
        };
        for (file, result) in results {
            match result {
                Ok(matches) => {
                    report.files_scanned += 1;
                    report.matches.extend(matches);
                }
                Err(e) => {
                    warn!("skipping {}: {}", file.display(), e);
                    report.files_skipped += 1;
                }
            }
        }
        Ok(report)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
