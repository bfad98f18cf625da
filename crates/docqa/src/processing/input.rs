//! Resolving operator input into sources

use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{FileType, Source};

/// Turn a folder path or an `http(s)://` link into the sources to process
pub fn resolve_input(raw: &str) -> Result<Vec<Source>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid_input("no folder or link given"));
    }

    if Source::is_url(raw) {
        return Ok(vec![Source::Url(raw.to_string())]);
    }

    scan_directory(Path::new(raw))
}

/// Supported documents directly inside `dir` (not recursive), sorted by file name
pub fn scan_directory(dir: &Path) -> Result<Vec<Source>> {
    if !dir.is_dir() {
        return Err(Error::invalid_input(format!(
            "Input path {} is not a valid folder",
            dir.display()
        )));
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && FileType::from_path(entry.path()).is_some() {
            sources.push(Source::File(entry.into_path()));
        }
    }

    if sources.is_empty() {
        let supported: Vec<_> = FileType::ALL.iter().map(|t| format!(".{}", t.extension())).collect();
        return Err(Error::invalid_input(format!(
            "No supported files ({}) found in {}",
            supported.join(", "),
            dir.display()
        )));
    }

    Ok(sources)
}
