use crate::error::DiscoveryError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Include/exclude patterns plus pruned directory names
pub struct FileFilter {
    include: GlobSet,
    include_any: bool,
    exclude: GlobSet,
    skip_dirs: Vec<String>,
}

impl FileFilter {
    pub fn new(
        include: &[String],
        exclude: &[String],
        skip_dirs: &[String],
    ) -> Result<Self, DiscoveryError> {
        Ok(Self {
            include: build_globset(include, "include set")?,
            include_any: include.is_empty(),
            exclude: build_globset(exclude, "exclude set")?,
            skip_dirs: skip_dirs.to_vec(),
        })
    }

    fn matches(&self, rel_path: &Path) -> bool {
        (self.include_any || self.include.is_match(rel_path)) && !self.exclude.is_match(rel_path)
    }
}

fn build_globset(patterns: &[String], label: &str) -> Result<GlobSet, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| DiscoveryError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| DiscoveryError::GlobPattern {
        pattern: label.to_string(),
        source: e,
    })
}

/// A candidate file with its on-disk size
#[derive(Debug, Clone, PartialEq)]
pub struct FoundFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Walk `target`, returning matching files no larger than `max_size`, sorted
pub fn walk_files(
    target: &Path,
    filter: &FileFilter,
    max_size: u64,
) -> Result<Vec<FoundFile>, DiscoveryError> {
    let skip_dirs = filter.skip_dirs.clone();

    // Use ignore crate to respect .gitignore
    let walker = WalkBuilder::new(target)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir
                && entry.depth() > 0
                && skip_dirs
                    .iter()
                    .any(|d| entry.file_name().to_str() == Some(d.as_str())))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let rel_path = path.strip_prefix(target).unwrap_or(path);
        if !filter.matches(rel_path) {
            continue;
        }

        let size = entry.metadata()?.len();
        if size > max_size {
            warn!(
                "Skipping file {} (size {} exceeds limit {})",
                path.display(),
                size,
                max_size
            );
            continue;
        }

        debug!("Found {}", path.display());
        files.push(FoundFile {
            path: path.to_path_buf(),
            size,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Read a file as text, replacing invalid UTF-8 so the validator can judge it
pub fn read_text(path: &Path) -> Result<String, DiscoveryError> {
    let bytes = std::fs::read(path).map_err(|e| DiscoveryError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
