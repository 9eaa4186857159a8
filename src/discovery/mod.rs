mod diff;
mod files;

pub use diff::get_changed_files;
pub use files::{read_text, walk_files, FileFilter};

use crate::config::Config;
use crate::error::DiscoveryError;
use crate::review::ReviewUnit;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

/// Scan the configured target into review units, paths relative to the target
pub fn scan_units(
    config: &Config,
    diff_base: Option<&str>,
) -> Result<Vec<ReviewUnit>, DiscoveryError> {
    let target = std::fs::canonicalize(&config.target)?;
    let filter = FileFilter::new(&config.include, &config.exclude, &config.skip_dirs)?;

    // Get changed files if diff_base is specified
    let changed: Option<HashSet<PathBuf>> = match diff_base {
        Some(base) => {
            let files: HashSet<PathBuf> = get_changed_files(&target, base)?.into_iter().collect();
            info!("{} files changed since {}", files.len(), base);
            Some(files)
        }
        None => None,
    };

    let mut units = Vec::new();
    for found in walk_files(&target, &filter, config.max_file_size)? {
        if let Some(ref changed) = changed {
            if !changed.contains(&found.path) {
                continue;
            }
        }

        let content = read_text(&found.path)?;
        let rel_path = found
            .path
            .strip_prefix(&target)
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| found.path.clone());

        units.push(ReviewUnit {
            path: rel_path,
            size: found.size,
            content,
        });
    }

    Ok(units)
}
