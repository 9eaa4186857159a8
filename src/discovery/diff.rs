use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Files changed since `base`, as absolute paths under the repository root
pub fn get_changed_files(target: &Path, base: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let root = git(target, &["rev-parse", "--show-toplevel"])?;
    let root = PathBuf::from(root.trim());

    let stdout = git(target, &["diff", "--name-only", base])?;
    let files = stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| root.join(line))
        .collect();

    Ok(files)
}

fn git(dir: &Path, args: &[&str]) -> Result<String, DiscoveryError> {
    let output = Command::new("git").current_dir(dir).args(args).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiscoveryError::GitDiff(stderr.trim().to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
