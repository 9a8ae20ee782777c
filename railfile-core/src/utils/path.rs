use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Ensure that a candidate absolute path resolves to a location contained
/// within the canonicalized `root_abs`. Returns the canonicalized path.
///
/// Stored media paths come from the database; a tampered row such as
/// `../../etc/passwd` or a symlink pointing outside the media root is
/// rejected here.
pub fn assert_within_root_abs(root_abs: &Path, candidate_abs: &Path) -> Result<PathBuf> {
    let root = root_abs
        .canonicalize()
        .with_context(|| format!("canonicalize root {:?}", root_abs))?;
    let resolved = candidate_abs
        .canonicalize()
        .with_context(|| format!("canonicalize {:?}", candidate_abs))?;

    if !resolved.starts_with(&root) {
        anyhow::bail!(
            "path escapes root: path={:?} root={:?}",
            candidate_abs,
            root
        );
    }
    Ok(resolved)
}

/// Join a relative, `/`-separated catalogue path onto the media root and
/// return the checked absolute path. Rejects absolute inputs.
pub fn resolve_rel_within_root(root_abs: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        anyhow::bail!("absolute paths are not allowed");
    }
    let joined = rel.split('/').fold(root_abs.to_path_buf(), |acc, part| acc.join(part));
    assert_within_root_abs(root_abs, &joined)
}
