// src/services/scanner.rs
//! Scanner: walk the media tree and reconcile it with the catalogue.
//!
//! Paths already in the catalogue are not re-hashed, so edits to a known
//! file go unnoticed; hashing every file on each scan is far too slow.
//! Everything else is identified by content (blake3), which is how moved
//! files keep their tags.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::CatalogueConfig;
use crate::services::catalogue::{Catalogue, NewMedia};

const READ_BUFFER_SIZE: usize = 1024 * 1024; // 1 MiB

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MovedFile {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DuplicateFile {
    pub original: String,
    pub duplicate: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub new: Vec<String>,
    pub moved: Vec<MovedFile>,
    pub duplicates: Vec<DuplicateFile>,
    pub missing: Vec<String>,
    /// Previously missing paths that are back on disk.
    pub restored: Vec<String>,
    /// Candidates whose content was already catalogued under the same path.
    pub unchanged: Vec<String>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
            && self.moved.is_empty()
            && self.duplicates.is_empty()
            && self.missing.is_empty()
            && self.restored.is_empty()
    }
}

pub struct Scanner<'a> {
    config: &'a CatalogueConfig,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a CatalogueConfig) -> Self {
        Self { config }
    }

    /// Every file under the media root, relative and `/`-separated.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let root = &self.config.media_path;
        let mut files = Vec::new();
        if !root.is_dir() {
            anyhow::bail!("media folder {} is not a directory", root.display());
        }
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        files.sort();
        Ok(files)
    }

    fn is_candidate(&self, rel: &str, known_paths: &HashSet<&str>) -> bool {
        !self.config.excluded_files.iter().any(|f| f == rel)
            && !self
                .config
                .excluded_folders
                .iter()
                .any(|folder| !folder.is_empty() && rel.starts_with(folder.as_str()))
            && !known_paths.contains(rel)
            && self.config.is_media(Path::new(rel))
    }

    pub fn scan(&self, catalogue: &mut Catalogue) -> Result<ScanReport> {
        let known = catalogue.known_media()?;
        let known_paths: HashSet<&str> = known.iter().map(|k| k.path.as_str()).collect();
        let known_by_hash: HashMap<&str, &str> = known
            .iter()
            .map(|k| (k.hash.as_str(), k.path.as_str()))
            .collect();

        let files = self.list_files()?;
        let on_disk: HashSet<&str> = files.iter().map(String::as_str).collect();
        let candidates: Vec<&String> = files
            .iter()
            .filter(|f| self.is_candidate(f, &known_paths))
            .collect();

        let mut report = ScanReport::default();
        if candidates.is_empty() {
            tracing::info!("No new media files found");
        }

        let mut new_media: Vec<NewMedia> = Vec::new();
        let mut moves: Vec<(String, String)> = Vec::new();
        let total = candidates.len();

        'files: for (i, rel) in candidates.into_iter().enumerate() {
            tracing::debug!(file = %rel, progress = %format!("{}/{}", i + 1, total), "processing");
            let abs = self.config.media_path.join(rel);
            let hash = hash_file(&abs)?;

            for earlier in &new_media {
                if earlier.hash == hash {
                    tracing::warn!("Duplicate of \"{}\" at \"{}\"", earlier.path, rel);
                    report.duplicates.push(DuplicateFile {
                        original: earlier.path.clone(),
                        duplicate: rel.clone(),
                    });
                    continue 'files;
                }
            }

            if let Some(old_path) = known_by_hash.get(hash.as_str()) {
                let moved_to = moves.iter().find(|(h, _)| *h == hash).map(|(_, to)| to.clone());
                let original: Option<String> = match moved_to {
                    Some(to) => Some(to),
                    None if on_disk.contains(old_path) && *old_path != rel.as_str() => {
                        Some(old_path.to_string())
                    }
                    None => None,
                };
                if let Some(original) = original {
                    tracing::warn!("Duplicate of \"{}\" at \"{}\"", original, rel);
                    report.duplicates.push(DuplicateFile {
                        original,
                        duplicate: rel.clone(),
                    });
                } else if *old_path != rel.as_str() {
                    tracing::info!("Moved \"{}\" to \"{}\"", old_path, rel);
                    report.moved.push(MovedFile {
                        from: old_path.to_string(),
                        to: rel.clone(),
                    });
                    moves.push((hash, rel.clone()));
                } else {
                    report.unchanged.push(rel.clone());
                }
                continue;
            }

            new_media.push(self.describe(rel, &abs, hash)?);
            tracing::info!("New file \"{}\"", rel);
            report.new.push(rel.clone());
        }

        let moved_from: HashSet<&str> = report.moved.iter().map(|m| m.from.as_str()).collect();
        let missing: Vec<(i64, String)> = known
            .iter()
            .filter(|k| k.present && !on_disk.contains(k.path.as_str()) && !moved_from.contains(k.path.as_str()))
            .map(|k| (k.id, k.path.clone()))
            .collect();
        for (_, path) in &missing {
            tracing::warn!("Missing file \"{}\"", path);
        }
        for k in known.iter().filter(|k| !k.present && on_disk.contains(k.path.as_str())) {
            tracing::info!("Restored \"{}\"", k.path);
            report.restored.push(k.path.clone());
            moves.push((k.hash.clone(), k.path.clone()));
        }

        catalogue.mark_moved(&moves)?;
        catalogue.insert_new(&new_media)?;
        catalogue.mark_missing(&missing.iter().map(|(id, _)| *id).collect::<Vec<_>>())?;
        report.missing = missing.into_iter().map(|(_, path)| path).collect();

        tracing::info!(
            new = report.new.len(),
            moved = report.moved.len(),
            duplicates = report.duplicates.len(),
            missing = report.missing.len(),
            restored = report.restored.len(),
            "Finished scanning files"
        );
        Ok(report)
    }

    fn describe(&self, rel: &str, abs: &Path, hash: String) -> Result<NewMedia> {
        let size = std::fs::metadata(abs)
            .with_context(|| format!("stat {}", abs.display()))?
            .len();
        let is_video = self.config.is_video(abs);
        let (width, height) = if is_video {
            (None, None)
        } else {
            match image::image_dimensions(abs) {
                Ok((w, h)) => (Some(w), Some(h)),
                Err(e) => {
                    tracing::debug!("no dimensions for \"{}\": {}", rel, e);
                    (None, None)
                }
            }
        };
        Ok(NewMedia {
            path: rel.to_string(),
            hash,
            size,
            width,
            height,
            duration: None,
            is_video,
        })
    }
}

/// blake3 hex digest of a file, read in 1 MiB chunks.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
