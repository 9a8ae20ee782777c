// railfile-core/src/commands/init.rs

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tagging::assets::write_default_vocabularies;

use crate::utils::logbook::emit_event;

#[derive(Debug, Clone)]
pub struct InitReport {
    pub root: PathBuf,
    pub created: Vec<String>,
    pub existed: Vec<String>,
}

// ---------- single global init gate ----------

static INIT: OnceCell<InitReport> = OnceCell::new();

/// Idempotent global initializer. Safe to call often.
/// Returns a &'static InitReport once initialization has completed.
pub fn ensure_initialized_once() -> Result<&'static InitReport> {
    INIT.get_or_try_init(ensure_initialized)
}

/// Resolve the Railfile root. Allow override via RAILFILE_ROOT (tests/venvs).
pub fn railfile_root() -> PathBuf {
    std::env::var_os("RAILFILE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".railfile"))
}

/// Ensure the default root is initialized (idempotent).
pub fn ensure_initialized() -> Result<InitReport> {
    ensure_initialized_at(&railfile_root())
}

/// Create the directory layout, default config, vocabularies and logbook
/// under `root`. Existing files are never overwritten.
pub fn ensure_initialized_at(root: &Path) -> Result<InitReport> {
    let root = root.to_path_buf();
    let mut created = Vec::new();
    let mut existed = Vec::new();

    // Directories
    ensure_dir(&root, "", &mut created, &mut existed)?;
    ensure_dir(&root, "cache", &mut created, &mut existed)?;
    ensure_dir(&root, "media", &mut created, &mut existed)?;
    ensure_dir(&root, "vocabulary", &mut created, &mut existed)?;

    // Config
    ensure_file(
        &root,
        "config.toml",
        Some(DEFAULT_CONFIG_TOML),
        &mut created,
        &mut existed,
    )?;

    // Vocabularies
    let vocab_dir = root.join("vocabulary");
    let seeded = write_default_vocabularies(&vocab_dir)
        .with_context(|| format!("seeding vocabularies in {:?}", vocab_dir))?;
    for name in [
        tagging::assets::CONTEXT_VOCABULARY_NAME,
        tagging::assets::TRAIN_VOCABULARY_NAME,
    ] {
        let rel = format!("vocabulary/{name}");
        if seeded.iter().any(|s| s == name) {
            created.push(rel);
        } else {
            existed.push(rel);
        }
    }

    // Logbook
    let logbook = root.join("logbook.jsonl");
    if logbook.exists() {
        existed.push("logbook.jsonl".to_string());
    } else {
        emit_event(&logbook, "system_init", json!({ "version": env!("CARGO_PKG_VERSION") }))?;
        created.push("logbook.jsonl".to_string());
    }

    if !created.is_empty() {
        tracing::info!(root = %root.display(), created = ?created, "initialized railfile root");
    }
    Ok(InitReport { root, created, existed })
}

fn ensure_dir(
    base: &Path,
    rel: &str,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = if rel.is_empty() { base.to_path_buf() } else { base.join(rel) };
    if p.exists() {
        existed.push(if rel.is_empty() { ".".to_string() } else { rel.to_string() });
        return Ok(());
    }
    fs::create_dir_all(&p).with_context(|| format!("create_dir_all({:?})", p))?;
    created.push(if rel.is_empty() { ".".to_string() } else { rel.to_string() });
    Ok(())
}

fn ensure_file(
    base: &Path,
    rel_file: &str,
    content_if_absent: Option<&str>,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = base.join(rel_file);
    if p.exists() {
        existed.push(rel_file.to_string());
        return Ok(());
    }
    write_atomic(&p, content_if_absent.unwrap_or("").as_bytes())?;
    created.push(rel_file.to_string());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create_dir_all({:?})", parent))?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp)
            .with_context(|| format!("open temp file {:?}", tmp))?;
        f.write_all(bytes)?;
        f.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("rename {:?} -> {:?}", tmp, path))?;
    Ok(())
}

// ---------- defaults ----------

const DEFAULT_CONFIG_TOML: &str = r#"[system]
name = "railfile"
version = "0.1.0"

[catalogue]
db_path = "cache/catalogue.db"
media_path = "media"
excluded_folders = []
excluded_files = []
extensions = [".jpg", ".jpeg", ".png", ".webp", ".mp4", ".mov"]
video_extensions = [".mp4", ".mov"]

[vocabulary]
context_path = "vocabulary/context.toml"
train_path = "vocabulary/train.toml"

[limits]
max_tag_len = 50
max_train_tags = 10
max_trains = 10

[logbook]
path = "logbook.jsonl"
"#;
