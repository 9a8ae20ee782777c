// src/commands/api.rs
use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

use tagging::{context_vocabulary, train_vocabulary, Vocabulary};

use crate::commands::init::{ensure_initialized_at, railfile_root};
use crate::config::CoreConfig;
use crate::services::catalogue::{Catalogue, MediaRecord, TagUpdate};
use crate::services::query::{run_query, MediaKind, MediaQuery};
use crate::services::scanner::{ScanReport, Scanner};
use crate::services::validate::validated;
use crate::utils::logbook::emit_event;
use crate::utils::path::resolve_rel_within_root;

/// Which vocabulary a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagScope {
    Context,
    Train,
}

#[derive(Debug, Serialize)]
pub struct TagExplanation {
    pub tag: String,
    pub scope: TagScope,
    pub known: bool,
    pub display_name: String,
    /// Everything the tag implies, depth-first.
    pub implies: Vec<String>,
    /// Known tags that imply this one.
    pub implied_by: Vec<String>,
}

pub struct Commands {
    root: PathBuf,
    config: CoreConfig,
    catalogue: Catalogue, // the only SQLite connection
    context: Vocabulary,
    trains: Vocabulary,
}

fn load_vocabulary(path: &Path, fallback: fn() -> Vocabulary) -> Vocabulary {
    match Vocabulary::load(path) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("vocabulary {} unusable ({}), using built-in", path.display(), e);
            fallback()
        }
    }
}

impl Commands {
    /// Initialize `root` if needed, then load config, catalogue and vocabularies.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_initialized_at(&root)?;
        let config = CoreConfig::load(&root)?;
        let catalogue = Catalogue::open(&config.catalogue.db_path)?;
        let context = load_vocabulary(&config.vocabulary.context_path, context_vocabulary);
        let trains = load_vocabulary(&config.vocabulary.train_path, train_vocabulary);
        tracing::debug!(
            root = %root.display(),
            context_tags = context.len(),
            train_tags = trains.len(),
            "commands ready"
        );
        Ok(Self {
            root,
            config,
            catalogue,
            context,
            trains,
        })
    }

    /// Open the root named by `RAILFILE_ROOT`, or `.railfile`.
    pub fn from_env() -> Result<Self> {
        Self::open(railfile_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn context_vocabulary(&self) -> &Vocabulary {
        &self.context
    }

    pub fn train_vocabulary(&self) -> &Vocabulary {
        &self.trains
    }

    fn log(&self, event: &str, data: serde_json::Value) {
        if let Err(e) = emit_event(&self.config.logbook.path, event, data) {
            tracing::warn!("logbook write failed: {e}");
        }
    }

    /// Reconcile the media folder with the catalogue.
    pub fn scan(&mut self) -> Result<ScanReport> {
        let report = Scanner::new(&self.config.catalogue).scan(&mut self.catalogue)?;
        if !report.is_empty() {
            self.log(
                "scan_completed",
                json!({
                    "new": report.new.len(),
                    "moved": report.moved.len(),
                    "duplicates": report.duplicates.len(),
                    "missing": report.missing.len(),
                    "restored": report.restored.len(),
                }),
            );
        }
        Ok(report)
    }

    /// Present records of the given kind, in catalogue order.
    pub fn list(&self, kind: MediaKind) -> Result<Vec<MediaRecord>> {
        Ok(self
            .catalogue
            .all_media()?
            .into_iter()
            .filter(|m| m.present && kind.admits(m.is_video))
            .collect())
    }

    pub fn media(&self, id: i64) -> Result<Option<MediaRecord>> {
        self.catalogue.media(id)
    }

    /// Validate and apply a batch of tag edits. Nothing is written unless
    /// every edit passes.
    pub fn update(&mut self, updates: Vec<TagUpdate>) -> Result<usize> {
        let updates = validated(updates, &self.config.limits)?;
        self.catalogue
            .apply_updates(&updates, &self.context, &self.trains)?;
        let ids: Vec<i64> = updates.iter().map(|u| u.id).collect();
        self.log("tags_updated", json!({ "ids": ids }));
        Ok(updates.len())
    }

    pub fn query(&self, query: &MediaQuery) -> Result<Vec<MediaRecord>> {
        for tag in query.filter.referenced_tags() {
            if !self.context.contains(tag) && !self.trains.contains(tag) {
                tracing::warn!("filter references unknown tag {:?}", tag);
            }
        }
        let records = self.catalogue.all_media()?;
        Ok(run_query(&records, query, &self.context, &self.trains)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn explain_tag(&self, tag: &str, scope: TagScope) -> TagExplanation {
        let vocabulary = match scope {
            TagScope::Context => &self.context,
            TagScope::Train => &self.trains,
        };
        let implied_by = vocabulary
            .entries()
            .filter(|e| e.name != tag && vocabulary.implies(&e.name, tag))
            .map(|e| e.name.clone())
            .collect();
        TagExplanation {
            tag: tag.to_string(),
            scope,
            known: vocabulary.contains(tag),
            display_name: vocabulary.display_name(tag).to_string(),
            implies: vocabulary.implied(tag).into_iter().map(String::from).collect(),
            implied_by,
        }
    }

    /// Absolute path of a catalogued file, checked to stay inside the media root.
    pub fn locate(&self, id: i64) -> Result<PathBuf> {
        let rel = self
            .catalogue
            .path_of(id)?
            .ok_or_else(|| anyhow!("no media with id {id}"))?;
        resolve_rel_within_root(&self.config.catalogue.media_path, &rel)
    }
}
