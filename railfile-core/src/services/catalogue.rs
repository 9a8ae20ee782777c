// src/services/catalogue.rs
//! Single-writer catalogue store.
//!
//! - Owns a single SQLite connection (WAL) to avoid multi-writer contention.
//! - One row per media file, keyed by relative path and by content hash.
//! - Context tags and per-train tags are stored as plain strings, always the
//!   minimal set produced by `TagSet::to_stored`; closures are recomputed
//!   from the vocabulary on read.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tagging::{TagSet, Tagged, Vocabulary};

use crate::services::validate::UpdateError;

/// A catalogued file plus its stored tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: i64,
    /// Path relative to the media root, `/`-separated.
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Seconds; only known for probed videos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub is_video: bool,
    /// False once a scan no longer finds the file.
    pub present: bool,
    pub context_tags: Vec<String>,
    pub train_tags: Vec<Vec<String>>,
}

impl Tagged for MediaRecord {
    fn context_tags(&self) -> &[String] {
        &self.context_tags
    }

    fn train_tags(&self) -> &[Vec<String>] {
        &self.train_tags
    }
}

/// Identity of an existing row, as needed by the scanner.
#[derive(Debug, Clone)]
pub struct KnownMedia {
    pub id: i64,
    pub path: String,
    pub hash: String,
    pub present: bool,
}

/// A file found by the scanner that is not yet catalogued.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub path: String,
    pub hash: String,
    pub size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<f64>,
    pub is_video: bool,
}

/// Tag edit for one item: context tags are merged into what is stored,
/// train tags replace the stored trains wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagUpdate {
    pub id: i64,
    #[serde(default, alias = "contextTags")]
    pub context_tags: Vec<String>,
    #[serde(default, alias = "trainTags")]
    pub train_tags: Vec<Vec<String>>,
}

/// Catalogue is the single authority for writing to SQLite.
pub struct Catalogue {
    pub(crate) db: Connection,
}

impl Catalogue {
    /// Open/create the SQLite DB and ensure schema.
    ///
    /// Behavior:
    /// - Creates the parent directory if missing.
    /// - Opens SQLite and enables WAL plus foreign keys.
    /// - Creates `media`, `context_tags` and `train_tags` if they don't exist.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Connection::open(db_path)?;
        Self::with_connection(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        db.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS media (
              id        INTEGER PRIMARY KEY AUTOINCREMENT,
              path      TEXT NOT NULL UNIQUE,     -- relative to the media root
              hash      TEXT NOT NULL UNIQUE,     -- blake3 hex of the file bytes
              size      INTEGER NOT NULL,
              width     INTEGER,
              height    INTEGER,
              duration  REAL,
              is_video  INTEGER NOT NULL,
              present   INTEGER NOT NULL DEFAULT 1,
              added_at  TEXT NOT NULL           -- RFC3339 UTC
            );

            CREATE TABLE IF NOT EXISTS context_tags (
              media_id  INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
              tag       TEXT NOT NULL,
              PRIMARY KEY (media_id, tag)
            );

            CREATE TABLE IF NOT EXISTS train_tags (
              media_id  INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
              train_id  INTEGER NOT NULL,       -- 0-based position of the train in the item
              tag       TEXT NOT NULL,
              PRIMARY KEY (media_id, train_id, tag)
            );
            "#,
        )?;
        Ok(Self { db })
    }

    pub fn known_media(&self) -> Result<Vec<KnownMedia>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, path, hash, present FROM media ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(KnownMedia {
                id: row.get(0)?,
                path: row.get(1)?,
                hash: row.get(2)?,
                present: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn insert_new(&mut self, media: &[NewMedia]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.db.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO media(path, hash, size, width, height, duration, is_video, present, added_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
                "#,
            )?;
            for m in media {
                stmt.execute(params![
                    m.path,
                    m.hash,
                    m.size as i64,
                    m.width,
                    m.height,
                    m.duration,
                    m.is_video,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Point rows at their new path (matched by content hash) and mark them present.
    pub fn mark_moved(&mut self, moves: &[(String, String)]) -> Result<()> {
        let tx = self.db.transaction()?;
        for (hash, new_path) in moves {
            tx.execute(
                "UPDATE media SET path=?1, present=1 WHERE hash=?2",
                params![new_path, hash],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn mark_missing(&mut self, ids: &[i64]) -> Result<()> {
        let tx = self.db.transaction()?;
        for id in ids {
            tx.execute("UPDATE media SET present=0 WHERE id=?1", [id])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Every record with its stored tags, in insertion order.
    pub fn all_media(&self) -> Result<Vec<MediaRecord>> {
        let mut context: HashMap<i64, Vec<String>> = HashMap::new();
        {
            let mut stmt = self
                .db
                .prepare("SELECT media_id, tag FROM context_tags ORDER BY media_id, tag")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
            for row in rows {
                let (id, tag) = row?;
                context.entry(id).or_default().push(tag);
            }
        }

        let mut trains: HashMap<i64, BTreeMap<i64, Vec<String>>> = HashMap::new();
        {
            let mut stmt = self.db.prepare(
                "SELECT media_id, train_id, tag FROM train_tags ORDER BY media_id, train_id, tag",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in rows {
                let (id, train, tag) = row?;
                trains.entry(id).or_default().entry(train).or_default().push(tag);
            }
        }

        let mut stmt = self.db.prepare(
            "SELECT id, path, size, width, height, duration, is_video, present FROM media ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MediaRecord {
                id: row.get(0)?,
                path: row.get(1)?,
                size: row.get::<_, i64>(2)? as u64,
                width: row.get(3)?,
                height: row.get(4)?,
                duration: row.get(5)?,
                is_video: row.get(6)?,
                present: row.get(7)?,
                context_tags: Vec::new(),
                train_tags: Vec::new(),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            let mut record = row?;
            record.context_tags = context.remove(&record.id).unwrap_or_default();
            record.train_tags = trains
                .remove(&record.id)
                .map(|t| t.into_values().collect())
                .unwrap_or_default();
            out.push(record);
        }
        Ok(out)
    }

    /// One record with its stored tags, without touching other rows.
    pub fn media(&self, id: i64) -> Result<Option<MediaRecord>> {
        let record = self
            .db
            .query_row(
                "SELECT id, path, size, width, height, duration, is_video, present FROM media WHERE id=?1",
                [id],
                |row| {
                    Ok(MediaRecord {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        size: row.get::<_, i64>(2)? as u64,
                        width: row.get(3)?,
                        height: row.get(4)?,
                        duration: row.get(5)?,
                        is_video: row.get(6)?,
                        present: row.get(7)?,
                        context_tags: Vec::new(),
                        train_tags: Vec::new(),
                    })
                },
            )
            .optional()?;
        let Some(mut record) = record else {
            return Ok(None);
        };

        let mut stmt = self
            .db
            .prepare("SELECT tag FROM context_tags WHERE media_id=?1 ORDER BY tag")?;
        record.context_tags = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut trains: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        let mut stmt = self
            .db
            .prepare("SELECT train_id, tag FROM train_tags WHERE media_id=?1 ORDER BY train_id, tag")?;
        let rows = stmt.query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (train, tag) = row?;
            trains.entry(train).or_default().push(tag);
        }
        record.train_tags = trains.into_values().collect();
        Ok(Some(record))
    }

    pub fn path_of(&self, id: i64) -> Result<Option<String>> {
        Ok(self
            .db
            .query_row("SELECT path FROM media WHERE id=?1", [id], |row| row.get(0))
            .optional()?)
    }

    /// Apply tag edits in one transaction. Context tags are merged through a
    /// `TagSet` so nothing already stored is lost; each train is normalised
    /// the same way. Only `to_stored()` output reaches the tables. A train
    /// with no tags has no rows and does not survive a reload.
    pub fn apply_updates(
        &mut self,
        updates: &[TagUpdate],
        context_vocabulary: &Vocabulary,
        train_vocabulary: &Vocabulary,
    ) -> Result<()> {
        let tx = self.db.transaction()?;
        for update in updates {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM media WHERE id=?1)",
                [update.id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(UpdateError::UnknownMedia(update.id).into());
            }

            let stored: Vec<String> = {
                let mut stmt = tx.prepare("SELECT tag FROM context_tags WHERE media_id=?1")?;
                let rows = stmt.query_map([update.id], |row| row.get::<_, String>(0))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            };
            let mut context = TagSet::from_stored(context_vocabulary, stored);
            for tag in &update.context_tags {
                context.add(tag.as_str());
            }

            tx.execute("DELETE FROM context_tags WHERE media_id=?1", [update.id])?;
            for tag in context.to_stored() {
                tx.execute(
                    "INSERT INTO context_tags(media_id, tag) VALUES (?1, ?2)",
                    params![update.id, tag],
                )?;
            }

            tx.execute("DELETE FROM train_tags WHERE media_id=?1", [update.id])?;
            for (train_id, tags) in update.train_tags.iter().enumerate() {
                let train = TagSet::from_stored(train_vocabulary, tags.iter().map(String::as_str));
                for tag in train.to_stored() {
                    tx.execute(
                        "INSERT INTO train_tags(media_id, train_id, tag) VALUES (?1, ?2, ?3)",
                        params![update.id, train_id as i64, tag],
                    )?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
