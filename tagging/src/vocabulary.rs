//! Tag vocabulary: the catalogue of known tag names and the implication
//! edges between them.
//!
//! Edges are directed (`"555012"` implies `"class 555"`) and expected to form a
//! DAG. Acyclicity is not validated; every walk keeps a visited set so a
//! cyclic vocabulary degrades to a conservative answer instead of looping.
//! Names without an entry are valid tags that imply nothing.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("reading vocabulary {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing TOML vocabulary: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("parsing JSON vocabulary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("serializing vocabulary: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// One known tag. Only `name` and `implies` carry semantics; the display
/// fields are passed through for pickers and listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implies: Vec<String>,
    #[serde(
        default,
        alias = "displayName",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl TagEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn implying<I, S>(mut self, implied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implies.extend(implied.into_iter().map(Into::into));
        self
    }

    pub fn display(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

/// On-disk TOML shape: a list of `[[tag]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct VocabularyFile {
    #[serde(default, rename = "tag")]
    tags: Vec<TagEntry>,
}

/// Read-only after construction; share it by reference (or `Arc`) across
/// every `TagSet` and worker thread.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<TagEntry>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from entries in declaration order. A repeated name merges its
    /// `implies` edges into the first entry and overrides any display field
    /// it sets.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TagEntry>,
    {
        let mut vocab = Self::default();
        for entry in entries {
            vocab.insert(entry);
        }
        vocab
    }

    fn insert(&mut self, entry: TagEntry) {
        match self.index.get(&entry.name) {
            Some(&i) => {
                let existing = &mut self.entries[i];
                for implied in entry.implies {
                    if !existing.implies.contains(&implied) {
                        existing.implies.push(implied);
                    }
                }
                if entry.display_name.is_some() {
                    existing.display_name = entry.display_name;
                }
                if entry.color.is_some() {
                    existing.color = entry.color;
                }
                if entry.emoji.is_some() {
                    existing.emoji = entry.emoji;
                }
            }
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile = toml::from_str(text)?;
        Ok(Self::from_entries(file.tags))
    }

    /// JSON vocabularies are a bare array of entries.
    pub fn from_json_str(text: &str) -> Result<Self, VocabularyError> {
        let entries: Vec<TagEntry> = serde_json::from_str(text)?;
        Ok(Self::from_entries(entries))
    }

    /// Load a vocabulary file; `.json` is read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let text = fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let vocab = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text)?,
            _ => Self::from_toml_str(&text)?,
        };
        tracing::debug!(path = %path.display(), tags = vocab.len(), "loaded vocabulary");
        Ok(vocab)
    }

    pub fn to_toml_string(&self) -> Result<String, VocabularyError> {
        let file = VocabularyFile {
            tags: self.entries.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Label for listings; falls back to the tag name itself.
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name)
            .and_then(|e| e.display_name.as_deref())
            .unwrap_or(name)
    }

    fn direct(&self, name: &str) -> &[String] {
        self.get(name).map(|e| e.implies.as_slice()).unwrap_or(&[])
    }

    /// True iff `to` is reachable from `from` over one or more edges.
    pub fn implies(&self, from: &str, to: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self.direct(from).iter().map(String::as_str).collect();
        while let Some(next) = stack.pop() {
            if next == to {
                return true;
            }
            if !visited.insert(next) {
                continue;
            }
            stack.extend(self.direct(next).iter().map(String::as_str));
        }
        false
    }

    /// Every name reachable from `name` (excluding `name` unless a cycle leads
    /// back to it), each reported once, in depth-first discovery order.
    pub fn implied(&self, name: &str) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.direct(name).iter().rev().map(String::as_str).collect();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.direct(next).iter().rev().map(String::as_str));
        }
        out
    }

    /// `name` followed by everything it implies.
    pub fn closure<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut out = vec![name];
        out.extend(self.implied(name).into_iter().filter(|t| *t != name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> Vocabulary {
        Vocabulary::from_entries([
            TagEntry::new("metro"),
            TagEntry::new("class 555").implying(["metro"]),
            TagEntry::new("555012").implying(["class 555"]),
        ])
    }

    #[test]
    fn implies_is_transitive_and_irreflexive() {
        let v = units();
        assert!(v.implies("555012", "class 555"));
        assert!(v.implies("555012", "metro"));
        assert!(!v.implies("metro", "555012"));
        assert!(!v.implies("555012", "555012"));
    }

    #[test]
    fn unknown_names_imply_nothing() {
        let v = units();
        assert!(!v.implies("555099", "class 555"));
        assert!(v.implied("555099").is_empty());
        assert_eq!(v.display_name("555099"), "555099");
    }

    #[test]
    fn cycles_terminate() {
        let v = Vocabulary::from_entries([
            TagEntry::new("a").implying(["b"]),
            TagEntry::new("b").implying(["a"]),
        ]);
        assert!(v.implies("a", "b"));
        assert!(v.implies("a", "a"));
        assert!(!v.implies("a", "c"));
        assert_eq!(v.implied("a"), vec!["b", "a"]);
        assert_eq!(v.closure("a"), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_names_merge_edges() {
        let v = Vocabulary::from_entries([
            TagEntry::new("tone"),
            TagEntry::new("low-high tone").implying(["low tone"]),
            TagEntry::new("low-high tone")
                .implying(["low tone", "high tone"])
                .emoji("📢"),
        ]);
        assert_eq!(v.len(), 2);
        let entry = v.get("low-high tone").unwrap();
        assert_eq!(entry.implies, vec!["low tone", "high tone"]);
        assert_eq!(entry.emoji.as_deref(), Some("📢"));
    }
}
