//! Closure-maintaining tag container for one scope (an item, or one train in it).
//!
//! Storage is kept as an antichain under the vocabulary's implication order:
//! no stored tag implies another stored tag. Membership answers over the full
//! transitive closure, iteration and persistence see only the stored tags.

use std::collections::hash_set;
use std::collections::HashSet;

use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone)]
pub struct TagSet<'v> {
    vocabulary: &'v Vocabulary,
    tags: HashSet<String>,
}

impl<'v> TagSet<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            vocabulary,
            tags: HashSet::new(),
        }
    }

    /// Rebuild a set from persisted tags, evicting any that another member
    /// already implies. Input order does not change the result for a DAG
    /// vocabulary.
    pub fn from_stored<I, S>(vocabulary: &'v Vocabulary, stored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(vocabulary);
        for tag in stored {
            set.add(tag);
        }
        set
    }

    pub fn vocabulary(&self) -> &'v Vocabulary {
        self.vocabulary
    }

    /// Add `tag` unless it is already satisfied. A more specific tag replaces
    /// the generalisations it implies. Returns whether storage changed.
    pub fn add(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has(&tag) {
            return false;
        }
        for implied in self.vocabulary.implied(&tag) {
            self.tags.remove(implied);
        }
        self.tags.insert(tag);
        true
    }

    /// Closure membership: stored, or implied by something stored.
    pub fn has(&self, tag: &str) -> bool {
        self.tags.contains(tag) || self.tags.iter().any(|s| self.vocabulary.implies(s, tag))
    }

    /// Stored (explicit) tags only, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// The minimal set to persist, sorted for stable output.
    pub fn to_stored(&self) -> Vec<String> {
        let mut out: Vec<String> = self.tags.iter().cloned().collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'a, 'v> IntoIterator for &'a TagSet<'v> {
    type Item = &'a String;
    type IntoIter = hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}
