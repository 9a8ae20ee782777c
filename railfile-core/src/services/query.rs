// src/services/query.rs
//! Catalogue query: a tag filter plus optional metadata ranges, evaluated
//! over every record in parallel.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use tagging::{evaluate_item, Filter, Vocabulary};

use crate::services::catalogue::MediaRecord;

/// Inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

// Slider bounds of the picker.
pub const SIZE_RANGE: Range<u64> = Range { min: 0, max: 5 * 1000 * 1000 * 1000 };
pub const WIDTH_RANGE: Range<u32> = Range { min: 0, max: 7680 };
pub const HEIGHT_RANGE: Range<u32> = Range { min: 0, max: 4320 };
pub const DURATION_RANGE: Range<f64> = Range { min: 0.0, max: 7200.0 };
pub const TRAINS_RANGE: Range<usize> = Range { min: 0, max: 10 };

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Any,
    Images,
    Videos,
}

impl MediaKind {
    pub fn admits(self, is_video: bool) -> bool {
        match self {
            MediaKind::Any => true,
            MediaKind::Images => !is_video,
            MediaKind::Videos => is_video,
        }
    }
}

/// A metadata value the record does not have passes its range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaQuery {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Range<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Range<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Range<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Range<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trains: Option<Range<usize>>,
    #[serde(default)]
    pub include_missing: bool,
}

fn within<T: PartialOrd + Copy>(range: &Option<Range<T>>, value: Option<T>) -> bool {
    match (range, value) {
        (Some(r), Some(v)) => r.contains(v),
        _ => true,
    }
}

impl MediaQuery {
    fn admits_metadata(&self, record: &MediaRecord) -> bool {
        (self.include_missing || record.present)
            && self.kind.admits(record.is_video)
            && within(&self.size, Some(record.size))
            && within(&self.width, record.width)
            && within(&self.height, record.height)
            && within(&self.duration, record.duration)
            && within(&self.trains, Some(record.train_tags.len()))
    }

    pub fn matches(&self, record: &MediaRecord, context: &Vocabulary, trains: &Vocabulary) -> bool {
        if !self.admits_metadata(record) {
            return false;
        }
        evaluate_item(&self.filter, record, context, trains)
    }
}

/// Evaluate `query` against every record. Matches come back in catalogue
/// order regardless of how the work was split.
pub fn run_query<'r>(
    records: &'r [MediaRecord],
    query: &MediaQuery,
    context: &Vocabulary,
    trains: &Vocabulary,
) -> Vec<&'r MediaRecord> {
    let matched: Vec<&MediaRecord> = records
        .par_iter()
        .filter(|record| query.matches(record, context, trains))
        .collect();
    tracing::debug!(matched = matched.len(), total = records.len(), "query evaluated");
    matched
}

static SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<number>\d+)\s*(?:(?P<unit>[kmg])?b)?$").expect("valid size regex")
});

/// Parse a human size such as `"800kb"`, `"15 MB"` or `"2000"` into bytes.
/// Multipliers are decimal (1 kb = 1000 bytes).
pub fn parse_size(input: &str) -> Option<u64> {
    let caps = SIZE_RE.captures(input.trim())?;
    let number: u64 = caps.name("number")?.as_str().parse().ok()?;
    let multiplier: u64 = match caps.name("unit").map(|u| u.as_str().to_ascii_lowercase()) {
        None => 1,
        Some(unit) => match unit.as_str() {
            "k" => 1000,
            "m" => 1000 * 1000,
            _ => 1000 * 1000 * 1000,
        },
    };
    number.checked_mul(multiplier)
}
