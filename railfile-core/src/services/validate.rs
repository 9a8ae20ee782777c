//! Checks applied to tag edits before they reach the catalogue.

use tagging::normalize_tag;
use thiserror::Error;

use crate::config::LimitsConfig;
use crate::services::catalogue::TagUpdate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("media {id}: empty tag")]
    EmptyTag { id: i64 },
    #[error("media {id}: tag {tag:?} is longer than {max} characters")]
    TagTooLong { id: i64, tag: String, max: usize },
    #[error("media {id}: {count} trains exceeds the limit of {max}")]
    TooManyTrains { id: i64, count: usize, max: usize },
    #[error("media {id}: train {train} has {count} tags, the limit is {max}")]
    TooManyTrainTags {
        id: i64,
        train: usize,
        count: usize,
        max: usize,
    },
    #[error("no media with id {0}")]
    UnknownMedia(i64),
}

fn clean_tag(id: i64, raw: &str, limits: &LimitsConfig) -> Result<String, UpdateError> {
    let tag = normalize_tag(raw);
    if tag.is_empty() {
        return Err(UpdateError::EmptyTag { id });
    }
    if tag.chars().count() > limits.max_tag_len {
        return Err(UpdateError::TagTooLong {
            id,
            tag,
            max: limits.max_tag_len,
        });
    }
    Ok(tag)
}

/// Normalize every tag and enforce the configured limits. The whole batch
/// is rejected on the first violation.
pub fn validated(updates: Vec<TagUpdate>, limits: &LimitsConfig) -> Result<Vec<TagUpdate>, UpdateError> {
    updates
        .into_iter()
        .map(|update| {
            let id = update.id;
            if update.train_tags.len() > limits.max_trains {
                return Err(UpdateError::TooManyTrains {
                    id,
                    count: update.train_tags.len(),
                    max: limits.max_trains,
                });
            }
            let context_tags = update
                .context_tags
                .iter()
                .map(|t| clean_tag(id, t, limits))
                .collect::<Result<Vec<_>, _>>()?;
            let train_tags = update
                .train_tags
                .iter()
                .enumerate()
                .map(|(index, train)| {
                    if train.len() > limits.max_train_tags {
                        return Err(UpdateError::TooManyTrainTags {
                            id,
                            train: index,
                            count: train.len(),
                            max: limits.max_train_tags,
                        });
                    }
                    train
                        .iter()
                        .map(|t| clean_tag(id, t, limits))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TagUpdate {
                id,
                context_tags,
                train_tags,
            })
        })
        .collect()
}
