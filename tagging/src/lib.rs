// Public modules so railfile-core can use them
pub mod assets;
pub mod evaluator;
pub mod filter;
pub mod normalize;
pub mod tagset;
pub mod vocabulary;

pub use assets::{context_vocabulary, train_vocabulary, write_default_vocabularies};
pub use evaluator::{evaluate_global, evaluate_item, evaluate_local, ItemTags, Tagged};
pub use filter::{Filter, FilterError, GroupFilter, TagFilter};
pub use normalize::tag_name as normalize_tag;
pub use tagset::TagSet;
pub use vocabulary::{TagEntry, Vocabulary, VocabularyError};

/// --- JSON entrypoint for callers holding a serialized filter ---
pub fn evaluate_filter_json(
    json_filter: &str,
    item: &ItemTags<'_>,
) -> Result<bool, serde_json::Error> {
    let filter: Filter = serde_json::from_str(json_filter)?;
    Ok(item.matches(&filter))
}
