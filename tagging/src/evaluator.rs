use crate::filter::Filter;
use crate::tagset::TagSet;
use crate::vocabulary::Vocabulary;

// ----------------- Scoped tags -----------------

/// The tag scopes of one catalogue item: its own (context) tags and one
/// tag set per pictured train.
#[derive(Debug, Clone)]
pub struct ItemTags<'v> {
    pub global: TagSet<'v>,
    pub locals: Vec<TagSet<'v>>,
}

impl<'v> ItemTags<'v> {
    pub fn from_stored<G, L, T>(
        global_vocabulary: &'v Vocabulary,
        local_vocabulary: &'v Vocabulary,
        global: G,
        locals: L,
    ) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        L: IntoIterator<Item = T>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            global: TagSet::from_stored(global_vocabulary, global),
            locals: locals
                .into_iter()
                .map(|tags| TagSet::from_stored(local_vocabulary, tags))
                .collect(),
        }
    }

    pub fn matches(&self, filter: &Filter) -> bool {
        evaluate_global(filter, &self.global, &self.locals)
    }
}

/// Anything carrying stored context tags and per-train tag sets.
pub trait Tagged {
    fn context_tags(&self) -> &[String];
    fn train_tags(&self) -> &[Vec<String>];
}

/// Build the scoped tag sets of `item` and evaluate `filter` against them.
pub fn evaluate_item<T: Tagged + ?Sized>(
    filter: &Filter,
    item: &T,
    context_vocabulary: &Vocabulary,
    train_vocabulary: &Vocabulary,
) -> bool {
    let tags = ItemTags::from_stored(
        context_vocabulary,
        train_vocabulary,
        item.context_tags().iter().map(String::as_str),
        item.train_tags().iter().map(|t| t.iter().map(String::as_str)),
    );
    let matched = tags.matches(filter);
    tracing::trace!(matched, trains = tags.locals.len(), "evaluated item");
    matched
}

// ----------------- Core -----------------

fn combine(or: bool, mut results: impl Iterator<Item = bool>) -> bool {
    if or {
        results.any(|r| r)
    } else {
        results.all(|r| r)
    }
}

/// Evaluate `filter` against a single tag set. The `local` flag has no
/// further scope to descend into here and is ignored.
pub fn evaluate_local(filter: &Filter, tags: &TagSet<'_>) -> bool {
    match filter {
        Filter::Tag(leaf) => tags.has(&leaf.tag),
        Filter::Group(group) => combine(
            group.or,
            group.filters.iter().map(|child| evaluate_local(child, tags)),
        ),
    }
}

/// Evaluate `filter` against an item's global tag set and its local sets.
///
/// Each child of a `local` group is satisfied when *some* local set
/// satisfies it; different children may be satisfied by different sets.
/// Empty AND groups are true and empty OR groups are false, local or not.
pub fn evaluate_global(filter: &Filter, global: &TagSet<'_>, locals: &[TagSet<'_>]) -> bool {
    match filter {
        Filter::Tag(leaf) => leaf.tag.trim().is_empty() || global.has(&leaf.tag),
        Filter::Group(group) if group.local => combine(
            group.or,
            group
                .filters
                .iter()
                .map(|child| locals.iter().any(|set| evaluate_local(child, set))),
        ),
        Filter::Group(group) => combine(
            group.or,
            group
                .filters
                .iter()
                .map(|child| evaluate_global(child, global, locals)),
        ),
    }
}
