//! Boolean tag filters.
//!
//! A filter is plain data: it names tags by string and holds no reference to
//! a vocabulary or tag set, so the same tree can be evaluated against every
//! catalogue item. On the wire it keeps the picker's shape, discriminated by
//! a `group` flag:
//!
//! ```json
//! {"group": true, "invert": false, "local": true, "or": false,
//!  "filters": [{"group": false, "invert": false, "tag": "class 555"}]}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("tag filter is missing its `tag` field")]
    MissingTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilter", into = "RawFilter")]
pub enum Filter {
    Tag(TagFilter),
    Group(GroupFilter),
}

/// Matches a single tag by name. A blank `tag` is the wildcard used for an
/// unset filter row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub tag: String,
    pub invert: bool,
}

/// Combines children with AND (`or = false`) or OR. A `local` group is
/// evaluated against the per-train tag sets instead of the item's own tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub or: bool,
    pub invert: bool,
    pub local: bool,
    pub filters: Vec<Filter>,
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Tag(TagFilter::default())
    }
}

impl Filter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Filter::Tag(TagFilter {
            tag: tag.into(),
            invert: false,
        })
    }

    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Group(GroupFilter {
            or: false,
            filters: filters.into_iter().collect(),
            ..GroupFilter::default()
        })
    }

    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Group(GroupFilter {
            or: true,
            filters: filters.into_iter().collect(),
            ..GroupFilter::default()
        })
    }

    /// Scope to the per-train tag sets. A bare tag filter is wrapped in a
    /// single-child local group.
    pub fn local(self) -> Self {
        match self {
            Filter::Group(mut group) => {
                group.local = true;
                Filter::Group(group)
            }
            leaf @ Filter::Tag(_) => Filter::Group(GroupFilter {
                local: true,
                filters: vec![leaf],
                ..GroupFilter::default()
            }),
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Filter::Tag(mut leaf) => {
                leaf.invert = !leaf.invert;
                Filter::Tag(leaf)
            }
            Filter::Group(mut group) => {
                group.invert = !group.invert;
                Filter::Group(group)
            }
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Filter::Tag(leaf) if leaf.tag.trim().is_empty())
    }

    /// Every non-blank tag named in the tree, first occurrence first.
    pub fn referenced_tags(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Filter::Tag(leaf) => {
                    let tag = leaf.tag.as_str();
                    if !tag.trim().is_empty() && !out.contains(&tag) {
                        out.push(tag);
                    }
                }
                Filter::Group(group) => stack.extend(group.filters.iter().rev()),
            }
        }
        out
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawFilter {
    group: bool,
    #[serde(default)]
    invert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    or: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filters: Option<Vec<Filter>>,
}

impl TryFrom<RawFilter> for Filter {
    type Error = FilterError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        if raw.group {
            Ok(Filter::Group(GroupFilter {
                or: raw.or.unwrap_or(false),
                invert: raw.invert,
                local: raw.local.unwrap_or(false),
                filters: raw.filters.unwrap_or_default(),
            }))
        } else {
            let tag = raw.tag.ok_or(FilterError::MissingTag)?;
            Ok(Filter::Tag(TagFilter {
                tag,
                invert: raw.invert,
            }))
        }
    }
}

impl From<Filter> for RawFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Tag(leaf) => RawFilter {
                group: false,
                invert: leaf.invert,
                tag: Some(leaf.tag),
                local: None,
                or: None,
                filters: None,
            },
            Filter::Group(group) => RawFilter {
                group: true,
                invert: group.invert,
                tag: None,
                local: Some(group.local),
                or: Some(group.or),
                filters: Some(group.filters),
            },
        }
    }
}
