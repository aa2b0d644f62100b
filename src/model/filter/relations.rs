//! Filter relations: AND/OR trees over filters.
//!
//! By default every filter in a query is ANDed. Relations override that
//! with an explicit boolean tree whose leaves reference filters by guid.
//! A tree made only of ANDs says nothing beyond the default and is
//! treated as "no relations".

use std::collections::HashSet;

use super::Filter;
use crate::error::{ModelResult, TranslatableError};
use crate::jaql::{FilterRelationsJaql, RelationOperator};

/// Boolean tree over filter guids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRelations {
    Filter(String),
    Node {
        operator: RelationOperator,
        left: Box<FilterRelations>,
        right: Box<FilterRelations>,
    },
}

impl FilterRelations {
    pub fn leaf(guid: impl Into<String>) -> Self {
        FilterRelations::Filter(guid.into())
    }

    pub fn and(left: FilterRelations, right: FilterRelations) -> Self {
        FilterRelations::Node {
            operator: RelationOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: FilterRelations, right: FilterRelations) -> Self {
        FilterRelations::Node {
            operator: RelationOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Leaf guids in left-to-right order, without duplicates.
    pub fn guids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_guids(&mut seen, &mut out);
        out
    }

    fn collect_guids(&self, seen: &mut HashSet<String>, out: &mut Vec<String>) {
        match self {
            FilterRelations::Filter(guid) => {
                if seen.insert(guid.clone()) {
                    out.push(guid.clone());
                }
            }
            FilterRelations::Node { left, right, .. } => {
                left.collect_guids(seen, out);
                right.collect_guids(seen, out);
            }
        }
    }

    pub fn contains(&self, guid: &str) -> bool {
        match self {
            FilterRelations::Filter(g) => g == guid,
            FilterRelations::Node { left, right, .. } => {
                left.contains(guid) || right.contains(guid)
            }
        }
    }

    /// True if the tree only uses AND.
    pub fn is_trivial(&self) -> bool {
        match self {
            FilterRelations::Filter(_) => true,
            FilterRelations::Node {
                operator,
                left,
                right,
            } => *operator == RelationOperator::And && left.is_trivial() && right.is_trivial(),
        }
    }

    /// Remove every leaf referencing `guid`. A node that loses one child
    /// collapses into the other; `None` if nothing is left.
    pub fn remove(self, guid: &str) -> Option<FilterRelations> {
        match self {
            FilterRelations::Filter(g) if g == guid => None,
            leaf @ FilterRelations::Filter(_) => Some(leaf),
            FilterRelations::Node {
                operator,
                left,
                right,
            } => match (left.remove(guid), right.remove(guid)) {
                (None, None) => None,
                (Some(l), None) => Some(l),
                (None, Some(r)) => Some(r),
                (Some(l), Some(r)) => Some(FilterRelations::Node {
                    operator,
                    left: Box::new(l),
                    right: Box::new(r),
                }),
            },
        }
    }

    /// Point every leaf referencing `old` at `new`.
    pub fn replace(&mut self, old: &str, new: &str) {
        match self {
            FilterRelations::Filter(g) => {
                if g == old {
                    *g = new.to_string();
                }
            }
            FilterRelations::Node { left, right, .. } => {
                left.replace(old, new);
                right.replace(old, new);
            }
        }
    }

    /// AND a new filter onto the root.
    pub fn and_with(self, guid: impl Into<String>) -> FilterRelations {
        FilterRelations::and(self, FilterRelations::leaf(guid))
    }

    /// Collapse `x op x` into `x`, bottom-up.
    pub fn normalize(self) -> FilterRelations {
        match self {
            leaf @ FilterRelations::Filter(_) => leaf,
            FilterRelations::Node {
                operator,
                left,
                right,
            } => {
                let left = left.normalize();
                let right = right.normalize();
                if left == right {
                    left
                } else {
                    FilterRelations::Node {
                        operator,
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
            }
        }
    }

    pub fn to_jaql(&self) -> FilterRelationsJaql {
        match self {
            FilterRelations::Filter(guid) => FilterRelationsJaql::Leaf {
                instanceid: guid.clone(),
            },
            FilterRelations::Node {
                operator,
                left,
                right,
            } => FilterRelationsJaql::Node {
                operator: *operator,
                left: Box::new(left.to_jaql()),
                right: Box::new(right.to_jaql()),
            },
        }
    }

    /// Parse wire relations, checking every instanceid against `filters`.
    pub fn from_jaql(jaql: &FilterRelationsJaql, filters: &[Filter]) -> ModelResult<Self> {
        let known: HashSet<&str> = filters.iter().map(Filter::guid).collect();
        Self::from_jaql_checked(jaql, &known)
    }

    fn from_jaql_checked(jaql: &FilterRelationsJaql, known: &HashSet<&str>) -> ModelResult<Self> {
        match jaql {
            FilterRelationsJaql::Leaf { instanceid } => {
                if !known.contains(instanceid.as_str()) {
                    return Err(TranslatableError::new("errors.filterRelations.unknownFilter")
                        .with_param("guid", instanceid.clone()));
                }
                Ok(FilterRelations::leaf(instanceid.clone()))
            }
            FilterRelationsJaql::Node {
                operator,
                left,
                right,
            } => Ok(FilterRelations::Node {
                operator: *operator,
                left: Box::new(Self::from_jaql_checked(left, known)?),
                right: Box::new(Self::from_jaql_checked(right, known)?),
            }),
        }
    }
}

/// Recompute relations after the filter list changed.
///
/// A filter replaced at the same position keeps its place in the tree,
/// removed filters are pruned and new filters are ANDed at the root.
/// Returns `None` when the result carries no information beyond AND.
pub fn calculate_new_relations(
    prev_filters: &[Filter],
    prev_relations: Option<&FilterRelations>,
    next_filters: &[Filter],
) -> Option<FilterRelations> {
    let mut relations = prev_relations?.clone();

    let prev: Vec<&str> = prev_filters.iter().map(Filter::guid).collect();
    let next: Vec<&str> = next_filters.iter().map(Filter::guid).collect();
    let prev_set: HashSet<&str> = prev.iter().copied().collect();
    let next_set: HashSet<&str> = next.iter().copied().collect();

    let mut replaced_old = HashSet::new();
    let mut replaced_new = HashSet::new();
    for (old, new) in prev.iter().zip(next.iter()) {
        if old != new && !next_set.contains(old) && !prev_set.contains(new) {
            relations.replace(old, new);
            replaced_old.insert(*old);
            replaced_new.insert(*new);
        }
    }

    let mut current = Some(relations);
    for old in prev.iter().filter(|g| !next_set.contains(*g) && !replaced_old.contains(*g)) {
        current = current.and_then(|r| r.remove(old));
    }

    for new in next.iter().filter(|g| !prev_set.contains(*g) && !replaced_new.contains(*g)) {
        current = Some(match current {
            Some(r) => r.and_with(*new),
            None => FilterRelations::leaf(*new),
        });
    }

    current
        .map(FilterRelations::normalize)
        .filter(|r| !r.is_trivial())
}

/// A boolean tree whose leaves are filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterTree {
    Leaf(Filter),
    Node {
        operator: RelationOperator,
        left: Box<FilterTree>,
        right: Box<FilterTree>,
    },
}

/// Either a plain (ANDed) filter list or an explicit filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FiltersOrRelations {
    Filters(Vec<Filter>),
    Tree(FilterTree),
}

impl FilterTree {
    fn collect(&self, seen: &mut HashSet<String>, out: &mut Vec<Filter>) {
        match self {
            FilterTree::Leaf(f) => {
                if seen.insert(f.guid().to_string()) {
                    out.push(f.clone());
                }
            }
            FilterTree::Node { left, right, .. } => {
                left.collect(seen, out);
                right.collect(seen, out);
            }
        }
    }

    fn to_relations(&self) -> FilterRelations {
        match self {
            FilterTree::Leaf(f) => FilterRelations::leaf(f.guid()),
            FilterTree::Node {
                operator,
                left,
                right,
            } => FilterRelations::Node {
                operator: *operator,
                left: Box::new(left.to_relations()),
                right: Box::new(right.to_relations()),
            },
        }
    }
}

/// Split into a flat filter list and guid-based relations.
pub fn split_filters_and_relations(
    input: &FiltersOrRelations,
) -> (Vec<Filter>, Option<FilterRelations>) {
    match input {
        FiltersOrRelations::Filters(filters) => (filters.clone(), None),
        FiltersOrRelations::Tree(tree) => {
            let mut filters = Vec::new();
            tree.collect(&mut HashSet::new(), &mut filters);
            let relations = tree.to_relations().normalize();
            let relations = (!relations.is_trivial()).then_some(relations);
            (filters, relations)
        }
    }
}

/// Inverse of [`split_filters_and_relations`]. Filters the relations do not
/// mention are ANDed onto the root.
pub fn merge_filters_and_relations(
    filters: &[Filter],
    relations: Option<&FilterRelations>,
) -> ModelResult<FiltersOrRelations> {
    let Some(relations) = relations else {
        return Ok(FiltersOrRelations::Filters(filters.to_vec()));
    };

    fn build(node: &FilterRelations, filters: &[Filter]) -> ModelResult<FilterTree> {
        match node {
            FilterRelations::Filter(guid) => filters
                .iter()
                .find(|f| f.guid() == guid)
                .cloned()
                .map(FilterTree::Leaf)
                .ok_or_else(|| {
                    TranslatableError::new("errors.filterRelations.unknownFilter")
                        .with_param("guid", guid.clone())
                }),
            FilterRelations::Node {
                operator,
                left,
                right,
            } => Ok(FilterTree::Node {
                operator: *operator,
                left: Box::new(build(left, filters)?),
                right: Box::new(build(right, filters)?),
            }),
        }
    }

    let mut tree = build(relations, filters)?;
    for filter in filters.iter().filter(|f| !relations.contains(f.guid())) {
        tree = FilterTree::Node {
            operator: RelationOperator::And,
            left: Box::new(tree),
            right: Box::new(FilterTree::Leaf(filter.clone())),
        };
    }
    Ok(FiltersOrRelations::Tree(tree))
}
