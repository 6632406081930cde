//! List Deduplication
//!
//! Helix may return the same game more than once across pages, and the
//! combined games route merges two result sets. Both cases keep the first
//! occurrence of each key and preserve order.

use std::collections::HashSet;
use std::hash::Hash;

/// Remove items whose key has already been seen.
///
/// # Example
///
/// ```rust
/// use twitch_curator::domain::dedup::remove_duplicates;
///
/// let ids = remove_duplicates(vec![3, 1, 3, 2, 1], |n| *n);
/// assert_eq!(ids, vec![3, 1, 2]);
/// ```
pub fn remove_duplicates<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Concatenate two lists, dropping items already present by key.
///
/// Items from `primary` win over items from `secondary` with the same key.
pub fn merge_without_duplicates<T, K, F>(primary: Vec<T>, secondary: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(primary.len() + secondary.len());
    primary
        .into_iter()
        .chain(secondary)
        .filter(|item| seen.insert(key(item)))
        .collect()
}
