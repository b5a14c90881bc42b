//! Desired related keys, as supplied by a caller.
//!
//! [`DesiredKeys`] keeps the caller's input verbatim; the shape is only
//! interpreted when [`DesiredKeys::normalize`] turns it into an ordered,
//! duplicate-free list of [`LinkKey`]s.

use linksync_core::{LinkKey, RawKey, Value};
use std::collections::HashSet;

/// Raw desired state for one relation of one owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DesiredKeys {
    /// Nothing should be linked.
    #[default]
    Empty,
    /// A single scalar, treated as a one-element set.
    One(RawKey),
    /// An explicit list; duplicates collapse on normalization.
    Many(Vec<RawKey>),
}

impl DesiredKeys {
    /// Build a list from already canonical keys.
    pub fn from_keys(keys: impl IntoIterator<Item = LinkKey>) -> Self {
        DesiredKeys::Many(keys.into_iter().map(RawKey::from).collect())
    }

    /// Normalize into the desired identifier set.
    ///
    /// - `Empty` → `[]`
    /// - `One(k)` → `[]` if `k` is NULL or the empty string, else `[k]`
    /// - `Many(ks)` → canonical keys in input order, NULLs dropped, later
    ///   duplicates removed
    pub fn normalize(&self) -> Vec<LinkKey> {
        match self {
            DesiredKeys::Empty => Vec::new(),
            DesiredKeys::One(raw) => match raw.canonicalize() {
                Some(key) if !key.is_empty_text() => vec![key],
                _ => Vec::new(),
            },
            DesiredKeys::Many(raws) => {
                let mut seen = HashSet::with_capacity(raws.len());
                raws.iter()
                    .filter_map(RawKey::canonicalize)
                    .filter(|key| seen.insert(key.clone()))
                    .collect()
            }
        }
    }
}

/// `NULL`/`DEFAULT` are empty, an array is a list of keys, anything else is
/// a single key. Composite keys must be wrapped in [`DesiredKeys::One`] or
/// [`DesiredKeys::Many`] explicitly, since a bare array means "list".
impl From<Value> for DesiredKeys {
    fn from(value: Value) -> Self {
        match value {
            Value::Null | Value::Default => DesiredKeys::Empty,
            Value::Array(items) => DesiredKeys::Many(items.into_iter().map(RawKey::Scalar).collect()),
            other => DesiredKeys::One(RawKey::Scalar(other)),
        }
    }
}

impl From<RawKey> for DesiredKeys {
    fn from(key: RawKey) -> Self {
        DesiredKeys::One(key)
    }
}

impl From<i64> for DesiredKeys {
    fn from(v: i64) -> Self {
        DesiredKeys::One(v.into())
    }
}

impl From<&str> for DesiredKeys {
    fn from(v: &str) -> Self {
        DesiredKeys::One(v.into())
    }
}

impl From<String> for DesiredKeys {
    fn from(v: String) -> Self {
        DesiredKeys::One(v.into())
    }
}

impl<T: Into<RawKey>> From<Vec<T>> for DesiredKeys {
    fn from(items: Vec<T>) -> Self {
        DesiredKeys::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DesiredKeys>> From<Option<T>> for DesiredKeys {
    fn from(value: Option<T>) -> Self {
        value.map_or(DesiredKeys::Empty, Into::into)
    }
}
