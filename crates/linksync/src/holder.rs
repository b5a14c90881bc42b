//! Per-owner desired state for one relation.

use crate::desired::DesiredKeys;
use crate::store::LinkStore;
use linksync_core::{Cx, Error, Model, Outcome, RelationshipInfo};
use std::sync::OnceLock;

/// Holds the desired related keys of one owner instance.
///
/// Starts uninitialized. The first [`get`](Self::get) loads the currently
/// linked keys from the store, so an owner whose keys are read but never
/// changed reconciles to a no-op. [`set`](Self::set) replaces the value
/// without touching storage.
///
/// Reads only need `&self`, so the owner can be borrowed alongside its holder
/// during the first load.
#[derive(Debug, Clone, Default)]
pub struct DesiredState {
    value: OnceLock<DesiredKeys>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `set` was called or `get` succeeded.
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// The held value, without initializing from storage.
    pub fn peek(&self) -> Option<&DesiredKeys> {
        self.value.get()
    }

    /// Store `value` verbatim as the desired state.
    pub fn set(&mut self, value: impl Into<DesiredKeys>) {
        self.value = OnceLock::from(value.into());
    }

    /// Return the desired state, loading the current links on first use.
    ///
    /// A failed load leaves the holder uninitialized. If two reads race, the
    /// first load to finish wins.
    pub async fn get<S, O, R>(
        &self,
        cx: &Cx,
        store: &S,
        owner: &O,
        relation: &RelationshipInfo,
    ) -> Outcome<&DesiredKeys, Error>
    where
        S: LinkStore,
        O: Model,
        R: Model,
    {
        if let Some(value) = self.value.get() {
            return Outcome::Ok(value);
        }

        let current: Vec<R> = match store.load_related(cx, owner, relation).await {
            Outcome::Ok(records) => records,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        tracing::trace!(
            relation = relation.name,
            count = current.len(),
            "Initialized desired keys from current links"
        );
        Outcome::Ok(self.value.get_or_init(|| {
            DesiredKeys::from_keys(current.iter().filter_map(|r| r.link_key().canonicalize()))
        }))
    }
}
