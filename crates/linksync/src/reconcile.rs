//! Diffing current links against the desired keys.
//!
//! [`plan`] is the pure half: it splits the current records into kept and
//! to-unlink, and leaves the desired keys nobody consumed as the set to link.
//! [`reconcile`] adds the I/O half: it fetches the records for those keys
//! (only when there are any) and resolves their extra junction columns.

use crate::desired::DesiredKeys;
use crate::extra::ExtraColumns;
use crate::store::LinkStore;
use linksync_core::{Cx, Error, LinkKey, Model, Outcome, RelationshipInfo, Value};
use std::collections::{HashMap, HashSet};

/// Result of diffing current records against desired keys.
#[derive(Debug)]
pub struct LinkPlan<R> {
    /// Currently linked records whose key is not desired.
    pub unlink: Vec<R>,
    /// Desired keys not currently linked, in desired order.
    pub fetch: Vec<LinkKey>,
    /// Desired records linked more than once. Unlinking a pair removes every
    /// copy, so these are unlinked once (via `unlink`) and linked again.
    pub relink: Vec<R>,
    /// Number of current records that stay linked untouched.
    pub kept: usize,
}

impl<R> LinkPlan<R> {
    /// True when applying the plan would not change anything.
    pub fn is_noop(&self) -> bool {
        self.unlink.is_empty() && self.fetch.is_empty() && self.relink.is_empty()
    }
}

/// A related record about to be linked, with its resolved extra columns.
#[derive(Debug)]
pub struct PendingLink<R> {
    pub related: R,
    pub columns: Vec<(String, Value)>,
}

/// Fully resolved link/unlink work for one owner and relation.
#[derive(Debug)]
pub struct Reconciliation<R> {
    /// Records to unlink, applied first.
    pub unlinks: Vec<R>,
    /// Records to link, applied after every unlink.
    pub links: Vec<PendingLink<R>>,
    /// Desired keys the store had no record for.
    pub unresolved: usize,
}

impl<R> Reconciliation<R> {
    pub fn is_empty(&self) -> bool {
        self.unlinks.is_empty() && self.links.is_empty()
    }
}

/// Diff `current` against `desired`.
///
/// Each current record consumes at most one matching desired key; records
/// without a match (including records without a usable key) are unlinked.
/// A desired key linked by several junction rows ends up with exactly one:
/// the pair is unlinked once and the first record is put in `relink`.
/// Comparison is by [`LinkKey`], so it is type-strict.
pub fn plan<R: Model>(current: Vec<R>, desired: &DesiredKeys) -> LinkPlan<R> {
    let mut remaining = desired.normalize();
    let mut unlink = Vec::new();
    let mut relink = Vec::new();
    let mut kept: HashMap<LinkKey, R> = HashMap::new();
    let mut duplicated: HashSet<LinkKey> = HashSet::new();

    for record in current {
        let Some(key) = record.link_key().canonicalize() else {
            unlink.push(record);
            continue;
        };
        if let Some(pos) = remaining.iter().position(|k| *k == key) {
            remaining.remove(pos);
            kept.insert(key, record);
        } else if let Some(first) = kept.remove(&key) {
            // Second row for a kept pair.
            duplicated.insert(key);
            unlink.push(record);
            relink.push(first);
        } else if !duplicated.contains(&key) {
            unlink.push(record);
        }
        // Further copies of a duplicated pair go with its single unlink.
    }

    LinkPlan {
        unlink,
        fetch: remaining,
        relink,
        kept: kept.len(),
    }
}

/// Compute the link/unlink work to move `current` to `desired`.
///
/// Fetches the records for newly desired keys through the store, skipping the
/// query entirely when there are none, and resolves `extra` for each of them.
/// Store failures propagate untouched.
pub async fn reconcile<S, R>(
    cx: &Cx,
    store: &S,
    relation: &RelationshipInfo,
    current: Vec<R>,
    desired: &DesiredKeys,
    extra: &ExtraColumns<R>,
) -> Outcome<Reconciliation<R>, Error>
where
    S: LinkStore,
    R: Model,
{
    let LinkPlan {
        unlink,
        fetch,
        relink,
        kept,
    } = plan(current, desired);

    tracing::debug!(
        relation = relation.name,
        kept,
        unlink = unlink.len(),
        relink = relink.len(),
        fetch = fetch.len(),
        "Planned link table changes"
    );

    let fetched: Vec<R> = if fetch.is_empty() {
        Vec::new()
    } else {
        match store.find_many_by_key(cx, relation, &fetch).await {
            Outcome::Ok(records) => records,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
    };

    let unresolved = fetch.len().saturating_sub(fetched.len());
    if unresolved > 0 {
        tracing::debug!(
            relation = relation.name,
            unresolved,
            "Desired keys without a related record were skipped"
        );
    }

    let links = relink
        .into_iter()
        .chain(fetched)
        .map(|related| {
            let columns = extra.resolve(&related);
            PendingLink { related, columns }
        })
        .collect();

    Outcome::Ok(Reconciliation {
        unlinks: unlink,
        links,
        unresolved,
    })
}
