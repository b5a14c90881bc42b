//! Lifecycle adapter: applies reconciliation after owner writes.
//!
//! A [`LinkSync`] is composed into the owner, one per synced relation. The
//! owner's persistence routine calls [`LinkSync::after_insert`] /
//! [`LinkSync::after_update`] once its own row is written and
//! [`LinkSync::after_delete`] once it is deleted:
//!
//! ```ignore
//! hero.save(&cx, &conn).await?;
//! let store = SqlLinkStore::new(&conn);
//! hero.powers.after_update(&cx, &store, &hero).await?;
//! ```
//!
//! Writes are applied unlinks first, then links, each awaited in turn. The
//! first failure stops the run and is returned as-is; whatever was applied
//! before it stays applied unless the caller wraps the save in a transaction.

use crate::config::LinkSyncConfig;
use crate::desired::DesiredKeys;
use crate::extra::{ExtraColumn, ExtraColumns};
use crate::holder::DesiredState;
use crate::reconcile::{Reconciliation, reconcile};
use crate::store::LinkStore;
use linksync_core::{Cx, Error, Model, Outcome, RelationshipInfo, Result, find_relationship};
use std::fmt;
use std::marker::PhantomData;

/// What a lifecycle hook did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Junction rows created.
    pub linked: usize,
    /// Junction rows removed (deleted or nulled out).
    pub unlinked: usize,
    /// Desired keys with no related record.
    pub unresolved: usize,
    /// Whether every link of the owner was removed at once.
    pub cleared: bool,
}

impl SyncReport {
    /// True when no junction row was touched.
    pub fn is_noop(&self) -> bool {
        self.linked == 0 && self.unlinked == 0 && !self.cleared
    }
}

/// Keeps one many-to-many relation of an owner `O` in sync with a desired set
/// of related `R` keys.
pub struct LinkSync<O, R> {
    config: LinkSyncConfig,
    relation: &'static RelationshipInfo,
    extra: ExtraColumns<R>,
    state: DesiredState,
    _owner: PhantomData<fn(&O)>,
}

impl<O: Model, R: Model> LinkSync<O, R> {
    /// Resolve `config.relation` on `O` and build the adapter.
    ///
    /// Fails with a configuration error if the relation is unknown or is not
    /// many-to-many.
    #[allow(clippy::result_large_err)]
    pub fn new(config: LinkSyncConfig) -> Result<Self> {
        config.validate()?;
        let relation = find_relationship::<O>(&config.relation).ok_or_else(|| {
            Error::config(format!(
                "relation '{}' is not declared on '{}'",
                config.relation,
                O::TABLE_NAME
            ))
        })?;
        if !relation.is_many_to_many() || relation.link_table.is_none() {
            return Err(Error::config(format!(
                "relation '{}' on '{}' is not a many-to-many relation with a link table",
                relation.name,
                O::TABLE_NAME
            )));
        }
        if relation.related_table != R::TABLE_NAME {
            return Err(Error::config(format!(
                "relation '{}' targets '{}', not '{}'",
                relation.name,
                relation.related_table,
                R::TABLE_NAME
            )));
        }

        let extra = ExtraColumns::from_literals(&config.extra_columns);
        Ok(Self {
            config,
            relation,
            extra,
            state: DesiredState::new(),
            _owner: PhantomData,
        })
    }

    /// Add (or replace) an extra junction column.
    pub fn with_extra_column(mut self, name: impl Into<String>, column: ExtraColumn<R>) -> Self {
        self.extra.insert(name, column);
        self
    }

    pub fn config(&self) -> &LinkSyncConfig {
        &self.config
    }

    pub fn relation(&self) -> &'static RelationshipInfo {
        self.relation
    }

    pub fn extra_columns(&self) -> &ExtraColumns<R> {
        &self.extra
    }

    /// Name of the pseudo-field this relation is exposed under.
    pub fn attribute(&self) -> &str {
        &self.config.attribute
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Read the desired keys, loading the current links on first access.
    pub async fn desired_keys<S: LinkStore>(
        &self,
        cx: &Cx,
        store: &S,
        owner: &O,
    ) -> Outcome<&DesiredKeys, Error> {
        self.state.get::<S, O, R>(cx, store, owner, self.relation).await
    }

    /// Replace the desired keys. Nothing is written until the next save hook.
    pub fn set_desired_keys(&mut self, value: impl Into<DesiredKeys>) {
        self.state.set(value);
    }

    /// Route a generic named attribute write. Returns `false`, leaving the
    /// state untouched, if `name` is not this relation's attribute.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<DesiredKeys>) -> bool {
        if name != self.config.attribute {
            return false;
        }
        self.state.set(value);
        true
    }

    /// Run after the owner row was inserted.
    pub async fn after_insert<S: LinkStore>(
        &self,
        cx: &Cx,
        store: &S,
        owner: &O,
    ) -> Outcome<SyncReport, Error> {
        self.after_save(cx, store, owner).await
    }

    /// Run after the owner row was updated.
    pub async fn after_update<S: LinkStore>(
        &self,
        cx: &Cx,
        store: &S,
        owner: &O,
    ) -> Outcome<SyncReport, Error> {
        self.after_save(cx, store, owner).await
    }

    /// Reconcile the junction table against the desired keys.
    ///
    /// Does nothing, not even a read, when the desired keys were never
    /// touched.
    #[tracing::instrument(level = "debug", skip_all, fields(relation = self.relation.name))]
    pub async fn after_save<S: LinkStore>(
        &self,
        cx: &Cx,
        store: &S,
        owner: &O,
    ) -> Outcome<SyncReport, Error> {
        let Some(desired) = self.state.peek() else {
            tracing::trace!("Desired keys untouched; skipping link sync");
            return Outcome::Ok(SyncReport::default());
        };

        let current: Vec<R> = match store.load_related(cx, owner, self.relation).await {
            Outcome::Ok(records) => records,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let Reconciliation {
            unlinks,
            links,
            unresolved,
        } = match reconcile(cx, store, self.relation, current, desired, &self.extra).await {
            Outcome::Ok(reconciliation) => reconciliation,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let delete = self.config.delete_junction_row_on_unlink;
        let mut report = SyncReport {
            unresolved,
            ..SyncReport::default()
        };

        for related in &unlinks {
            match store.unlink(cx, owner, self.relation, related, delete).await {
                Outcome::Ok(()) => report.unlinked += 1,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }

        for pending in &links {
            match store
                .link(cx, owner, self.relation, &pending.related, &pending.columns)
                .await
            {
                Outcome::Ok(()) => report.linked += 1,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }

        tracing::debug!(
            linked = report.linked,
            unlinked = report.unlinked,
            unresolved = report.unresolved,
            "Link sync complete"
        );
        Outcome::Ok(report)
    }

    /// Remove every link of the deleted owner, whether or not the desired
    /// keys were ever touched.
    #[tracing::instrument(level = "debug", skip_all, fields(relation = self.relation.name))]
    pub async fn after_delete<S: LinkStore>(
        &self,
        cx: &Cx,
        store: &S,
        owner: &O,
    ) -> Outcome<SyncReport, Error> {
        let delete = self.config.delete_junction_row_on_unlink;
        match store.unlink_all(cx, owner, self.relation, delete).await {
            Outcome::Ok(()) => {
                tracing::debug!(delete_junction_row = delete, "Cleared all links");
                Outcome::Ok(SyncReport {
                    cleared: true,
                    ..SyncReport::default()
                })
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }
}

impl<O, R> fmt::Debug for LinkSync<O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkSync")
            .field("relation", &self.relation.name)
            .field("attribute", &self.config.attribute)
            .field("extra", &self.extra)
            .field("state", &self.state)
            .finish()
    }
}
