//! The persistence collaborator the sync layer drives.
//!
//! [`LinkStore`] is everything reconciliation needs from the ORM: loading the
//! currently linked records, bulk lookup by key, and link/unlink writes on the
//! junction table. [`crate::SqlLinkStore`] implements it over any
//! [`linksync_core::Connection`]; tests and alternative engines can provide
//! their own.
//!
//! Implementations are expected to fail loudly: errors are propagated to the
//! caller of the lifecycle hook untouched.

use linksync_core::{Cx, Error, LinkKey, Model, Outcome, RelationshipInfo, Value};
use std::future::Future;

/// Relational operations over a many-to-many relation.
pub trait LinkStore: Send + Sync {
    /// Load the records currently linked to `owner` through `relation`,
    /// in engine order.
    fn load_related<O: Model, R: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
    ) -> impl Future<Output = Outcome<Vec<R>, Error>> + Send;

    /// Fetch the related records whose primary key is in `keys`.
    ///
    /// Keys with no matching record are silently skipped.
    fn find_many_by_key<R: Model>(
        &self,
        cx: &Cx,
        relation: &RelationshipInfo,
        keys: &[LinkKey],
    ) -> impl Future<Output = Outcome<Vec<R>, Error>> + Send;

    /// Create the junction row between `owner` and `related`, writing
    /// `extra_columns` alongside the two keys.
    fn link<O: Model, R: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        related: &R,
        extra_columns: &[(String, Value)],
    ) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Remove the link between `owner` and `related`, deleting the junction
    /// row or clearing its keys.
    fn unlink<O: Model, R: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        related: &R,
        delete_junction_row: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Remove every link of `owner` through `relation`.
    fn unlink_all<O: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        delete_junction_row: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send;
}
