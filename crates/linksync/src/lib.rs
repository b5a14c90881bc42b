//! Many-to-many link table synchronization.
//!
//! `linksync` keeps the junction rows between an owner model and its related
//! models equal to a desired set of related keys. The caller sets (or never
//! touches) the desired keys; after the owner is saved, the minimal set of
//! unlinks and links is computed and applied through a [`LinkStore`].
//!
//! # Role In The Architecture
//!
//! - **Desired state** ([`DesiredState`]): per-owner keys, lazily loaded from the
//!   current links on first read so untouched owners cost nothing.
//! - **Reconciler** ([`plan`], [`reconcile`]): type-strict diff of current vs.
//!   desired, bulk fetch of new targets, extra column resolution.
//! - **Lifecycle adapter** ([`LinkSync`]): explicit after-insert/update/delete
//!   hooks the owner's persistence routine calls.
//! - **Store** ([`LinkStore`], [`SqlLinkStore`]): the relational operations,
//!   with a SQL implementation over any `linksync_core::Connection`.
//!
//! # Example
//!
//! ```ignore
//! struct Hero {
//!     id: Option<i64>,
//!     powers: LinkSync<Hero, Power>,
//! }
//!
//! let mut hero = load_hero(&cx, &conn).await?;
//! hero.powers.set_desired_keys(vec![2_i64, 3, 4]);
//! hero.update(&cx, &conn).await?;
//!
//! let store = SqlLinkStore::new(&conn);
//! let report = hero.powers.after_update(&cx, &store, &hero).await?;
//! ```

pub mod config;
pub mod desired;
pub mod extra;
pub mod holder;
pub mod reconcile;
pub mod sql;
pub mod store;
pub mod sync;

pub use config::LinkSyncConfig;
pub use desired::DesiredKeys;
pub use extra::{ExtraColumn, ExtraColumns};
pub use holder::DesiredState;
pub use reconcile::{LinkPlan, PendingLink, Reconciliation, plan, reconcile};
pub use sql::{LinkTableSql, SqlLinkStore, Statement};
pub use store::LinkStore;
pub use sync::{LinkSync, SyncReport};
