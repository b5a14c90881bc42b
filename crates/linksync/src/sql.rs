//! SQL-backed [`LinkStore`] over a [`Connection`].
//!
//! Statements are rendered by [`LinkTableSql`] for the connection's dialect:
//!
//! - load:       `SELECT r.* FROM related r JOIN link l ON .. WHERE l.local = $1`
//! - find:       `SELECT * FROM related WHERE pk IN ($1, ..)`
//! - link:       `INSERT INTO link (local, remote, extra..) VALUES (..)`
//! - unlink:     `DELETE FROM link WHERE local = $1 AND remote = $2`
//! - soft unlink: `UPDATE link SET local = NULL, remote = NULL WHERE ..`
//!
//! Only single-column primary keys on both sides are supported.

use crate::store::LinkStore;
use linksync_core::{
    Connection, Cx, Dialect, Error, LinkKey, LinkTableInfo, Model, Outcome, RelationshipInfo, Row,
    Value, quote_ident_for,
};
use std::future::Future;

/// A rendered statement and its bind parameters.
pub type Statement = (String, Vec<Value>);

/// Renders link-table SQL for one dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkTableSql {
    dialect: Dialect,
}

impl LinkTableSql {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn ident(&self, name: &str) -> String {
        quote_ident_for(self.dialect, name)
    }

    fn placeholders(&self, from: usize, count: usize) -> String {
        (from..from + count)
            .map(|i| self.dialect.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Select the related rows currently linked to `owner_key`.
    pub fn select_linked(
        &self,
        relation: &RelationshipInfo,
        link: &LinkTableInfo,
        related_pk: &str,
        owner_key: Value,
    ) -> Statement {
        let mut sql = format!(
            "SELECT r.* FROM {} AS r INNER JOIN {} AS l ON l.{} = r.{} WHERE l.{} = {}",
            self.ident(relation.related_table),
            self.ident(link.table_name),
            self.ident(link.remote_column),
            self.ident(related_pk),
            self.ident(link.local_column),
            self.dialect.placeholder(1),
        );
        if let Some(order_by) = relation.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        (sql, vec![owner_key])
    }

    /// Select related rows by primary key.
    pub fn select_by_keys(
        &self,
        relation: &RelationshipInfo,
        related_pk: &str,
        keys: &[LinkKey],
    ) -> Statement {
        let sql = format!(
            "SELECT * FROM {} WHERE {} IN ({})",
            self.ident(relation.related_table),
            self.ident(related_pk),
            self.placeholders(1, keys.len()),
        );
        (sql, keys.iter().cloned().map(Value::from).collect())
    }

    /// Insert one junction row.
    pub fn insert_link(
        &self,
        link: &LinkTableInfo,
        owner_key: Value,
        related_key: Value,
        extra_columns: &[(String, Value)],
    ) -> Statement {
        let mut columns = vec![
            self.ident(link.local_column),
            self.ident(link.remote_column),
        ];
        let mut params = vec![owner_key, related_key];
        for (name, value) in extra_columns {
            columns.push(self.ident(name));
            params.push(value.clone());
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.ident(link.table_name),
            columns.join(", "),
            self.placeholders(1, params.len()),
        );
        (sql, params)
    }

    /// Delete or null out the junction row(s) of `owner_key`, restricted to
    /// `related_key` when given.
    pub fn remove_link(
        &self,
        link: &LinkTableInfo,
        owner_key: Value,
        related_key: Option<Value>,
        delete_junction_row: bool,
    ) -> Statement {
        let local = self.ident(link.local_column);
        let remote = self.ident(link.remote_column);

        let mut predicate = format!("{} = {}", local, self.dialect.placeholder(1));
        let mut params = vec![owner_key];
        if let Some(related_key) = related_key {
            predicate.push_str(&format!(" AND {} = {}", remote, self.dialect.placeholder(2)));
            params.push(related_key);
        }

        let sql = if delete_junction_row {
            format!("DELETE FROM {} WHERE {}", self.ident(link.table_name), predicate)
        } else {
            format!(
                "UPDATE {} SET {} = NULL, {} = NULL WHERE {}",
                self.ident(link.table_name),
                local,
                remote,
                predicate
            )
        };
        (sql, params)
    }
}

/// [`LinkStore`] executing link-table SQL on a borrowed connection.
#[derive(Debug)]
pub struct SqlLinkStore<'c, C> {
    conn: &'c C,
    sql: LinkTableSql,
}

impl<'c, C: Connection> SqlLinkStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            sql: LinkTableSql::new(conn.dialect()),
        }
    }

    pub fn statements(&self) -> LinkTableSql {
        self.sql
    }
}

fn link_table(relation: &RelationshipInfo) -> Result<&LinkTableInfo, Error> {
    relation.link_table.as_ref().ok_or_else(|| {
        Error::config(format!(
            "relation '{}' has no link table; only many-to-many relations can be synced",
            relation.name
        ))
    })
}

fn single_pk<M: Model>() -> Result<&'static str, Error> {
    match M::PRIMARY_KEY {
        [pk] => Ok(*pk),
        other => Err(Error::config(format!(
            "table '{}' has {} primary key columns; link tables need exactly one",
            M::TABLE_NAME,
            other.len()
        ))),
    }
}

fn single_key_value<M: Model>(model: &M) -> Result<Value, Error> {
    match model.primary_key_value().as_slice() {
        [value] if !value.is_null() => Ok(value.clone()),
        [_] => Err(Error::Custom(format!(
            "cannot link a '{}' row without a primary key value",
            M::TABLE_NAME
        ))),
        other => Err(Error::config(format!(
            "table '{}' has a {}-column primary key; link tables need exactly one",
            M::TABLE_NAME,
            other.len()
        ))),
    }
}

fn rows_into<R: Model>(rows: &[Row]) -> Outcome<Vec<R>, Error> {
    match rows.iter().map(R::from_row).collect::<Result<Vec<_>, _>>() {
        Ok(records) => Outcome::Ok(records),
        Err(e) => Outcome::Err(e),
    }
}

impl<C: Connection> LinkStore for SqlLinkStore<'_, C> {
    fn load_related<O: Model, R: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
    ) -> impl Future<Output = Outcome<Vec<R>, Error>> + Send {
        let statement = link_table(relation).and_then(|link| {
            let owner_key = single_key_value(owner)?;
            Ok(self
                .sql
                .select_linked(relation, link, single_pk::<R>()?, owner_key))
        });
        async move {
            let (sql, params) = match statement {
                Ok(statement) => statement,
                Err(e) => return Outcome::Err(e),
            };
            tracing::trace!(sql = %sql, "Loading linked rows");
            match self.conn.query(cx, &sql, &params).await {
                Outcome::Ok(rows) => rows_into(&rows),
                Outcome::Err(e) => Outcome::Err(e),
                Outcome::Cancelled(r) => Outcome::Cancelled(r),
                Outcome::Panicked(p) => Outcome::Panicked(p),
            }
        }
    }

    fn find_many_by_key<R: Model>(
        &self,
        cx: &Cx,
        relation: &RelationshipInfo,
        keys: &[LinkKey],
    ) -> impl Future<Output = Outcome<Vec<R>, Error>> + Send {
        let statement =
            single_pk::<R>().map(|pk| self.sql.select_by_keys(relation, pk, keys));
        async move {
            if keys.is_empty() {
                return Outcome::Ok(Vec::new());
            }
            let (sql, params) = match statement {
                Ok(statement) => statement,
                Err(e) => return Outcome::Err(e),
            };
            tracing::trace!(sql = %sql, count = keys.len(), "Fetching rows by key");
            match self.conn.query(cx, &sql, &params).await {
                Outcome::Ok(rows) => rows_into(&rows),
                Outcome::Err(e) => Outcome::Err(e),
                Outcome::Cancelled(r) => Outcome::Cancelled(r),
                Outcome::Panicked(p) => Outcome::Panicked(p),
            }
        }
    }

    fn link<O: Model, R: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        related: &R,
        extra_columns: &[(String, Value)],
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let statement = link_table(relation).and_then(|link| {
            Ok(self.sql.insert_link(
                link,
                single_key_value(owner)?,
                single_key_value(related)?,
                extra_columns,
            ))
        });
        async move {
            let (sql, params) = match statement {
                Ok(statement) => statement,
                Err(e) => return Outcome::Err(e),
            };
            tracing::trace!(sql = %sql, "Executing link INSERT");
            self.conn.execute(cx, &sql, &params).await.map(|_| ())
        }
    }

    fn unlink<O: Model, R: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        related: &R,
        delete_junction_row: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let statement = link_table(relation).and_then(|link| {
            Ok(self.sql.remove_link(
                link,
                single_key_value(owner)?,
                Some(single_key_value(related)?),
                delete_junction_row,
            ))
        });
        async move {
            let (sql, params) = match statement {
                Ok(statement) => statement,
                Err(e) => return Outcome::Err(e),
            };
            tracing::trace!(sql = %sql, "Executing unlink");
            self.conn.execute(cx, &sql, &params).await.map(|_| ())
        }
    }

    fn unlink_all<O: Model>(
        &self,
        cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        delete_junction_row: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let statement = link_table(relation).and_then(|link| {
            Ok(self.sql.remove_link(
                link,
                single_key_value(owner)?,
                None,
                delete_junction_row,
            ))
        });
        async move {
            let (sql, params) = match statement {
                Ok(statement) => statement,
                Err(e) => return Outcome::Err(e),
            };
            tracing::trace!(sql = %sql, "Executing unlink of all rows");
            self.conn.execute(cx, &sql, &params).await.map(|_| ())
        }
    }
}
