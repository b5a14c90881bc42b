//! Shared fixtures: hero/power/team models and an in-memory recording store.

#![allow(dead_code)]

use asupersync::{Cx, Outcome};
use linksync::{LinkStore, LinkSync, LinkSyncConfig, SyncReport};
use linksync_core::{
    ConnectionErrorKind, Error, LinkKey, LinkTableInfo, Model, QueryErrorKind, RawKey,
    RelationshipInfo, RelationshipKind, Result, Row, Value,
};
use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::Mutex;

pub fn unwrap_outcome<T>(outcome: Outcome<T, Error>) -> T {
    match outcome {
        Outcome::Ok(v) => v,
        Outcome::Err(e) => panic!("unexpected error: {e}"),
        Outcome::Cancelled(r) => panic!("cancelled: {r:?}"),
        Outcome::Panicked(p) => panic!("panicked: {p:?}"),
    }
}

pub fn unwrap_err<T>(outcome: Outcome<T, Error>) -> Error {
    match outcome {
        Outcome::Err(e) => e,
        Outcome::Ok(_) => panic!("expected an error"),
        Outcome::Cancelled(r) => panic!("cancelled: {r:?}"),
        Outcome::Panicked(p) => panic!("panicked: {p:?}"),
    }
}

// ============================================================================
// Models
// ============================================================================

pub const HERO_POWERS: RelationshipInfo = RelationshipInfo::many_to_many(
    "powers",
    "powers",
    LinkTableInfo::new("hero_powers", "hero_id", "power_id"),
);

pub const HERO_TEAMS: RelationshipInfo = RelationshipInfo::many_to_many(
    "teams",
    "teams",
    LinkTableInfo::new("hero_teams", "hero_id", "team_id"),
);

#[derive(Debug)]
pub struct Hero {
    pub id: Option<i64>,
    pub name: String,
    pub powers: LinkSync<Hero, Power>,
    pub teams: LinkSync<Hero, Team>,
}

impl Hero {
    pub fn new(id: i64, name: &str) -> Self {
        Self::with_power_config(id, name, LinkSyncConfig::new("powers", "power_ids"))
    }

    pub fn with_power_config(id: i64, name: &str, config: LinkSyncConfig) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            powers: LinkSync::new(config).expect("powers relation"),
            teams: LinkSync::new(LinkSyncConfig::new("teams", "team_ids")).expect("teams relation"),
        }
    }

    /// Named attribute writes, the way a form binder would issue them.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> bool {
        self.powers.set_attribute(name, value.clone()) || self.teams.set_attribute(name, value)
    }

    pub async fn after_update<S: LinkStore>(
        &self,
        cx: &Cx,
        store: &S,
    ) -> Outcome<(SyncReport, SyncReport), Error> {
        let powers = match self.powers.after_update(cx, store, self).await {
            Outcome::Ok(report) => report,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        match self.teams.after_update(cx, store, self).await {
            Outcome::Ok(teams) => Outcome::Ok((powers, teams)),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    pub async fn after_delete<S: LinkStore>(&self, cx: &Cx, store: &S) -> Outcome<(), Error> {
        match self.powers.after_delete(cx, store, self).await {
            Outcome::Ok(_) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
        match self.teams.after_delete(cx, store, self).await {
            Outcome::Ok(_) => Outcome::Ok(()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }
}

impl Model for Hero {
    const TABLE_NAME: &'static str = "heroes";
    const PRIMARY_KEY: &'static [&'static str] = &["id"];
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[
        HERO_POWERS,
        HERO_TEAMS,
        RelationshipInfo::new("mentor", "heroes", RelationshipKind::ManyToOne),
    ];

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.map_or(Value::Null, Value::BigInt)),
            ("name", Value::Text(self.name.clone())),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            name: row.get_named("name")?,
            powers: LinkSync::new(LinkSyncConfig::new("powers", "power_ids"))?,
            teams: LinkSync::new(LinkSyncConfig::new("teams", "team_ids"))?,
        })
    }

    fn primary_key_value(&self) -> Vec<Value> {
        vec![self.id.map_or(Value::Null, Value::BigInt)]
    }

    fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Power {
    pub id: i64,
    pub name: String,
    pub owner_hint: String,
}

impl Power {
    pub fn row(id: i64, name: &str, owner_hint: &str) -> Row {
        Row::new(
            vec!["id".into(), "name".into(), "owner_hint".into()],
            vec![
                Value::BigInt(id),
                Value::Text(name.into()),
                Value::Text(owner_hint.into()),
            ],
        )
    }
}

impl Model for Power {
    const TABLE_NAME: &'static str = "powers";
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::BigInt(self.id)),
            ("name", Value::Text(self.name.clone())),
            ("owner_hint", Value::Text(self.owner_hint.clone())),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            name: row.get_named("name")?,
            owner_hint: row.get_named("owner_hint")?,
        })
    }

    fn primary_key_value(&self) -> Vec<Value> {
        vec![Value::BigInt(self.id)]
    }

    fn is_new(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

impl Team {
    pub fn row(id: i64, name: &str) -> Row {
        Row::new(
            vec!["id".into(), "name".into()],
            vec![Value::BigInt(id), Value::Text(name.into())],
        )
    }
}

impl Model for Team {
    const TABLE_NAME: &'static str = "teams";
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::BigInt(self.id)),
            ("name", Value::Text(self.name.clone())),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            name: row.get_named("name")?,
        })
    }

    fn primary_key_value(&self) -> Vec<Value> {
        vec![Value::BigInt(self.id)]
    }

    fn is_new(&self) -> bool {
        false
    }
}

pub const WORKSHOP_GADGETS: RelationshipInfo = RelationshipInfo::many_to_many(
    "gadgets",
    "gadgets",
    LinkTableInfo::new("workshop_gadgets", "workshop_id", "gadget_sku"),
);

/// Owner whose related records are keyed by an object with a string form.
#[derive(Debug)]
pub struct Workshop {
    pub id: i64,
    pub gadgets: LinkSync<Workshop, Gadget>,
}

impl Workshop {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            gadgets: LinkSync::new(LinkSyncConfig::new("gadgets", "gadget_skus"))
                .expect("gadgets relation"),
        }
    }
}

impl Model for Workshop {
    const TABLE_NAME: &'static str = "workshops";
    const PRIMARY_KEY: &'static [&'static str] = &["id"];
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[WORKSHOP_GADGETS];

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", Value::BigInt(self.id))]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            gadgets: LinkSync::new(LinkSyncConfig::new("gadgets", "gadget_skus"))?,
        })
    }

    fn primary_key_value(&self) -> Vec<Value> {
        vec![Value::BigInt(self.id)]
    }

    fn is_new(&self) -> bool {
        false
    }
}

/// Stock keeping unit, compared by its printed code.
#[derive(Debug, Clone, PartialEq)]
pub struct Sku(pub String);

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn sku(code: &str) -> RawKey {
    RawKey::stringable(Sku(code.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gadget {
    pub sku: Sku,
    pub name: String,
}

impl Gadget {
    pub fn row(sku: &str, name: &str) -> Row {
        Row::new(
            vec!["sku".into(), "name".into()],
            vec![Value::Text(sku.into()), Value::Text(name.into())],
        )
    }
}

impl Model for Gadget {
    const TABLE_NAME: &'static str = "gadgets";
    const PRIMARY_KEY: &'static [&'static str] = &["sku"];

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("sku", Value::Text(self.sku.0.clone())),
            ("name", Value::Text(self.name.clone())),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            sku: Sku(row.get_named("sku")?),
            name: row.get_named("name")?,
        })
    }

    fn primary_key_value(&self) -> Vec<Value> {
        vec![Value::Text(self.sku.0.clone())]
    }

    fn link_key(&self) -> RawKey {
        RawKey::stringable(self.sku.clone())
    }

    fn is_new(&self) -> bool {
        false
    }
}

// ============================================================================
// Recording store
// ============================================================================

/// One call made against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadRelated(&'static str),
    Find(&'static str, Vec<LinkKey>),
    Link(&'static str, LinkKey, Vec<(String, Value)>),
    Unlink(&'static str, LinkKey, bool),
    UnlinkAll(&'static str, bool),
}

#[derive(Debug, Clone, PartialEq)]
struct JunctionRow {
    table: &'static str,
    owner: LinkKey,
    related: LinkKey,
    columns: Vec<(String, Value)>,
}

#[derive(Debug, Default)]
struct StoreState {
    tables: HashMap<&'static str, Vec<Row>>,
    junction: Vec<JunctionRow>,
    calls: Vec<Call>,
    fail_link_on: Option<LinkKey>,
    fail_loads: bool,
}

/// In-memory [`LinkStore`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingStore {
    state: Mutex<StoreState>,
}

fn key_of<M: Model>(model: &M) -> LinkKey {
    model
        .link_key()
        .canonicalize()
        .expect("fixture models always have a key")
}

fn row_key(row: &Row, pk: &str) -> Option<LinkKey> {
    row.get_by_name(pk).and_then(LinkKey::from_value)
}

fn rows_into<R: Model>(rows: Vec<Row>) -> Outcome<Vec<R>, Error> {
    match rows.iter().map(R::from_row).collect::<Result<Vec<_>>>() {
        Ok(records) => Outcome::Ok(records),
        Err(e) => Outcome::Err(e),
    }
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: &'static str, rows: Vec<Row>) -> Self {
        self.state
            .lock()
            .expect("lock poisoned")
            .tables
            .insert(table, rows);
        self
    }

    /// Seed an existing junction row.
    pub fn with_link(self, relation: &RelationshipInfo, owner: i64, related: i64) -> Self {
        self.with_link_key(relation, owner, LinkKey::Int(related))
    }

    /// Seed an existing junction row with any related key.
    pub fn with_link_key(self, relation: &RelationshipInfo, owner: i64, related: LinkKey) -> Self {
        self.state
            .lock()
            .expect("lock poisoned")
            .junction
            .push(JunctionRow {
                table: relation.link_table.expect("link table").table_name,
                owner: LinkKey::Int(owner),
                related,
                columns: Vec::new(),
            });
        self
    }

    /// Make `link` fail with a constraint violation for this related key.
    pub fn fail_link_on(self, key: LinkKey) -> Self {
        self.state.lock().expect("lock poisoned").fail_link_on = Some(key);
        self
    }

    /// Make `load_related` fail until switched back.
    pub fn set_fail_loads(&self, fail: bool) {
        self.state.lock().expect("lock poisoned").fail_loads = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("lock poisoned").calls.clone()
    }

    /// Calls that write to a junction table.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Link(..) | Call::Unlink(..) | Call::UnlinkAll(..)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().expect("lock poisoned").calls.clear();
    }

    /// Related keys currently linked to `owner` through `relation`.
    pub fn linked(&self, relation: &RelationshipInfo, owner: i64) -> Vec<LinkKey> {
        let table = relation.link_table.expect("link table").table_name;
        self.state
            .lock()
            .expect("lock poisoned")
            .junction
            .iter()
            .filter(|j| j.table == table && j.owner == LinkKey::Int(owner))
            .map(|j| j.related.clone())
            .collect()
    }

    /// Extra columns written for one junction row.
    pub fn columns_of(
        &self,
        relation: &RelationshipInfo,
        owner: i64,
        related: i64,
    ) -> Option<Vec<(String, Value)>> {
        let table = relation.link_table.expect("link table").table_name;
        self.state
            .lock()
            .expect("lock poisoned")
            .junction
            .iter()
            .find(|j| {
                j.table == table
                    && j.owner == LinkKey::Int(owner)
                    && j.related == LinkKey::Int(related)
            })
            .map(|j| j.columns.clone())
    }
}

impl LinkStore for RecordingStore {
    fn load_related<O: Model, R: Model>(
        &self,
        _cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
    ) -> impl Future<Output = Outcome<Vec<R>, Error>> + Send {
        let owner = key_of(owner);
        let link = relation.link_table.expect("link table");
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(Call::LoadRelated(relation.name));
        if state.fail_loads {
            return ready(Outcome::Err(Error::connection(
                ConnectionErrorKind::Disconnected,
                "connection reset while loading links",
            )));
        }

        let table = state.tables.get(relation.related_table).cloned().unwrap_or_default();
        let rows: Vec<Row> = state
            .junction
            .iter()
            .filter(|j| j.table == link.table_name && j.owner == owner)
            .filter_map(|j| {
                table
                    .iter()
                    .find(|row| row_key(row, R::PRIMARY_KEY[0]).as_ref() == Some(&j.related))
                    .cloned()
            })
            .collect();
        ready(rows_into(rows))
    }

    fn find_many_by_key<R: Model>(
        &self,
        _cx: &Cx,
        relation: &RelationshipInfo,
        keys: &[LinkKey],
    ) -> impl Future<Output = Outcome<Vec<R>, Error>> + Send {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(Call::Find(relation.name, keys.to_vec()));
        let rows: Vec<Row> = state
            .tables
            .get(relation.related_table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row_key(row, R::PRIMARY_KEY[0]).is_some_and(|k| keys.contains(&k))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        ready(rows_into(rows))
    }

    fn link<O: Model, R: Model>(
        &self,
        _cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        related: &R,
        extra_columns: &[(String, Value)],
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let related = key_of(related);
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(Call::Link(
            relation.name,
            related.clone(),
            extra_columns.to_vec(),
        ));
        if state.fail_link_on.as_ref() == Some(&related) {
            return ready(Outcome::Err(Error::query(
                QueryErrorKind::Constraint,
                None,
                format!("foreign key violation linking {related}"),
            )));
        }
        state.junction.push(JunctionRow {
            table: relation.link_table.expect("link table").table_name,
            owner: key_of(owner),
            related,
            columns: extra_columns.to_vec(),
        });
        ready(Outcome::Ok(()))
    }

    fn unlink<O: Model, R: Model>(
        &self,
        _cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        related: &R,
        delete_junction_row: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let owner = key_of(owner);
        let related = key_of(related);
        let table = relation.link_table.expect("link table").table_name;
        let mut state = self.state.lock().expect("lock poisoned");
        state
            .calls
            .push(Call::Unlink(relation.name, related.clone(), delete_junction_row));
        state
            .junction
            .retain(|j| !(j.table == table && j.owner == owner && j.related == related));
        ready(Outcome::Ok(()))
    }

    fn unlink_all<O: Model>(
        &self,
        _cx: &Cx,
        owner: &O,
        relation: &RelationshipInfo,
        delete_junction_row: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let owner = key_of(owner);
        let table = relation.link_table.expect("link table").table_name;
        let mut state = self.state.lock().expect("lock poisoned");
        state
            .calls
            .push(Call::UnlinkAll(relation.name, delete_junction_row));
        state
            .junction
            .retain(|j| !(j.table == table && j.owner == owner));
        ready(Outcome::Ok(()))
    }
}

/// Store seeded with powers 1..=6 and teams 10, 20.
pub fn seeded_store() -> RecordingStore {
    RecordingStore::new()
        .with_table(
            "powers",
            vec![
                Power::row(1, "Flight", "alice"),
                Power::row(2, "Strength", "bob"),
                Power::row(3, "Speed", "carol"),
                Power::row(4, "Telepathy", "dave"),
                Power::row(5, "Invisibility", "erin"),
                Power::row(6, "Healing", "frank"),
            ],
        )
        .with_table("teams", vec![Team::row(10, "Avengers"), Team::row(20, "X-Men")])
}
