//! Extra junction-row columns written on link.
//!
//! Each column is either a literal or computed from the related record being
//! linked. Columns are resolved per link; a computed value is never shared
//! between two related records.

use linksync_core::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type ComputeFn<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Value source for one extra junction column.
pub enum ExtraColumn<R> {
    /// The same value for every link.
    Literal(Value),
    /// Computed from the related record at link time.
    Computed(ComputeFn<R>),
}

impl<R> ExtraColumn<R> {
    pub fn literal(value: impl Into<Value>) -> Self {
        ExtraColumn::Literal(value.into())
    }

    pub fn computed(f: impl Fn(&R) -> Value + Send + Sync + 'static) -> Self {
        ExtraColumn::Computed(Arc::new(f))
    }

    /// Produce the value to store for `related`.
    pub fn resolve(&self, related: &R) -> Value {
        match self {
            ExtraColumn::Literal(value) => value.clone(),
            ExtraColumn::Computed(f) => f(related),
        }
    }
}

impl<R> Clone for ExtraColumn<R> {
    fn clone(&self) -> Self {
        match self {
            ExtraColumn::Literal(value) => ExtraColumn::Literal(value.clone()),
            ExtraColumn::Computed(f) => ExtraColumn::Computed(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for ExtraColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraColumn::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ExtraColumn::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Ordered column name → value source mapping.
pub struct ExtraColumns<R> {
    columns: Vec<(String, ExtraColumn<R>)>,
}

impl<R> ExtraColumns<R> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Build literal columns from configuration values.
    pub fn from_literals(literals: &BTreeMap<String, serde_json::Value>) -> Self {
        let mut columns = Self::new();
        for (name, value) in literals {
            columns.insert(name.clone(), ExtraColumn::Literal(json_literal(value)));
        }
        columns
    }

    /// Set `name`, replacing an existing column of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, column: ExtraColumn<R>) {
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = column;
        } else {
            self.columns.push((name, column));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtraColumn<R>> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Resolve every column for one related record.
    pub fn resolve(&self, related: &R) -> Vec<(String, Value)> {
        self.columns
            .iter()
            .map(|(name, column)| (name.clone(), column.resolve(related)))
            .collect()
    }
}

impl<R> Default for ExtraColumns<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ExtraColumns<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<R> fmt::Debug for ExtraColumns<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.columns.iter().map(|(n, c)| (n, c)))
            .finish()
    }
}

/// Map a configuration JSON scalar onto a column value; structured JSON is
/// stored as JSON.
fn json_literal(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::BigInt)
            .or_else(|| n.as_f64().map(Value::Double))
            .unwrap_or_else(|| Value::Decimal(n.to_string())),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Json(other.clone()),
    }
}
