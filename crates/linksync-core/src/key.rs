//! Primary key canonicalization for link-table comparisons.
//!
//! Related records hand over their primary key as a [`RawKey`]: either a plain
//! scalar [`Value`] or an object that is only meaningful through its string
//! form. Before any comparison the raw key is canonicalized exactly once into a
//! [`LinkKey`], so every downstream diff works on one concrete `Eq + Hash` type.
//!
//! Comparison is type-strict: `LinkKey::Text("5")` and `LinkKey::Int(5)` are
//! different keys.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A primary key as supplied by a record or a caller, before canonicalization.
#[derive(Clone)]
pub enum RawKey {
    /// A scalar column value.
    Scalar(Value),
    /// An object identified by its string conversion.
    Stringable(Arc<dyn fmt::Display + Send + Sync>),
}

impl RawKey {
    /// Wrap an object whose string form is its identity.
    pub fn stringable(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        RawKey::Stringable(Arc::new(value))
    }

    /// Canonicalize into the comparison key.
    ///
    /// Returns `None` for NULL and DEFAULT, which never identify a record.
    pub fn canonicalize(&self) -> Option<LinkKey> {
        match self {
            RawKey::Stringable(v) => Some(LinkKey::Text(v.to_string())),
            RawKey::Scalar(v) => LinkKey::from_value(v),
        }
    }
}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawKey::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            RawKey::Stringable(v) => f.debug_tuple("Stringable").field(&v.to_string()).finish(),
        }
    }
}

impl PartialEq for RawKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RawKey::Scalar(a), RawKey::Scalar(b)) => a == b,
            (RawKey::Stringable(a), RawKey::Stringable(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<Value> for RawKey {
    fn from(v: Value) -> Self {
        RawKey::Scalar(v)
    }
}

impl From<LinkKey> for RawKey {
    fn from(key: LinkKey) -> Self {
        RawKey::Scalar(key.into())
    }
}

impl From<i32> for RawKey {
    fn from(v: i32) -> Self {
        RawKey::Scalar(Value::Int(v))
    }
}

impl From<i64> for RawKey {
    fn from(v: i64) -> Self {
        RawKey::Scalar(Value::BigInt(v))
    }
}

/// Unsigned ids above `i64::MAX` are clamped, matching how they bind.
impl From<u64> for RawKey {
    fn from(v: u64) -> Self {
        RawKey::Scalar(Value::from_u64_clamped(v))
    }
}

impl From<&str> for RawKey {
    fn from(v: &str) -> Self {
        RawKey::Scalar(Value::Text(v.to_string()))
    }
}

impl From<String> for RawKey {
    fn from(v: String) -> Self {
        RawKey::Scalar(Value::Text(v))
    }
}

/// The canonical, type-strict identity of a related record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkKey {
    Bool(bool),
    /// Every integer width, dates and timestamps.
    Int(i64),
    /// IEEE-754 bit pattern of a floating point key.
    Float(u64),
    /// Text and stringable objects.
    Text(String),
    /// Decimal literal, kept apart from text of the same spelling.
    Decimal(String),
    /// Serialized JSON document.
    Json(String),
    Bytes(Vec<u8>),
    Uuid([u8; 16]),
    /// Composite primary keys, in primary key column order.
    Composite(Vec<LinkKey>),
}

impl LinkKey {
    /// Canonicalize a scalar value. `None` for NULL/DEFAULT and for arrays
    /// containing them.
    pub fn from_value(value: &Value) -> Option<Self> {
        let key = match value {
            Value::Null | Value::Default => return None,
            Value::Bool(v) => LinkKey::Bool(*v),
            Value::TinyInt(v) => LinkKey::Int(i64::from(*v)),
            Value::SmallInt(v) => LinkKey::Int(i64::from(*v)),
            Value::Int(v) => LinkKey::Int(i64::from(*v)),
            Value::BigInt(v) | Value::Timestamp(v) => LinkKey::Int(*v),
            Value::Date(v) => LinkKey::Int(i64::from(*v)),
            Value::Float(v) => LinkKey::Float(f64::from(*v).to_bits()),
            Value::Double(v) => LinkKey::Float(v.to_bits()),
            Value::Text(s) => LinkKey::Text(s.clone()),
            Value::Decimal(s) => LinkKey::Decimal(s.clone()),
            Value::Json(j) => LinkKey::Json(j.to_string()),
            Value::Bytes(b) => LinkKey::Bytes(b.clone()),
            Value::Uuid(u) => LinkKey::Uuid(*u),
            Value::Array(items) => LinkKey::Composite(
                items
                    .iter()
                    .map(LinkKey::from_value)
                    .collect::<Option<Vec<_>>>()?,
            ),
        };
        Some(key)
    }

    /// Whether this is the empty string, which desired-key input treats as "nothing".
    pub fn is_empty_text(&self) -> bool {
        matches!(self, LinkKey::Text(s) if s.is_empty())
    }
}

impl From<LinkKey> for Value {
    fn from(key: LinkKey) -> Self {
        match key {
            LinkKey::Bool(v) => Value::Bool(v),
            LinkKey::Int(v) => Value::BigInt(v),
            LinkKey::Float(bits) => Value::Double(f64::from_bits(bits)),
            LinkKey::Text(s) => Value::Text(s),
            LinkKey::Decimal(s) => Value::Decimal(s),
            LinkKey::Json(s) => serde_json::from_str(&s).map_or(Value::Text(s), Value::Json),
            LinkKey::Bytes(b) => Value::Bytes(b),
            LinkKey::Uuid(u) => Value::Uuid(u),
            LinkKey::Composite(parts) => Value::Array(parts.into_iter().map(Value::from).collect()),
        }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKey::Bool(v) => write!(f, "{v}"),
            LinkKey::Int(v) => write!(f, "{v}"),
            LinkKey::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            LinkKey::Text(s) => write!(f, "{s:?}"),
            LinkKey::Decimal(s) | LinkKey::Json(s) => write!(f, "{s}"),
            LinkKey::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            LinkKey::Uuid(u) => {
                for byte in u {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            LinkKey::Composite(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{part}")?;
                }
                write!(f, ")")
            }
        }
    }
}
