//! Model trait for ORM-style struct mapping.
//!
//! Owners and related records both implement [`Model`]. The link-sync layer
//! only needs table metadata, row conversion and the primary key.

use crate::Result;
use crate::key::RawKey;
use crate::relationship::RelationshipInfo;
use crate::row::Row;
use crate::value::Value;

/// Trait for types that can be mapped to database tables.
///
/// # Example
///
/// ```ignore
/// struct Hero {
///     id: Option<i64>,
///     name: String,
/// }
///
/// impl Model for Hero {
///     const TABLE_NAME: &'static str = "heroes";
///     const PRIMARY_KEY: &'static [&'static str] = &["id"];
///     const RELATIONSHIPS: &'static [RelationshipInfo] = &[RelationshipInfo::many_to_many(
///         "powers",
///         "powers",
///         LinkTableInfo::new("hero_powers", "hero_id", "power_id"),
///     )];
///     // ...
/// }
/// ```
pub trait Model: Sized + Send + Sync {
    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// The primary key column name(s).
    const PRIMARY_KEY: &'static [&'static str];

    /// Relationship metadata for this model.
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[];

    /// Convert this model instance to a row of values.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Construct a model instance from a database row.
    #[allow(clippy::result_large_err)]
    fn from_row(row: &Row) -> Result<Self>;

    /// Get the value of the primary key field(s).
    fn primary_key_value(&self) -> Vec<Value>;

    /// Check if this is a new record (primary key is None/default).
    fn is_new(&self) -> bool;

    /// The key used to compare this record against desired link keys.
    ///
    /// Single-column keys are handed over as-is; composite keys become an
    /// array in `PRIMARY_KEY` order. Override to return
    /// [`RawKey::stringable`] when the key is an object with a string form.
    fn link_key(&self) -> RawKey {
        let mut values = self.primary_key_value();
        if values.len() == 1 {
            RawKey::Scalar(values.remove(0))
        } else {
            RawKey::Scalar(Value::Array(values))
        }
    }
}
