//! Link-sync configuration.

use linksync_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for syncing one many-to-many relation of an owner model.
///
/// Literal extra columns can be given here; columns computed from the related
/// record are attached in code with [`crate::LinkSync::with_extra_column`].
///
/// ```
/// use linksync::LinkSyncConfig;
///
/// let config: LinkSyncConfig = serde_json::from_str(
///     r#"{ "relation": "powers", "attribute": "power_ids" }"#,
/// ).unwrap();
/// assert!(config.delete_junction_row_on_unlink);
/// assert!(config.extra_columns.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSyncConfig {
    /// Relationship name on the owner model.
    pub relation: String,
    /// Name of the pseudo-field exposing the desired keys.
    pub attribute: String,
    /// Delete junction rows on unlink instead of nulling their keys.
    #[serde(default = "default_delete_junction_row")]
    pub delete_junction_row_on_unlink: bool,
    /// Literal values written to extra junction columns on link.
    #[serde(default)]
    pub extra_columns: BTreeMap<String, serde_json::Value>,
}

fn default_delete_junction_row() -> bool {
    true
}

impl LinkSyncConfig {
    /// Create a configuration for `relation`, exposed as `attribute`.
    pub fn new(relation: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            attribute: attribute.into(),
            delete_junction_row_on_unlink: default_delete_junction_row(),
            extra_columns: BTreeMap::new(),
        }
    }

    /// Enable/disable junction row deletion on unlink.
    pub fn delete_junction_row_on_unlink(mut self, enabled: bool) -> Self {
        self.delete_junction_row_on_unlink = enabled;
        self
    }

    /// Add a literal extra column.
    pub fn extra_column(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_columns.insert(name.into(), value);
        self
    }

    /// Reject configurations that cannot name a relation or attribute.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.relation.trim().is_empty() {
            return Err(Error::config("link sync relation name must not be empty"));
        }
        if self.attribute.trim().is_empty() {
            return Err(Error::config(format!(
                "link sync attribute name for relation '{}' must not be empty",
                self.relation
            )));
        }
        Ok(())
    }
}
