//! Introspector configuration.

use serde::{Deserialize, Serialize};
use sqlman_core::migrations::DEFAULT_MASTER_TABLE;

/// Where the [`Introspector`](crate::Introspector) reads the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrospectorConfig {
    /// Master table holding the schema, `sqlite_master` by default.
    pub master_table: String,
    /// Attached schema to inspect, `None` for `main`.
    pub schema: Option<String>,
}

impl Default for IntrospectorConfig {
    fn default() -> Self {
        Self {
            master_table: String::from(DEFAULT_MASTER_TABLE),
            schema: None,
        }
    }
}

impl IntrospectorConfig {
    /// Uses another master table.
    #[must_use]
    pub fn master_table(mut self, master_table: &str) -> Self {
        self.master_table = String::from(master_table);
        self
    }

    /// Inspects an attached schema.
    #[must_use]
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(String::from(schema));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IntrospectorConfig::default();
        assert_eq!(config.master_table, "sqlite_master");
        assert_eq!(config.schema, None);
    }

    #[test]
    fn test_partial_json() {
        let config: IntrospectorConfig = serde_json::from_str(r#"{"schema": "aux"}"#).unwrap();
        assert_eq!(config, IntrospectorConfig::default().schema("aux"));
    }
}
