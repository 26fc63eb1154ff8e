//! JSON Schema of the configuration file, for editors that validate JSONC.

use crate::config::TesseraConfig;

const SCHEMA_ID: &str = "tessera.schema.json";

/// Generates a JSON Schema for the Tessera configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(TesseraConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Pretty-printed JSON of [`generate_schema`].
#[must_use]
pub fn generate_schema_json() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_schema_produces_valid_json() {
        let schema_json = generate_schema_json();
        let parsed: serde_json::Value = serde_json::from_str(&schema_json).unwrap();

        assert_eq!(parsed["$id"], SCHEMA_ID);
        assert_eq!(parsed["title"], "TesseraConfig");
        assert!(parsed["properties"]["keybindings"].is_object());
        assert!(parsed["properties"]["workspaces"].is_object());
        assert!(parsed["properties"]["routes"].is_object());
    }

    #[test]
    fn test_generate_schema_returns_schema_object() {
        assert!(generate_schema().as_object().is_some());
    }
}
