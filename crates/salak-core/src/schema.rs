//! JSON Schema for layer definition files
//!
//! Generated from [`LayerDefinition`] with schemars, for editor validation of
//! hand-written layers.

use crate::config::LayerDefinition;
use schemars::schema_for;
use serde_json::{Value, json};

/// Schema identifier embedded in generated schemas
pub const SCHEMA_ID: &str = "https://salak.github.io/salak-lint-config/schema/layer-v1.json";

/// JSON Schema describing a layer definition document
pub fn layer_definition_schema() -> Value {
    let mut schema = schema_for!(LayerDefinition).to_value();

    schema["$id"] = json!(SCHEMA_ID);
    schema["title"] = json!("Salak lint configuration layer");
    schema["description"] =
        json!("A named layer of lint rule directives that may extend other layers");

    schema
}
