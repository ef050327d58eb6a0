//! Layer data model
//!
//! A [`ConfigLayer`] is one named unit of lint configuration. Layers are
//! loaded from [`LayerDefinition`] documents (or built in code) and are never
//! mutated after they enter a registry.

use indexmap::{IndexMap, IndexSet};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Execution-environment flags (`browser`, `node`, `es6`, ...)
pub type EnvFlags = IndexMap<String, bool>;

/// Parser configuration keys (`ecmaVersion`, `sourceType`, `ecmaFeatures`, ...)
pub type ParserOptions = IndexMap<String, Value>;

/// Rule identifier to directive
pub type RuleMap = IndexMap<String, RuleDirective>;

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    /// Warning (doesn't fail the lint run)
    Warn,
    /// Error (fails the lint run)
    Error,
}

impl RuleSeverity {
    /// Lowercase name used when serializing
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSeverity::Off => "off",
            RuleSeverity::Warn => "warn",
            RuleSeverity::Error => "error",
        }
    }

    /// Numeric level (`0`, `1`, `2`)
    pub fn level(&self) -> u8 {
        match self {
            RuleSeverity::Off => 0,
            RuleSeverity::Warn => 1,
            RuleSeverity::Error => 2,
        }
    }

    /// Whether the rule runs at all
    pub fn is_enabled(&self) -> bool {
        *self != RuleSeverity::Off
    }

    /// Parse a severity from its numeric or string form
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => {
                let level = n.as_u64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                        .map(|f| f as u64)
                });
                match level {
                    Some(0) => Ok(RuleSeverity::Off),
                    Some(1) => Ok(RuleSeverity::Warn),
                    Some(2) => Ok(RuleSeverity::Error),
                    _ => Err(format!("invalid severity level {n} (expected 0, 1 or 2)")),
                }
            }
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "off" => Ok(RuleSeverity::Off),
                "warn" => Ok(RuleSeverity::Warn),
                "error" => Ok(RuleSeverity::Error),
                _ => Err(format!(
                    "invalid severity '{s}' (expected \"off\", \"warn\" or \"error\")"
                )),
            },
            other => Err(format!("severity must be a number or string, found {other}")),
        }
    }
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleSeverity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleSeverity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        RuleSeverity::from_value(&raw).map_err(D::Error::custom)
    }
}

impl JsonSchema for RuleSeverity {
    fn schema_name() -> Cow<'static, str> {
        "RuleSeverity".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "description": "Rule severity: 0/\"off\", 1/\"warn\", 2/\"error\"",
            "oneOf": [
                { "type": "integer", "enum": [0, 1, 2] },
                { "type": "string", "enum": ["off", "warn", "error"] }
            ]
        })
    }
}

/// Severity plus rule-specific options for one named check
///
/// Accepts either a bare severity (`"no-console": 2`) or an array whose first
/// element is the severity (`"quotes": [2, "double"]`). Options are opaque.
/// Always serializes as an array.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDirective {
    pub severity: RuleSeverity,
    pub options: Vec<Value>,
}

impl RuleDirective {
    /// Directive with no options
    pub fn new(severity: RuleSeverity) -> Self {
        Self {
            severity,
            options: Vec::new(),
        }
    }

    /// Directive with options
    pub fn with_options(severity: RuleSeverity, options: Vec<Value>) -> Self {
        Self { severity, options }
    }

    pub fn off() -> Self {
        Self::new(RuleSeverity::Off)
    }

    pub fn warn() -> Self {
        Self::new(RuleSeverity::Warn)
    }

    pub fn error() -> Self {
        Self::new(RuleSeverity::Error)
    }

    /// Parse a directive from its bare or array form
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Array(items) => {
                let mut items = items.into_iter();
                let first = items
                    .next()
                    .ok_or_else(|| "rule directive must start with a severity".to_string())?;
                Ok(Self {
                    severity: RuleSeverity::from_value(&first)?,
                    options: items.collect(),
                })
            }
            other => Ok(Self::new(RuleSeverity::from_value(&other)?)),
        }
    }
}

impl From<RuleSeverity> for RuleDirective {
    fn from(severity: RuleSeverity) -> Self {
        Self::new(severity)
    }
}

impl Serialize for RuleDirective {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.options.len() + 1))?;
        seq.serialize_element(&self.severity)?;
        for option in &self.options {
            seq.serialize_element(option)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for RuleDirective {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        RuleDirective::from_value(raw).map_err(D::Error::custom)
    }
}

impl JsonSchema for RuleDirective {
    fn schema_name() -> Cow<'static, str> {
        "RuleDirective".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let severity = generator.subschema_for::<RuleSeverity>();
        json_schema!({
            "description": "Bare severity, or [severity, ...options]",
            "oneOf": [
                severity,
                {
                    "type": "array",
                    "minItems": 1,
                    "prefixItems": [severity]
                }
            ]
        })
    }
}

/// Namespace of a rule identifier (`react/jsx-key` → `react`)
pub fn rule_namespace(rule_id: &str) -> Option<&str> {
    rule_id.rsplit_once('/').map(|(namespace, _)| namespace)
}

/// A named, immutable unit of configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    /// Unique identifier used by other layers' `extends`
    pub name: String,
    /// Parent layers, applied in order before this layer's own fields
    pub extends: Vec<String>,
    pub env: EnvFlags,
    pub parser_options: ParserOptions,
    pub plugins: IndexSet<String>,
    pub rules: RuleMap,
}

impl ConfigLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_extends<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends.extend(parents.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, flag: impl Into<String>, enabled: bool) -> Self {
        self.env.insert(flag.into(), enabled);
        self
    }

    pub fn with_parser_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parser_options.insert(key.into(), value);
        self
    }

    pub fn with_plugin(mut self, namespace: impl Into<String>) -> Self {
        self.plugins.insert(namespace.into());
        self
    }

    pub fn with_rule(
        mut self,
        rule_id: impl Into<String>,
        directive: impl Into<RuleDirective>,
    ) -> Self {
        self.rules.insert(rule_id.into(), directive.into());
        self
    }
}

/// `extends` accepts a single name or a list of names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExtendsField {
    One(String),
    Many(Vec<String>),
}

impl Default for ExtendsField {
    fn default() -> Self {
        ExtendsField::Many(Vec::new())
    }
}

impl From<ExtendsField> for Vec<String> {
    fn from(field: ExtendsField) -> Self {
        match field {
            ExtendsField::One(name) => vec![name],
            ExtendsField::Many(names) => names,
        }
    }
}

/// Persisted form of a layer, as written in definition files
///
/// ```jsonc
/// {
///   "extends": ["salak/es6"],
///   "env": { "node": true },
///   "parserOptions": { "ecmaFeatures": { "jsx": true } },
///   "plugins": ["react"],
///   "rules": {
///     "no-console": 0,
///     "react/jsx-indent": [2, 2]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayerDefinition {
    /// Optional schema reference for editor tooling
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "JSON Schema reference (ignored)")]
    pub schema: Option<String>,

    /// Explicit layer name; defaults to a name derived from the file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Layer name (defaults to the file-derived name)")]
    pub name: Option<String>,

    #[serde(default)]
    #[schemars(description = "Layers this layer inherits from, in application order")]
    pub extends: ExtendsField,

    #[serde(default)]
    #[schemars(description = "Execution environment flags")]
    pub env: EnvFlags,

    #[serde(default)]
    #[schemars(description = "Parser options, shallow-merged over parent layers")]
    pub parser_options: ParserOptions,

    #[serde(default)]
    #[schemars(description = "Plugin namespaces whose rules this layer references")]
    pub plugins: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Rule directives keyed by rule identifier")]
    pub rules: RuleMap,

    /// Legacy top-level `ecmaFeatures`, moved into `parserOptions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Deprecated: use parserOptions.ecmaFeatures")]
    pub ecma_features: Option<Value>,
}

impl LayerDefinition {
    /// Build the layer this document defines
    ///
    /// `fallback_name` is used when the document carries no `name`. Legacy
    /// `ecmaFeatures` only fills `parserOptions.ecmaFeatures` when that key is
    /// not already set.
    pub fn into_layer(self, fallback_name: impl Into<String>) -> ConfigLayer {
        let mut parser_options = self.parser_options;
        if let Some(features) = self.ecma_features {
            parser_options
                .entry("ecmaFeatures".to_string())
                .or_insert(features);
        }

        ConfigLayer {
            name: self.name.unwrap_or_else(|| fallback_name.into()),
            extends: self.extends.into(),
            env: self.env,
            parser_options,
            plugins: self.plugins.into_iter().collect(),
            rules: self.rules,
        }
    }
}
