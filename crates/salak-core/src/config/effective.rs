//! The fully merged configuration handed to the rule-evaluation engine

use super::layer::{EnvFlags, ParserOptions, RuleDirective, RuleMap, RuleSeverity, rule_namespace};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Result of resolving a layer's `extends` chain
///
/// Same shape as a layer minus `name` and `extends`. Serializes to exactly the
/// four top-level fields the external engine expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub env: EnvFlags,
    pub parser_options: ParserOptions,
    pub plugins: IndexSet<String>,
    pub rules: RuleMap,
}

impl EffectiveConfig {
    /// Directive for a rule, if any layer configured it
    pub fn rule(&self, rule_id: &str) -> Option<&RuleDirective> {
        self.rules.get(rule_id)
    }

    /// Severity for a rule, if any layer configured it
    pub fn severity(&self, rule_id: &str) -> Option<RuleSeverity> {
        self.rules.get(rule_id).map(|directive| directive.severity)
    }

    /// Whether a rule is configured with a severity other than `off`
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.severity(rule_id).is_some_and(|severity| severity.is_enabled())
    }

    /// Rules that will run, in configuration order
    pub fn enabled_rules(&self) -> impl Iterator<Item = (&str, &RuleDirective)> {
        self.rules
            .iter()
            .filter(|(_, directive)| directive.severity.is_enabled())
            .map(|(id, directive)| (id.as_str(), directive))
    }

    /// Whether an environment flag ended up enabled
    pub fn env_enabled(&self, flag: &str) -> bool {
        self.env.get(flag).copied().unwrap_or(false)
    }

    /// Rules belonging to a plugin namespace
    pub fn rules_in_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a RuleDirective)> + 'a {
        self.rules
            .iter()
            .filter(move |(id, _)| rule_namespace(id) == Some(namespace))
            .map(|(id, directive)| (id.as_str(), directive))
    }

    /// Namespaces referenced by rule ids but missing from `plugins`
    pub fn undeclared_plugins(&self) -> IndexSet<&str> {
        self.rules
            .keys()
            .filter_map(|id| rule_namespace(id))
            .filter(|namespace| !self.plugins.contains(*namespace))
            .collect()
    }

    /// Serialize for the rule-evaluation engine
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> EffectiveConfig {
        let mut config = EffectiveConfig::default();
        config.env.insert("browser".to_string(), true);
        config.env.insert("node".to_string(), false);
        config.plugins.insert("react".to_string());
        config.rules.insert("no-console".to_string(), RuleDirective::off());
        config.rules.insert(
            "quotes".to_string(),
            RuleDirective::with_options(RuleSeverity::Error, vec![json!("single")]),
        );
        config.rules.insert("react/jsx-key".to_string(), RuleDirective::error());
        config.rules.insert("lodash/prefer-map".to_string(), RuleDirective::warn());
        config
    }

    #[test]
    fn test_queries() {
        let config = sample();

        assert_eq!(config.severity("quotes"), Some(RuleSeverity::Error));
        assert!(!config.is_enabled("no-console"));
        assert!(!config.is_enabled("unknown-rule"));
        assert!(config.env_enabled("browser"));
        assert!(!config.env_enabled("node"));
        assert!(!config.env_enabled("worker"));

        let enabled: Vec<&str> = config.enabled_rules().map(|(id, _)| id).collect();
        assert_eq!(enabled, vec!["quotes", "react/jsx-key", "lodash/prefer-map"]);

        let react: Vec<&str> = config.rules_in_namespace("react").map(|(id, _)| id).collect();
        assert_eq!(react, vec!["react/jsx-key"]);
    }

    #[test]
    fn test_undeclared_plugins() {
        let config = sample();
        let undeclared: Vec<&str> = config.undeclared_plugins().into_iter().collect();
        assert_eq!(undeclared, vec!["lodash"]);
    }

    #[test]
    fn test_to_json_shape() {
        let value = sample().to_json();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["env", "parserOptions", "plugins", "rules"]);
        assert_eq!(value["rules"]["no-console"], json!(["off"]));
        assert_eq!(value["rules"]["quotes"], json!(["error", "single"]));
        assert_eq!(value["plugins"], json!(["react"]));
    }
}
