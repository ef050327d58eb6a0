//! Configuration merging logic
//!
//! Layers are applied onto an accumulating [`EffectiveConfig`]. The layer
//! applied last wins, with a per-field policy:
//! - `env`: union; once a flag is enabled no later layer disables it
//! - `parserOptions`: shallow key overwrite
//! - `plugins`: union
//! - `rules`: key-wise overwrite of the whole directive (severity + options)

use super::effective::EffectiveConfig;
use super::layer::{ConfigLayer, EnvFlags, ParserOptions, RuleMap};
use indexmap::IndexSet;

impl EffectiveConfig {
    /// Apply an already resolved parent over this config (parent takes precedence)
    pub fn apply(&mut self, overlay: &EffectiveConfig) {
        Self::merge_env(&mut self.env, &overlay.env);
        Self::merge_parser_options(&mut self.parser_options, &overlay.parser_options);
        Self::merge_plugins(&mut self.plugins, &overlay.plugins);
        Self::merge_rule_map(&mut self.rules, &overlay.rules);
    }

    /// Apply a layer's own fields over this config (layer takes precedence)
    ///
    /// `name` and `extends` are not merged.
    pub fn apply_layer(&mut self, layer: &ConfigLayer) {
        Self::merge_env(&mut self.env, &layer.env);
        Self::merge_parser_options(&mut self.parser_options, &layer.parser_options);
        Self::merge_plugins(&mut self.plugins, &layer.plugins);
        Self::merge_rule_map(&mut self.rules, &layer.rules);
    }

    fn merge_env(target: &mut EnvFlags, source: &EnvFlags) {
        for (flag, &enabled) in source {
            let current = target.entry(flag.clone()).or_insert(false);
            *current |= enabled;
        }
    }

    fn merge_parser_options(target: &mut ParserOptions, source: &ParserOptions) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }

    fn merge_plugins(target: &mut IndexSet<String>, source: &IndexSet<String>) {
        for plugin in source {
            if !target.contains(plugin) {
                target.insert(plugin.clone());
            }
        }
    }

    /// Source directives replace target directives entirely
    fn merge_rule_map(target: &mut RuleMap, source: &RuleMap) {
        for (rule, directive) in source {
            target.insert(rule.clone(), directive.clone());
        }
    }
}

impl From<&ConfigLayer> for EffectiveConfig {
    fn from(layer: &ConfigLayer) -> Self {
        let mut config = EffectiveConfig::default();
        config.apply_layer(layer);
        config
    }
}
