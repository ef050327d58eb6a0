//! The universe of named layers a resolution runs against

use super::effective::EffectiveConfig;
use super::graph::LayerGraph;
use super::layer::ConfigLayer;
use super::resolver::resolve;
use crate::error::ConfigError;
use indexmap::IndexMap;
use indexmap::map::Entry;
use rayon::prelude::*;
use tracing::debug;

/// Layers keyed by unique name, in insertion order
///
/// Populated up front and then only read; resolution never loads layers
/// lazily.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerRegistry {
    layers: IndexMap<String, ConfigLayer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateLayer`] if the name is already taken.
    pub fn insert(&mut self, layer: ConfigLayer) -> Result<(), ConfigError> {
        match self.layers.entry(layer.name.clone()) {
            Entry::Occupied(entry) => Err(ConfigError::DuplicateLayer {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!("Registered layer '{}'", layer.name);
                entry.insert(layer);
                Ok(())
            }
        }
    }

    /// Register several layers, stopping at the first duplicate
    pub fn extend<I>(&mut self, layers: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = ConfigLayer>,
    {
        layers.into_iter().try_for_each(|layer| self.insert(layer))
    }

    /// Move every layer of `other` into this registry
    pub fn merge_registry(&mut self, other: LayerRegistry) -> Result<(), ConfigError> {
        self.extend(other.layers.into_values())
    }

    pub fn get(&self, name: &str) -> Option<&ConfigLayer> {
        self.layers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// Layer names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Layers in insertion order
    pub fn layers(&self) -> impl Iterator<Item = &ConfigLayer> {
        self.layers.values()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Graph view of the `extends` relation
    pub fn graph(&self) -> LayerGraph {
        LayerGraph::from_registry(self)
    }

    /// Check every layer's references and the whole graph for cycles
    ///
    /// Unknown references are reported before cycles, each in registry order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.graph().validate()
    }

    /// Resolve one entry layer
    pub fn resolve(&self, entry: &str) -> Result<EffectiveConfig, ConfigError> {
        resolve(entry, self)
    }

    /// Resolve every registered layer in parallel
    ///
    /// Results come back in registry order.
    pub fn resolve_all(&self) -> Vec<(String, Result<EffectiveConfig, ConfigError>)> {
        let names: Vec<&str> = self.names().collect();
        names
            .par_iter()
            .map(|name| (name.to_string(), resolve(name, self)))
            .collect()
    }
}

impl TryFrom<Vec<ConfigLayer>> for LayerRegistry {
    type Error = ConfigError;

    fn try_from(layers: Vec<ConfigLayer>) -> Result<Self, Self::Error> {
        let mut registry = LayerRegistry::new();
        registry.extend(layers)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layer::RuleSeverity;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut registry = LayerRegistry::new();
        registry.insert(ConfigLayer::new("base")).unwrap();

        let result =
            registry.insert(ConfigLayer::new("base").with_rule("semi", RuleSeverity::Error));
        assert_eq!(
            result,
            Err(ConfigError::DuplicateLayer {
                name: "base".to_string()
            })
        );
        // The original layer is kept
        assert!(registry.get("base").unwrap().rules.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let registry = LayerRegistry::try_from(vec![
            ConfigLayer::new("zeta"),
            ConfigLayer::new("alpha"),
            ConfigLayer::new("mid"),
        ])
        .unwrap();

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(registry.contains("alpha"));
        assert!(!registry.contains("beta"));
    }

    #[test]
    fn test_merge_registry() {
        let mut first = LayerRegistry::try_from(vec![ConfigLayer::new("a")]).unwrap();
        let second = LayerRegistry::try_from(vec![ConfigLayer::new("b")]).unwrap();
        first.merge_registry(second).unwrap();
        assert_eq!(first.len(), 2);

        let clash = LayerRegistry::try_from(vec![ConfigLayer::new("a")]).unwrap();
        assert!(first.merge_registry(clash).is_err());
    }

    #[test]
    fn test_validate_reports_unknown_before_cycles() {
        let registry = LayerRegistry::try_from(vec![
            ConfigLayer::new("a").with_extends(["b"]),
            ConfigLayer::new("b").with_extends(["a"]),
            ConfigLayer::new("c").with_extends(["ghost"]),
        ])
        .unwrap();

        assert_eq!(
            registry.validate(),
            Err(ConfigError::unknown_layer("ghost", "c"))
        );
    }

    #[test]
    fn test_resolve_all_in_registry_order() {
        let registry = LayerRegistry::try_from(vec![
            ConfigLayer::new("base").with_rule("semi", RuleSeverity::Error),
            ConfigLayer::new("child").with_extends(["base"]),
            ConfigLayer::new("broken").with_extends(["missing"]),
        ])
        .unwrap();

        let results = registry.resolve_all();
        let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["base", "child", "broken"]);

        assert!(results[0].1.is_ok());
        assert_eq!(
            results[1].1.as_ref().unwrap().severity("semi"),
            Some(RuleSeverity::Error)
        );
        assert!(results[2].1.is_err());
    }
}
