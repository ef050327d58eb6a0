//! `extends` resolution
//!
//! Walks an entry layer's `extends` list depth-first, in listed order. Every
//! parent is fully resolved before the next one is applied, and the layer's
//! own fields are applied last, so later parents override earlier ones and
//! the child overrides them all.
//!
//! Cycles are detected against the active traversal path. A layer reached
//! through several paths (a diamond) is resolved once per call and reused.

use super::effective::EffectiveConfig;
use super::layer::ConfigLayer;
use super::registry::LayerRegistry;
use crate::error::ConfigError;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Resolve the effective configuration of `entry`
///
/// Pure function of `registry` and `entry`: the registry is only read and
/// each call owns its traversal state, so concurrent calls over the same
/// registry are independent.
///
/// # Errors
///
/// - [`ConfigError::UnknownLayer`] when `entry` or any `extends` reference is
///   not registered
/// - [`ConfigError::CyclicExtends`] when the traversal revisits a layer on the
///   active path
///
/// # Examples
///
/// ```
/// use salak_core::config::{ConfigLayer, LayerRegistry, RuleSeverity, resolve};
///
/// let mut registry = LayerRegistry::new();
/// registry.insert(ConfigLayer::new("base").with_rule("no-console", RuleSeverity::Error))?;
/// registry.insert(
///     ConfigLayer::new("child")
///         .with_extends(["base"])
///         .with_rule("no-console", RuleSeverity::Off),
/// )?;
///
/// let effective = resolve("child", &registry)?;
/// assert_eq!(effective.severity("no-console"), Some(RuleSeverity::Off));
/// # Ok::<(), salak_core::ConfigError>(())
/// ```
pub fn resolve(entry: &str, registry: &LayerRegistry) -> Result<EffectiveConfig, ConfigError> {
    let layer = registry
        .get(entry)
        .ok_or_else(|| ConfigError::unknown_entry(entry))?;

    debug!("Resolving layer '{}'", entry);
    let effective = Resolver::new(registry).resolve_layer(layer)?;

    let undeclared = effective.undeclared_plugins();
    if !undeclared.is_empty() {
        warn!(
            "Layer '{}' configures rules of undeclared plugins: {:?}",
            entry, undeclared
        );
    }

    Ok(effective)
}

/// Per-call traversal state
struct Resolver<'a> {
    registry: &'a LayerRegistry,
    /// Layers already resolved during this call
    resolved: HashMap<&'a str, EffectiveConfig>,
}

/// A layer on the active path, with the parents applied so far
struct Frame<'a> {
    layer: &'a ConfigLayer,
    next: usize,
    effective: EffectiveConfig,
}

impl<'a> Frame<'a> {
    fn new(layer: &'a ConfigLayer) -> Self {
        Self {
            layer,
            next: 0,
            effective: EffectiveConfig::default(),
        }
    }

    /// Next `extends` entry to resolve, if any remain
    fn next_parent(&mut self) -> Option<&'a str> {
        let layer: &'a ConfigLayer = self.layer;
        let parent = layer.extends.get(self.next)?;
        self.next += 1;
        Some(parent.as_str())
    }

    /// Apply the parent returned by the last `next_parent`
    fn absorb(&mut self, parent: EffectiveConfig) {
        if self.next == 1 {
            self.effective = parent;
        } else {
            self.effective.apply(&parent);
        }
    }
}

impl<'a> Resolver<'a> {
    fn new(registry: &'a LayerRegistry) -> Self {
        Self {
            registry,
            resolved: HashMap::new(),
        }
    }

    /// Depth-first over `extends` with an explicit stack, so chain depth is
    /// bounded by memory rather than the thread stack
    fn resolve_layer(&mut self, entry: &'a ConfigLayer) -> Result<EffectiveConfig, ConfigError> {
        let mut stack = vec![Frame::new(entry)];
        let mut finished: Option<EffectiveConfig> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(parent_config) = finished.take() {
                frame.absorb(parent_config);
            }

            let layer = frame.layer;
            let Some(parent_name) = frame.next_parent() else {
                let mut effective = std::mem::take(&mut frame.effective);
                effective.apply_layer(layer);
                stack.pop();
                self.resolved.insert(&layer.name, effective.clone());
                finished = Some(effective);
                continue;
            };

            let parent = self
                .registry
                .get(parent_name)
                .ok_or_else(|| ConfigError::unknown_layer(parent_name, &layer.name))?;

            if let Some(pos) = stack.iter().position(|open| open.layer.name == parent.name) {
                let cycle = stack[pos..]
                    .iter()
                    .map(|open| open.layer.name.clone())
                    .collect();
                return Err(ConfigError::CyclicExtends { cycle });
            }

            trace!("Applying '{}' onto '{}'", parent_name, layer.name);
            if let Some(done) = self.resolved.get(parent.name.as_str()) {
                trace!("Reusing resolved layer '{}'", parent.name);
                finished = Some(done.clone());
                continue;
            }

            stack.push(Frame::new(parent));
        }

        Ok(finished.unwrap_or_default())
    }
}
