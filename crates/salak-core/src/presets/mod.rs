//! Built-in salak presets
//!
//! The shareable layers shipped with salak, embedded at compile time:
//!
//! | Layer | Concern |
//! |---|---|
//! | `salak` | default entry point: `salak/error` + `salak/general` |
//! | `salak/error` | possible errors |
//! | `salak/general` | best practices, extends `eslint:recommended` |
//! | `salak/es` | ES2016 syntax and module parsing |
//! | `salak/es6` | ES2015 syntax |
//! | `salak/browser` | browser environment, extends `salak/es` |
//! | `salak/node` | Node.js environment, extends `salak/es6` |
//! | `salak/json` | JSON-like object style |
//! | `salak/react` | React JSX rules, extends `salak/es6` |
//! | `salak/react/jsx-first-prop-sets-indentation` | JSX props aligned with the first prop |
//! | `salak/react/jsx-one-prop-per-line` | JSX props one per line, brackets tag-aligned |
//! | `eslint:recommended` | the upstream recommended rule set |
//!
//! Definitions keep their published form (numeric severities, legacy
//! top-level `ecmaFeatures`, `.js` suffixes in `extends`) and are normalized
//! by the loader.

use crate::config::{EffectiveConfig, LayerFormat, LayerLoader, LayerRegistry};
use crate::result::Result;
use tracing::debug;

/// Preset name and embedded definition
const PRESETS: &[(&str, &str)] = &[
    ("eslint:recommended", include_str!("../../presets/eslint-recommended.json")),
    ("salak", include_str!("../../presets/index.json")),
    ("salak/error", include_str!("../../presets/error.json")),
    ("salak/general", include_str!("../../presets/general.json")),
    ("salak/es", include_str!("../../presets/es.json")),
    ("salak/es6", include_str!("../../presets/es6.json")),
    ("salak/browser", include_str!("../../presets/browser.json")),
    ("salak/node", include_str!("../../presets/node.json")),
    ("salak/json", include_str!("../../presets/json.json")),
    ("salak/react", include_str!("../../presets/react.json")),
    (
        "salak/react/jsx-first-prop-sets-indentation",
        include_str!("../../presets/react/jsx-first-prop-sets-indentation.json"),
    ),
    (
        "salak/react/jsx-one-prop-per-line",
        include_str!("../../presets/react/jsx-one-prop-per-line.json"),
    ),
];

/// Names of every built-in preset
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

/// Registry holding every built-in preset, validated
pub fn builtin_registry() -> Result<LayerRegistry> {
    let loader = LayerLoader::default();
    let mut registry = LayerRegistry::new();

    for (name, definition) in PRESETS {
        registry.insert(loader.parse_str(name, definition, LayerFormat::Json)?)?;
    }
    registry.validate()?;

    debug!("Loaded {} built-in presets", registry.len());
    Ok(registry)
}

/// Effective configuration of one built-in preset
pub fn resolve_preset(name: &str) -> Result<EffectiveConfig> {
    Ok(builtin_registry()?.resolve(name)?)
}
