//! Layered lint configuration
//!
//! This module provides the layer model and its composition:
//! - Layer definitions in JSON, JSONC, YAML, TOML or CommonJS modules
//! - A registry of uniquely named layers
//! - Resolution of `extends` chains into one effective configuration
//! - Whole-registry validation and ordering over the `extends` graph
//!
//! ## Layer definitions
//!
//! ```jsonc
//! {
//!   "extends": ["salak/es6"],
//!   "env": { "browser": true },
//!   "parserOptions": { "ecmaFeatures": { "jsx": true } },
//!   "plugins": ["react"],
//!   "rules": {
//!     "no-console": "off",
//!     "quotes": [2, "single", "avoid-escape"],
//!     "react/jsx-indent": ["error", 2]
//!   }
//! }
//! ```
//!
//! ## Layer inheritance
//!
//! Parents listed in `extends` are resolved depth-first, in order. Later
//! parents override earlier ones and the layer's own fields override all of
//! them:
//! - `env` flags are unioned and never switched back off
//! - `parserOptions` keys are overwritten one level deep
//! - `plugins` are unioned
//! - each rule directive is replaced whole
//!
//! References to unknown layers and cycles abort resolution.

mod effective;
mod graph;
mod layer;
mod loader;
mod merge;
mod registry;
mod resolver;

pub use effective::EffectiveConfig;
pub use graph::{LayerGraph, UnknownReference};
pub use layer::{
    ConfigLayer, EnvFlags, ExtendsField, LayerDefinition, ParserOptions, RuleDirective, RuleMap,
    RuleSeverity, rule_namespace,
};
pub use loader::{LayerFormat, LayerLoader, LoaderOptions};
pub use registry::LayerRegistry;
pub use resolver::resolve;
